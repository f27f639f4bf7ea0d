mod app;
pub mod config;
pub mod services;

use std::sync::Arc;

use anyhow::Result;
use campus_axum::AxumApp;
use campus_core::{CampusConfig, CampusStore, MemoryStore};

pub use app::campus_app;

/// Server configured from the environment, backed by the in-memory store.
pub fn build() -> Result<AxumApp> {
    build_with(config::load(), Arc::new(MemoryStore::new()))
}

pub fn build_with<S>(config: CampusConfig, store: Arc<S>) -> Result<AxumApp>
where
    S: CampusStore + 'static,
{
    campus_app(config, store)
}
