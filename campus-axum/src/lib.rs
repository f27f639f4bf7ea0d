//! campus-axum: Axum adapter for the Campus backend.
//!
//! Error responses in the structured JSON shape, the session extractor and
//! the app shell that carries configuration and the HTTP middleware stack.

pub mod app;
pub mod rest;
pub mod session;
mod error;
pub use error::CampusAxumError;
pub use session::{CurrentSession, SessionState};

pub use app::{axum, AxumApp};
