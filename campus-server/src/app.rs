use std::sync::Arc;

use anyhow::Result;
use campus_auth::{AuthenticationService, SessionCodec};
use campus_auth_local::{AdminStrategy, CredentialStore, LocalStrategy, Registrar};
use campus_axum::{axum, AxumApp};
use campus_core::{CampusConfig, CampusStore};
use tracing::info;

use crate::config::Settings;
use crate::services::{self, CampusState, StoreHandle};
use crate::services::cats::CatsService;
use crate::services::courses::CoursesService;
use crate::services::rosters::RostersService;
use crate::services::schedules::SchedulesService;
use crate::services::schools::SchoolsService;
use crate::services::students::StudentsService;
use crate::services::teachers::TeachersService;

/// Wire every service against `store` and mount the routes.
pub fn campus_app<S>(config: CampusConfig, store: Arc<S>) -> Result<AxumApp>
where
    S: CampusStore + 'static,
{
    let snapshot = config.snapshot();
    let settings = Settings::from_snapshot(&snapshot)?;
    let credentials = CredentialStore::new(settings.bcrypt_cost)?;
    let timeout = settings.storage_timeout;

    let codec = SessionCodec::new(settings.signing, settings.auth.jwt.clone());
    let auth = AuthenticationService::builder(codec, store.clone())
        .options(settings.auth.clone())
        .storage_timeout(timeout)
        .strategy(Arc::new(
            LocalStrategy::new(store.clone(), credentials).with_storage_timeout(timeout),
        ))
        .strategy(Arc::new(
            AdminStrategy::new(store.clone(), credentials).with_storage_timeout(timeout),
        ))
        .build()?;
    let registrar =
        Registrar::new(store.clone(), store.clone(), credentials).with_storage_timeout(timeout);

    let handle = StoreHandle::new(store, timeout);
    let state = Arc::new(CampusState {
        auth,
        registrar,
        schools: SchoolsService::new(handle.clone(), settings.auth.asset_base_url.clone()),
        courses: CoursesService::new(handle.clone()),
        teachers: TeachersService::new(handle.clone()),
        students: StudentsService::new(handle.clone()),
        schedules: SchedulesService::new(handle.clone()),
        cats: CatsService::new(handle.clone()),
        rosters: RostersService::new(handle),
    });
    info!(
        strategies = ?state.auth.strategy_names(),
        bcrypt_cost = credentials.cost(),
        storage_timeout = ?timeout,
        "campus services configured"
    );

    let mut ax = axum(snapshot)
        .merge(services::routes().with_state(state))
        .use_get("/health", || async { "ok" });
    if let Some(origin) = settings.cors_origin.as_deref() {
        ax = ax.with_cors(origin)?;
    }
    Ok(ax.with_http_layers())
}
