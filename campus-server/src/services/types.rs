use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use campus_auth::{AuthenticationService, SessionClaim};
use campus_auth_local::Registrar;
use campus_axum::SessionState;
use campus_core::{bail_campus, bounded, CampusResult, CampusStore, Role, StoreResult};

use super::cats::CatsService;
use super::courses::CoursesService;
use super::rosters::RostersService;
use super::schedules::SchedulesService;
use super::schools::SchoolsService;
use super::students::StudentsService;
use super::teachers::TeachersService;

/// Shared store plus the deadline applied to every call made through it.
#[derive(Clone)]
pub struct StoreHandle {
    store: Arc<dyn CampusStore>,
    timeout: Duration,
}

impl StoreHandle {
    pub fn new(store: Arc<dyn CampusStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub fn store(&self) -> &dyn CampusStore {
        self.store.as_ref()
    }

    pub async fn run<T, F>(&self, fut: F) -> CampusResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        Ok(bounded(self.timeout, fut).await?)
    }
}

/// Everything a handler can reach.
pub struct CampusState {
    pub auth: AuthenticationService,
    pub registrar: Registrar,
    pub schools: SchoolsService,
    pub courses: CoursesService,
    pub teachers: TeachersService,
    pub students: StudentsService,
    pub schedules: SchedulesService,
    pub cats: CatsService,
    pub rosters: RostersService,
}

pub type SharedState = Arc<CampusState>;

impl SessionState for CampusState {
    fn authentication(&self) -> &AuthenticationService {
        &self.auth
    }
}

/// The principal must exist in the caller's school (404 otherwise, like any
/// foreign id); then the caller must be that principal or an admin (403).
pub async fn ensure_principal_access(
    store: &StoreHandle,
    claim: &SessionClaim,
    role: Role,
    principal_id: i64,
) -> CampusResult<()> {
    let ctx = claim.tenant();
    match role {
        Role::Teacher => {
            store.run(store.store().get_teacher(&ctx, principal_id)).await?;
        }
        Role::Student => {
            store.run(store.store().get_student(&ctx, principal_id)).await?;
        }
        Role::Admin => {}
    }
    ensure_self_or_admin(claim, role, principal_id)
}

/// Admins act for anyone in their school; others only for themselves.
pub fn ensure_self_or_admin(claim: &SessionClaim, role: Role, principal_id: i64) -> CampusResult<()> {
    if claim.may_act_for(role, principal_id) {
        return Ok(());
    }
    bail_campus!(forbidden, "Not allowed to act for this {}", role);
}

pub fn ensure_admin(claim: &SessionClaim) -> CampusResult<()> {
    if claim.is_admin() {
        return Ok(());
    }
    bail_campus!(forbidden, "Only school administrators can do this");
}

/// A slug in the path must name the caller's own school. Any other slug is
/// answered like an unknown school.
pub fn ensure_slug(claim: &SessionClaim, slug: &str) -> CampusResult<()> {
    if claim.slug == slug {
        return Ok(());
    }
    bail_campus!(not_found, "School not found");
}
