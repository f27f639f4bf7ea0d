//! campus-core: framework-agnostic core for the Campus school backend.

pub mod config;
pub mod errors;
pub mod models;
pub mod store;
pub mod tenant;

pub use config::{CampusConfig, CampusConfigSnapshot};
pub use errors::{CampusError, CampusResult, ErrorKind};
pub use models::{DayOfWeek, Role};
pub use store::{
    bounded, CampusStore, CatStore, CourseStore, MemoryStore, PrincipalStore, ScheduleStore,
    StoreError, StoreResult, TenantDirectory,
};
pub use tenant::{Branding, BrandingUpdate, NewTenant, Tenant, TenantContext, TenantId};
