//! Password-based authentication for Campus: bcrypt credentials, the
//! student/teacher and admin login strategies, and registration.

pub mod credentials;
pub mod payload;
pub mod registration;
pub mod strategy;

pub use credentials::{CredentialError, CredentialStore};
pub use payload::decode_payload;
pub use registration::{Registered, Registrar, RegistrationRequest, SchoolRegistration};
pub use strategy::{AdminStrategy, LocalStrategy, ADMIN_DEPARTMENT};
