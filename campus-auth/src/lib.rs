//! campus-auth: session tokens, cookies and the authentication service.

pub mod claims;
pub mod cookie;
pub mod core;
pub mod error;
pub mod options;
pub mod service;
pub mod strategy;

pub use claims::{AuthenticatedPrincipal, SessionClaim};
pub use cookie::{extract_session_token, SESSION_COOKIE};
pub use self::core::{JwtProvider, SessionCodec, SigningContext, SigningKey};
pub use error::{AuthError, AuthResult, INVALID_CREDENTIALS};
pub use options::{AuthOptions, AuthOptionsBuilder, CookieOptions, JwtAlgorithm, JwtOptions, SameSite};
pub use service::{asset_url, AuthenticationService, AuthenticationServiceBuilder, Session, SessionInfo};
pub use strategy::AuthenticationStrategy;
