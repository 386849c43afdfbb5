//! Session identity for the SSO gateway.
//!
//! After a successful provider callback the gateway issues its own HS256
//! session token ([`SessionTokenService`]). The OAuth `state` parameter is a
//! short-lived signed token as well ([`LoginStateService`]) so callbacks can
//! be tied back to the login that started them without server-side storage.
//!
//! ```rust
//! use auth_identity::{IdentityConfig, SessionTokenService};
//!
//! let service = SessionTokenService::new(&IdentityConfig::new("secret")).unwrap();
//! let token = service.issue(99, "user123", "user@example.com").unwrap();
//! let claims = service.verify(&token).unwrap();
//! assert_eq!(claims.tenant_id, 99);
//! ```

pub mod config;
pub mod error;
pub mod session;
pub mod state;

pub use config::IdentityConfig;
pub use error::{Result, SessionTokenError};
pub use session::{SessionClaims, SessionTokenService};
pub use state::{LoginState, LoginStateService};
