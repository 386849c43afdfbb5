//! Authentication gateway for protected routes.
//!
//! [`authenticate`] is an axum middleware that turns a gateway session token
//! into a [`SessionContext`]. Handlers behind it take the context as an
//! extractor:
//!
//! ```rust,ignore
//! use auth_gateway::{authenticate, SessionContext};
//! use axum::{middleware, routing::get, Json, Router};
//!
//! async fn me(session: SessionContext) -> Json<SessionContext> {
//!     Json(session)
//! }
//!
//! let app = Router::new()
//!     .route("/api/v1/me", get(me))
//!     .route_layer(middleware::from_fn_with_state(tokens, authenticate));
//! ```

pub mod error;
pub mod middleware;

pub use error::AuthError;
pub use middleware::{authenticate, extract_bearer, SessionContext};
