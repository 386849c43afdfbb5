//! Multi-tenant SSO gateway HTTP server
//!
//! Wires the provider registry, session tokens and provider store into an
//! axum router:
//!
//! - `GET /{tenant_id}/{idp_type}/login` and `/callback` for the SSO flow
//! - `/admin/tenants/{tenant_id}/idps` for provider CRUD (session required)
//! - `GET /api/v1/me` for the caller's identity (session required)
//! - `GET /healthz`

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::{ConfigError, SsoConfig};
pub use error::{ApiError, ApiErrorResponse};
pub use state::AppState;

use axum::{extract::Request, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Create the main application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // Spans carry the path only; callback query strings hold authorization codes
    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        tracing::info_span!(
            "request",
            method = %request.method(),
            path = %request.uri().path(),
        )
    });

    routes::create_routes(&state)
        .layer(ServiceBuilder::new().layer(trace))
        .with_state(state)
}
