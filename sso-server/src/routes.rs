use auth_gateway::authenticate;
use axum::{
    middleware::from_fn_with_state,
    routing::get,
    Router,
};

use crate::{
    handlers::{auth, health, idp, me},
    state::AppState,
};

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/healthz", get(health::healthz))
}

/// Browser-facing SSO routes
pub fn sso_routes() -> Router<AppState> {
    Router::new()
        .route("/:tenant_id/:idp_type/login", get(auth::login))
        .route("/:tenant_id/:idp_type/callback", get(auth::callback))
}

/// Identity-provider administration
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/admin/tenants/:tenant_id/idps",
            get(idp::list_providers).post(idp::create_provider),
        )
        .route(
            "/admin/tenants/:tenant_id/idps/:id",
            get(idp::get_provider)
                .put(idp::update_provider)
                .delete(idp::delete_provider),
        )
}

/// Authenticated API routes
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/api/v1/me", get(me::me))
}

/// Create all routes. Admin and API routes require a session token.
pub fn create_routes(state: &AppState) -> Router<AppState> {
    let protected = admin_routes()
        .merge(api_routes())
        .route_layer(from_fn_with_state(state.sessions.clone(), authenticate));

    Router::new()
        .merge(health_routes())
        .merge(sso_routes())
        .merge(protected)
}
