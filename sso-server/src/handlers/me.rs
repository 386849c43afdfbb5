use auth_gateway::SessionContext;
use axum::Json;

/// Echo the caller's session identity
pub async fn me(session: SessionContext) -> Json<SessionContext> {
    Json(session)
}
