use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ApiErrorResponse;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct ComponentStatus {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub database: ComponentStatus,
}

/// Liveness of the gateway and its database
pub async fn healthz(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<ApiErrorResponse>)> {
    match state.store.ping().await {
        Ok(()) => Ok(Json(HealthResponse {
            database: ComponentStatus {
                status: "up".to_string(),
            },
        })),
        Err(e) => {
            warn!(error = %e, "Health check failed");
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiErrorResponse {
                    error: "database down".to_string(),
                    status: StatusCode::SERVICE_UNAVAILABLE.as_u16(),
                }),
            ))
        }
    }
}
