//! SSO entry points:
//! - GET /{tenant_id}/{idp_type}/login
//! - GET /{tenant_id}/{idp_type}/callback

use auth_oidc::{CallbackParams, IdentityProvider};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{parse_kind, parse_tenant};
use crate::error::ApiError;
use crate::state::AppState;

/// Body returned by a successful callback
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

fn find_provider(
    state: &AppState,
    tenant: &str,
    idp_type: &str,
) -> Result<Arc<dyn IdentityProvider>, ApiError> {
    let tenant_id = parse_tenant(tenant)?;
    let kind = parse_kind(idp_type)?;

    state
        .registry
        .find(tenant_id, kind)
        .ok_or_else(|| ApiError::not_found("provider not found"))
}

/// Redirect the browser to the provider's authorization endpoint
#[instrument(skip(state))]
pub async fn login(
    State(state): State<AppState>,
    Path((tenant, idp_type)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let provider = find_provider(&state, &tenant, &idp_type)?;

    let login_state = state
        .login_states
        .issue(provider.tenant_id(), provider.kind().as_str())
        .map_err(|e| ApiError::internal(format!("failed to sign login state: {e}")))?;

    let location = provider.auth_url(&login_state);
    Ok((StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response())
}

/// Complete the authorization-code flow and issue a gateway session token
#[instrument(skip(state, params))]
pub async fn callback(
    State(state): State<AppState>,
    Path((tenant, idp_type)): Path<(String, String)>,
    Query(params): Query<CallbackParams>,
) -> Result<Json<TokenResponse>, ApiError> {
    let provider = find_provider(&state, &tenant, &idp_type)?;
    let tenant_id = provider.tenant_id();
    let kind = provider.kind();

    let login_state = params.state.as_deref().unwrap_or_default();
    if let Err(e) = state.login_states.verify(login_state, tenant_id, kind.as_str()) {
        warn!(tenant_id, %kind, error = %e, "Rejected callback with invalid state");
        return Err(ApiError::Unauthorized);
    }

    let result = provider.callback(&params).await.map_err(|e| {
        warn!(tenant_id, %kind, error = %e, "SSO callback failed");
        ApiError::Unauthorized
    })?;

    let token = state
        .sessions
        .issue(result.tenant_id, &result.user_id, &result.email)
        .map_err(|e| ApiError::internal(format!("failed to generate token: {e}")))?;

    info!(tenant_id, %kind, user_id = %result.user_id, "User signed in");
    Ok(Json(TokenResponse { token }))
}
