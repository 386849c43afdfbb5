//! Admin endpoints for a tenant's identity providers:
//! - GET /admin/tenants/{tenant_id}/idps
//! - POST /admin/tenants/{tenant_id}/idps
//! - GET /admin/tenants/{tenant_id}/idps/{id}
//! - PUT /admin/tenants/{tenant_id}/idps/{id}
//! - DELETE /admin/tenants/{tenant_id}/idps/{id}
//!
//! Client secrets are encrypted before they reach the store and are only
//! ever returned as base64 ciphertext.

use auth_oidc::ProviderKind;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::SecondsFormat;
use database_layer::{NewProviderRecord, ProviderRecord};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;
use zeroize::Zeroizing;

use super::{parse_id, parse_tenant};
use crate::error::ApiError;
use crate::state::AppState;

/// Create or replace payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct IdpRequest {
    #[serde(rename = "type")]
    pub provider_type: ProviderKind,

    #[validate(url(message = "metadata_url must be a valid URL"))]
    pub metadata_url: String,

    #[validate(length(min = 1, message = "client_id is required"))]
    pub client_id: String,

    #[validate(length(min = 1, message = "client_secret is required"))]
    pub client_secret: String,

    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdpResponse {
    pub id: i64,
    pub tenant_id: i64,
    #[serde(rename = "type")]
    pub provider_type: String,
    pub metadata_url: String,
    pub client_id: String,
    /// Base64 of `nonce || ciphertext`
    pub client_secret_enc: String,
    pub enabled: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ProviderRecord> for IdpResponse {
    fn from(record: ProviderRecord) -> Self {
        Self {
            id: record.id,
            tenant_id: record.tenant_id,
            provider_type: record.provider_type,
            metadata_url: record.metadata_url,
            client_id: record.client_id,
            client_secret_enc: BASE64.encode(&record.client_secret_enc),
            enabled: record.enabled,
            created_at: record.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            updated_at: record.updated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: i64,
}

/// Validate the payload and encrypt its secret
fn to_record(
    state: &AppState,
    tenant_id: i64,
    body: Result<Json<IdpRequest>, JsonRejection>,
) -> Result<NewProviderRecord, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    request.validate()?;

    let IdpRequest {
        provider_type,
        metadata_url,
        client_id,
        client_secret,
        enabled,
    } = request;
    let client_secret = Zeroizing::new(client_secret);

    Ok(NewProviderRecord {
        tenant_id,
        provider_type: provider_type.as_str().to_string(),
        metadata_url,
        client_id,
        client_secret_enc: state.cipher.encrypt(client_secret.as_bytes())?,
        enabled,
    })
}

pub async fn list_providers(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
) -> Result<Json<Vec<IdpResponse>>, ApiError> {
    let tenant_id = parse_tenant(&tenant)?;

    let records = state.store.list_by_tenant(tenant_id).await?;
    Ok(Json(records.into_iter().map(IdpResponse::from).collect()))
}

pub async fn get_provider(
    State(state): State<AppState>,
    Path((tenant, id)): Path<(String, String)>,
) -> Result<Json<IdpResponse>, ApiError> {
    let tenant_id = parse_tenant(&tenant)?;
    let id = parse_id(&id)?;

    let record = state.store.get(tenant_id, id).await?;
    Ok(Json(record.into()))
}

pub async fn create_provider(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
    body: Result<Json<IdpRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let tenant_id = parse_tenant(&tenant)?;
    let record = to_record(&state, tenant_id, body)?;

    let id = state.store.create(&record).await?;

    info!(tenant_id, provider_id = id, provider_type = %record.provider_type, "Identity provider created");
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

pub async fn update_provider(
    State(state): State<AppState>,
    Path((tenant, id)): Path<(String, String)>,
    body: Result<Json<IdpRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let tenant_id = parse_tenant(&tenant)?;
    let id = parse_id(&id)?;
    let record = to_record(&state, tenant_id, body)?;

    state.store.update(id, &record).await?;

    info!(tenant_id, provider_id = id, "Identity provider updated");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_provider(
    State(state): State<AppState>,
    Path((tenant, id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let tenant_id = parse_tenant(&tenant)?;
    let id = parse_id(&id)?;

    state.store.delete(tenant_id, id).await?;

    info!(tenant_id, provider_id = id, "Identity provider deleted");
    Ok(StatusCode::NO_CONTENT)
}
