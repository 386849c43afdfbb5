pub mod auth;
pub mod health;
pub mod idp;
pub mod me;

use auth_oidc::ProviderKind;

use crate::error::ApiError;

/// Parse a `{tenant_id}` path segment, tolerating stray slashes
pub(crate) fn parse_tenant(raw: &str) -> Result<i64, ApiError> {
    raw.trim_matches('/')
        .parse()
        .map_err(|_| ApiError::bad_request("invalid tenant id"))
}

pub(crate) fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim_start_matches('/')
        .parse()
        .map_err(|_| ApiError::bad_request("invalid id"))
}

/// Parse an `{idp_type}` path segment. A kind we do not know has no
/// provider behind it, so it is reported like any other missing provider.
pub(crate) fn parse_kind(raw: &str) -> Result<ProviderKind, ApiError> {
    raw.parse()
        .map_err(|_: auth_oidc::provider::UnknownProviderKind| ApiError::not_found("provider not found"))
}
