use async_trait::async_trait;
use auth_identity::{SessionClaims, SessionTokenService};
use axum::{
    body::Body,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::AuthError;

/// Authenticated caller, injected into request extensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub tenant_id: i64,
    pub user_id: String,
    pub email: String,
}

impl From<SessionClaims> for SessionContext {
    fn from(claims: SessionClaims) -> Self {
        Self {
            tenant_id: claims.tenant_id,
            user_id: claims.user_id,
            email: claims.email,
        }
    }
}

/// Require a valid gateway session token.
///
/// Expects `Authorization: Bearer <token>`. On success the decoded
/// [`SessionContext`] is available to handlers; otherwise the request is
/// answered with 401 and never reaches the handler.
pub async fn authenticate(
    State(tokens): State<Arc<SessionTokenService>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let token = extract_bearer(request.headers())?;

    let claims = tokens.verify(token).map_err(|e| {
        tracing::debug!(error = %e, "Session token rejected");
        AuthError::InvalidToken
    })?;

    let context = SessionContext::from(claims);
    tracing::debug!(
        tenant_id = context.tenant_id,
        user_id = %context.user_id,
        "Request authenticated"
    );

    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers.get(AUTHORIZATION).ok_or(AuthError::MissingHeader)?;
    let value = value.to_str().map_err(|_| AuthError::InvalidHeaderFormat)?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthError::InvalidHeaderFormat),
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionContext>()
            .cloned()
            .ok_or(AuthError::Unauthenticated)
    }
}
