use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::IdentityConfig;
use crate::error::{Result, SessionTokenError};

/// Claims carried by a gateway session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub tenant_id: i64,
    /// Subject identifier assigned by the external identity provider
    pub user_id: String,
    pub email: String,
    /// Issued at (seconds since epoch)
    pub iat: i64,
    /// Expiration (seconds since epoch)
    pub exp: i64,
}

impl SessionClaims {
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp <= now
    }
}

/// HS256 session token issuer and verifier.
///
/// Tokens are stateless: nothing is stored server side and there is no
/// revocation. Verification pins the algorithm to HS256 before the signature
/// is looked at and applies no clock leeway.
pub struct SessionTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl SessionTokenService {
    pub fn new(config: &IdentityConfig) -> Result<Self> {
        let secret = config.jwt_secret.expose_secret().as_bytes();
        if secret.is_empty() {
            return Err(SessionTokenError::Configuration(
                "session signing secret must not be empty".to_string(),
            ));
        }
        if config.session_ttl_hours <= 0 {
            return Err(SessionTokenError::Configuration(format!(
                "session lifetime must be positive, got {} hours",
                config.session_ttl_hours
            )));
        }

        let ttl = Duration::try_hours(config.session_ttl_hours).ok_or_else(|| {
            SessionTokenError::Configuration(format!(
                "session lifetime of {} hours is out of range",
                config.session_ttl_hours
            ))
        })?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: hs256_validation(),
            ttl,
        })
    }

    /// Token lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for an authenticated user
    pub fn issue(&self, tenant_id: i64, user_id: &str, email: &str) -> Result<String> {
        self.issue_at(tenant_id, user_id, email, Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(&self, tenant_id: i64, user_id: &str, email: &str, now: i64) -> Result<String> {
        let exp = now
            .checked_add(self.ttl.num_seconds())
            .ok_or_else(|| SessionTokenError::Signing("token expiry out of range".to_string()))?;
        let claims = SessionClaims {
            tenant_id,
            user_id: user_id.to_string(),
            email: email.to_string(),
            iat: now,
            exp,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| SessionTokenError::Signing(e.to_string()))?;

        debug!(tenant_id, exp = claims.exp, "Issued session token");
        Ok(token)
    }

    /// Verify signature, algorithm and expiry
    pub fn verify(&self, token: &str) -> Result<SessionClaims> {
        self.verify_at(token, Utc::now().timestamp())
    }

    pub fn verify_at(&self, token: &str, now: i64) -> Result<SessionClaims> {
        ensure_hs256(token)?;

        let claims = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)?.claims;
        if claims.is_expired_at(now) {
            return Err(SessionTokenError::Expired);
        }
        Ok(claims)
    }
}

/// HS256 validation with expiry checked by the caller against an explicit clock.
pub(crate) fn hs256_validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.validate_exp = false;
    validation.set_required_spec_claims(&["exp"]);
    validation
}

/// Reject anything not signed with HS256 before touching the signature,
/// including `alg: none` which the JWT library cannot even represent.
pub(crate) fn ensure_hs256(token: &str) -> Result<()> {
    let header_segment = token
        .split('.')
        .next()
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| SessionTokenError::Malformed("missing header".to_string()))?;

    let header_bytes = URL_SAFE_NO_PAD
        .decode(header_segment)
        .map_err(|e| SessionTokenError::Malformed(format!("header is not base64url: {e}")))?;
    let header: Value = serde_json::from_slice(&header_bytes)
        .map_err(|e| SessionTokenError::Malformed(format!("header is not JSON: {e}")))?;

    match header.get("alg").and_then(Value::as_str) {
        Some("HS256") => Ok(()),
        Some(other) => Err(SessionTokenError::UnexpectedAlgorithm(other.to_string())),
        None => Err(SessionTokenError::Malformed("header has no alg".to_string())),
    }
}
