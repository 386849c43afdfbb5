use jsonwebtoken::{
    decode, decode_header,
    jwk::{Jwk, JwkSet},
    Algorithm, DecodingKey, Validation,
};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{AuthFlowError, Result};
use crate::provider::IdToken;

/// Clock skew tolerated on `exp`, `nbf` and `iat`.
const CLOCK_SKEW_SECS: u64 = 60;

const ASYMMETRIC_ALGORITHMS: &[Algorithm] = &[
    Algorithm::RS256,
    Algorithm::RS384,
    Algorithm::RS512,
    Algorithm::PS256,
    Algorithm::PS384,
    Algorithm::PS512,
    Algorithm::ES256,
    Algorithm::ES384,
    Algorithm::EdDSA,
];

/// Verifies ID tokens against a provider's published signing keys.
///
/// The JWKS is fetched lazily on first use and cached for the life of the
/// process. A token signed with an unknown `kid` triggers exactly one refetch,
/// which covers provider key rotation.
pub struct IdTokenVerifier {
    issuer: String,
    client_id: String,
    jwks_uri: String,
    http_client: reqwest::Client,
    timeout: Duration,
    keys: RwLock<Option<JwkSet>>,
}

impl IdTokenVerifier {
    pub fn new(
        issuer: impl Into<String>,
        client_id: impl Into<String>,
        jwks_uri: impl Into<String>,
        http_client: reqwest::Client,
        timeout: Duration,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            client_id: client_id.into(),
            jwks_uri: jwks_uri.into(),
            http_client,
            timeout,
            keys: RwLock::new(None),
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Check signature, algorithm, issuer, audience and expiry
    pub async fn verify(&self, raw: &str) -> Result<IdToken> {
        let header = decode_header(raw).map_err(|e| verification(format!("bad header: {e}")))?;

        if !ASYMMETRIC_ALGORITHMS.contains(&header.alg) {
            return Err(verification(format!(
                "algorithm {:?} is not allowed for id_tokens",
                header.alg
            )));
        }

        let jwk = self.signing_key(header.kid.as_deref()).await?;
        let key = DecodingKey::from_jwk(&jwk)
            .map_err(|e| verification(format!("unusable signing key: {e}")))?;

        let mut validation = Validation::new(header.alg);
        validation.leeway = CLOCK_SKEW_SECS;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.client_id]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        let claims = decode::<Value>(raw, &key, &validation)
            .map_err(|e| verification(e.to_string()))?
            .claims;

        Ok(IdToken {
            raw: raw.to_string(),
            claims,
        })
    }

    async fn signing_key(&self, kid: Option<&str>) -> Result<Jwk> {
        {
            let cached = self.keys.read().await;
            if let Some(jwk) = cached.as_ref().and_then(|set| select_key(set, kid)) {
                return Ok(jwk.clone());
            }
        }

        debug!(kid = ?kid, jwks_uri = %self.jwks_uri, "Signing key not cached, fetching JWKS");
        let jwks = self.fetch_keys().await?;
        let jwk = select_key(&jwks, kid).cloned();
        *self.keys.write().await = Some(jwks);

        jwk.ok_or_else(|| {
            verification(format!(
                "no signing key matches kid {}",
                kid.unwrap_or("<none>")
            ))
        })
    }

    async fn fetch_keys(&self) -> Result<JwkSet> {
        let response = self
            .http_client
            .get(&self.jwks_uri)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| verification(format!("JWKS fetch failed: {e}")))?;

        if !response.status().is_success() {
            return Err(verification(format!(
                "JWKS fetch failed: HTTP status {}",
                response.status()
            )));
        }

        let jwks: JwkSet = response
            .json()
            .await
            .map_err(|e| verification(format!("JWKS is not valid JSON: {e}")))?;

        info!(jwks_uri = %self.jwks_uri, key_count = jwks.keys.len(), "JWKS cached");
        Ok(jwks)
    }
}

fn select_key<'a>(set: &'a JwkSet, kid: Option<&str>) -> Option<&'a Jwk> {
    match kid {
        Some(kid) => set.find(kid),
        None => set.keys.first(),
    }
}

fn verification(message: String) -> AuthFlowError {
    AuthFlowError::TokenVerification(message)
}

/// Pull the identity claims out of a verified token
pub(crate) fn identity_claims(token: &IdToken) -> Result<(String, String)> {
    let claim = |name: &str| {
        token
            .claims
            .get(name)
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AuthFlowError::ClaimsDecode(format!("missing or invalid '{name}' claim")))
    };

    Ok((claim("sub")?, claim("email")?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token(claims: Value) -> IdToken {
        IdToken {
            raw: String::new(),
            claims,
        }
    }

    #[test]
    fn test_identity_claims() {
        let (sub, email) =
            identity_claims(&token(json!({"sub": "user123", "email": "user@example.com"})))
                .unwrap();
        assert_eq!(sub, "user123");
        assert_eq!(email, "user@example.com");
    }

    #[test]
    fn test_identity_claims_missing_email() {
        let result = identity_claims(&token(json!({"sub": "user123"})));
        assert!(matches!(result, Err(AuthFlowError::ClaimsDecode(_))));
    }

    #[test]
    fn test_identity_claims_wrong_type() {
        let result = identity_claims(&token(json!({"sub": 42, "email": "a@b.c"})));
        assert!(matches!(result, Err(AuthFlowError::ClaimsDecode(_))));
    }
}
