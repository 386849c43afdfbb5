use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::config::IdentityConfig;
use crate::error::{Result, SessionTokenError};
use crate::session::{ensure_hs256, hs256_validation};

const STATE_AUDIENCE: &str = "sso-state";

/// Payload of the OAuth `state` parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginState {
    pub tenant_id: i64,
    /// Provider kind tag, e.g. `oidc`
    pub idp: String,
    /// Random value so two logins never share a state
    pub nonce: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and checks the signed `state` round-tripped through the provider.
///
/// The state binds a callback to the tenant and provider the login started
/// from, without any server-side storage.
pub struct LoginStateService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl LoginStateService {
    pub fn new(config: &IdentityConfig) -> Result<Self> {
        let secret = config.jwt_secret.expose_secret().as_bytes();
        if secret.is_empty() {
            return Err(SessionTokenError::Configuration(
                "state signing secret must not be empty".to_string(),
            ));
        }

        let ttl = Duration::try_minutes(config.state_ttl_minutes)
            .filter(|ttl| *ttl > Duration::zero())
            .ok_or_else(|| {
                SessionTokenError::Configuration(format!(
                    "login state lifetime of {} minutes is out of range",
                    config.state_ttl_minutes
                ))
            })?;

        let mut validation = hs256_validation();
        validation.set_audience(&[STATE_AUDIENCE]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        })
    }

    pub fn issue(&self, tenant_id: i64, idp: &str) -> Result<String> {
        self.issue_at(tenant_id, idp, Utc::now().timestamp())
    }

    pub fn issue_at(&self, tenant_id: i64, idp: &str, now: i64) -> Result<String> {
        let mut nonce = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut nonce);

        let exp = now
            .checked_add(self.ttl.num_seconds())
            .ok_or_else(|| SessionTokenError::Signing("state expiry out of range".to_string()))?;
        let state = LoginState {
            tenant_id,
            idp: idp.to_string(),
            nonce: URL_SAFE_NO_PAD.encode(nonce),
            aud: STATE_AUDIENCE.to_string(),
            iat: now,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &state, &self.encoding_key)
            .map_err(|e| SessionTokenError::Signing(e.to_string()))
    }

    /// Check the state and that it was issued for this tenant and provider
    pub fn verify(&self, token: &str, tenant_id: i64, idp: &str) -> Result<LoginState> {
        self.verify_at(token, tenant_id, idp, Utc::now().timestamp())
    }

    pub fn verify_at(&self, token: &str, tenant_id: i64, idp: &str, now: i64) -> Result<LoginState> {
        ensure_hs256(token)?;

        let state = decode::<LoginState>(token, &self.decoding_key, &self.validation)?.claims;
        if state.exp <= now {
            return Err(SessionTokenError::Expired);
        }
        if state.tenant_id != tenant_id || state.idp != idp {
            return Err(SessionTokenError::StateMismatch);
        }
        Ok(state)
    }
}
