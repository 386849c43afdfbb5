use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted identity-provider configuration for one tenant.
///
/// `client_secret_enc` holds `nonce || ciphertext` as produced by the
/// secret cipher. It is never decrypted by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProviderRecord {
    pub id: i64,
    pub tenant_id: i64,
    #[sqlx(rename = "type")]
    pub provider_type: String,
    pub metadata_url: String,
    pub client_id: String,
    #[serde(skip_serializing)]
    pub client_secret_enc: Vec<u8>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Writable fields of a [`ProviderRecord`], used for inserts and updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProviderRecord {
    pub tenant_id: i64,
    pub provider_type: String,
    pub metadata_url: String,
    pub client_id: String,
    pub client_secret_enc: Vec<u8>,
    pub enabled: bool,
}
