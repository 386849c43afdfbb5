use crate::provider::ProviderKind;
use crypto::CryptoError;
use database_layer::DatabaseError;
use thiserror::Error;

/// Failure while building the provider registry at startup.
///
/// Any of these aborts the whole load; the gateway does not start with a
/// partial provider set.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to list identity providers: {0}")]
    Store(#[from] DatabaseError),

    #[error("Failed to decrypt client secret of provider {provider_id}: {source}")]
    Secret {
        provider_id: i64,
        #[source]
        source: CryptoError,
    },

    #[error("OIDC discovery failed for {url}: {message}")]
    Discovery { url: String, message: String },

    #[error("Invalid provider configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Duplicate {kind} provider for tenant {tenant_id}")]
    DuplicateProvider { tenant_id: i64, kind: ProviderKind },
}

/// Failure during the authorization-code callback.
///
/// The messages are for logs. HTTP callers only ever see a generic 401.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthFlowError {
    #[error("authorization code not found")]
    MissingAuthorizationCode,

    #[error("invalid login state: {0}")]
    InvalidState(String),

    #[error("code exchange failed: {0}")]
    CodeExchange(String),

    #[error("id_token not found in token response")]
    MissingIdentityToken,

    #[error("id_token verification failed: {0}")]
    TokenVerification(String),

    #[error("failed to decode id_token claims: {0}")]
    ClaimsDecode(String),
}

pub type Result<T> = std::result::Result<T, AuthFlowError>;
