use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{AuthFlowError, Result};

/// Identity-provider protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Oidc,
    Saml,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Oidc => "oidc",
            Self::Saml => "saml",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProviderKind(pub String);

impl fmt::Display for UnknownProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown identity provider type '{}'", self.0)
    }
}

impl std::error::Error for UnknownProviderKind {}

impl FromStr for ProviderKind {
    type Err = UnknownProviderKind;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "oidc" => Ok(Self::Oidc),
            "saml" => Ok(Self::Saml),
            other => Err(UnknownProviderKind(other.to_string())),
        }
    }
}

/// Query parameters delivered to the callback endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
}

impl CallbackParams {
    /// The authorization code, if present and non-empty
    pub fn code(&self) -> Result<&str> {
        self.code
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or(AuthFlowError::MissingAuthorizationCode)
    }
}

/// A verified ID token
#[derive(Clone)]
pub struct IdToken {
    /// Compact JWT as received from the provider
    pub raw: String,
    pub claims: serde_json::Value,
}

impl fmt::Debug for IdToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdToken")
            .field("claims", &self.claims)
            .finish_non_exhaustive()
    }
}

/// Outcome of a successful callback
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub tenant_id: i64,
    /// `sub` claim of the ID token
    pub user_id: String,
    pub email: String,
    pub id_token: IdToken,
}

/// A configured identity provider for one tenant.
///
/// Implementations are built once at startup and never mutated, so they are
/// shared freely between request tasks.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn tenant_id(&self) -> i64;

    fn kind(&self) -> ProviderKind;

    /// URL the browser is redirected to, carrying `state` through the provider
    fn auth_url(&self, state: &str) -> Url;

    /// Complete the login from the provider's redirect
    async fn callback(&self, params: &CallbackParams) -> Result<AuthResult>;
}
