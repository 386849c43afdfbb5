use serde::Deserialize;
use std::time::Duration;
use tracing::{info, instrument};

use crate::error::LoadError;

/// Fields of `/.well-known/openid-configuration` the gateway relies on
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderMetadata {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub jwks_uri: String,
    #[serde(default)]
    pub userinfo_endpoint: Option<String>,
}

/// Get well-known configuration URL for an issuer.
pub fn well_known_url(issuer_url: &str) -> String {
    let issuer_url = issuer_url.trim_end_matches('/');
    format!("{issuer_url}/.well-known/openid-configuration")
}

/// Fetch and validate provider metadata.
///
/// The advertised issuer must equal `issuer_url` (ignoring a trailing slash),
/// otherwise a provider could vouch for tokens minted by someone else.
#[instrument(skip(http_client))]
pub async fn discover(
    http_client: &reqwest::Client,
    issuer_url: &str,
    timeout: Duration,
) -> Result<ProviderMetadata, LoadError> {
    let failed = |message: String| LoadError::Discovery {
        url: issuer_url.to_string(),
        message,
    };

    let response = http_client
        .get(well_known_url(issuer_url))
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| failed(format!("HTTP error: {e}")))?;

    if !response.status().is_success() {
        return Err(failed(format!("HTTP status {}", response.status())));
    }

    let metadata: ProviderMetadata = response
        .json()
        .await
        .map_err(|e| failed(format!("invalid provider metadata: {e}")))?;

    if metadata.issuer.trim_end_matches('/') != issuer_url.trim_end_matches('/') {
        return Err(failed(format!(
            "issuer mismatch: expected {issuer_url}, provider advertised {}",
            metadata.issuer
        )));
    }

    info!(
        authorization_endpoint = %metadata.authorization_endpoint,
        token_endpoint = %metadata.token_endpoint,
        jwks_uri = %metadata.jwks_uri,
        "Discovered OIDC endpoints"
    );

    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_known_url() {
        assert_eq!(
            well_known_url("https://example.com"),
            "https://example.com/.well-known/openid-configuration"
        );
        assert_eq!(
            well_known_url("https://example.com/"),
            "https://example.com/.well-known/openid-configuration"
        );
    }
}
