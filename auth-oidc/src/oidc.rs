use async_trait::async_trait;
use oauth2::{
    basic::{
        BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
        BasicTokenType,
    },
    reqwest::async_http_client,
    AuthUrl, AuthorizationCode, Client, ClientId, ClientSecret, CsrfToken, ExtraTokenFields,
    RedirectUrl, Scope, StandardRevocableToken, StandardTokenResponse, TokenUrl,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::discovery::{discover, ProviderMetadata};
use crate::error::{AuthFlowError, LoadError, Result};
use crate::provider::{AuthResult, CallbackParams, IdentityProvider, ProviderKind};
use crate::verifier::{identity_claims, IdTokenVerifier};

/// Scopes requested from every OIDC provider
pub const OIDC_SCOPES: [&str; 3] = ["openid", "profile", "email"];

/// Gateway-wide settings shared by all OIDC providers
#[derive(Debug, Clone)]
pub struct OidcSettings {
    /// Public base URL of the gateway, used to derive redirect URLs
    pub base_url: String,
    /// Timeout for discovery and JWKS requests
    pub http_timeout: Duration,
    /// Timeout for the authorization-code exchange
    pub exchange_timeout: Duration,
}

impl OidcSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_timeout: Duration::from_secs(10),
            exchange_timeout: Duration::from_secs(10),
        }
    }

    /// `{base_url}/{tenant_id}/oidc/callback`
    pub fn redirect_url(&self, tenant_id: i64) -> String {
        format!(
            "{}/{tenant_id}/{}/callback",
            self.base_url.trim_end_matches('/'),
            ProviderKind::Oidc
        )
    }
}

/// Per-provider configuration, with the client secret already decrypted
#[derive(Debug, Clone)]
pub struct OidcProviderConfig {
    pub tenant_id: i64,
    pub issuer_url: String,
    pub client_id: String,
    pub client_secret: SecretString,
}

/// Token endpoint response fields beyond the OAuth 2.0 standard ones
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct IdTokenFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

impl ExtraTokenFields for IdTokenFields {}

pub type OidcTokenResponse = StandardTokenResponse<IdTokenFields, BasicTokenType>;

type OidcClient = Client<
    BasicErrorResponse,
    OidcTokenResponse,
    BasicTokenType,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
>;

/// OpenID Connect provider for a single tenant
pub struct OidcProvider {
    tenant_id: i64,
    client: OidcClient,
    verifier: IdTokenVerifier,
    exchange_timeout: Duration,
}

impl OidcProvider {
    /// Run discovery against the issuer and build a ready-to-use provider
    #[instrument(skip(settings, config, http_client), fields(tenant_id = config.tenant_id, issuer = %config.issuer_url))]
    pub async fn discover(
        settings: &OidcSettings,
        config: OidcProviderConfig,
        http_client: &reqwest::Client,
    ) -> std::result::Result<Self, LoadError> {
        let metadata = discover(http_client, &config.issuer_url, settings.http_timeout).await?;
        Self::from_metadata(settings, config, &metadata, http_client.clone())
    }

    /// Build a provider from already-discovered metadata
    pub fn from_metadata(
        settings: &OidcSettings,
        config: OidcProviderConfig,
        metadata: &ProviderMetadata,
        http_client: reqwest::Client,
    ) -> std::result::Result<Self, LoadError> {
        let invalid = |what: &str, e: url::ParseError| {
            LoadError::InvalidConfiguration(format!("invalid {what} for tenant {}: {e}", config.tenant_id))
        };

        let auth_url = AuthUrl::new(metadata.authorization_endpoint.clone())
            .map_err(|e| invalid("authorization endpoint", e))?;
        let token_url = TokenUrl::new(metadata.token_endpoint.clone())
            .map_err(|e| invalid("token endpoint", e))?;
        let redirect_url = RedirectUrl::new(settings.redirect_url(config.tenant_id))
            .map_err(|e| invalid("redirect URL", e))?;

        let client = OidcClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.expose_secret().clone())),
            auth_url,
            Some(token_url),
        )
        .set_redirect_uri(redirect_url);

        let verifier = IdTokenVerifier::new(
            metadata.issuer.clone(),
            config.client_id,
            metadata.jwks_uri.clone(),
            http_client,
            settings.http_timeout,
        );

        info!(tenant_id = config.tenant_id, issuer = %metadata.issuer, "OIDC provider ready");

        Ok(Self {
            tenant_id: config.tenant_id,
            client,
            verifier,
            exchange_timeout: settings.exchange_timeout,
        })
    }

    async fn exchange_code(&self, code: &str) -> Result<OidcTokenResponse> {
        let request = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(async_http_client);

        match tokio::time::timeout(self.exchange_timeout, request).await {
            Ok(Ok(token)) => Ok(token),
            Ok(Err(e)) => Err(AuthFlowError::CodeExchange(e.to_string())),
            Err(_) => Err(AuthFlowError::CodeExchange(format!(
                "token endpoint did not answer within {:?}",
                self.exchange_timeout
            ))),
        }
    }
}

#[async_trait]
impl IdentityProvider for OidcProvider {
    fn tenant_id(&self) -> i64 {
        self.tenant_id
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Oidc
    }

    fn auth_url(&self, state: &str) -> Url {
        let (url, _) = self
            .client
            .authorize_url(|| CsrfToken::new(state.to_string()))
            .add_scopes(OIDC_SCOPES.iter().map(|s| Scope::new((*s).to_string())))
            .url();
        url
    }

    async fn callback(&self, params: &CallbackParams) -> Result<AuthResult> {
        let code = params.code()?;

        let token = self.exchange_code(code).await.map_err(|e| {
            warn!(tenant_id = self.tenant_id, error = %e, "Authorization code exchange failed");
            e
        })?;

        let raw_id_token = token
            .extra_fields()
            .id_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(AuthFlowError::MissingIdentityToken)?;

        let id_token = self.verifier.verify(raw_id_token).await?;
        let (user_id, email) = identity_claims(&id_token)?;

        debug!(tenant_id = self.tenant_id, issuer = %self.verifier.issuer(), "id_token verified");

        Ok(AuthResult {
            tenant_id: self.tenant_id,
            user_id,
            email,
            id_token,
        })
    }
}
