use crypto::{CryptoError, Encryptor};
use database_layer::{ProviderRecord, ProviderStore};
use secrecy::SecretString;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};
use zeroize::Zeroizing;

use crate::error::LoadError;
use crate::oidc::{OidcProvider, OidcProviderConfig, OidcSettings};
use crate::provider::{IdentityProvider, ProviderKind};

type ProviderKey = (i64, ProviderKind);

/// Immutable set of identity providers, keyed by `(tenant_id, kind)`.
///
/// Built once at startup and shared behind an `Arc`. Reloading means building
/// a new registry and swapping the whole `Arc`.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderKey, Arc<dyn IdentityProvider>>,
}

impl ProviderRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a registry from ready providers, rejecting duplicate pairs
    pub fn from_providers(
        providers: impl IntoIterator<Item = Arc<dyn IdentityProvider>>,
    ) -> Result<Self, LoadError> {
        let mut registry = Self::default();
        for provider in providers {
            registry.insert(provider)?;
        }
        Ok(registry)
    }

    fn insert(&mut self, provider: Arc<dyn IdentityProvider>) -> Result<(), LoadError> {
        let key = (provider.tenant_id(), provider.kind());
        self.ensure_vacant(key)?;
        self.providers.insert(key, provider);
        Ok(())
    }

    fn ensure_vacant(&self, (tenant_id, kind): ProviderKey) -> Result<(), LoadError> {
        if self.providers.contains_key(&(tenant_id, kind)) {
            return Err(LoadError::DuplicateProvider { tenant_id, kind });
        }
        Ok(())
    }

    /// Look up the provider for a tenant
    pub fn find(&self, tenant_id: i64, kind: ProviderKind) -> Option<Arc<dyn IdentityProvider>> {
        self.providers.get(&(tenant_id, kind)).cloned()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn IdentityProvider>> {
        self.providers.values()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.providers.keys().collect();
        keys.sort();
        f.debug_struct("ProviderRegistry")
            .field("providers", &keys)
            .finish()
    }
}

/// Load every enabled provider from storage.
///
/// Fails fast: a secret that does not decrypt or an issuer that cannot be
/// discovered aborts the whole load. Secrets are checked before the type, so
/// a corrupt secret aborts even for SAML or unknown records, which are
/// otherwise skipped.
pub async fn load_providers(
    settings: &OidcSettings,
    store: &dyn ProviderStore,
    cipher: &dyn Encryptor,
) -> Result<ProviderRegistry, LoadError> {
    let records = store.list_enabled().await?;
    let http_client = reqwest::Client::builder()
        .timeout(settings.http_timeout)
        .build()
        .map_err(|e| LoadError::InvalidConfiguration(format!("failed to build HTTP client: {e}")))?;

    let mut registry = ProviderRegistry::empty();

    for record in records {
        // Every enabled secret must decrypt, whatever the provider type
        let client_secret = decrypt_client_secret(cipher, &record).map_err(|e| {
            error!(provider_id = record.id, tenant_id = record.tenant_id, error = %e, "Cannot load identity provider");
            e
        })?;

        match record.provider_type.parse::<ProviderKind>() {
            Ok(ProviderKind::Oidc) => {
                registry.ensure_vacant((record.tenant_id, ProviderKind::Oidc))?;

                let config = OidcProviderConfig {
                    tenant_id: record.tenant_id,
                    issuer_url: record.metadata_url.clone(),
                    client_id: record.client_id.clone(),
                    client_secret,
                };
                let provider = OidcProvider::discover(settings, config, &http_client)
                    .await
                    .map_err(|e| {
                        error!(provider_id = record.id, tenant_id = record.tenant_id, error = %e, "Cannot load identity provider");
                        e
                    })?;

                registry.insert(Arc::new(provider))?;
            }
            Ok(ProviderKind::Saml) => {
                info!(
                    provider_id = record.id,
                    tenant_id = record.tenant_id,
                    "SAML providers are not supported yet, skipping"
                );
            }
            Err(e) => {
                warn!(
                    provider_id = record.id,
                    tenant_id = record.tenant_id,
                    error = %e,
                    "Ignoring identity provider with unknown type"
                );
            }
        }
    }

    info!(count = registry.len(), "Identity providers loaded");
    Ok(registry)
}

fn decrypt_client_secret(
    cipher: &dyn Encryptor,
    record: &ProviderRecord,
) -> Result<SecretString, LoadError> {
    let secret_error = |source| LoadError::Secret {
        provider_id: record.id,
        source,
    };

    let plaintext = Zeroizing::new(cipher.decrypt(&record.client_secret_enc).map_err(secret_error)?);
    let secret = std::str::from_utf8(&plaintext).map_err(|_| secret_error(CryptoError::InvalidUtf8))?;
    Ok(SecretString::new(secret.to_owned()))
}
