//! Identity providers for the SSO gateway.
//!
//! Each tenant registers its own external identity providers. At startup the
//! enabled records are read from storage, their client secrets decrypted and
//! OIDC discovery performed, producing an immutable [`ProviderRegistry`].
//! Request handlers then look providers up by `(tenant_id, kind)` and drive
//! the authorization-code flow through the [`IdentityProvider`] trait.
//!
//! SAML is recognised as a provider type but not implemented.

pub mod discovery;
pub mod error;
pub mod oidc;
pub mod provider;
pub mod registry;
pub mod verifier;

pub use discovery::ProviderMetadata;
pub use error::{AuthFlowError, LoadError};
pub use oidc::{OidcProvider, OidcProviderConfig, OidcSettings, OIDC_SCOPES};
pub use provider::{AuthResult, CallbackParams, IdToken, IdentityProvider, ProviderKind};
pub use registry::{load_providers, ProviderRegistry};
pub use verifier::IdTokenVerifier;
