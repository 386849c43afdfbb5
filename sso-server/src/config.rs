use auth_identity::IdentityConfig;
use auth_oidc::OidcSettings;
use crypto::SecretCipher;
use database_layer::PoolSettings;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// One year
const MAX_SESSION_TTL_HOURS: i64 = 24 * 366;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{name} is invalid: {message}")]
    Invalid { name: &'static str, message: String },
}

/// Gateway configuration, read from the environment at startup.
///
/// | Variable | Default |
/// |---|---|
/// | `SSO_ENCRYPTION_KEY` | required, base64 of 32 bytes |
/// | `SSO_JWT_SECRET` | required |
/// | `SSO_BASE_URL` | required |
/// | `DATABASE_URL` | required |
/// | `SSO_DB_MAX_CONNECTIONS` | 25 |
/// | `SSO_DB_ACQUIRE_TIMEOUT_SECS` | 5 |
/// | `SSO_DISCOVERY_TIMEOUT_SECS` | 10 |
/// | `SSO_EXCHANGE_TIMEOUT_SECS` | 10 |
/// | `SSO_SESSION_TTL_HOURS` | 24, at most one year |
/// | `SSO_RUN_MIGRATIONS` | false |
#[derive(Clone)]
pub struct SsoConfig {
    pub encryption_key: SecretString,
    pub jwt_secret: SecretString,
    pub base_url: String,
    pub database_url: SecretString,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub discovery_timeout: Duration,
    pub exchange_timeout: Duration,
    pub session_ttl_hours: i64,
    pub run_migrations: bool,
}

impl SsoConfig {
    /// Load from the process environment. Any `.env` file is applied by the
    /// binary before argument parsing, not here.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let encryption_key = required(&lookup, "SSO_ENCRYPTION_KEY")?;
        SecretCipher::from_base64(&encryption_key).map_err(|e| ConfigError::Invalid {
            name: "SSO_ENCRYPTION_KEY",
            message: e.to_string(),
        })?;

        let jwt_secret = required(&lookup, "SSO_JWT_SECRET")?;

        let base_url = required(&lookup, "SSO_BASE_URL")?;
        Url::parse(&base_url).map_err(|e| ConfigError::Invalid {
            name: "SSO_BASE_URL",
            message: e.to_string(),
        })?;

        let database_url = required(&lookup, "DATABASE_URL")?;

        let session_ttl_hours = optional(&lookup, "SSO_SESSION_TTL_HOURS", 24_i64)?;
        if session_ttl_hours <= 0 {
            return Err(ConfigError::Invalid {
                name: "SSO_SESSION_TTL_HOURS",
                message: "must be positive".to_string(),
            });
        }
        if session_ttl_hours > MAX_SESSION_TTL_HOURS {
            return Err(ConfigError::Invalid {
                name: "SSO_SESSION_TTL_HOURS",
                message: format!("must be at most {MAX_SESSION_TTL_HOURS}"),
            });
        }

        Ok(Self {
            encryption_key: SecretString::new(encryption_key),
            jwt_secret: SecretString::new(jwt_secret),
            base_url: base_url.trim_end_matches('/').to_string(),
            database_url: SecretString::new(database_url),
            db_max_connections: optional(&lookup, "SSO_DB_MAX_CONNECTIONS", 25)?,
            db_acquire_timeout: Duration::from_secs(optional(
                &lookup,
                "SSO_DB_ACQUIRE_TIMEOUT_SECS",
                5,
            )?),
            discovery_timeout: Duration::from_secs(optional(
                &lookup,
                "SSO_DISCOVERY_TIMEOUT_SECS",
                10,
            )?),
            exchange_timeout: Duration::from_secs(optional(
                &lookup,
                "SSO_EXCHANGE_TIMEOUT_SECS",
                10,
            )?),
            session_ttl_hours,
            run_migrations: optional(&lookup, "SSO_RUN_MIGRATIONS", false)?,
        })
    }

    pub fn identity_config(&self) -> IdentityConfig {
        IdentityConfig::new(self.jwt_secret.expose_secret().clone())
            .with_session_ttl_hours(self.session_ttl_hours)
    }

    pub fn oidc_settings(&self) -> OidcSettings {
        let mut settings = OidcSettings::new(self.base_url.clone());
        settings.http_timeout = self.discovery_timeout;
        settings.exchange_timeout = self.exchange_timeout;
        settings
    }

    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_connections: self.db_max_connections,
            acquire_timeout: self.db_acquire_timeout,
        }
    }
}

impl fmt::Debug for SsoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SsoConfig")
            .field("encryption_key", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("database_url", &"[REDACTED]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_acquire_timeout", &self.db_acquire_timeout)
            .field("discovery_timeout", &self.discovery_timeout)
            .field("exchange_timeout", &self.exchange_timeout)
            .field("session_ttl_hours", &self.session_ttl_hours)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn optional<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                name,
                message: e.to_string(),
            })
        }
        _ => Ok(default),
    }
}
