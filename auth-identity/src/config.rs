use secrecy::SecretString;

/// Signing configuration for session and login-state tokens
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// HS256 signing secret. Never logged.
    pub jwt_secret: SecretString,
    pub session_ttl_hours: i64,
    pub state_ttl_minutes: i64,
}

impl IdentityConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: SecretString::new(jwt_secret.into()),
            session_ttl_hours: 24,
            state_ttl_minutes: 10,
        }
    }

    pub fn with_session_ttl_hours(mut self, hours: i64) -> Self {
        self.session_ttl_hours = hours;
        self
    }
}
