use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionTokenError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Unexpected signing algorithm: {0}")]
    UnexpectedAlgorithm(String),

    #[error("Malformed token: {0}")]
    Malformed(String),

    /// Login state was valid but issued for another tenant or provider.
    #[error("Login state does not match the callback")]
    StateMismatch,

    #[error("Token signing failed: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for SessionTokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                Self::UnexpectedAlgorithm(err.to_string())
            }
            _ => Self::Malformed(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionTokenError>;
