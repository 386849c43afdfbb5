use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The configured key is not valid base64.
    #[error("Invalid key encoding: {0}")]
    InvalidKeyEncoding(String),

    #[error("Invalid key length: expected {expected}, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    #[error("Ciphertext too short: expected at least {min} bytes, got {got}")]
    TruncatedCiphertext { min: usize, got: usize },

    /// Tag mismatch. Either the key is wrong or the blob was altered.
    #[error("Ciphertext authentication failed")]
    AuthenticationFailed,

    #[error("Encryption failed")]
    EncryptionFailed,

    #[error("Invalid UTF-8 in decrypted data")]
    InvalidUtf8,
}

impl CryptoError {
    /// True for errors caused by configuration rather than data.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidKeyEncoding(_) | Self::InvalidKeyLength { .. }
        )
    }
}

pub type CryptoResult<T> = Result<T, CryptoError>;
