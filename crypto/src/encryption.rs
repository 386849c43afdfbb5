use crate::error::CryptoResult;

/// Trait for encryption/decryption operations on provider secrets
pub trait Encryptor: Send + Sync {
    /// Encrypt data
    fn encrypt(&self, plaintext: &[u8]) -> CryptoResult<Vec<u8>>;

    /// Decrypt data
    fn decrypt(&self, ciphertext: &[u8]) -> CryptoResult<Vec<u8>>;

    /// Get the encryption algorithm name
    fn algorithm(&self) -> &str;
}
