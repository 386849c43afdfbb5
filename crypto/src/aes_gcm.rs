use crate::encryption::Encryptor;
use crate::error::{CryptoError, CryptoResult};
use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::RngCore;
use secrecy::SecretString;
use std::fmt;
use zeroize::Zeroizing;

/// Length of an AES-256 key in bytes.
pub const KEY_LEN: usize = 32;

/// Length of the GCM nonce prepended to every ciphertext.
pub const NONCE_LEN: usize = 12;

/// AES-256-GCM cipher for provider client secrets.
///
/// Ciphertexts are laid out as `nonce (12 bytes) || ciphertext || tag (16 bytes)`
/// with no associated data. A fresh random nonce is drawn for every call, so
/// encrypting the same plaintext twice yields different blobs.
///
/// The expanded key schedule is held inside [`Aes256Gcm`], which zeroizes
/// itself on drop. The raw key bytes never outlive construction.
#[derive(Clone)]
pub struct SecretCipher {
    cipher: Aes256Gcm,
}

impl SecretCipher {
    /// Create a cipher from a raw 32-byte key
    pub fn new(key: &[u8; KEY_LEN]) -> Self {
        Self {
            cipher: Aes256Gcm::new(key.into()),
        }
    }

    /// Create from a base64-encoded key
    pub fn from_base64(key_b64: &str) -> CryptoResult<Self> {
        let key_bytes = Zeroizing::new(
            BASE64
                .decode(key_b64.trim())
                .map_err(|e| CryptoError::InvalidKeyEncoding(e.to_string()))?,
        );

        if key_bytes.len() != KEY_LEN {
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_LEN,
                got: key_bytes.len(),
            });
        }

        let cipher = Aes256Gcm::new_from_slice(&key_bytes).map_err(|_| {
            CryptoError::InvalidKeyLength {
                expected: KEY_LEN,
                got: key_bytes.len(),
            }
        })?;

        Ok(Self { cipher })
    }

    /// Encrypt and prepend the nonce
    pub fn seal(&self, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| CryptoError::EncryptionFailed)?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(nonce.as_slice());
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    /// Split off the nonce, then decrypt and verify the tag
    pub fn open(&self, blob: &[u8]) -> CryptoResult<Vec<u8>> {
        if blob.len() < NONCE_LEN {
            return Err(CryptoError::TruncatedCiphertext {
                min: NONCE_LEN,
                got: blob.len(),
            });
        }

        let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        self.cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| CryptoError::AuthenticationFailed)
    }

    /// Encrypt a UTF-8 secret such as an OAuth client secret
    pub fn encrypt_secret(&self, secret: &str) -> CryptoResult<Vec<u8>> {
        self.seal(secret.as_bytes())
    }

    /// Decrypt into a [`SecretString`] that is wiped when dropped
    pub fn decrypt_secret(&self, blob: &[u8]) -> CryptoResult<SecretString> {
        let plaintext = Zeroizing::new(self.open(blob)?);
        let text = std::str::from_utf8(&plaintext).map_err(|_| CryptoError::InvalidUtf8)?;
        Ok(SecretString::new(text.to_owned()))
    }
}

impl Encryptor for SecretCipher {
    fn encrypt(&self, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        self.seal(plaintext)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
        self.open(ciphertext)
    }

    fn algorithm(&self) -> &str {
        "AES-256-GCM"
    }
}

impl fmt::Debug for SecretCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretCipher")
            .field("algorithm", &"AES-256-GCM")
            .finish_non_exhaustive()
    }
}

/// Encrypt `plaintext` with a base64-encoded key.
pub fn encrypt(plaintext: &[u8], key_b64: &str) -> CryptoResult<Vec<u8>> {
    SecretCipher::from_base64(key_b64)?.seal(plaintext)
}

/// Decrypt a `nonce || ciphertext` blob with a base64-encoded key.
pub fn decrypt(ciphertext: &[u8], key_b64: &str) -> CryptoResult<Vec<u8>> {
    SecretCipher::from_base64(key_b64)?.open(ciphertext)
}

/// Decrypt straight into a [`SecretString`].
pub fn decrypt_to_secret(ciphertext: &[u8], key_b64: &str) -> CryptoResult<SecretString> {
    SecretCipher::from_base64(key_b64)?.decrypt_secret(ciphertext)
}

/// Secure key generation utilities
pub struct KeyGenerator;

impl KeyGenerator {
    /// Generate a cryptographically secure random key
    pub fn generate() -> Zeroizing<[u8; KEY_LEN]> {
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        OsRng.fill_bytes(key.as_mut());
        key
    }

    /// Generate a key and encode as base64, ready for `SSO_ENCRYPTION_KEY`
    pub fn generate_base64() -> SecretString {
        let key = Self::generate();
        SecretString::new(BASE64.encode(key.as_ref()))
    }
}
