//! Secret encryption for the SSO gateway.
//!
//! Identity-provider client secrets are stored encrypted with AES-256-GCM.
//! [`SecretCipher`] is built once from the configured base64 key and shared
//! (it is `Send + Sync` and cheap to clone).
//!
//! ```rust
//! use crypto::{KeyGenerator, SecretCipher};
//! use secrecy::ExposeSecret;
//!
//! let key = KeyGenerator::generate_base64();
//! let cipher = SecretCipher::from_base64(key.expose_secret()).unwrap();
//!
//! let blob = cipher.encrypt_secret("client-secret").unwrap();
//! let secret = cipher.decrypt_secret(&blob).unwrap();
//! assert_eq!(secret.expose_secret(), "client-secret");
//! ```

pub mod aes_gcm;
pub mod encryption;
pub mod error;

pub use aes_gcm::{decrypt, decrypt_to_secret, encrypt, KeyGenerator, SecretCipher, KEY_LEN, NONCE_LEN};
pub use encryption::Encryptor;
pub use error::*;
