//! Credential codec (§4.7): AES-256-GCM symmetric encryption for stored
//! secrets, plus a truncated-hash helper for log correlation.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Ciphertexts stored in configuration carry this prefix; the dispatcher
/// strips it before calling [`decrypt`] (§4.7).
pub const ENCRYPTED_PREFIX: &str = "encrypted:";

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("ciphertext is malformed")]
    Malformed,
    #[error("decryption failed: authentication tag mismatch")]
    TagMismatch,
}

pub struct CredentialCodec {
    key: Key<Aes256Gcm>,
}

impl CredentialCodec {
    /// Load the key from `MCP_ENCRYPTION_KEY` (base64, 32 bytes) or generate
    /// a fresh one (§4.7, §6 persisted-state layout).
    pub fn from_env_or_generate() -> Self {
        let key_bytes = std::env::var("MCP_ENCRYPTION_KEY")
            .ok()
            .and_then(|b64| BASE64.decode(b64).ok())
            .filter(|bytes| bytes.len() == 32)
            .unwrap_or_else(|| {
                let mut bytes = vec![0u8; 32];
                use rand::RngCore;
                rand::thread_rng().fill_bytes(&mut bytes);
                bytes
            });
        Self {
            key: *Key::<Aes256Gcm>::from_slice(&key_bytes),
        }
    }

    pub fn from_raw_key(key_bytes: [u8; 32]) -> Self {
        Self {
            key: *Key::<Aes256Gcm>::from_slice(&key_bytes),
        }
    }

    /// `encrypt(plaintext) -> ciphertext`. The returned string does **not**
    /// carry the `"encrypted:"` prefix -- callers that persist it into
    /// configuration add the prefix themselves.
    pub fn encrypt(&self, plaintext: &str) -> String {
        let cipher = Aes256Gcm::new(&self.key);
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .expect("AES-GCM encryption does not fail for valid inputs");

        let mut combined = Vec::with_capacity(nonce.len() + ciphertext.len());
        combined.extend_from_slice(&nonce);
        combined.extend_from_slice(&ciphertext);
        BASE64.encode(combined)
    }

    /// `decrypt(ciphertext) -> plaintext`. Strips a leading `"encrypted:"`
    /// prefix if present.
    pub fn decrypt(&self, ciphertext: &str) -> Result<String, CryptoError> {
        let stripped = ciphertext
            .strip_prefix(ENCRYPTED_PREFIX)
            .unwrap_or(ciphertext);

        let combined = BASE64.decode(stripped).map_err(|_| CryptoError::Malformed)?;
        if combined.len() < 12 {
            return Err(CryptoError::Malformed);
        }
        let (nonce_bytes, ciphertext_bytes) = combined.split_at(12);
        let nonce = Nonce::from_slice(nonce_bytes);

        let cipher = Aes256Gcm::new(&self.key);
        let plaintext = cipher
            .decrypt(nonce, ciphertext_bytes)
            .map_err(|_| CryptoError::TagMismatch)?;

        String::from_utf8(plaintext).map_err(|_| CryptoError::Malformed)
    }
}

/// `hashForLogging(secret) -> string`: first 8 hex chars of SHA-256, never
/// the secret itself (§4.7, §8 invariant).
pub fn hash_for_logging(secret: &str) -> String {
    let digest = Sha256::digest(secret.as_bytes());
    hex::encode(&digest[..4])
}
