//! AES-256-GCM cipher with a process-lifetime key.
//!
//! Wire format: `base64(nonce[12] || ciphertext || tag[16])`. The key lives
//! only in this struct; once it is dropped, nothing it produced can be read.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::{MedBridgeError, Result};

const NONCE_LEN: usize = 12;

pub struct SessionCipher {
    cipher: Aes256Gcm,
    key_id: String,
}

impl SessionCipher {
    /// Fresh random 256-bit key from the OS RNG.
    pub fn generate() -> Self {
        let mut key = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut key);
        Self::from_key(key)
    }

    pub fn from_key(key: [u8; 32]) -> Self {
        let digest = Sha256::digest(key);
        let key_id = digest[..4].iter().map(|b| format!("{b:02x}")).collect();
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key)),
            key_id,
        }
    }

    /// Short SHA-256 fingerprint of the key, safe to log.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn encrypt(&self, plain: &str) -> Result<String> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);
        let encrypted = self
            .cipher
            .encrypt(nonce, plain.as_bytes())
            .map_err(|e| MedBridgeError::Encryption(e.to_string()))?;
        let mut out = Vec::with_capacity(NONCE_LEN + encrypted.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&encrypted);
        Ok(BASE64.encode(out))
    }

    pub fn decrypt(&self, encoded: &str) -> Result<String> {
        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|e| MedBridgeError::Decryption(format!("invalid base64: {e}")))?;
        if bytes.len() <= NONCE_LEN {
            return Err(MedBridgeError::Decryption("ciphertext too short".into()));
        }
        let (nonce_bytes, cipher_bytes) = bytes.split_at(NONCE_LEN);
        let plain = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), cipher_bytes)
            .map_err(|_| MedBridgeError::Decryption("authentication failed".into()))?;
        String::from_utf8(plain).map_err(|e| MedBridgeError::Decryption(e.to_string()))
    }
}

impl std::fmt::Debug for SessionCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCipher")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_plaintext_encrypts_differently() {
        let cipher = SessionCipher::from_key([7u8; 32]);
        let a = cipher.encrypt("blood type O-").expect("encrypt");
        let b = cipher.encrypt("blood type O-").expect("encrypt");
        assert_ne!(a, b);
        assert_eq!(cipher.decrypt(&a).expect("decrypt"), "blood type O-");
    }

    #[test]
    fn tampered_ciphertext_is_rejected() {
        let cipher = SessionCipher::from_key([1u8; 32]);
        let token = cipher.encrypt("notes").expect("encrypt");
        let mut bytes = BASE64.decode(&token).expect("base64");
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let tampered = BASE64.encode(bytes);
        assert!(matches!(
            cipher.decrypt(&tampered),
            Err(MedBridgeError::Decryption(_))
        ));
    }

    #[test]
    fn malformed_input_is_rejected() {
        let cipher = SessionCipher::generate();
        assert!(cipher.decrypt("***").is_err());
        assert!(cipher.decrypt(&BASE64.encode([0u8; 12])).is_err());
    }

    #[test]
    fn key_id_is_stable_and_short() {
        let a = SessionCipher::from_key([9u8; 32]);
        let b = SessionCipher::from_key([9u8; 32]);
        assert_eq!(a.key_id(), b.key_id());
        assert_eq!(a.key_id().len(), 8);
        assert!(!format!("{a:?}").contains("cipher:"));
    }
}
