//! SSE-C customer key material.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use md5::{Digest, Md5};
use rand::Rng;

/// A customer-provided AES-256 key for server-side encryption, held in the
/// base64 form the storage service expects along with the base64 MD5 digest
/// of the raw key bytes.
///
/// The service keeps no copy of the key; losing it makes the uploaded objects
/// unreadable. Callers that need to decrypt later must persist the key
/// themselves.
#[derive(Clone, PartialEq, Eq)]
pub struct SseKey {
    key_b64: String,
    key_md5_b64: String,
}

impl SseKey {
    /// Generate a fresh random 256-bit key.
    pub fn generate() -> Self {
        let key: [u8; 32] = rand::rng().random();
        Self::from_key_bytes(&key)
    }

    /// Build key material from explicit key bytes (tests, key reuse).
    pub fn from_key_bytes(key: &[u8; 32]) -> Self {
        Self {
            key_b64: BASE64.encode(key),
            key_md5_b64: BASE64.encode(Md5::digest(key)),
        }
    }

    pub fn algorithm(&self) -> &'static str {
        "AES256"
    }

    pub fn key_b64(&self) -> &str {
        &self.key_b64
    }

    pub fn key_md5_b64(&self) -> &str {
        &self.key_md5_b64
    }
}

// Keep key material out of logs.
impl std::fmt::Debug for SseKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SseKey")
            .field("key_b64", &"<redacted>")
            .field("key_md5_b64", &self.key_md5_b64)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_key_has_expected_encoded_lengths() {
        let key = SseKey::generate();
        // 32 bytes -> 44 base64 chars, 16-byte digest -> 24 chars
        assert_eq!(key.key_b64().len(), 44);
        assert_eq!(key.key_md5_b64().len(), 24);
        assert_eq!(key.algorithm(), "AES256");
    }

    #[test]
    fn key_material_is_deterministic_for_fixed_bytes() {
        let bytes = [7u8; 32];
        let a = SseKey::from_key_bytes(&bytes);
        let b = SseKey::from_key_bytes(&bytes);
        assert_eq!(a, b);
        assert_eq!(a.key_b64(), BASE64.encode(bytes));
    }

    #[test]
    fn generated_keys_differ() {
        assert_ne!(SseKey::generate().key_b64(), SseKey::generate().key_b64());
    }

    #[test]
    fn debug_redacts_key() {
        let key = SseKey::generate();
        let rendered = format!("{:?}", key);
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains(key.key_b64()));
    }
}
