//! Encrypting serializer for session payloads.
//!
//! Wire format: `nonce (12 bytes) || AES-256-GCM ciphertext and tag`.
//! The key is the SHA-256 digest of the configured secret.

use std::collections::BTreeMap;
use std::fmt;

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::{Result, SerializerError};

/// Length of the AES-GCM nonce prefixed to every encoded payload.
const NONCE_LEN: usize = 12;

/// Key/value data stored in a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionPayload(BTreeMap<String, Value>);

impl SessionPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

/// Encrypts payloads before they reach the store and decrypts them after.
#[derive(Clone)]
pub struct EncryptingSerializer {
    cipher: Aes256Gcm,
}

impl EncryptingSerializer {
    /// Create a serializer keyed by `secret`.
    pub fn new(secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        let key = Key::<Aes256Gcm>::from_slice(digest.as_slice());
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    /// Encode and encrypt a payload. An empty payload encodes to no bytes.
    pub fn encode(&self, payload: &SessionPayload) -> Result<Vec<u8>> {
        if payload.is_empty() {
            return Ok(Vec::new());
        }

        let plaintext = serde_json::to_vec(payload).map_err(SerializerError::Serialize)?;
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_slice())
            .map_err(|_| SerializerError::Encrypt)?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(nonce.as_slice());
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    /// Decrypt and decode a stored value. No bytes decode to an empty payload.
    pub fn decode(&self, data: &[u8]) -> Result<SessionPayload> {
        if data.is_empty() {
            return Ok(SessionPayload::new());
        }

        if data.len() < NONCE_LEN {
            return Err(SerializerError::Truncated { len: data.len() });
        }

        let (nonce, ciphertext) = data.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| SerializerError::Decrypt)?;

        serde_json::from_slice(&plaintext).map_err(SerializerError::Deserialize)
    }
}

impl fmt::Debug for EncryptingSerializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptingSerializer").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> SessionPayload {
        let mut payload = SessionPayload::new();
        payload.insert("username", "john");
        payload.insert("authentication_level", 2);
        payload.insert("groups", json!(["admins", "dev"]));
        payload
    }

    #[test]
    fn test_encode_decode() {
        let serializer = EncryptingSerializer::new("secret");
        let encoded = serializer.encode(&payload()).unwrap();
        assert_eq!(serializer.decode(&encoded).unwrap(), payload());
    }

    #[test]
    fn test_ciphertext_hides_plaintext() {
        let serializer = EncryptingSerializer::new("secret");
        let encoded = serializer.encode(&payload()).unwrap();
        let haystack = String::from_utf8_lossy(&encoded);
        assert!(!haystack.contains("john"));
        assert!(!haystack.contains("admins"));
    }

    #[test]
    fn test_nonce_is_fresh() {
        let serializer = EncryptingSerializer::new("secret");
        let a = serializer.encode(&payload()).unwrap();
        let b = serializer.encode(&payload()).unwrap();
        assert_ne!(a, b);
        assert_ne!(a[..NONCE_LEN], b[..NONCE_LEN]);
    }

    #[test]
    fn test_empty_payload() {
        let serializer = EncryptingSerializer::new("secret");
        assert!(serializer.encode(&SessionPayload::new()).unwrap().is_empty());
        assert!(serializer.decode(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_wrong_secret_fails() {
        let encoded = EncryptingSerializer::new("secret")
            .encode(&payload())
            .unwrap();
        let err = EncryptingSerializer::new("other")
            .decode(&encoded)
            .unwrap_err();
        assert!(matches!(err, SerializerError::Decrypt));
    }

    #[test]
    fn test_tampering_detected() {
        let serializer = EncryptingSerializer::new("secret");
        let mut encoded = serializer.encode(&payload()).unwrap();
        let last = encoded.len() - 1;
        encoded[last] ^= 0x01;
        assert!(matches!(
            serializer.decode(&encoded),
            Err(SerializerError::Decrypt)
        ));
    }

    #[test]
    fn test_truncated_input() {
        let serializer = EncryptingSerializer::new("secret");
        assert!(matches!(
            serializer.decode(&[1, 2, 3]),
            Err(SerializerError::Truncated { len: 3 })
        ));
    }

    #[test]
    fn test_payload_accessors() {
        let mut payload = payload();
        assert_eq!(payload.len(), 3);
        assert_eq!(payload.get("username"), Some(&json!("john")));
        assert_eq!(payload.insert("username", "jane"), Some(json!("john")));
        assert_eq!(payload.remove("groups"), Some(json!(["admins", "dev"])));
        assert_eq!(payload.iter().count(), 2);
    }

    #[test]
    fn test_debug_hides_key() {
        let debug = format!("{:?}", EncryptingSerializer::new("secret"));
        assert_eq!(debug, "EncryptingSerializer { .. }");
    }
}
