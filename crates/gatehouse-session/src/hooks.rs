//! Payload encode/decode hooks for the Redis-backed providers.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::backend::{Backend, Topology};
use crate::error::Result;
use crate::serializer::{EncryptingSerializer, SessionPayload};

/// Hook run on every payload before it is written to the store.
pub type EncodeFn = Arc<dyn Fn(&SessionPayload) -> Result<Vec<u8>> + Send + Sync>;

/// Hook run on every stored value before the framework uses it.
pub type DecodeFn = Arc<dyn Fn(&[u8]) -> Result<SessionPayload> + Send + Sync>;

/// A payload serializer that can be installed as session hooks.
pub trait PayloadSerializer: Send + Sync + 'static {
    fn encode(&self, payload: &SessionPayload) -> Result<Vec<u8>>;

    fn decode(&self, data: &[u8]) -> Result<SessionPayload>;
}

impl PayloadSerializer for EncryptingSerializer {
    fn encode(&self, payload: &SessionPayload) -> Result<Vec<u8>> {
        EncryptingSerializer::encode(self, payload)
    }

    fn decode(&self, data: &[u8]) -> Result<SessionPayload> {
        EncryptingSerializer::decode(self, data)
    }
}

/// The encode/decode pair installed on a Redis-backed provider.
#[derive(Clone)]
pub struct SessionCodec {
    encode: EncodeFn,
    decode: DecodeFn,
}

impl SessionCodec {
    pub fn new(encode: EncodeFn, decode: DecodeFn) -> Self {
        Self { encode, decode }
    }

    /// Bind both hooks to a single serializer instance.
    pub fn from_serializer<S: PayloadSerializer>(serializer: S) -> Self {
        let serializer = Arc::new(serializer);
        let encoder = Arc::clone(&serializer);
        Self {
            encode: Arc::new(move |payload: &SessionPayload| encoder.encode(payload)),
            decode: Arc::new(move |data: &[u8]| serializer.decode(data)),
        }
    }

    pub fn encode(&self, payload: &SessionPayload) -> Result<Vec<u8>> {
        (self.encode)(payload)
    }

    pub fn decode(&self, data: &[u8]) -> Result<SessionPayload> {
        (self.decode)(data)
    }

    pub fn encode_fn(&self) -> EncodeFn {
        Arc::clone(&self.encode)
    }

    pub fn decode_fn(&self) -> DecodeFn {
        Arc::clone(&self.decode)
    }
}

impl fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCodec").finish_non_exhaustive()
    }
}

/// Attach payload encryption to the selected topology.
///
/// Redis topologies get an [`EncryptingSerializer`] keyed by `secret`;
/// the memory topology is returned without hooks.
pub fn install_encryption(topology: Topology, secret: Option<&str>) -> Backend {
    let codec = || {
        debug!("Installing encrypting serializer for session payloads");
        SessionCodec::from_serializer(EncryptingSerializer::new(secret.unwrap_or_default()))
    };

    match topology {
        Topology::Memory => Backend::Memory,
        Topology::Redis(params) => Backend::Redis {
            params,
            codec: codec(),
        },
        Topology::RedisSentinel(params) => Backend::RedisSentinel {
            params,
            codec: codec(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::select_topology;
    use crate::error::SerializerError;
    use gatehouse_config::{HighAvailabilityConfig, RedisConfig};

    /// Stores payloads as plain JSON so tests can see what the hooks did.
    struct PlainSerializer;

    impl PayloadSerializer for PlainSerializer {
        fn encode(&self, payload: &SessionPayload) -> Result<Vec<u8>> {
            serde_json::to_vec(payload).map_err(SerializerError::Serialize)
        }

        fn decode(&self, data: &[u8]) -> Result<SessionPayload> {
            serde_json::from_slice(data).map_err(SerializerError::Deserialize)
        }
    }

    fn payload() -> SessionPayload {
        let mut payload = SessionPayload::new();
        payload.insert("username", "john");
        payload
    }

    #[test]
    fn test_codec_from_custom_serializer() {
        let codec = SessionCodec::from_serializer(PlainSerializer);
        let encoded = codec.encode(&payload()).unwrap();
        assert_eq!(encoded, br#"{"username":"john"}"#);
        assert_eq!(codec.decode(&encoded).unwrap(), payload());
    }

    #[test]
    fn test_codec_fns_share_serializer() {
        let codec = SessionCodec::from_serializer(EncryptingSerializer::new("k"));
        let encode = codec.encode_fn();
        let decode = codec.decode_fn();
        let bytes = encode(&payload()).unwrap();
        assert_eq!(decode(&bytes).unwrap(), payload());
    }

    #[test]
    fn test_memory_gets_no_hooks() {
        let backend = install_encryption(Topology::Memory, Some("secret"));
        assert!(matches!(backend, Backend::Memory));
        assert!(backend.codec().is_none());
    }

    #[test]
    fn test_redis_gets_encrypting_hooks() {
        let topology = select_topology(Some(&RedisConfig::new("r1", 6379)), None);
        let backend = install_encryption(topology, Some("secret"));

        let codec = backend.codec().unwrap();
        let encoded = codec.encode(&payload()).unwrap();
        assert!(!String::from_utf8_lossy(&encoded).contains("john"));

        // Bound to the configured secret.
        let other = EncryptingSerializer::new("secret");
        assert_eq!(other.decode(&encoded).unwrap(), payload());
    }

    #[test]
    fn test_sentinel_gets_hooks() {
        let redis = RedisConfig::new("r1", 6379)
            .with_high_availability(HighAvailabilityConfig::new("mymaster"));
        let backend = install_encryption(select_topology(Some(&redis), None), Some("secret"));
        assert_eq!(backend.provider_name(), "redis-sentinel");
        assert!(backend.codec().is_some());
    }

    #[test]
    fn test_missing_secret_uses_empty_key() {
        let topology = select_topology(Some(&RedisConfig::new("r1", 6379)), None);
        let backend = install_encryption(topology, None);
        let encoded = backend.codec().unwrap().encode(&payload()).unwrap();
        assert_eq!(
            EncryptingSerializer::new("").decode(&encoded).unwrap(),
            payload()
        );
    }
}
