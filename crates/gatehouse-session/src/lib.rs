//! Session provider configuration.
//!
//! Turns a [`SessionConfiguration`](gatehouse_config::SessionConfiguration)
//! into an immutable [`ProviderConfig`] for the session framework:
//! - [`id`]: session identifiers drawn from the OS random source
//! - [`cookie`]: cookie attributes with secure defaults
//! - [`backend`]: memory, single-node Redis or Redis Sentinel
//! - [`hooks`]: payload encryption for the Redis-backed providers
//!
//! # Example
//!
//! ```rust,ignore
//! use gatehouse_config::{RedisConfig, SessionConfiguration};
//! use gatehouse_session::ProviderConfig;
//!
//! let config = SessionConfiguration::default()
//!     .with_secret("s3cr3t")
//!     .with_redis(RedisConfig::new("redis.internal", 6379));
//!
//! let provider = ProviderConfig::new(&config, None);
//! assert_eq!(provider.provider_name(), "redis");
//! ```

pub mod backend;
pub mod cookie;
pub mod error;
pub mod hooks;
pub mod id;
pub mod provider;
pub mod serializer;
pub mod tls;

pub use backend::{
    Backend, IDLE_TIMEOUT, KEY_PREFIX, Network, RedisParams, SentinelParams, Topology,
    select_topology, sentinel_addresses,
};
pub use cookie::{CookiePolicy, SameSite};
pub use error::{CertificateError, Result, SerializerError};
pub use hooks::{DecodeFn, EncodeFn, PayloadSerializer, SessionCodec, install_encryption};
pub use id::{
    ALPHABET, IdGenerator, SESSION_ID_LENGTH, SessionId, default_generator, generate_session_id,
};
pub use provider::{IsSecureFn, ProviderConfig, ProviderSummary, RequestInfo, SessionPolicy};
pub use serializer::{EncryptingSerializer, SessionPayload};
pub use tls::{CertificatePool, TLS_MINIMUM_VERSION_FLOOR, TlsContext};
