//! The session provider configuration handed to the session framework.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use gatehouse_config::SessionConfiguration;
use serde::Serialize;
use tracing::info;

use crate::backend::{Backend, Network, RedisParams, SentinelParams, select_topology};
use crate::cookie::{CookiePolicy, SameSite};
use crate::hooks::{SessionCodec, install_encryption};
use crate::id::{IdGenerator, SESSION_ID_LENGTH, SessionId, default_generator};
use crate::tls::CertificatePool;

/// How often the framework sweeps expired in-memory sessions.
pub const GC_LIFETIME: Duration = Duration::from_secs(60);

/// The parts of an incoming request the "is secure" predicate may inspect.
#[derive(Debug, Clone, Copy)]
pub struct RequestInfo<'a> {
    pub scheme: &'a str,
    pub host: &'a str,
}

/// Predicate telling the framework whether a request arrived over HTTPS.
pub type IsSecureFn = Arc<dyn Fn(&RequestInfo<'_>) -> bool + Send + Sync>;

/// Cookie policy plus the callbacks every provider shares.
#[derive(Clone)]
pub struct SessionPolicy {
    pub cookie: CookiePolicy,
    pub gc_lifetime: Duration,
    pub id_length: usize,
    id_generator: IdGenerator,
    is_secure: IsSecureFn,
}

impl SessionPolicy {
    /// Build the shared policy from configuration.
    ///
    /// Requests are always treated as secure: the service is deployed
    /// behind TLS termination, so the scheme seen here is not trusted.
    pub fn from_config(config: &SessionConfiguration) -> Self {
        Self {
            cookie: CookiePolicy::from_config(config),
            gc_lifetime: GC_LIFETIME,
            id_length: SESSION_ID_LENGTH,
            id_generator: default_generator(),
            is_secure: Arc::new(|_: &RequestInfo<'_>| true),
        }
    }

    /// Generate a fresh session identifier.
    pub fn generate_id(&self) -> SessionId {
        (self.id_generator)()
    }

    pub fn id_generator(&self) -> IdGenerator {
        Arc::clone(&self.id_generator)
    }

    pub fn is_secure(&self, request: &RequestInfo<'_>) -> bool {
        (self.is_secure)(request)
    }

    pub fn is_secure_fn(&self) -> IsSecureFn {
        Arc::clone(&self.is_secure)
    }
}

impl fmt::Debug for SessionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionPolicy")
            .field("cookie", &self.cookie)
            .field("gc_lifetime", &self.gc_lifetime)
            .field("id_length", &self.id_length)
            .finish_non_exhaustive()
    }
}

/// Everything the session framework needs to create its provider.
///
/// Built once per configuration load and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    session: SessionPolicy,
    backend: Backend,
}

impl ProviderConfig {
    /// Build the provider configuration.
    ///
    /// `root_certificates` is only used when the Redis block has TLS settings;
    /// otherwise they are dropped with a warning.
    pub fn new(
        config: &SessionConfiguration,
        root_certificates: Option<Arc<CertificatePool>>,
    ) -> Self {
        let session = SessionPolicy::from_config(config);
        let topology = select_topology(config.redis.as_ref(), root_certificates);
        let backend = install_encryption(topology, config.secret.as_deref());

        info!(
            provider = backend.provider_name(),
            cookie = %session.cookie.name,
            domain = %session.cookie.domain,
            same_site = %session.cookie.same_site,
            encrypted = backend.codec().is_some(),
            "Session provider configured"
        );

        Self { session, backend }
    }

    pub fn session(&self) -> &SessionPolicy {
        &self.session
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// `memory`, `redis` or `redis-sentinel`.
    pub fn provider_name(&self) -> &'static str {
        self.backend.provider_name()
    }

    pub fn redis_params(&self) -> Option<&RedisParams> {
        self.backend.redis_params()
    }

    pub fn sentinel_params(&self) -> Option<&SentinelParams> {
        self.backend.sentinel_params()
    }

    pub fn codec(&self) -> Option<&SessionCodec> {
        self.backend.codec()
    }

    /// A credential-free description for display and diagnostics.
    pub fn summary(&self) -> ProviderSummary {
        let cookie = &self.session.cookie;
        let mut summary = ProviderSummary {
            provider: self.provider_name(),
            cookie_name: cookie.name.clone(),
            domain: cookie.domain.clone(),
            same_site: cookie.same_site,
            secure: cookie.secure,
            expiration_secs: cookie.expiration.as_secs(),
            network: None,
            addr: None,
            master_name: None,
            sentinel_addrs: Vec::new(),
            database_index: None,
            pool_size: None,
            key_prefix: None,
            tls: false,
            encrypted: self.codec().is_some(),
        };

        match &self.backend {
            Backend::Memory => {}
            Backend::Redis { params, .. } => {
                summary.network = Some(params.network);
                summary.addr = Some(params.addr.clone());
                summary.database_index = Some(params.database_index);
                summary.pool_size = Some(params.pool_size);
                summary.key_prefix = Some(params.key_prefix);
                summary.tls = params.tls.is_some();
            }
            Backend::RedisSentinel { params, .. } => {
                summary.master_name = Some(params.master_name.clone());
                summary.sentinel_addrs = params.sentinel_addrs.clone();
                summary.database_index = Some(params.database_index);
                summary.pool_size = Some(params.pool_size);
                summary.key_prefix = Some(params.key_prefix);
                summary.tls = params.tls.is_some();
            }
        }

        summary
    }
}

/// Serializable view of a [`ProviderConfig`] without secrets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderSummary {
    pub provider: &'static str,
    pub cookie_name: String,
    pub domain: String,
    pub same_site: SameSite,
    pub secure: bool,
    pub expiration_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<Network>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sentinel_addrs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_prefix: Option<&'static str>,
    pub tls: bool,
    pub encrypted: bool,
}
