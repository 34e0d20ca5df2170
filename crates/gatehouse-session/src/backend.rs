//! Storage backend selection.
//!
//! Three mutually exclusive topologies, chosen purely from the shape of the
//! Redis configuration:
//!
//! | Redis config                         | Topology          |
//! |--------------------------------------|-------------------|
//! | absent                               | `memory`          |
//! | present, non-empty sentinel name     | `redis-sentinel`  |
//! | present otherwise                    | `redis`           |

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use gatehouse_config::{HighAvailabilityConfig, RedisConfig, RedisNode};
use serde::Serialize;
use tracing::{debug, warn};

use crate::hooks::SessionCodec;
use crate::tls::{CertificatePool, TLS_MINIMUM_VERSION_FLOOR, TlsContext};

/// Prefix applied to every session key in the shared store.
pub const KEY_PREFIX: &str = "gatehouse-session";

/// How long a pooled connection may sit idle before the client closes it.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(300);

pub const PROVIDER_MEMORY: &str = "memory";
pub const PROVIDER_REDIS: &str = "redis";
pub const PROVIDER_REDIS_SENTINEL: &str = "redis-sentinel";

/// Transport for a single-node Redis connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Tcp,
    Unix,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Tcp => "tcp",
            Network::Unix => "unix",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection parameters for a single Redis node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisParams {
    pub network: Network,
    /// `host:port` for TCP, a socket path for Unix.
    pub addr: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database_index: i64,
    pub pool_size: i64,
    pub min_idle_connections: i64,
    pub idle_timeout: Duration,
    pub tls: Option<TlsContext>,
    pub key_prefix: &'static str,
}

/// Connection parameters for a Redis Sentinel deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentinelParams {
    pub master_name: String,
    pub sentinel_addrs: Vec<String>,
    pub sentinel_username: Option<String>,
    pub sentinel_password: Option<String>,
    pub route_by_latency: bool,
    pub route_randomly: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database_index: i64,
    pub pool_size: i64,
    pub min_idle_connections: i64,
    pub idle_timeout: Duration,
    pub tls: Option<TlsContext>,
    pub key_prefix: &'static str,
}

/// The selected topology, before payload hooks are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Topology {
    Memory,
    Redis(RedisParams),
    RedisSentinel(SentinelParams),
}

impl Topology {
    pub fn provider_name(&self) -> &'static str {
        match self {
            Topology::Memory => PROVIDER_MEMORY,
            Topology::Redis(_) => PROVIDER_REDIS,
            Topology::RedisSentinel(_) => PROVIDER_REDIS_SENTINEL,
        }
    }
}

/// The storage backend handed to the session framework.
///
/// Only the Redis variants carry a [`SessionCodec`]: payloads kept in
/// process memory are never encoded.
#[derive(Debug, Clone)]
pub enum Backend {
    Memory,
    Redis {
        params: RedisParams,
        codec: SessionCodec,
    },
    RedisSentinel {
        params: SentinelParams,
        codec: SessionCodec,
    },
}

impl Backend {
    pub fn provider_name(&self) -> &'static str {
        match self {
            Backend::Memory => PROVIDER_MEMORY,
            Backend::Redis { .. } => PROVIDER_REDIS,
            Backend::RedisSentinel { .. } => PROVIDER_REDIS_SENTINEL,
        }
    }

    pub fn redis_params(&self) -> Option<&RedisParams> {
        match self {
            Backend::Redis { params, .. } => Some(params),
            _ => None,
        }
    }

    pub fn sentinel_params(&self) -> Option<&SentinelParams> {
        match self {
            Backend::RedisSentinel { params, .. } => Some(params),
            _ => None,
        }
    }

    /// Payload encode/decode hooks, present for the Redis variants only.
    pub fn codec(&self) -> Option<&SessionCodec> {
        match self {
            Backend::Memory => None,
            Backend::Redis { codec, .. } | Backend::RedisSentinel { codec, .. } => Some(codec),
        }
    }
}

/// Select a topology from the optional Redis configuration.
///
/// No reachability or range checks are made; values are copied as given.
pub fn select_topology(
    redis: Option<&RedisConfig>,
    root_certificates: Option<Arc<CertificatePool>>,
) -> Topology {
    let Some(redis) = redis else {
        if let Some(ref pool) = root_certificates {
            warn!(
                certificates = pool.len(),
                "Root certificates ignored: in-memory sessions have no TLS connection"
            );
        }
        debug!(provider = PROVIDER_MEMORY, "No Redis configured, using in-memory sessions");
        return Topology::Memory;
    };

    let tls = match (redis.tls.as_ref(), root_certificates) {
        (Some(tls), roots) => Some(TlsContext::new(tls, TLS_MINIMUM_VERSION_FLOOR, roots)),
        (None, Some(pool)) => {
            warn!(
                certificates = pool.len(),
                "Root certificates ignored: Redis connection has no TLS settings"
            );
            None
        }
        (None, None) => None,
    };

    match redis.high_availability {
        Some(ref ha) if !ha.sentinel_name.is_empty() => {
            Topology::RedisSentinel(sentinel_params(redis, ha, tls))
        }
        _ => Topology::Redis(redis_params(redis, tls)),
    }
}

fn redis_params(redis: &RedisConfig, tls: Option<TlsContext>) -> RedisParams {
    let (network, addr) = if redis.port == 0 {
        (Network::Unix, redis.host.clone())
    } else {
        (Network::Tcp, format!("{}:{}", redis.host, redis.port))
    };

    debug!(
        provider = PROVIDER_REDIS,
        %network,
        addr = %addr,
        tls = tls.is_some(),
        "Selected single-node Redis backend"
    );

    RedisParams {
        network,
        addr,
        username: redis.username.clone(),
        password: redis.password.clone(),
        database_index: redis.database_index,
        pool_size: redis.maximum_active_connections,
        min_idle_connections: redis.minimum_idle_connections,
        idle_timeout: IDLE_TIMEOUT,
        tls,
        key_prefix: KEY_PREFIX,
    }
}

fn sentinel_params(
    redis: &RedisConfig,
    ha: &HighAvailabilityConfig,
    tls: Option<TlsContext>,
) -> SentinelParams {
    let sentinel_addrs = sentinel_addresses(&redis.host, redis.port, &ha.nodes);

    debug!(
        provider = PROVIDER_REDIS_SENTINEL,
        master = %ha.sentinel_name,
        sentinels = ?sentinel_addrs,
        tls = tls.is_some(),
        "Selected Redis Sentinel backend"
    );

    SentinelParams {
        master_name: ha.sentinel_name.clone(),
        sentinel_addrs,
        sentinel_username: ha.sentinel_username.clone(),
        sentinel_password: ha.sentinel_password.clone(),
        route_by_latency: ha.route_by_latency,
        route_randomly: ha.route_randomly,
        username: redis.username.clone(),
        password: redis.password.clone(),
        database_index: redis.database_index,
        pool_size: redis.maximum_active_connections,
        min_idle_connections: redis.minimum_idle_connections,
        idle_timeout: IDLE_TIMEOUT,
        tls,
        key_prefix: KEY_PREFIX,
    }
}

/// Build the ordered sentinel address list.
///
/// The primary `host:port` comes first when `host` is non-empty, followed by
/// each node in order. Hosts are lower-cased and repeated addresses dropped.
pub fn sentinel_addresses(host: &str, port: u16, nodes: &[RedisNode]) -> Vec<String> {
    let mut addrs: Vec<String> = Vec::with_capacity(nodes.len() + 1);

    if !host.is_empty() {
        addrs.push(format!("{}:{}", host.to_lowercase(), port));
    }

    for node in nodes {
        let addr = format!("{}:{}", node.host.to_lowercase(), node.port);
        if !addrs.contains(&addr) {
            addrs.push(addr);
        }
    }

    addrs
}
