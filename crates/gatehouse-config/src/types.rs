//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [session]
//! name = "gatehouse_session"
//! domain = "example.com"
//! same_site = "lax"
//! expiration_secs = 3600
//!
//! [session.redis]
//! host = "redis.internal"
//! port = 6379
//!
//! [session.redis.high_availability]
//! sentinel_name = "mymaster"
//! nodes = [{ host = "sentinel-1", port = 26379 }]
//! ```

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatehouseConfig {
    /// Session subsystem configuration.
    pub session: SessionConfiguration,
}

impl GatehouseConfig {
    /// Create a config with every field at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Default cookie name.
pub const DEFAULT_COOKIE_NAME: &str = "gatehouse_session";

/// Default session lifetime in seconds.
pub const DEFAULT_EXPIRATION_SECS: u64 = 3600;

/// Session cookie and storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfiguration {
    /// Cookie name.
    pub name: String,

    /// Cookie domain.
    pub domain: String,

    /// SameSite mode as written in the config (`strict`, `lax`, `none`).
    pub same_site: String,

    /// Session lifetime in seconds.
    pub expiration_secs: u64,

    /// Secret used to encrypt payloads held in Redis.
    pub secret: Option<String>,

    /// Redis store. Absent means the in-memory provider.
    pub redis: Option<RedisConfig>,
}

impl Default for SessionConfiguration {
    fn default() -> Self {
        Self {
            name: DEFAULT_COOKIE_NAME.to_string(),
            domain: String::new(),
            same_site: "lax".to_string(),
            expiration_secs: DEFAULT_EXPIRATION_SECS,
            secret: None,
            redis: None,
        }
    }
}

impl SessionConfiguration {
    /// Session lifetime as a [`Duration`].
    pub fn expiration(&self) -> Duration {
        Duration::from_secs(self.expiration_secs)
    }

    /// Set the cookie domain.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Set the SameSite mode string.
    pub fn with_same_site(mut self, same_site: impl Into<String>) -> Self {
        self.same_site = same_site.into();
        self
    }

    /// Set the payload encryption secret.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Use a Redis store.
    pub fn with_redis(mut self, redis: RedisConfig) -> Self {
        self.redis = Some(redis);
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Redis Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Default Redis port.
pub const DEFAULT_REDIS_PORT: u16 = 6379;

/// Redis store configuration.
///
/// A `port` of zero means `host` is the path of a Unix-domain socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database_index: i64,
    pub maximum_active_connections: i64,
    pub minimum_idle_connections: i64,
    pub tls: Option<TlsConfig>,
    pub high_availability: Option<HighAvailabilityConfig>,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_REDIS_PORT,
            username: None,
            password: None,
            database_index: 0,
            maximum_active_connections: 8,
            minimum_idle_connections: 0,
            tls: None,
            high_availability: None,
        }
    }
}

impl RedisConfig {
    /// Create a Redis config pointing at `host:port`.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Create a Redis config for a Unix-domain socket path.
    pub fn unix(path: impl Into<String>) -> Self {
        Self::new(path, 0)
    }

    /// Set the ACL credentials.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the TLS settings.
    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = Some(tls);
        self
    }

    /// Set the Sentinel settings.
    pub fn with_high_availability(mut self, ha: HighAvailabilityConfig) -> Self {
        self.high_availability = Some(ha);
        self
    }
}

/// Redis Sentinel configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighAvailabilityConfig {
    /// Name of the master set monitored by the sentinels.
    pub sentinel_name: String,
    pub sentinel_username: Option<String>,
    pub sentinel_password: Option<String>,
    pub nodes: Vec<RedisNode>,
    /// Route read-only commands to the closest node.
    pub route_by_latency: bool,
    /// Route read-only commands to a random node.
    pub route_randomly: bool,
}

impl HighAvailabilityConfig {
    /// Create a Sentinel config for the given master name.
    pub fn new(sentinel_name: impl Into<String>) -> Self {
        Self {
            sentinel_name: sentinel_name.into(),
            ..Self::default()
        }
    }

    /// Add a sentinel node.
    pub fn add_node(mut self, host: impl Into<String>, port: u16) -> Self {
        self.nodes.push(RedisNode {
            host: host.into(),
            port,
        });
        self
    }
}

/// A single Sentinel node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedisNode {
    pub host: String,
    #[serde(default = "default_sentinel_port")]
    pub port: u16,
}

fn default_sentinel_port() -> u16 {
    26379
}

// ─────────────────────────────────────────────────────────────────────────────
// TLS Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// TLS settings for the Redis connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Server name to verify; defaults to the connection host when empty.
    pub server_name: String,
    /// Disable certificate verification.
    pub skip_verify: bool,
    /// Lowest protocol version to negotiate.
    pub minimum_version: Option<TlsVersion>,
}

/// TLS protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TlsVersion {
    #[serde(rename = "TLS1.0")]
    Tls10,
    #[serde(rename = "TLS1.1")]
    Tls11,
    #[serde(rename = "TLS1.2")]
    Tls12,
    #[serde(rename = "TLS1.3")]
    Tls13,
}

impl fmt::Display for TlsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TlsVersion::Tls10 => write!(f, "TLS1.0"),
            TlsVersion::Tls11 => write!(f, "TLS1.1"),
            TlsVersion::Tls12 => write!(f, "TLS1.2"),
            TlsVersion::Tls13 => write!(f, "TLS1.3"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = GatehouseConfig::from_toml("").unwrap();
        assert_eq!(config.session.name, DEFAULT_COOKIE_NAME);
        assert_eq!(config.session.same_site, "lax");
        assert_eq!(config.session.expiration(), Duration::from_secs(3600));
        assert!(config.session.redis.is_none());
        assert!(config.session.secret.is_none());
    }

    #[test]
    fn test_parse_single_node_redis() {
        let toml = r#"
[session]
name = "sid"
domain = "example.com"
same_site = "strict"
expiration_secs = 7200
secret = "hunter2"

[session.redis]
host = "r1"
username = "app"
password = "pw"
database_index = 3
"#;
        let config = GatehouseConfig::from_toml(toml).unwrap();
        let session = &config.session;
        assert_eq!(session.name, "sid");
        assert_eq!(session.domain, "example.com");
        assert_eq!(session.expiration_secs, 7200);

        let redis = session.redis.as_ref().unwrap();
        assert_eq!(redis.host, "r1");
        assert_eq!(redis.port, DEFAULT_REDIS_PORT);
        assert_eq!(redis.username.as_deref(), Some("app"));
        assert_eq!(redis.database_index, 3);
        assert_eq!(redis.maximum_active_connections, 8);
        assert!(redis.high_availability.is_none());
    }

    #[test]
    fn test_parse_sentinel() {
        let toml = r#"
[session.redis]
host = "r1"

[session.redis.high_availability]
sentinel_name = "mymaster"
route_by_latency = true
nodes = [
    { host = "s1", port = 26380 },
    { host = "s2" },
]
"#;
        let config = GatehouseConfig::from_toml(toml).unwrap();
        let ha = config
            .session
            .redis
            .unwrap()
            .high_availability
            .unwrap();
        assert_eq!(ha.sentinel_name, "mymaster");
        assert!(ha.route_by_latency);
        assert!(!ha.route_randomly);
        assert_eq!(ha.nodes.len(), 2);
        assert_eq!(ha.nodes[0].port, 26380);
        assert_eq!(ha.nodes[1].port, 26379);
    }

    #[test]
    fn test_parse_tls_version() {
        let toml = r#"
[session.redis]
host = "r1"

[session.redis.tls]
server_name = "redis.internal"
minimum_version = "TLS1.3"
"#;
        let config = GatehouseConfig::from_toml(toml).unwrap();
        let tls = config.session.redis.unwrap().tls.unwrap();
        assert_eq!(tls.server_name, "redis.internal");
        assert_eq!(tls.minimum_version, Some(TlsVersion::Tls13));
        assert!(!tls.skip_verify);
    }

    #[test]
    fn test_unknown_tls_version_rejected() {
        let toml = r#"
[session.redis.tls]
minimum_version = "SSL3"
"#;
        assert!(GatehouseConfig::from_toml(toml).is_err());
    }

    #[test]
    fn test_tls_version_ordering() {
        assert!(TlsVersion::Tls10 < TlsVersion::Tls12);
        assert!(TlsVersion::Tls13 > TlsVersion::Tls12);
        assert_eq!(TlsVersion::Tls12.to_string(), "TLS1.2");
    }

    #[test]
    fn test_toml_roundtrip_keeps_redis() {
        let mut config = GatehouseConfig::new();
        config.session = SessionConfiguration::default()
            .with_secret("s")
            .with_redis(RedisConfig::unix("/var/run/redis.sock"));

        let text = config.to_toml().unwrap();
        let parsed = GatehouseConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.session, config.session);
    }
}
