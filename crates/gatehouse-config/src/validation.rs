//! Structural validation of session configuration.
//!
//! The provider builder copies most values verbatim, so anything it cannot
//! work with has to be rejected here, before a provider is built.

use crate::{ConfigError, RedisConfig, Result, SessionConfiguration};

impl SessionConfiguration {
    /// Check the configuration for values the session provider cannot use.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ConfigError::MissingField {
                field: "name".to_string(),
                context: "[session]".to_string(),
            });
        }

        if let Some(ref redis) = self.redis {
            if self.secret.as_deref().is_none_or(str::is_empty) {
                return Err(ConfigError::MissingField {
                    field: "secret".to_string(),
                    context: "[session] (required when [session.redis] is set)".to_string(),
                });
            }
            redis.validate()?;
        }

        Ok(())
    }
}

impl RedisConfig {
    /// Check pool sizing and the Sentinel block.
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() && self.high_availability.is_none() {
            return Err(ConfigError::MissingField {
                field: "host".to_string(),
                context: "[session.redis]".to_string(),
            });
        }

        if self.maximum_active_connections < 0 {
            return Err(invalid(
                "maximum_active_connections",
                "must not be negative",
            ));
        }

        if self.minimum_idle_connections < 0 {
            return Err(invalid("minimum_idle_connections", "must not be negative"));
        }

        if self.minimum_idle_connections > self.maximum_active_connections {
            return Err(invalid(
                "minimum_idle_connections",
                "must not exceed maximum_active_connections",
            ));
        }

        if let Some(ref ha) = self.high_availability {
            if ha.sentinel_name.is_empty() {
                return Err(ConfigError::MissingField {
                    field: "sentinel_name".to_string(),
                    context: "[session.redis.high_availability]".to_string(),
                });
            }

            if let Some(pos) = ha.nodes.iter().position(|n| n.host.is_empty()) {
                return Err(invalid(
                    "high_availability.nodes",
                    &format!("node {} has an empty host", pos),
                ));
            }

            if self.host.is_empty() && ha.nodes.is_empty() {
                return Err(invalid(
                    "high_availability.nodes",
                    "at least one sentinel is required when host is empty",
                ));
            }
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HighAvailabilityConfig;

    fn redis_session(redis: RedisConfig) -> SessionConfiguration {
        SessionConfiguration::default()
            .with_secret("secret")
            .with_redis(redis)
    }

    #[test]
    fn test_default_is_valid() {
        assert!(SessionConfiguration::default().validate().is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut config = SessionConfiguration::default();
        config.name.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingField { ref field, .. }) if field == "name"
        ));
    }

    #[test]
    fn test_redis_requires_secret() {
        let config = SessionConfiguration::default().with_redis(RedisConfig::new("r1", 6379));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingField { ref field, .. }) if field == "secret"
        ));

        let config = config.with_secret("");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unix_socket_is_valid() {
        let config = redis_session(RedisConfig::unix("/var/run/redis.sock"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_idle_exceeding_active_rejected() {
        let mut redis = RedisConfig::new("r1", 6379);
        redis.minimum_idle_connections = 10;
        redis.maximum_active_connections = 2;
        assert!(matches!(
            redis_session(redis).validate(),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_negative_pool_rejected() {
        let mut redis = RedisConfig::new("r1", 6379);
        redis.maximum_active_connections = -1;
        assert!(redis_session(redis).validate().is_err());
    }

    #[test]
    fn test_sentinel_requires_name() {
        let redis = RedisConfig::new("r1", 6379)
            .with_high_availability(HighAvailabilityConfig::default().add_node("s1", 26379));
        assert!(matches!(
            redis_session(redis).validate(),
            Err(ConfigError::MissingField { ref field, .. }) if field == "sentinel_name"
        ));
    }

    #[test]
    fn test_sentinel_node_without_host_rejected() {
        let redis = RedisConfig::new("r1", 6379)
            .with_high_availability(HighAvailabilityConfig::new("mymaster").add_node("", 26379));
        assert!(redis_session(redis).validate().is_err());
    }

    #[test]
    fn test_sentinel_without_any_address_rejected() {
        let redis = RedisConfig::new("", 6379)
            .with_high_availability(HighAvailabilityConfig::new("mymaster"));
        assert!(redis_session(redis).validate().is_err());
    }

    #[test]
    fn test_sentinel_nodes_only_is_valid() {
        let redis = RedisConfig::new("", 6379)
            .with_high_availability(HighAvailabilityConfig::new("mymaster").add_node("s1", 26379));
        assert!(redis_session(redis).validate().is_ok());
    }
}
