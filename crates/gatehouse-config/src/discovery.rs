//! Config file loading and secret resolution.
//!
//! Resolution order for the session secret (later overrides earlier):
//! 1. `secret` in the config file (warns: plaintext)
//! 2. `GATEHOUSE_SESSION_SECRET` environment variable

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{ConfigError, GatehouseConfig, Result};

/// Environment variable that supplies the session secret.
pub const SECRET_ENV: &str = "GATEHOUSE_SESSION_SECRET";

/// Where the session secret was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSource {
    /// Environment variable.
    EnvVar,
    /// Config file (plaintext).
    ConfigFile,
    /// No secret configured.
    None,
}

/// Result of loading a config file.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The parsed configuration, with the secret override applied.
    pub config: GatehouseConfig,
    /// File the configuration was read from.
    pub path: PathBuf,
    /// Where the session secret came from.
    pub secret_source: SecretSource,
    /// Warnings generated during loading (e.g., plaintext secrets).
    pub warnings: Vec<String>,
}

/// Load a config file, apply the environment secret override and validate it.
pub fn load_config(path: &Path) -> Result<LoadedConfig> {
    let mut config = load_config_file(path)?;
    let mut warnings = Vec::new();

    let env_secret = std::env::var(SECRET_ENV).ok();
    let secret_source = apply_secret_override(&mut config, env_secret, &mut warnings);

    config.session.validate()?;

    for warning in &warnings {
        warn!(path = %path.display(), "{}", warning);
    }
    debug!(path = %path.display(), ?secret_source, "Loaded session configuration");

    Ok(LoadedConfig {
        config,
        path: path.to_path_buf(),
        secret_source,
        warnings,
    })
}

/// Load config from a specific file path without validation.
pub fn load_config_file(path: &Path) -> Result<GatehouseConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    GatehouseConfig::from_toml(&contents)
}

/// Replace the file secret with `env_secret` when one is set.
fn apply_secret_override(
    config: &mut GatehouseConfig,
    env_secret: Option<String>,
    warnings: &mut Vec<String>,
) -> SecretSource {
    if let Some(secret) = env_secret
        && !secret.is_empty()
    {
        config.session.secret = Some(secret);
        return SecretSource::EnvVar;
    }

    match config.session.secret {
        Some(ref secret) if !secret.is_empty() => {
            warnings.push(format!(
                "[session] contains a plaintext secret. \
                 Consider setting {} instead.",
                SECRET_ENV
            ));
            SecretSource::ConfigFile
        }
        _ => SecretSource::None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gatehouse.toml");
        fs::write(
            &path,
            r#"
[session]
name = "sid"
domain = "example.com"
"#,
        )
        .unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.session.name, "sid");
        assert_eq!(config.session.domain, "example.com");
    }

    #[test]
    fn test_load_config_file_not_found() {
        let err = load_config_file(Path::new("/nonexistent/gatehouse.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_load_config_file_bad_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gatehouse.toml");
        fs::write(&path, "[session\nname = ").unwrap();

        let err = load_config_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_env_secret_overrides_file() {
        let mut config = GatehouseConfig::new();
        config.session.secret = Some("from-file".to_string());
        let mut warnings = Vec::new();

        let source = apply_secret_override(&mut config, Some("from-env".to_string()), &mut warnings);

        assert_eq!(source, SecretSource::EnvVar);
        assert_eq!(config.session.secret.as_deref(), Some("from-env"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_plaintext_secret_warns() {
        let mut config = GatehouseConfig::new();
        config.session.secret = Some("from-file".to_string());
        let mut warnings = Vec::new();

        let source = apply_secret_override(&mut config, None, &mut warnings);

        assert_eq!(source, SecretSource::ConfigFile);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains(SECRET_ENV));
    }

    #[test]
    fn test_empty_env_secret_ignored() {
        let mut config = GatehouseConfig::new();
        let mut warnings = Vec::new();

        let source = apply_secret_override(&mut config, Some(String::new()), &mut warnings);

        assert_eq!(source, SecretSource::None);
        assert!(config.session.secret.is_none());
    }

    #[test]
    fn test_load_config_rejects_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gatehouse.toml");
        fs::write(
            &path,
            r#"
[session]
name = ""
"#,
        )
        .unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { .. }));
    }
}
