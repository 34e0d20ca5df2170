//! Configuration system for the Gatehouse session subsystem.
//!
//! Provides TOML-based configuration with:
//! - A `[session]` section describing cookies and expiration
//! - An optional `[session.redis]` section selecting a networked store
//! - An optional `[session.redis.high_availability]` section for Sentinel
//! - Secret resolution (env var → config file, with a plaintext warning)
//!
//! The types here are plain data; turning them into a session provider
//! configuration is the job of `gatehouse-session`.

pub mod discovery;
pub mod error;
pub mod types;
pub mod validation;

pub use discovery::{LoadedConfig, SECRET_ENV, SecretSource, load_config, load_config_file};
pub use error::{ConfigError, Result};
pub use types::*;
