//! Check command - load a config file and show the session provider it yields.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result, bail};
use clap::Args;
use gatehouse_config::SecretSource;
use gatehouse_session::{CertificatePool, ProviderConfig, ProviderSummary};
use tracing::debug;

use super::Context;

/// Arguments for the check command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "gatehouse.toml")]
    pub config: PathBuf,

    /// DER-encoded CA certificate trusted for the Redis connection (repeatable)
    #[arg(long = "ca-cert")]
    pub ca_certs: Vec<PathBuf>,
}

/// Run the check command.
pub fn run(args: CheckArgs, ctx: &Context) -> Result<()> {
    let loaded = gatehouse_config::load_config(&args.config)
        .with_context(|| format!("invalid configuration in {}", args.config.display()))?;

    let has_tls = loaded
        .config
        .session
        .redis
        .as_ref()
        .is_some_and(|redis| redis.tls.is_some());
    if !args.ca_certs.is_empty() && !has_tls {
        bail!("--ca-cert requires a [session.redis.tls] section in the config file");
    }

    let pool = load_certificates(&args.ca_certs)?;
    let provider = ProviderConfig::new(&loaded.config.session, pool);
    let summary = provider.summary();

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("# Session Provider\n");
    println!("Config file: {}", loaded.path.display());
    if ctx.verbose {
        println!("Secret:      {}", secret_label(loaded.secret_source));
    }
    for warning in &loaded.warnings {
        println!("Warning:     {}", warning);
    }
    println!();
    print_summary(&summary);

    if ctx.verbose {
        let example = provider.session().generate_id();
        println!(
            "\nSet-Cookie: {}",
            provider.session().cookie.header_value(example.as_str())
        );
    }

    Ok(())
}

fn load_certificates(paths: &[PathBuf]) -> Result<Option<Arc<CertificatePool>>> {
    if paths.is_empty() {
        return Ok(None);
    }

    let mut pool = CertificatePool::new();
    for path in paths {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read certificate {}", path.display()))?;
        let count = pool
            .add_encoded(&bytes)
            .with_context(|| format!("invalid certificate {}", path.display()))?;
        debug!(path = %path.display(), count, "Loaded CA certificates");
    }
    Ok(Some(Arc::new(pool)))
}

fn secret_label(source: SecretSource) -> &'static str {
    match source {
        SecretSource::EnvVar => "from environment",
        SecretSource::ConfigFile => "from config file (plaintext)",
        SecretSource::None => "not set",
    }
}

fn print_summary(summary: &ProviderSummary) {
    println!("Provider:    {}", summary.provider);
    println!("Cookie:      {}", summary.cookie_name);
    if !summary.domain.is_empty() {
        println!("Domain:      {}", summary.domain);
    }
    println!("SameSite:    {}", summary.same_site);
    println!("Secure:      {}", summary.secure);
    println!("Expiration:  {}s", summary.expiration_secs);

    if let (Some(network), Some(addr)) = (summary.network, summary.addr.as_ref()) {
        println!("Network:     {}", network);
        println!("Address:     {}", addr);
    }

    if let Some(ref master) = summary.master_name {
        println!("Master:      {}", master);
        if summary.sentinel_addrs.is_empty() {
            println!("Sentinels:   (none)");
        } else {
            println!("Sentinels:");
            for addr in &summary.sentinel_addrs {
                println!("  {}", addr);
            }
        }
    }

    if let Some(index) = summary.database_index {
        println!("Database:    {}", index);
    }
    if let Some(size) = summary.pool_size {
        println!("Pool size:   {}", size);
    }
    if let Some(prefix) = summary.key_prefix {
        println!("Key prefix:  {}", prefix);
    }
    if summary.provider != "memory" {
        println!("TLS:         {}", if summary.tls { "enabled" } else { "disabled" });
        println!("Encrypted:   {}", summary.encrypted);
    }
}
