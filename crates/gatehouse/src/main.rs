//! Gatehouse - session provider configuration tool
//!
//! Main entry point for the Gatehouse CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{check, session_id};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Gatehouse - session provider configuration tool
#[derive(Parser)]
#[command(name = "gatehouse")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a config file and show the resulting session provider
    Check(check::CheckArgs),

    /// Generate session identifiers
    SessionId(session_id::SessionIdArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for --json.
    let filter = if cli.verbose {
        "gatehouse=debug,gatehouse_config=debug,gatehouse_session=debug,warn"
    } else {
        "gatehouse=info,gatehouse_config=warn,gatehouse_session=warn,warn"
    };

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    let ctx = commands::Context {
        json_output: cli.json,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Check(args) => check::run(args, &ctx),
        Commands::SessionId(args) => session_id::run(args, &ctx),
    }
}
