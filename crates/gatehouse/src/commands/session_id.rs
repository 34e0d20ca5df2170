//! Session-id command - mint identifiers with the provider's generator.

use anyhow::{Result, bail};
use clap::Args;
use gatehouse_session::generate_session_id;
use tracing::debug;

use super::Context;

/// Arguments for the session-id command.
#[derive(Args, Debug)]
pub struct SessionIdArgs {
    /// Number of identifiers to generate
    #[arg(short = 'n', long, default_value_t = 1)]
    pub count: usize,
}

/// Run the session-id command.
pub fn run(args: SessionIdArgs, ctx: &Context) -> Result<()> {
    if args.count == 0 {
        bail!("--count must be at least 1");
    }

    let ids: Vec<String> = (0..args.count)
        .map(|_| generate_session_id().into_string())
        .collect();
    debug!(count = ids.len(), "Generated session identifiers");

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&ids)?);
    } else {
        for id in &ids {
            println!("{}", id);
        }
    }

    Ok(())
}
