use anyhow::Result;
use clap::Parser;
use tracing::{debug, error};

mod cli;

use cli::commands::Commands;
use cli::env::CliArgs;
use cli::runtime::{init_logging, load_policy};
use cli::{cmd_lcp, cmd_lrc, cmd_policy, cmd_scan};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = CliArgs::parse();

    let policy = load_policy(cli.config.as_deref(), &cli.set)?;
    init_logging(&cli.log_level, cli.debug || policy.debug)?;
    debug!(rev = policy.rev, "foldbeacon v{} starting", env!("CARGO_PKG_VERSION"));

    let result = match cli.command {
        Commands::Scan(args) => cmd_scan(args, policy, cli.output).await,
        Commands::Lcp(args) => cmd_lcp(args, &policy, cli.output),
        Commands::Lrc(args) => cmd_lrc(args, &policy, cli.output),
        Commands::Policy(args) => cmd_policy(args, &policy, cli.output),
    };

    if let Err(err) = &result {
        error!("command failed: {:#}", err);
    }
    result
}
