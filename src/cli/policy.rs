use anyhow::Result;
use clap::{Args, Subcommand};
use foldbeacon_policy_center::BeaconPolicy;

use super::output::{emit, OutputFormat};

#[derive(Args, Clone, Debug)]
pub struct PolicyArgs {
    #[command(subcommand)]
    pub command: PolicyCommand,
}

#[derive(Subcommand, Clone, Debug)]
pub enum PolicyCommand {
    /// Print the effective policy after file, env and --set overlays
    Show(PolicyShowArgs),
}

#[derive(Args, Clone, Debug)]
pub struct PolicyShowArgs {
    /// Include where each overridden value came from
    #[arg(long)]
    pub provenance: bool,
}

pub fn cmd_policy(args: PolicyArgs, policy: &BeaconPolicy, format: OutputFormat) -> Result<()> {
    match args.command {
        PolicyCommand::Show(show) => {
            let mut view = policy.clone();
            if !show.provenance {
                view.provenance.clear();
            }
            emit(&view, format, None)
        }
    }
}
