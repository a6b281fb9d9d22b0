use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use foldbeacon_cli::{Beacon, BeaconOutcome, GeneratedBefore, StaticPriorResults};
use foldbeacon_policy_center::BeaconPolicy;
use tracing::{debug, info};

use super::output::{emit, OutputFormat};
use super::runtime::read_snapshot;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Feature {
    Lcp,
    Lrc,
}

#[derive(Args, Clone, Debug)]
pub struct ScanArgs {
    /// Page snapshot (JSON) to inspect
    #[arg(long, value_name = "FILE")]
    pub snapshot: PathBuf,

    /// Write the report to a file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Features that already have stored results for a cached page
    #[arg(long, value_enum, value_delimiter = ',')]
    pub generated_before: Vec<Feature>,

    /// Skip the post-load start delay
    #[arg(long)]
    pub no_delay: bool,
}

pub async fn cmd_scan(args: ScanArgs, mut policy: BeaconPolicy, format: OutputFormat) -> Result<()> {
    let snapshot = read_snapshot(&args.snapshot)?;
    if args.no_delay {
        policy.timing.start_delay_ms = 0;
    }

    let mut beacon = Beacon::new(policy).context("beacon policy rejected")?;
    if !args.generated_before.is_empty() {
        let before = GeneratedBefore {
            lcp: args.generated_before.contains(&Feature::Lcp),
            lrc: args.generated_before.contains(&Feature::Lrc),
        };
        beacon = beacon.with_prior_results(Arc::new(StaticPriorResults(before)));
    }

    let outcome = beacon.run(Arc::new(snapshot)).await;
    debug!(
        paint = ?perceiver_paint::metrics::snapshot(),
        lazy = ?perceiver_lazy::metrics::snapshot(),
        "scan metrics"
    );
    match &outcome {
        BeaconOutcome::Report(report) => {
            info!(status = %report.status, run_id = %report.run_id, "beacon report ready");
            emit(report.as_ref(), format, args.out.as_deref())
        }
        BeaconOutcome::Skipped(reason) => {
            info!(reason = reason.as_str(), "beacon skipped");
            emit(&outcome, format, args.out.as_deref())
        }
    }
}
