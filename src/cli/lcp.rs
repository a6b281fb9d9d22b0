use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use foldbeacon_policy_center::BeaconPolicy;
use perceiver_paint::{metrics, PaintPerceiver, PaintResults};
use serde_json::json;
use tracing::debug;

use super::output::{emit, OutputFormat};
use super::runtime::read_snapshot;

#[derive(Args, Clone, Debug)]
pub struct LcpArgs {
    /// Page snapshot (JSON) to inspect
    #[arg(long, value_name = "FILE")]
    pub snapshot: PathBuf,
}

pub fn cmd_lcp(args: LcpArgs, policy: &BeaconPolicy, format: OutputFormat) -> Result<()> {
    let snapshot = read_snapshot(&args.snapshot)?;
    let perceiver =
        PaintPerceiver::from_policy(&policy.paint).context("candidate scan policy rejected")?;
    let outcome = perceiver
        .run_candidate_scan(&snapshot)
        .map(PaintResults::into_records);
    debug!(metrics = ?metrics::snapshot(), "paint metrics");
    let payload = json!({
        "status": outcome.status,
        "records": outcome.value,
    });
    emit(&payload, format, None)
}
