use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use foldbeacon_policy_center::BeaconPolicy;
use perceiver_lazy::{metrics, LazyRenderPerceiver};
use serde_json::json;
use tracing::debug;

use super::output::{emit, OutputFormat};
use super::runtime::read_snapshot;

#[derive(Args, Clone, Debug)]
pub struct LrcArgs {
    /// Page snapshot (JSON) to inspect
    #[arg(long, value_name = "FILE")]
    pub snapshot: PathBuf,

    /// Also list the layout conflicts found under every marker node
    #[arg(long)]
    pub conflicts: bool,
}

pub fn cmd_lrc(args: LrcArgs, policy: &BeaconPolicy, format: OutputFormat) -> Result<()> {
    let snapshot = read_snapshot(&args.snapshot)?;
    let perceiver =
        LazyRenderPerceiver::from_policy(&policy.lazy).context("lazy render policy rejected")?;
    let outcome = perceiver.run_lazy_render_scan(&snapshot);
    debug!(metrics = ?metrics::snapshot(), "lazy render metrics");

    let mut payload = json!({
        "status": outcome.status,
        "tokens": outcome.value,
    });
    if args.conflicts {
        let records = perceiver
            .conflicts(&snapshot)
            .context("conflict analysis failed")?;
        payload["conflicts"] = serde_json::to_value(records)?;
    }
    emit(&payload, format, None)
}
