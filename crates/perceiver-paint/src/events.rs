use std::time::Duration;

use foldbeacon_render_tree::TreeError;
use tracing::{debug, warn};

use crate::metrics;
use crate::model::PaintResults;

pub fn emit_scan(candidates: usize, results: &PaintResults, faults: usize, duration: Duration) {
    metrics::record_scan(candidates, results.len(), faults, duration);
    debug!(
        target: "perceiver.events",
        candidates,
        records = results.len(),
        primary = results.primary.as_ref().map(|r| r.info.src.as_str()).unwrap_or(""),
        faults,
        elapsed_ms = duration.as_millis() as u64,
        "paint.scan.completed"
    );
}

pub fn emit_failure(selector: &str, err: &TreeError) {
    metrics::record_failure();
    warn!(
        target: "perceiver.events",
        selector,
        error = %err,
        "paint.scan.failed"
    );
}
