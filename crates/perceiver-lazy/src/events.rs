use std::time::Duration;

use foldbeacon_render_tree::{NodeId, TreeError};
use tracing::{debug, warn};

use crate::metrics;
use crate::model::LazyElement;
use crate::threshold::SkipReason;

pub fn emit_skip(node: NodeId, tag: &str, reason: SkipReason) {
    metrics::record_skip(reason == SkipReason::Conflict);
    debug!(
        target: "perceiver.events",
        %node,
        tag,
        reason = reason.as_str(),
        "lazy.element.skipped"
    );
}

pub fn emit_element(element: &LazyElement, tag: &str, activated: bool) {
    debug!(
        target: "perceiver.events",
        node = %element.node,
        tag,
        depth = element.depth,
        distance = element.distance,
        token = element.token.as_str(),
        activated,
        "lazy.element.evaluated"
    );
}

pub fn emit_scan(evaluated: usize, activated: usize, duration: Duration) {
    metrics::record_scan(evaluated, activated, duration);
    debug!(
        target: "perceiver.events",
        evaluated,
        activated,
        elapsed_ms = duration.as_millis() as u64,
        "lazy.scan.completed"
    );
}

pub fn emit_failure(selector: &str, err: &TreeError) {
    metrics::record_failure();
    warn!(
        target: "perceiver.events",
        selector,
        error = %err,
        "lazy.scan.failed"
    );
}
