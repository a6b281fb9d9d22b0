//! Process-wide counters for lazy render scans.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

static SCAN_TOTAL: AtomicU64 = AtomicU64::new(0);
static SCAN_FAILED: AtomicU64 = AtomicU64::new(0);
static SCAN_LAT_NS: AtomicU64 = AtomicU64::new(0);
static EVALUATED_TOTAL: AtomicU64 = AtomicU64::new(0);
static ACTIVATED_TOTAL: AtomicU64 = AtomicU64::new(0);
static SKIPPED_TOTAL: AtomicU64 = AtomicU64::new(0);
static CONFLICT_TOTAL: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MetricSnapshot {
    pub scans: u64,
    pub failed_scans: u64,
    pub avg_scan_ms: f64,
    pub evaluated: u64,
    pub activated: u64,
    pub skipped: u64,
    pub conflicts: u64,
}

pub fn record_scan(evaluated: usize, activated: usize, duration: Duration) {
    SCAN_TOTAL.fetch_add(1, Ordering::Relaxed);
    EVALUATED_TOTAL.fetch_add(evaluated as u64, Ordering::Relaxed);
    ACTIVATED_TOTAL.fetch_add(activated as u64, Ordering::Relaxed);
    SCAN_LAT_NS.fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
}

pub fn record_skip(conflict: bool) {
    SKIPPED_TOTAL.fetch_add(1, Ordering::Relaxed);
    if conflict {
        CONFLICT_TOTAL.fetch_add(1, Ordering::Relaxed);
    }
}

pub fn record_failure() {
    SCAN_TOTAL.fetch_add(1, Ordering::Relaxed);
    SCAN_FAILED.fetch_add(1, Ordering::Relaxed);
}

pub fn snapshot() -> MetricSnapshot {
    let scans = SCAN_TOTAL.load(Ordering::Relaxed);
    let failed = SCAN_FAILED.load(Ordering::Relaxed);
    let completed = scans.saturating_sub(failed);
    let avg_scan_ms = if completed == 0 {
        0.0
    } else {
        SCAN_LAT_NS.load(Ordering::Relaxed) as f64 / completed as f64 / 1_000_000.0
    };
    MetricSnapshot {
        scans,
        failed_scans: failed,
        avg_scan_ms,
        evaluated: EVALUATED_TOTAL.load(Ordering::Relaxed),
        activated: ACTIVATED_TOTAL.load(Ordering::Relaxed),
        skipped: SKIPPED_TOTAL.load(Ordering::Relaxed),
        conflicts: CONFLICT_TOTAL.load(Ordering::Relaxed),
    }
}
