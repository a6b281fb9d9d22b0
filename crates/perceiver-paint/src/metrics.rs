//! Process-wide counters for the paint perceiver.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

static SCAN_TOTAL: AtomicU64 = AtomicU64::new(0);
static SCAN_FAILED: AtomicU64 = AtomicU64::new(0);
static SCAN_LAT_NS: AtomicU64 = AtomicU64::new(0);
static CANDIDATES_TOTAL: AtomicU64 = AtomicU64::new(0);
static RECORDS_TOTAL: AtomicU64 = AtomicU64::new(0);
static FAULTS_TOTAL: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MetricSnapshot {
    pub scans: u64,
    pub failed_scans: u64,
    pub avg_scan_ms: f64,
    pub candidates: u64,
    pub records: u64,
    pub classification_faults: u64,
}

pub fn record_scan(candidates: usize, records: usize, faults: usize, duration: Duration) {
    SCAN_TOTAL.fetch_add(1, Ordering::Relaxed);
    CANDIDATES_TOTAL.fetch_add(candidates as u64, Ordering::Relaxed);
    RECORDS_TOTAL.fetch_add(records as u64, Ordering::Relaxed);
    FAULTS_TOTAL.fetch_add(faults as u64, Ordering::Relaxed);
    SCAN_LAT_NS.fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
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
        candidates: CANDIDATES_TOTAL.load(Ordering::Relaxed),
        records: RECORDS_TOTAL.load(Ordering::Relaxed),
        classification_faults: FAULTS_TOTAL.load(Ordering::Relaxed),
    }
}
