use chrono::{DateTime, Utc};
use foldbeacon_core_types::{RunId, ScanStatus};
use perceiver_paint::ImageRecord;
use serde::Serialize;

/// Why a run ended without a report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BeaconSkip {
    /// Viewport outside the bounds accepted for the device class.
    ScreenSize,
    PageScrolled,
    /// Every feature is disabled or already has results.
    NothingToRun,
}

impl BeaconSkip {
    pub fn as_str(&self) -> &'static str {
        match self {
            BeaconSkip::ScreenSize => "screen_size",
            BeaconSkip::PageScrolled => "page_scrolled",
            BeaconSkip::NothingToRun => "nothing_to_run",
        }
    }
}

/// `None` for a feature that did not run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BeaconResults {
    pub lcp: Option<Vec<ImageRecord>>,
    pub lrc: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BeaconReport {
    pub url: Option<String>,
    pub is_mobile: bool,
    pub status: ScanStatus,
    pub results: BeaconResults,
    pub run_id: RunId,
    pub generated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BeaconOutcome {
    Skipped(BeaconSkip),
    Report(Box<BeaconReport>),
}

impl BeaconOutcome {
    pub fn report(&self) -> Option<&BeaconReport> {
        match self {
            BeaconOutcome::Report(report) => Some(report),
            BeaconOutcome::Skipped(_) => None,
        }
    }

    pub fn skipped(&self) -> Option<BeaconSkip> {
        match self {
            BeaconOutcome::Skipped(reason) => Some(*reason),
            BeaconOutcome::Report(_) => None,
        }
    }
}
