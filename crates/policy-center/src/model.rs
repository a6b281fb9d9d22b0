use std::collections::BTreeMap;

use foldbeacon_core_types::{ActivationPolicy, ReferenceLine};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BeaconPolicy {
    pub rev: u64,
    pub features: FeatureFlags,
    pub screen: ScreenPolicy,
    pub paint: PaintPolicy,
    pub lazy: LazyRenderPolicy,
    pub timing: TimingPolicy,
    pub debug: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub provenance: BTreeMap<String, PolicyProvenance>,
}

/// Which scans a beacon run may perform.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureFlags {
    /// Above-the-fold / LCP candidate scan.
    pub atf: bool,
    /// Lazy render content scan.
    pub lrc: bool,
}

/// Viewport bounds a run accepts for its device class.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScreenPolicy {
    pub is_mobile: bool,
    pub width_threshold: u32,
    pub height_threshold: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaintPolicy {
    /// Selector enumerating candidate elements.
    pub elements: String,
    /// `None` keeps every candidate.
    pub max_candidates: Option<usize>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LazyRenderPolicy {
    pub marker_attribute: String,
    pub threshold_px: f64,
    pub skip_strings: Vec<String>,
    pub exclusions: Vec<ExclusionRule>,
    pub activation: ActivationPolicy,
    pub reference: ReferenceLine,
}

/// Skip a node when `attribute` matches `pattern` (case-insensitive regex).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExclusionRule {
    pub attribute: String,
    pub pattern: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimingPolicy {
    pub start_delay_ms: u64,
    pub guard_ms: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicyProvenance {
    pub path: String,
    pub source: PolicySource,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PolicySource {
    Builtin,
    File,
    Env,
    Cli,
}

impl BeaconPolicy {
    pub fn set_provenance(&mut self, path: &str, source: PolicySource) {
        self.provenance.insert(
            path.to_string(),
            PolicyProvenance {
                path: path.to_string(),
                source,
            },
        );
    }

    pub fn source_of(&self, path: &str) -> Option<PolicySource> {
        self.provenance.get(path).map(|entry| entry.source)
    }
}
