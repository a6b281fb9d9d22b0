use std::collections::BTreeMap;

use foldbeacon_core_types::{ActivationPolicy, ReferenceLine};

use crate::model::{
    BeaconPolicy, FeatureFlags, LazyRenderPolicy, PaintPolicy, ScreenPolicy, TimingPolicy,
};

pub const DEFAULT_ELEMENTS: &str = "img, video, picture, p, main, div, li, svg, section, header, span";
pub const DEFAULT_MARKER_ATTRIBUTE: &str = "data-location-hash";

pub fn default_policy() -> BeaconPolicy {
    BeaconPolicy {
        rev: 1,
        features: FeatureFlags {
            atf: true,
            lrc: true,
        },
        screen: ScreenPolicy {
            is_mobile: false,
            width_threshold: 393,
            height_threshold: 830,
        },
        paint: PaintPolicy {
            elements: DEFAULT_ELEMENTS.to_string(),
            max_candidates: None,
        },
        lazy: LazyRenderPolicy {
            marker_attribute: DEFAULT_MARKER_ATTRIBUTE.to_string(),
            threshold_px: 1800.0,
            skip_strings: vec!["memex".to_string()],
            exclusions: Vec::new(),
            activation: ActivationPolicy::ParentRelative,
            reference: ReferenceLine::ViewportBottom,
        },
        timing: TimingPolicy {
            start_delay_ms: 500,
            guard_ms: 10_000,
        },
        debug: false,
        provenance: BTreeMap::new(),
    }
}

impl Default for BeaconPolicy {
    fn default() -> Self {
        default_policy()
    }
}
