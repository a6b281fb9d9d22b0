use foldbeacon_core_types::{ActivationPolicy, ReferenceLine};
use foldbeacon_policy_center::{ExclusionRule, LazyRenderPolicy};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LazyScanConfig {
    /// Attribute holding the location token; nodes are matched on presence.
    pub marker_attribute: String,
    pub threshold_px: f64,
    /// Substrings that exclude a node when found in its `id`, any case.
    pub skip_strings: Vec<String>,
    pub exclusions: Vec<ExclusionRule>,
    pub activation: ActivationPolicy,
    pub reference: ReferenceLine,
}

impl LazyScanConfig {
    pub fn new(marker_attribute: impl Into<String>, threshold_px: f64) -> Self {
        Self {
            marker_attribute: marker_attribute.into(),
            threshold_px,
            skip_strings: vec!["memex".to_string()],
            exclusions: Vec::new(),
            activation: ActivationPolicy::default(),
            reference: ReferenceLine::default(),
        }
    }

    pub fn with_activation(mut self, activation: ActivationPolicy) -> Self {
        self.activation = activation;
        self
    }

    pub fn with_reference(mut self, reference: ReferenceLine) -> Self {
        self.reference = reference;
        self
    }

    pub fn with_skip_strings<I, S>(mut self, skip: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_strings = skip.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_exclusion(mut self, attribute: &str, pattern: &str) -> Self {
        self.exclusions.push(ExclusionRule {
            attribute: attribute.to_string(),
            pattern: pattern.to_string(),
        });
        self
    }

    pub fn marker_selector(&self) -> String {
        format!("[{}]", self.marker_attribute.trim())
    }
}

impl From<&LazyRenderPolicy> for LazyScanConfig {
    fn from(policy: &LazyRenderPolicy) -> Self {
        Self {
            marker_attribute: policy.marker_attribute.clone(),
            threshold_px: policy.threshold_px,
            skip_strings: policy.skip_strings.clone(),
            exclusions: policy.exclusions.clone(),
            activation: policy.activation,
            reference: policy.reference,
        }
    }
}
