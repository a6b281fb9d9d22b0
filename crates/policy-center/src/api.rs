use std::str::FromStr;

use serde_json::Value;
use tracing::debug;

use crate::errors::PolicyError;
use crate::model::{BeaconPolicy, ExclusionRule, PolicySource};

/// Applies one dotted-path override. Returns whether the policy changed.
pub fn apply_override(
    policy: &mut BeaconPolicy,
    path: &str,
    value: &Value,
    source: PolicySource,
) -> Result<bool, PolicyError> {
    let changed = match path {
        "features.atf" => merge(&mut policy.features.atf, to_bool(value)?),
        "features.lrc" => merge(&mut policy.features.lrc, to_bool(value)?),
        "screen.is_mobile" => merge(&mut policy.screen.is_mobile, to_bool(value)?),
        "screen.width_threshold" => merge(&mut policy.screen.width_threshold, to_u32(value)?),
        "screen.height_threshold" => merge(&mut policy.screen.height_threshold, to_u32(value)?),
        "paint.elements" => merge(&mut policy.paint.elements, to_string(value)?),
        "paint.max_candidates" => {
            let limit = if value.is_null() {
                None
            } else {
                Some(to_u64(value)? as usize)
            };
            merge(&mut policy.paint.max_candidates, limit)
        }
        "lazy.marker_attribute" => merge(&mut policy.lazy.marker_attribute, to_string(value)?),
        "lazy.threshold_px" => merge(&mut policy.lazy.threshold_px, to_f64(value)?),
        "lazy.skip_strings" => merge(&mut policy.lazy.skip_strings, to_string_list(value)?),
        "lazy.exclusions" => merge(&mut policy.lazy.exclusions, to_exclusions(value)?),
        "lazy.activation" => merge(&mut policy.lazy.activation, to_parsed(value)?),
        "lazy.reference" => merge(&mut policy.lazy.reference, to_parsed(value)?),
        "timing.start_delay_ms" => merge(&mut policy.timing.start_delay_ms, to_u64(value)?),
        "timing.guard_ms" => merge(&mut policy.timing.guard_ms, to_u64(value)?),
        "debug" => merge(&mut policy.debug, to_bool(value)?),
        "rev" => false,
        other => return Err(PolicyError::UnsupportedPath(other.to_string())),
    };

    if changed {
        policy.rev = policy.rev.saturating_add(1);
        debug!(path, ?source, "policy value overridden");
    }
    policy.set_provenance(path, source);
    Ok(changed)
}

/// Rejects policies no scan can be constructed from.
pub fn validate(policy: &BeaconPolicy) -> Result<(), PolicyError> {
    if policy.paint.elements.trim().is_empty() {
        return Err(PolicyError::InvalidValue(
            "paint.elements must not be empty".into(),
        ));
    }
    if policy.paint.max_candidates == Some(0) {
        return Err(PolicyError::InvalidValue(
            "paint.max_candidates must be at least 1 (use null for no limit)".into(),
        ));
    }
    if policy.lazy.marker_attribute.trim().is_empty() {
        return Err(PolicyError::InvalidValue(
            "lazy.marker_attribute must not be empty".into(),
        ));
    }
    let threshold = policy.lazy.threshold_px;
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(PolicyError::InvalidValue(format!(
            "lazy.threshold_px must be a non-negative number, got {threshold}"
        )));
    }
    for rule in &policy.lazy.exclusions {
        if rule.attribute.trim().is_empty() || rule.pattern.is_empty() {
            return Err(PolicyError::InvalidValue(format!(
                "lazy.exclusions entry needs attribute and pattern, got {:?}",
                rule
            )));
        }
    }
    if policy.timing.guard_ms == 0 {
        return Err(PolicyError::InvalidValue(
            "timing.guard_ms must be positive".into(),
        ));
    }
    Ok(())
}

fn merge<T: PartialEq>(target: &mut T, candidate: T) -> bool {
    if *target == candidate {
        return false;
    }
    *target = candidate;
    true
}

fn to_u64(value: &Value) -> Result<u64, PolicyError> {
    value
        .as_u64()
        .ok_or_else(|| PolicyError::InvalidValue(format!("expected unsigned integer, got {value}")))
}

fn to_u32(value: &Value) -> Result<u32, PolicyError> {
    let raw = to_u64(value)?;
    u32::try_from(raw).map_err(|_| PolicyError::InvalidValue(format!("{raw} is out of range")))
}

fn to_f64(value: &Value) -> Result<f64, PolicyError> {
    value
        .as_f64()
        .ok_or_else(|| PolicyError::InvalidValue(format!("expected number, got {value}")))
}

fn to_bool(value: &Value) -> Result<bool, PolicyError> {
    value
        .as_bool()
        .ok_or_else(|| PolicyError::InvalidValue(format!("expected bool, got {value}")))
}

fn to_string(value: &Value) -> Result<String, PolicyError> {
    value
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| PolicyError::InvalidValue(format!("expected string, got {value}")))
}

/// Accepts a list of strings or a single comma separated string.
fn to_string_list(value: &Value) -> Result<Vec<String>, PolicyError> {
    match value {
        Value::Array(items) => items.iter().map(to_string).collect(),
        Value::String(raw) => Ok(raw
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()),
        Value::Null => Ok(Vec::new()),
        other => Err(PolicyError::InvalidValue(format!(
            "expected list of strings, got {other}"
        ))),
    }
}

fn to_exclusions(value: &Value) -> Result<Vec<ExclusionRule>, PolicyError> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(value.clone())
        .map_err(|err| PolicyError::InvalidValue(format!("invalid exclusions: {err}")))
}

fn to_parsed<T>(value: &Value) -> Result<T, PolicyError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = to_string(value)?;
    raw.parse::<T>()
        .map_err(|err| PolicyError::InvalidValue(err.to_string()))
}
