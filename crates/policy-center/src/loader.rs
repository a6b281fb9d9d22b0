//! Layered policy loading.
//!
//! Layers apply in order and later ones win: built-in defaults, each YAML
//! file, `FOLDBEACON_POLICY__*` variables, the JSON document in
//! `FOLDBEACON_POLICY_OVERRIDE_JSON`, then `path=value` pairs from the CLI.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::api::{apply_override, validate};
use crate::defaults::default_policy;
use crate::errors::PolicyError;
use crate::model::{BeaconPolicy, PolicySource};

const ENV_PREFIX: &str = "FOLDBEACON_POLICY__";
const ENV_JSON: &str = "FOLDBEACON_POLICY_OVERRIDE_JSON";

#[derive(Debug, Default)]
pub struct LoadOptions {
    /// Missing files are skipped.
    pub paths: Vec<PathBuf>,
    pub include_env: bool,
    /// `path=value` pairs, applied last.
    pub cli_overrides: Vec<String>,
}

pub fn load_policy(path: Option<&Path>) -> Result<BeaconPolicy, PolicyError> {
    load_policy_with_options(&LoadOptions {
        paths: path.map(Path::to_path_buf).into_iter().collect(),
        include_env: true,
        cli_overrides: Vec::new(),
    })
}

pub fn load_policy_with_options(options: &LoadOptions) -> Result<BeaconPolicy, PolicyError> {
    let mut policy = default_policy();
    mark_builtin(&mut policy)?;

    let mut layers = Vec::new();
    for path in &options.paths {
        if !path.exists() {
            debug!(path = %path.display(), "policy file missing, skipped");
            continue;
        }
        let layer = file_layer(path)?;
        debug!(path = %path.display(), entries = layer.len(), "policy file loaded");
        layers.push(layer);
    }
    if options.include_env {
        layers.push(env_layer()?);
    }
    layers.push(cli_layer(&options.cli_overrides)?);

    for overlay in layers.into_iter().flatten() {
        apply_override(&mut policy, &overlay.path, &overlay.value, overlay.source)?;
    }
    validate(&policy)?;
    Ok(policy)
}

struct Overlay {
    path: String,
    value: Value,
    source: PolicySource,
}

fn file_layer(path: &Path) -> Result<Vec<Overlay>, PolicyError> {
    let raw = fs::read_to_string(path).map_err(|source| PolicyError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document: Value = serde_yaml::from_str(&raw).map_err(|source| PolicyError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    let mut layer = Vec::new();
    collect_leaves(String::new(), document, PolicySource::File, &mut layer);
    Ok(layer)
}

fn env_layer() -> Result<Vec<Overlay>, PolicyError> {
    let mut layer: Vec<Overlay> = env::vars()
        .filter_map(|(key, raw)| {
            let path = dotted_env_path(key.strip_prefix(ENV_PREFIX)?)?;
            Some(Overlay {
                path,
                value: parse_scalar(&raw),
                source: PolicySource::Env,
            })
        })
        .collect();

    if let Some(raw) = env::var(ENV_JSON).ok().filter(|raw| !raw.trim().is_empty()) {
        let document: Value = serde_json::from_str(&raw)
            .map_err(|err| PolicyError::Override(format!("{ENV_JSON}: {err}")))?;
        collect_leaves(String::new(), document, PolicySource::Env, &mut layer);
    }
    Ok(layer)
}

/// `LAZY__THRESHOLD_PX` becomes `lazy.threshold_px`.
fn dotted_env_path(suffix: &str) -> Option<String> {
    let segments: Vec<String> = suffix
        .split("__")
        .filter(|segment| !segment.is_empty())
        .map(str::to_ascii_lowercase)
        .collect();
    (!segments.is_empty()).then(|| segments.join("."))
}

fn cli_layer(pairs: &[String]) -> Result<Vec<Overlay>, PolicyError> {
    pairs
        .iter()
        .map(|pair| pair.trim())
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (path, raw) = pair
                .split_once('=')
                .ok_or_else(|| PolicyError::Override(format!("`{pair}` must look like path=value")))?;
            let path = path.trim();
            if path.is_empty() {
                return Err(PolicyError::Override(format!("`{pair}` has an empty path")));
            }
            Ok(Overlay {
                path: path.to_ascii_lowercase(),
                value: parse_scalar(raw.trim()),
                source: PolicySource::Cli,
            })
        })
        .collect()
}

/// JSON when it parses (numbers, booleans, lists, `null`), otherwise the raw
/// text as a string. Empty input is `null`.
fn parse_scalar(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Flattens nested objects into dotted paths; arrays and scalars are leaves.
fn collect_leaves(prefix: String, value: Value, source: PolicySource, out: &mut Vec<Overlay>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let key = key.trim().to_ascii_lowercase();
                let path = if prefix.is_empty() {
                    key
                } else {
                    format!("{prefix}.{key}")
                };
                collect_leaves(path, child, source, out);
            }
        }
        leaf if !prefix.is_empty() => out.push(Overlay {
            path: prefix,
            value: leaf,
            source,
        }),
        _ => {}
    }
}

fn mark_builtin(policy: &mut BeaconPolicy) -> Result<(), PolicyError> {
    let mut document =
        serde_json::to_value(&*policy).map_err(|err| PolicyError::InvalidValue(err.to_string()))?;
    if let Value::Object(map) = &mut document {
        map.remove("rev");
        map.remove("provenance");
    }
    let mut leaves = Vec::new();
    collect_leaves(String::new(), document, PolicySource::Builtin, &mut leaves);
    for leaf in leaves {
        policy.set_provenance(&leaf.path, leaf.source);
    }
    Ok(())
}
