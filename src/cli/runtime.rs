use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use foldbeacon_policy_center::{load_policy_with_options, BeaconPolicy, LoadOptions};
use foldbeacon_render_tree::PageSnapshot;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Logs go to stderr so stdout carries only the rendered payload.
pub fn init_logging(level: &str, debug: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

pub fn load_policy(config: Option<&Path>, overrides: &[String]) -> Result<BeaconPolicy> {
    if let Some(path) = config {
        if !path.exists() {
            anyhow::bail!("policy file {} does not exist", path.display());
        }
    }
    let options = LoadOptions {
        paths: config.map(Path::to_path_buf).into_iter().collect(),
        include_env: true,
        cli_overrides: overrides.to_vec(),
    };
    load_policy_with_options(&options).context("failed to load beacon policy")
}

pub fn read_snapshot(path: &Path) -> Result<PageSnapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    let snapshot = PageSnapshot::from_json(&raw)
        .with_context(|| format!("invalid snapshot {}", path.display()))?;
    debug!(path = %path.display(), nodes = snapshot.len(), "snapshot loaded");
    Ok(snapshot)
}
