use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
    };
    Ok(rendered)
}

/// Prints to stdout, or writes to `out` when given.
pub fn emit<T: Serialize>(value: &T, format: OutputFormat, out: Option<&Path>) -> Result<()> {
    let rendered = render(value, format)?;
    match out {
        Some(path) => fs::write(path, rendered.as_bytes())
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{}", rendered.trim_end()),
    }
    Ok(())
}
