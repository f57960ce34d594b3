//! CLI command implementations and the helpers they share.

pub mod check;
pub mod process;
pub mod render;
pub mod schema;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde_json::Value;
use stagecraft_core::MacroConfig;
use stagecraft_macro::MacroProcessor;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Serialization format for command output.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
}

/// Resolve the macro configuration.
///
/// An explicit namespace (flag or `MACRO_NAME`) wins over the one in the
/// config file; at least one of them must be present.
pub fn load_config(namespace: Option<&str>, config_path: Option<&Path>) -> Result<MacroConfig> {
    let config = match (namespace, config_path) {
        (Some(namespace), Some(path)) => MacroConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?
            .with_namespace(namespace)?,
        (None, Some(path)) => MacroConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        (Some(namespace), None) => MacroConfig::new(namespace)?,
        (None, None) => bail!("No namespace configured. Pass --namespace, set MACRO_NAME, or use --config."),
    };

    tracing::debug!(namespace = %config.namespace, "configuration loaded");
    Ok(config)
}

/// Build the processor, failing loudly on registry drift.
pub fn build_processor(config: MacroConfig) -> Result<MacroProcessor> {
    MacroProcessor::new(config).context("Failed to initialize the macro processor")
}

/// Read a JSON or YAML document from a file, or stdin for `None`/`-`.
pub fn read_document(path: Option<&Path>) -> Result<Value> {
    let content = match path {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        _ => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            buffer
        }
    };
    parse_document(&content)
}

/// Parse JSON, falling back to YAML.
pub fn parse_document(content: &str) -> Result<Value> {
    match serde_json::from_str(content) {
        Ok(value) => Ok(value),
        Err(_) => serde_yaml::from_str(content).context("Input is neither valid JSON nor valid YAML"),
    }
}

/// Render a value in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    let text = match format {
        OutputFormat::Json => {
            let mut text = serde_json::to_string_pretty(value)?;
            text.push('\n');
            text
        }
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
    };
    Ok(text)
}

/// Write rendered output to a file, or stdout for `None`.
pub fn write_output(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
        }
        None => {
            print!("{}", text);
            Ok(())
        }
    }
}
