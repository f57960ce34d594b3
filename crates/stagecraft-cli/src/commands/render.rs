//! `stagecraft render` command implementation.

use anyhow::Result;
use serde_json::Value;
use stagecraft_macro::MacroProcessor;
use std::path::Path;

use super::{OutputFormat, read_document, render, write_output};

/// Print the template with its custom resources expanded.
///
/// Unlike `process`, invalid templates are an error here.
pub fn run(processor: &MacroProcessor, template: &Path, format: OutputFormat) -> Result<()> {
    let fragment = read_document(Some(template))?;
    let expanded = expand(processor, &fragment)?;
    write_output(&render(&expanded, format)?, None)
}

pub fn expand(processor: &MacroProcessor, fragment: &Value) -> Result<Value> {
    let expanded = processor.transform_fragment(fragment)?;
    tracing::info!(
        resources = processor.filter(fragment).len(),
        "template rendered"
    );
    Ok(expanded)
}
