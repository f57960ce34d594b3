//! `stagecraft process` command implementation.
//!
//! Reads one macro request, runs it through the processor and writes the
//! response. A `failure` response is a normal outcome and exits zero; only a
//! registry consistency fault aborts the command.

use anyhow::{Context, Result};
use stagecraft_core::{MacroRequest, MacroResponse};
use stagecraft_macro::MacroProcessor;
use std::path::Path;

use super::{OutputFormat, read_document, render, write_output};

pub fn run(
    processor: &MacroProcessor,
    input: Option<&Path>,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let document = read_document(input)?;
    let response = handle(processor, document)?;
    write_output(&render(&response, format)?, output)
}

/// Decode a request document and process it.
pub fn handle(processor: &MacroProcessor, document: serde_json::Value) -> Result<MacroResponse> {
    let request: MacroRequest =
        serde_json::from_value(document).context("Input is not a valid macro request")?;
    let response = processor.process(request)?;
    Ok(response)
}
