//! `stagecraft schema` command implementation.

use anyhow::Result;
use stagecraft_macro::MacroProcessor;

use super::{OutputFormat, render, write_output};

/// Print the JSON Schema that custom resources are validated against.
pub fn run(processor: &MacroProcessor, format: OutputFormat) -> Result<()> {
    write_output(&render(processor.schema().document(), format)?, None)
}
