//! `stagecraft check` command implementation.
//!
//! Validates the custom resources of a template without transforming it:
//! - Schema validation of every resource in the macro's namespace
//! - Duplicate stage names within a pipeline
//! - A note when the template has nothing for the macro to do

use anyhow::Result;
use serde_json::Value;
use stagecraft_core::model::{PROPERTIES_KEY, STAGES_KEY};
use stagecraft_macro::MacroProcessor;
use stagecraft_schema::{ValidationError, ValidationErrorKind};
use std::collections::BTreeSet;
use std::path::Path;

use super::read_document;

// ============================================================================
// Check Result Types
// ============================================================================

/// Severity level for check results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// A single check finding.
#[derive(Debug, Clone)]
pub struct CheckFinding {
    pub severity: Severity,
    /// Category of the check that produced this finding.
    pub category: String,
    pub message: String,
    /// Location within the template (e.g. "Resources.Pipe.Properties.Stages[0]").
    pub location: Option<String>,
}

impl CheckFinding {
    fn new(severity: Severity, category: &str, message: impl Into<String>) -> Self {
        Self {
            severity,
            category: category.to_string(),
            message: message.into(),
            location: None,
        }
    }

    fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl From<&ValidationError> for CheckFinding {
    fn from(error: &ValidationError) -> Self {
        CheckFinding::new(Severity::Error, kind_label(error.kind), error.message.clone())
            .at(error.path.to_string())
    }
}

fn kind_label(kind: ValidationErrorKind) -> &'static str {
    match kind {
        ValidationErrorKind::RequiredFieldMissing => "required",
        ValidationErrorKind::UnknownField => "unknown-field",
        ValidationErrorKind::TypeMismatch => "type",
        ValidationErrorKind::ValueNotAllowed => "allowed",
        ValidationErrorKind::MinLength => "min-length",
        ValidationErrorKind::MaxLength => "max-length",
        ValidationErrorKind::NoAlternativeMatched
        | ValidationErrorKind::MultipleAlternativesMatched => "alternatives",
        ValidationErrorKind::Constraint => "constraint",
    }
}

/// Results from running all checks.
#[derive(Debug, Default)]
pub struct CheckResults {
    pub findings: Vec<CheckFinding>,
}

impl CheckResults {
    fn add(&mut self, finding: CheckFinding) {
        self.findings.push(finding);
    }

    fn extend(&mut self, findings: impl IntoIterator<Item = CheckFinding>) {
        self.findings.extend(findings);
    }

    /// Returns true if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }

    /// Print human-readable summary.
    pub fn print_summary(&self) {
        let mut findings: Vec<&CheckFinding> = self.findings.iter().collect();
        // Most severe first, then by location.
        findings.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| a.location.cmp(&b.location))
        });

        for finding in &findings {
            print_finding(finding);
        }

        println!();
        println!("{}", "═".repeat(60));
        if self.error_count() == 0 && self.warning_count() == 0 {
            println!("✔ All checks passed!");
        } else {
            println!(
                "Summary: {} error(s), {} warning(s)",
                self.error_count(),
                self.warning_count()
            );
        }
    }
}

fn print_finding(finding: &CheckFinding) {
    let icon = match finding.severity {
        Severity::Error => "✗",
        Severity::Warning => "⚠",
        Severity::Info => "ℹ",
    };

    let location = finding
        .location
        .as_deref()
        .map(|l| format!(" [{}]", l))
        .unwrap_or_default();

    println!(
        "  {} {} [{}]{}: {}",
        icon, finding.severity, finding.category, location, finding.message
    );
}

// ============================================================================
// Check Runner
// ============================================================================

/// Run every check against a template, without printing.
pub fn run_quiet(processor: &MacroProcessor, fragment: &Value) -> CheckResults {
    let mut results = CheckResults::default();

    let managed = processor.filter(fragment);
    if managed.is_empty() {
        results.add(CheckFinding::new(
            Severity::Info,
            "resources",
            format!(
                "no resources of type {}* found; the template passes through unchanged",
                processor.config().prefix()
            ),
        ));
        return results;
    }

    let errors = processor.validate(&managed);
    results.extend(errors.iter().map(CheckFinding::from));

    for (name, resource) in &managed {
        results.extend(check_duplicate_stage_names(name, resource));
    }

    results
}

/// Check a template file and fail if any error was found.
pub fn run(processor: &MacroProcessor, template: &Path) -> Result<()> {
    println!("Checking {}...", template.display());

    let fragment = read_document(Some(template))?;
    let results = run_quiet(processor, &fragment);
    results.print_summary();

    if results.has_errors() {
        anyhow::bail!("Template check failed with {} error(s)", results.error_count());
    }

    Ok(())
}

// ============================================================================
// Stage Names
// ============================================================================

/// Stage names become action and stage names in the engine, which requires
/// them to be unique within a pipeline.
fn check_duplicate_stage_names(name: &str, resource: &Value) -> Vec<CheckFinding> {
    let Some(stages) = resource
        .get(PROPERTIES_KEY)
        .and_then(|p| p.get(STAGES_KEY))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    let mut seen = BTreeSet::new();
    let mut findings = Vec::new();
    for (index, stage) in stages.iter().enumerate() {
        let Some(map) = stage.as_object() else {
            continue;
        };
        for stage_name in map.keys() {
            if !seen.insert(stage_name.as_str()) {
                findings.push(
                    CheckFinding::new(
                        Severity::Warning,
                        "stage-names",
                        format!("stage name '{}' is used more than once", stage_name),
                    )
                    .at(format!("Resources.{}.Properties.Stages[{}]", name, index)),
                );
            }
        }
    }
    findings
}
