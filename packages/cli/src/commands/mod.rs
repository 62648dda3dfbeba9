pub mod apply;
pub mod compile;
pub mod inspect;

pub use apply::{apply, ApplyArgs};
pub use compile::{compile, CompileArgs};
pub use inspect::{inspect, InspectArgs};

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use vellum_common::{Diagnostic, DiagnosticLevel};
use vellum_model::EditorDocument;

pub(crate) fn read_document(path: &Path) -> Result<EditorDocument> {
    let json = std::fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    EditorDocument::from_json(&json).with_context(|| format!("Invalid document {}", path.display()))
}

/// Write a diagnostic to stderr, colored by level
pub(crate) fn print_diagnostic(diagnostic: &Diagnostic) {
    let label = match diagnostic.level {
        DiagnosticLevel::Error => "error".red().bold(),
        DiagnosticLevel::Warning => "warning".yellow().bold(),
        DiagnosticLevel::Info => "info".blue(),
    };
    eprintln!("  {} {}", label, diagnostic);
}
