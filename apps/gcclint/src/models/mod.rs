//! Shared data models for diagnostics, language profiles, and lint output.

pub mod language;

use language::LanguageVariant;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
/// Severity class of a diagnostic. Compiler notes are reported as warnings.
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// One compiler finding attributed to the `<stdin>` pseudo-file.
pub struct DiagnosticRecord {
    pub line: u32,
    pub col: Option<u32>,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Serialize)]
/// Diagnostics collected for a single linted file.
pub struct FileReport {
    pub file: String,
    pub variant: LanguageVariant,
    pub command: String,
    pub diagnostics: Vec<DiagnosticRecord>,
}

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
/// Aggregated counts used by printers and the exit code.
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub files: usize,
}

#[derive(Debug, Default, Serialize)]
/// Lint results container.
pub struct LintResult {
    pub reports: Vec<FileReport>,
    pub summary: Summary,
}

impl Summary {
    pub fn from_reports(reports: &[FileReport]) -> Self {
        let mut summary = Summary {
            files: reports.len(),
            ..Summary::default()
        };
        for d in reports.iter().flat_map(|r| r.diagnostics.iter()) {
            match d.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
            }
        }
        summary
    }
}
