//! Extraction of `<stdin>` diagnostics from raw compiler output.
//!
//! The source is fed on stdin, so only locations reported against the
//! `<stdin>` pseudo-file map back to the linted buffer. Diagnostics located
//! in included headers are skipped; an `In file included from <stdin>:N`
//! banner instead reports the header's diagnostic at the include line.
//!
//! One pattern is matched left to right without overlap. `.` stops at line
//! breaks, but the whitespace after the location may span one, which is how
//! a banner picks up the diagnostic printed on the following line.

use crate::models::{DiagnosticRecord, Severity};
use regex::{Captures, Regex};
use std::sync::OnceLock;
use tracing::debug;

const DIAGNOSTIC_PATTERN: &str = concat!(
    r"<stdin>:(?P<line>\d+):(?:(?P<col>\d+):)?\s*",
    r".*?(?:(?P<error>error)|(?P<warning>warning|note)):\s*",
    r"(?P<message>.+)",
);

fn diagnostic_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(DIAGNOSTIC_PATTERN).expect("diagnostic regex is valid"))
}

/// Parse every `<stdin>` diagnostic in `raw`, in order of appearance.
pub fn extract_diagnostics(raw: &str) -> Vec<DiagnosticRecord> {
    let records: Vec<DiagnosticRecord> = diagnostic_regex()
        .captures_iter(raw)
        .filter_map(|caps| to_record(&caps))
        .collect();
    debug!(count = records.len(), "extracted diagnostics");
    records
}

fn to_record(caps: &Captures) -> Option<DiagnosticRecord> {
    let line = caps.name("line")?.as_str().parse().ok()?;
    let col = match caps.name("col") {
        Some(m) => Some(m.as_str().parse().ok()?),
        None => None,
    };
    let severity = if caps.name("error").is_some() {
        Severity::Error
    } else {
        Severity::Warning
    };
    let message = caps.name("message")?.as_str().trim_end().to_string();
    Some(DiagnosticRecord {
        line,
        col,
        severity,
        message,
    })
}
