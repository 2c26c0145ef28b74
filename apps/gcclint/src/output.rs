//! Output rendering for lint, command, and parse commands.
//!
//! Supports `human` (default) and `json` outputs. Human output uses the
//! `file:line:col: severity: message` layout editors already understand;
//! the JSON form serializes the reports plus a top-level summary.

use crate::command::CommandSpec;
use crate::models::language::LanguageVariant;
use crate::models::{DiagnosticRecord, LintResult, Severity};
use crate::utils::{rel_to_wd, use_colors};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;
use std::path::Path;

fn severity_label(sev: Severity, color: bool) -> String {
    match (sev, color) {
        (Severity::Error, true) => "error".red().bold().to_string(),
        (Severity::Warning, true) => "warning".yellow().bold().to_string(),
        (sev, false) => sev.to_string(),
    }
}

/// `file:line[:col]: severity: message` for one record.
pub fn format_record(file: &str, d: &DiagnosticRecord, color: bool) -> String {
    let location = match d.col {
        Some(col) => format!("{}:{}:{}", file, d.line, col),
        None => format!("{}:{}", file, d.line),
    };
    let location = if color {
        location.bold().to_string()
    } else {
        location
    };
    format!(
        "{}: {}: {}",
        location,
        severity_label(d.severity, color),
        d.message
    )
}

/// Print lint results in the requested format.
pub fn print_lint(res: &LintResult, output: &str, errors: &[String]) {
    match output {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&compose_lint_json(res, errors)).unwrap_or_default()
        ),
        _ => {
            let color = use_colors(output);
            for report in &res.reports {
                let file = rel_to_wd(Path::new(&report.file));
                for d in &report.diagnostics {
                    println!("{}", format_record(&file, d, color));
                }
            }
            for e in errors {
                eprintln!("{} {}", crate::utils::error_prefix(), e);
            }
            let summary = format!(
                "— Summary — errors={} warnings={} files={}",
                res.summary.errors, res.summary.warnings, res.summary.files
            );
            if color {
                println!("{}", summary.bold());
            } else {
                println!("{}", summary);
            }
        }
    }
}

/// Print records parsed from raw compiler output (no file attached).
pub fn print_diagnostics(records: &[DiagnosticRecord], output: &str) {
    match output {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(records).unwrap_or_default()
        ),
        _ => {
            let color = use_colors(output);
            for d in records {
                println!("{}", format_record("<stdin>", d, color));
            }
        }
    }
}

/// Print the compiler invocation for one file.
pub fn print_command(cmd: &CommandSpec, output: &str) {
    match output {
        "json" => {
            let out = json!({
                "executable": cmd.executable,
                "args": cmd.args(),
                "command": cmd.command_line(),
            });
            println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        }
        _ => println!("{}", cmd.command_line()),
    }
}

/// One-line note shown before `command` output.
pub fn command_banner(file: &str, variant: LanguageVariant) -> String {
    format!("Command for {} ({})", file, variant)
}

/// Compose lint JSON object (pure) for testing/snapshot purposes.
pub fn compose_lint_json(res: &LintResult, errors: &[String]) -> JsonVal {
    let mut out = serde_json::to_value(res).unwrap_or(JsonVal::Null);
    if let JsonVal::Object(map) = &mut out {
        map.insert("errors".into(), json!(errors));
    }
    out
}
