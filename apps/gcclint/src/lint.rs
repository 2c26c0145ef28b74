//! Lint runner: one compiler invocation per file.
//!
//! Each file goes through the same cycle: pick the language, build the
//! command, feed the source on stdin, and extract `<stdin>` diagnostics from
//! what the compiler printed. Files are independent and linted in parallel;
//! reports come back in input order.

use crate::command::{build_command, CommandSpec, FileContext};
use crate::config::{
    discovery_start, effective_for, find_project_file, project_folder_for, CliOverrides, Effective,
};
use crate::error::LintError;
use crate::extract::extract_diagnostics;
use crate::models::language::LanguageVariant;
use crate::models::{DiagnosticRecord, FileReport, LintResult, Summary};
use crate::runner::ProcessRunner;
use glob::glob;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Resolve the language for `path`: explicit override, then file extension.
pub fn detect_variant(
    path: &Path,
    variant_override: Option<LanguageVariant>,
) -> Result<LanguageVariant, LintError> {
    variant_override
        .or_else(|| LanguageVariant::from_path(path))
        .ok_or_else(|| LintError::UnknownLanguage(path.to_path_buf()))
}

/// Build the compiler command `path` would be linted with.
pub fn command_for(
    path: &Path,
    variant: LanguageVariant,
    eff: &Effective,
) -> CommandSpec {
    let folder = project_folder_for(eff.project_folder.as_deref(), Some(path));
    let ctx = FileContext::new(folder, Some(path.to_path_buf()));
    build_command(variant.profile(), &eff.settings, &ctx)
}

/// Lint in-memory `source` as if it were the contents of `path`.
pub fn lint_source(
    path: &Path,
    source: &str,
    variant: LanguageVariant,
    eff: &Effective,
    runner: &dyn ProcessRunner,
) -> Result<(CommandSpec, Vec<DiagnosticRecord>), LintError> {
    let cmd = command_for(path, variant, eff);
    let raw = runner.run(&cmd, source)?;
    let diagnostics = extract_diagnostics(&raw);
    info!(
        file = %path.display(),
        diagnostics = diagnostics.len(),
        "linted"
    );
    Ok((cmd, diagnostics))
}

/// Read and lint a single file.
pub fn lint_file(
    path: &Path,
    variant_override: Option<LanguageVariant>,
    eff: &Effective,
    runner: &dyn ProcessRunner,
) -> Result<FileReport, LintError> {
    let variant = detect_variant(path, variant_override)?;
    let source = fs::read_to_string(path).map_err(|source| LintError::ReadSource {
        path: path.to_path_buf(),
        source,
    })?;
    let (cmd, diagnostics) = lint_source(path, &source, variant, eff, runner)?;
    Ok(FileReport {
        file: path.to_string_lossy().to_string(),
        variant,
        command: cmd.command_line(),
        diagnostics,
    })
}

/// Expand glob patterns into file paths. Plain paths are kept even if they
/// do not exist so the read error is reported against them.
pub fn expand_targets(patterns: &[String]) -> (Vec<PathBuf>, Vec<String>) {
    let mut targets: Vec<PathBuf> = Vec::new();
    let mut errors: Vec<String> = Vec::new();
    for pat in patterns {
        if !pat.contains(['*', '?', '[']) {
            targets.push(PathBuf::from(pat));
            continue;
        }
        match glob(pat) {
            Ok(paths) => {
                let before = targets.len();
                targets.extend(paths.flatten().filter(|p| p.is_file()));
                if targets.len() == before {
                    errors.push(format!("no files matched '{}'", pat));
                }
            }
            Err(e) => errors.push(format!("bad glob pattern '{}': {}", pat, e)),
        }
    }
    (targets, errors)
}

/// Lint every file matched by `patterns`.
///
/// Each file is linted with the project file found from its own directory
/// (or `--project-root`); every distinct project file is loaded once.
/// Returns the collected reports plus one message per file that could not be
/// linted (bad project file, unknown language, unreadable, compiler failed
/// to start).
pub fn run_lint(
    patterns: &[String],
    variant_override: Option<LanguageVariant>,
    cli: &CliOverrides,
    runner: &dyn ProcessRunner,
) -> (LintResult, Vec<String>) {
    let (targets, mut errors) = expand_targets(patterns);

    let project_files: Vec<Option<PathBuf>> = targets
        .iter()
        .map(|path| find_project_file(&discovery_start(cli, Some(path))))
        .collect();
    let mut configs: HashMap<Option<PathBuf>, Result<Effective, String>> = HashMap::new();
    for project_file in &project_files {
        configs.entry(project_file.clone()).or_insert_with(|| {
            effective_for(cli, project_file.clone()).map_err(|e| e.to_string())
        });
    }
    debug!(files = targets.len(), projects = configs.len(), "resolved configs");

    let outcomes: Vec<Result<FileReport, String>> = targets
        .par_iter()
        .zip(project_files.par_iter())
        .map(|(path, project_file)| match &configs[project_file] {
            Ok(eff) => lint_file(path, variant_override, eff, runner).map_err(|e| e.to_string()),
            Err(e) => Err(format!("{}: {}", path.display(), e)),
        })
        .collect();

    let mut reports = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(r) => reports.push(r),
            Err(e) => errors.push(e),
        }
    }
    let summary = Summary::from_reports(&reports);
    (LintResult { reports, summary }, errors)
}
