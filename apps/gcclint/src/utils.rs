//! Small helpers shared by the CLI printers.

use owo_colors::OwoColorize;
use std::path::Path;

/// Colors are on for human output unless `NO_COLOR` is set.
pub fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

pub fn error_prefix() -> String {
    if use_colors("human") {
        "error:".red().bold().to_string()
    } else {
        "error:".to_string()
    }
}

pub fn note_prefix() -> String {
    if use_colors("human") {
        "note:".cyan().bold().to_string()
    } else {
        "note:".to_string()
    }
}

pub fn info_prefix() -> String {
    if use_colors("human") {
        "info:".blue().bold().to_string()
    } else {
        "info:".to_string()
    }
}

/// Path relative to the working directory when that is shorter to read.
pub fn rel_to_wd(p: &Path) -> String {
    let rel = std::env::current_dir()
        .ok()
        .filter(|_| p.is_absolute())
        .and_then(|wd| pathdiff::diff_paths(p, wd));
    match rel {
        Some(r) if !r.starts_with("..") => r.to_string_lossy().to_string(),
        _ => p.to_string_lossy().to_string(),
    }
}
