//! Error types for configuration loading, compiler execution, and linting.
//!
//! The command builder and extractor never fail; these cover the host side.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading a `gcclint.toml|yaml|yml` project file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in '{path}': {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid YAML in '{path}': {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Failures launching or talking to the compiler process.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to start '{executable}': {source}")]
    Spawn {
        executable: String,
        #[source]
        source: std::io::Error,
    },

    #[error("i/o error while running '{executable}': {source}")]
    Io {
        executable: String,
        #[source]
        source: std::io::Error,
    },
}

/// Per-file lint failures. These are reported next to the results and do
/// not stop other files from being linted.
#[derive(Debug, Error)]
pub enum LintError {
    #[error("cannot tell whether '{0}' is C or C++; pass --lang")]
    UnknownLanguage(PathBuf),

    #[error("failed to read source '{path}': {source}")]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Run(#[from] RunError),
}
