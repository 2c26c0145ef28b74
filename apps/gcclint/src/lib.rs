//! gcclint core library.
//!
//! This crate lints C and C++ sources by piping them to gcc (or a compatible
//! compiler) on stdin and turning the `<stdin>:line:col: severity: message`
//! lines it prints back into structured records.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Project file discovery and effective configuration resolution.
//! - `settings`: Settings values and language-prefixed key lookup.
//! - `command`: Compiler command building and `${project_folder}` expansion.
//! - `extract`: Diagnostic extraction from raw compiler output.
//! - `runner`: Process execution behind the `ProcessRunner` trait.
//! - `lint`: Per-file lint cycle and parallel batch runs.
//! - `models`: Language profiles, diagnostic records, and lint output structs.
//! - `output`: Human/JSON printers.
//! - `error`: Error types.
//! - `utils`: Supporting helpers.
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod extract;
pub mod lint;
pub mod models;
pub mod output;
pub mod runner;
pub mod settings;
pub mod utils;
