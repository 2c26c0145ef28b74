//! gcclint CLI binary entry point.
//! Delegates to the library modules for lint/command/parse and prints results.

use clap::Parser;
use gcclint::cli::{Cli, Commands, LangArgs, SettingsArgs};
use gcclint::config::{self, Effective};
use gcclint::extract::extract_diagnostics;
use gcclint::models::Severity;
use gcclint::runner::SystemRunner;
use gcclint::utils::{error_prefix, info_prefix, note_prefix};
use gcclint::{lint, output};
use std::io::Read;
use std::path::Path;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_env("GCCLINT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

/// Resolve config or exit 2, with a note when running on defaults.
fn effective_or_exit(settings: &SettingsArgs, first_file: Option<&Path>) -> Effective {
    let eff = match config::resolve_effective(&settings.to_overrides(), first_file) {
        Ok(eff) => eff,
        Err(e) => {
            eprintln!("{} {}", error_prefix(), e);
            std::process::exit(2);
        }
    };
    if eff.output != "json" {
        match eff.project_file.as_deref() {
            Some(p) => tracing::debug!(project_file = %p.display(), "using project file"),
            None => eprintln!("{} No gcclint.toml found; using defaults.", note_prefix()),
        }
    }
    eff
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Lint {
            files,
            lang,
            settings,
        } => {
            // output mode and config errors come from the first target; each
            // file is then linted with its own project file
            let eff = effective_or_exit(&settings, files.first().map(Path::new));
            let overrides = settings.to_overrides();
            let (result, errors) =
                lint::run_lint(&files, lang.variant(), &overrides, &SystemRunner);
            output::print_lint(&result, &eff.output, &errors);
            if result.reports.is_empty() && !errors.is_empty() {
                std::process::exit(2);
            }
            if result.summary.errors > 0 {
                std::process::exit(1);
            }
        }
        Commands::Command {
            file,
            lang,
            settings,
        } => run_command(&file, &lang, &settings),
        Commands::Parse { input, output } => {
            let raw = match read_input(input.as_deref()) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("{} cannot read compiler output: {}", error_prefix(), e);
                    std::process::exit(2);
                }
            };
            let records = extract_diagnostics(&raw);
            let output = output.unwrap_or_else(|| "human".to_string());
            output::print_diagnostics(&records, &output);
            if records.iter().any(|d| d.severity == Severity::Error) {
                std::process::exit(1);
            }
        }
    }
}

fn run_command(file: &str, lang: &LangArgs, settings: &SettingsArgs) {
    let path = Path::new(file);
    let eff = effective_or_exit(settings, Some(path));
    let variant = match lint::detect_variant(path, lang.variant()) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{} {}", error_prefix(), e);
            std::process::exit(2);
        }
    };
    if eff.output != "json" {
        eprintln!("{} {}", info_prefix(), output::command_banner(file, variant));
    }
    let cmd = lint::command_for(path, variant, &eff);
    output::print_command(&cmd, &eff.output);
}

/// Read compiler output from a file, or stdin for `-`/nothing.
fn read_input(input: Option<&str>) -> std::io::Result<String> {
    match input {
        Some(p) if p != "-" => std::fs::read_to_string(p),
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}
