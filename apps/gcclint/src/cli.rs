//! CLI argument parsing via `clap`.

use crate::config::CliOverrides;
use crate::models::language::LanguageVariant;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "gcclint",
    version,
    about = "Lint C/C++ files with gcc",
    long_about = "gcclint: compile C/C++ sources from stdin with gcc (or any compatible compiler) and report the diagnostics as file:line:col records.\n\nConfiguration precedence: CLI > gcclint.toml > defaults.",
    after_help = "Examples:\n  gcclint lint src/main.c\n  gcclint lint 'src/**/*.cpp' --extra-flags='-std=c++17 -Wextra'\n  gcclint command src/main.c -I include\n  gcc -c -Wall -x c - < main.c 2>&1 | gcclint parse",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Args, Clone, Default)]
/// Flags that override the project file settings.
pub struct SettingsArgs {
    #[arg(long, help = "Directory to start looking for gcclint.toml (default: the file's folder)")]
    pub project_root: Option<String>,
    #[arg(long, help = "Output mode: human|json (default: human)")]
    pub output: Option<String>,
    #[arg(long, help = "Compiler executable (default: gcc for C, g++ for C++)")]
    pub executable: Option<String>,
    #[arg(long, allow_hyphen_values = true, help = "Extra compiler flags, shell-quoted")]
    pub extra_flags: Option<String>,
    #[arg(short = 'I', long = "include-dir", help = "Include directory (repeatable)")]
    pub include_dirs: Vec<String>,
}

impl SettingsArgs {
    pub fn to_overrides(&self) -> CliOverrides {
        CliOverrides {
            project_root: self.project_root.clone(),
            output: self.output.clone(),
            executable: self.executable.clone(),
            extra_flags: self.extra_flags.clone(),
            include_dirs: self.include_dirs.clone(),
        }
    }
}

#[derive(Args, Clone, Default)]
/// Language selection when the file extension is not enough.
pub struct LangArgs {
    #[arg(long, conflicts_with = "syntax", help = "Force the language: c|c++")]
    pub lang: Option<LanguageVariant>,
    #[arg(long, help = "Editor syntax name, e.g. 'c improved' or 'c++11'")]
    pub syntax: Option<String>,
}

impl LangArgs {
    pub fn variant(&self) -> Option<LanguageVariant> {
        self.lang
            .or_else(|| self.syntax.as_deref().map(LanguageVariant::from_syntax))
    }
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current gcclint version.")]
    Version,
    /// Compile files and report diagnostics
    #[command(
        about = "Lint C/C++ files",
        long_about = "Run the compiler on each file (source fed on stdin) and print the diagnostics reported for it. Exits 1 when any error is found.",
        after_help = "Examples:\n  gcclint lint src/*.c\n  gcclint lint main.cc --output json"
    )]
    Lint {
        #[arg(required = true, help = "Files or glob patterns")]
        files: Vec<String>,
        #[command(flatten)]
        lang: LangArgs,
        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// Show the compiler command for a file
    #[command(
        about = "Print the compiler command",
        long_about = "Print the command line gcclint would run for FILE, without running it."
    )]
    Command {
        file: String,
        #[command(flatten)]
        lang: LangArgs,
        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// Parse compiler output
    #[command(
        about = "Parse compiler output",
        long_about = "Extract <stdin> diagnostics from compiler output read from INPUT (or standard input)."
    )]
    Parse {
        #[arg(help = "File with compiler output; '-' or nothing reads stdin")]
        input: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lint_flags() {
        let cli = Cli::try_parse_from([
            "gcclint",
            "lint",
            "a.c",
            "b.cpp",
            "--lang",
            "c++",
            "--extra-flags",
            "-std=c++17 -Wextra",
            "-I",
            "inc",
            "-I",
            "/opt/inc",
        ])
        .unwrap();
        match cli.cmd {
            Commands::Lint {
                files,
                lang,
                settings,
            } => {
                assert_eq!(files, vec!["a.c", "b.cpp"]);
                assert_eq!(lang.variant(), Some(LanguageVariant::Cpp));
                let ov = settings.to_overrides();
                assert_eq!(ov.extra_flags.as_deref(), Some("-std=c++17 -Wextra"));
                assert_eq!(ov.include_dirs, vec!["inc", "/opt/inc"]);
            }
            _ => panic!("expected lint"),
        }
    }

    #[test]
    fn test_syntax_selects_variant() {
        let cli = Cli::try_parse_from(["gcclint", "command", "x.inc", "--syntax", "c improved"])
            .unwrap();
        match cli.cmd {
            Commands::Command { lang, .. } => assert_eq!(lang.variant(), Some(LanguageVariant::C)),
            _ => panic!("expected command"),
        }
    }

    #[test]
    fn test_lang_and_syntax_conflict() {
        let res = Cli::try_parse_from([
            "gcclint", "command", "x.c", "--lang", "c", "--syntax", "c++",
        ]);
        assert!(res.is_err());
    }
}
