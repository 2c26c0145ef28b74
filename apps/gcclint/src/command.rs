//! Compiler command construction.
//!
//! The compiler reads the source from stdin (`-`) and writes its object file
//! to a throwaway target so diagnostics from the full compile are reported,
//! not just the syntax-only ones. Final shape:
//!
//! `<executable> -c -Wall -O0 <extra flags> <-Idir>* -x {c|c++} -o <discard> -`

use crate::models::language::LanguageProfile;
use crate::settings::{self, SettingValue, Settings};
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// No link step, all common warnings, no optimization.
pub const BASE_FLAGS: [&str; 3] = ["-c", "-Wall", "-O0"];
/// Tells the compiler to read the translation unit from standard input.
pub const STDIN_MARKER: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Where the compiler writes the object file nobody reads.
pub enum OutputTarget {
    TempFile(PathBuf),
    NullDevice,
}

impl OutputTarget {
    /// Pick a file inside `tmp_dir`, or the null device when that file
    /// cannot be opened for writing.
    pub fn resolve_in(tmp_dir: &Path) -> Self {
        let path = tmp_dir.join(discard_file_name());
        match OpenOptions::new().write(true).create(true).truncate(true).open(&path) {
            Ok(_) => OutputTarget::TempFile(path),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "temp dir not writable; using null device");
                OutputTarget::NullDevice
            }
        }
    }

    pub fn as_arg(&self) -> Cow<'_, str> {
        match self {
            OutputTarget::TempFile(p) => p.to_string_lossy(),
            OutputTarget::NullDevice => Cow::Borrowed(null_device()),
        }
    }
}

/// Per-process object file name, e.g. `gcclint-4242-discard.o`.
pub fn discard_file_name() -> String {
    format!("gcclint-{}-discard.o", std::process::id())
}

fn null_device() -> &'static str {
    if cfg!(windows) {
        "NUL"
    } else {
        "/dev/null"
    }
}

/// Process-wide discard target, resolved on first use.
pub fn discard_target() -> &'static OutputTarget {
    static TARGET: OnceLock<OutputTarget> = OnceLock::new();
    TARGET.get_or_init(|| OutputTarget::resolve_in(&std::env::temp_dir()))
}

#[derive(Debug, Clone)]
/// Inputs from the editor side: the project folder used for placeholders and
/// the file being linted (if it has a path).
pub struct FileContext {
    pub project_folder: PathBuf,
    pub file: Option<PathBuf>,
}

impl FileContext {
    pub fn new(project_folder: impl Into<PathBuf>, file: Option<PathBuf>) -> Self {
        FileContext {
            project_folder: project_folder.into(),
            file,
        }
    }

    /// Directory of the linted file; `.` for a bare file name.
    fn file_dir(&self) -> Option<String> {
        let parent = self.file.as_ref()?.parent()?;
        if parent.as_os_str().is_empty() {
            Some(".".to_string())
        } else {
            Some(parent.to_string_lossy().to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A fully resolved compiler invocation.
pub struct CommandSpec {
    pub executable: String,
    pub extra_flags: Vec<String>,
    pub include_dirs: Vec<String>,
    pub lang_flag: &'static str,
    pub output: OutputTarget,
}

impl CommandSpec {
    /// Arguments after the executable, unquoted, ready for `Command::args`.
    pub fn args(&self) -> Vec<String> {
        let mut args: Vec<String> = BASE_FLAGS.iter().map(|s| s.to_string()).collect();
        args.extend(self.extra_flags.iter().cloned());
        args.extend(self.include_dirs.iter().map(|d| format!("-I{}", d)));
        args.push("-x".into());
        args.push(self.lang_flag.into());
        args.push("-o".into());
        args.push(self.output.as_arg().into_owned());
        args.push(STDIN_MARKER.into());
        args
    }

    /// Single shell-escaped command line.
    pub fn command_line(&self) -> String {
        let mut parts: Vec<String> = vec![quote_arg(&self.executable).into_owned()];
        parts.extend(BASE_FLAGS.iter().map(|s| s.to_string()));
        parts.extend(self.extra_flags.iter().map(|f| quote_arg(f).into_owned()));
        parts.extend(self.include_dirs.iter().map(|d| format!("-I{}", quote_arg(d))));
        parts.push(format!("-x {}", self.lang_flag));
        parts.push(format!("-o {}", quote_arg(&self.output.as_arg())));
        parts.push(STDIN_MARKER.into());
        parts.join(" ")
    }
}

/// Build the compiler invocation for one file.
pub fn build_command(
    profile: &LanguageProfile,
    settings: &Settings,
    ctx: &FileContext,
) -> CommandSpec {
    build_command_with_output(profile, settings, ctx, discard_target().clone())
}

/// Same as [`build_command`] with an explicit discard target.
pub fn build_command_with_output(
    profile: &LanguageProfile,
    settings: &Settings,
    ctx: &FileContext,
    output: OutputTarget,
) -> CommandSpec {
    let defaults = Settings::defaults_for(profile);
    let project_folder = ctx.project_folder.to_string_lossy();

    let executable = settings::resolve(settings::EXECUTABLE, profile, settings, &defaults)
        .and_then(first_text)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(profile.default_executable)
        .to_string();

    // Tokenize first so a substituted folder with spaces stays one argument
    let raw_flags = match settings::resolve(settings::EXTRA_FLAGS, profile, settings, &defaults) {
        Some(SettingValue::Text(s)) => split_flags(s),
        Some(SettingValue::List(v)) => v.clone(),
        None => Vec::new(),
    };
    let extra_flags: Vec<String> = raw_flags
        .iter()
        .map(|f| apply_template(f, &project_folder).into_owned())
        .filter(|f| !f.is_empty())
        .collect();

    let mut include_dirs: Vec<String> = Vec::new();
    let configured = settings::resolve(settings::INCLUDE_DIRS, profile, settings, &defaults)
        .map(SettingValue::to_list)
        .unwrap_or_default();
    let dirs = configured
        .iter()
        .map(|d| apply_template(d, &project_folder).into_owned())
        .chain(ctx.file_dir());
    for dir in dirs {
        if !dir.is_empty() && !include_dirs.contains(&dir) {
            include_dirs.push(dir);
        }
    }

    let spec = CommandSpec {
        executable,
        extra_flags,
        include_dirs,
        lang_flag: profile.lang_flag,
        output,
    };
    debug!(command = %spec.command_line(), "built compiler command");
    spec
}

/// Quote `s` for a POSIX shell unless it only holds characters that never
/// need quoting.
fn quote_arg(s: &str) -> Cow<'_, str> {
    let plain = !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./_-".contains(c));
    if plain {
        Cow::Borrowed(s)
    } else {
        shell_words::quote(s)
    }
}

fn first_text(v: &SettingValue) -> Option<&str> {
    match v {
        SettingValue::List(l) => l.first().map(String::as_str),
        text => text.as_text(),
    }
}

/// Split a flag string with shell quoting rules. Unbalanced quotes fall back
/// to plain whitespace splitting.
fn split_flags(s: &str) -> Vec<String> {
    match shell_words::split(s) {
        Ok(v) => v,
        Err(e) => {
            warn!(flags = s, error = %e, "extra_flags is not valid shell syntax; splitting on whitespace");
            s.split_whitespace().map(str::to_string).collect()
        }
    }
}

fn template_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$(?:(\$)|\{([_A-Za-z][_A-Za-z0-9]*)\}|([_A-Za-z][_A-Za-z0-9]*))")
            .expect("template regex is valid")
    })
}

/// Substitute `${project_folder}` / `$project_folder` and collapse `$$`.
/// Unknown or malformed placeholders are left as they are.
pub fn apply_template<'a>(s: &'a str, project_folder: &str) -> Cow<'a, str> {
    if !s.contains('$') {
        return Cow::Borrowed(s);
    }
    template_regex().replace_all(s, |caps: &Captures| {
        if caps.get(1).is_some() {
            return "$".to_string();
        }
        let name = caps.get(2).or_else(|| caps.get(3)).map(|m| m.as_str());
        match name {
            Some("project_folder") => project_folder.to_string(),
            _ => caps[0].to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::language::{C_PROFILE, CPP_PROFILE};

    fn tmp_target() -> OutputTarget {
        OutputTarget::TempFile(PathBuf::from("/tmp/gcclint-discard.o"))
    }

    #[test]
    fn test_defaults_only() {
        let ctx = FileContext::new(".", None);
        let spec = build_command_with_output(&C_PROFILE, &Settings::new(), &ctx, tmp_target());
        assert_eq!(
            spec.command_line(),
            "gcc -c -Wall -O0 -x c -o /tmp/gcclint-discard.o -"
        );
        let cpp = build_command_with_output(&CPP_PROFILE, &Settings::new(), &ctx, tmp_target());
        assert_eq!(cpp.executable, "g++");
        assert!(cpp.command_line().ends_with("-x c++ -o /tmp/gcclint-discard.o -"));
    }

    #[test]
    fn test_flags_and_include_dirs_in_order() {
        let mut s = Settings::new();
        s.insert("include_dirs", vec!["/usr/local/include".to_string()]);
        s.insert("extra_flags", "-std=c11 -pedantic");
        let ctx = FileContext::new(".", None);
        let spec = build_command_with_output(&C_PROFILE, &s, &ctx, OutputTarget::NullDevice);
        let args = spec.args();
        assert_eq!(&args[..3], &["-c", "-Wall", "-O0"]);
        assert_eq!(args[3], "-std=c11");
        assert_eq!(args[4], "-pedantic");
        assert_eq!(args[5], "-I/usr/local/include");
        assert_eq!(&args[6..8], &["-x", "c"]);
        assert_eq!(args[8], "-o");
        assert_eq!(args.last().map(String::as_str), Some("-"));
        let line = spec.command_line();
        assert!(line.starts_with("gcc -c -Wall -O0 -std=c11 -pedantic -I/usr/local/include -x c -o "));
        assert!(line.ends_with(" -"));
    }

    #[test]
    fn test_project_folder_placeholder() {
        let mut s = Settings::new();
        s.insert("extra_flags", "-DFOO=${project_folder}/bar");
        s.insert("include_dirs", vec!["$project_folder/include".to_string()]);
        let ctx = FileContext::new("/home/u/proj", None);
        let spec = build_command_with_output(&C_PROFILE, &s, &ctx, tmp_target());
        assert_eq!(spec.extra_flags, vec!["-DFOO=/home/u/proj/bar"]);
        assert_eq!(spec.include_dirs, vec!["/home/u/proj/include"]);
    }

    #[test]
    fn test_substitution_keeps_spaced_folder_in_one_token() {
        let mut s = Settings::new();
        s.insert("extra_flags", "-iquote ${project_folder}/gen '-DNAME=a b'");
        let ctx = FileContext::new("/home/u/my proj", None);
        let spec = build_command_with_output(&C_PROFILE, &s, &ctx, tmp_target());
        assert_eq!(
            spec.extra_flags,
            vec!["-iquote", "/home/u/my proj/gen", "-DNAME=a b"]
        );
        assert!(spec
            .command_line()
            .contains("-iquote '/home/u/my proj/gen' '-DNAME=a b'"));
    }

    #[test]
    fn test_extra_flags_as_list_used_verbatim() {
        let mut s = Settings::new();
        s.insert(
            "c++_extra_flags",
            vec!["-std=c++17".to_string(), "-DMSG=hello world".to_string()],
        );
        s.insert("extra_flags", "-std=c99");
        let ctx = FileContext::new(".", None);
        let spec = build_command_with_output(&CPP_PROFILE, &s, &ctx, tmp_target());
        assert_eq!(spec.extra_flags, vec!["-std=c++17", "-DMSG=hello world"]);
        // c keeps the generic value
        let c = build_command_with_output(&C_PROFILE, &s, &ctx, tmp_target());
        assert_eq!(c.extra_flags, vec!["-std=c99"]);
    }

    #[test]
    fn test_unbalanced_quotes_fall_back_to_whitespace() {
        let mut s = Settings::new();
        s.insert("extra_flags", "-DX=\"oops -Wextra");
        let ctx = FileContext::new(".", None);
        let spec = build_command_with_output(&C_PROFILE, &s, &ctx, tmp_target());
        assert_eq!(spec.extra_flags, vec!["-DX=\"oops", "-Wextra"]);
    }

    #[test]
    fn test_include_dirs_dedup_and_file_dir_appended() {
        let mut s = Settings::new();
        s.insert(
            "include_dirs",
            vec![
                "/opt/b".to_string(),
                "/opt/a".to_string(),
                "/opt/b".to_string(),
                "src".to_string(),
            ],
        );
        let ctx = FileContext::new(".", Some(PathBuf::from("src/main.c")));
        let spec = build_command_with_output(&C_PROFILE, &s, &ctx, tmp_target());
        assert_eq!(spec.include_dirs, vec!["/opt/b", "/opt/a", "src"]);

        let bare = FileContext::new(".", Some(PathBuf::from("main.c")));
        let spec = build_command_with_output(&C_PROFILE, &Settings::new(), &bare, tmp_target());
        assert_eq!(spec.include_dirs, vec!["."]);
    }

    #[test]
    fn test_include_dir_with_space_is_escaped() {
        let mut s = Settings::new();
        s.insert("include_dirs", vec!["/opt/my libs".to_string()]);
        let ctx = FileContext::new(".", None);
        let spec = build_command_with_output(&C_PROFILE, &s, &ctx, tmp_target());
        assert!(spec.command_line().contains("-I'/opt/my libs'"));
        assert!(spec.args().contains(&"-I/opt/my libs".to_string()));
    }

    #[test]
    fn test_empty_executable_falls_back() {
        let mut s = Settings::new();
        s.insert("c_executable", "  ");
        let ctx = FileContext::new(".", None);
        let spec = build_command_with_output(&C_PROFILE, &s, &ctx, tmp_target());
        assert_eq!(spec.executable, "gcc");
        s.insert("c_executable", "clang");
        let spec = build_command_with_output(&C_PROFILE, &s, &ctx, tmp_target());
        assert_eq!(spec.executable, "clang");
    }

    #[test]
    fn test_apply_template_edge_cases() {
        assert_eq!(apply_template("plain", "/p"), "plain");
        assert_eq!(apply_template("${project_folder}", "/p"), "/p");
        assert_eq!(apply_template("$project_folder/x", "/p"), "/p/x");
        assert_eq!(apply_template("${unknown}/x", "/p"), "${unknown}/x");
        assert_eq!(apply_template("$HOME/x", "/p"), "$HOME/x");
        assert_eq!(apply_template("cost$$", "/p"), "cost$");
        assert_eq!(apply_template("${project_folder", "/p"), "${project_folder");
        assert_eq!(apply_template("$project_folderX", "/p"), "$project_folderX");
        assert_eq!(apply_template("trailing $", "/p"), "trailing $");
    }

    #[test]
    fn test_output_target_resolution() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            OutputTarget::resolve_in(dir.path()),
            OutputTarget::TempFile(dir.path().join(discard_file_name()))
        );
        assert!(dir.path().join(discard_file_name()).is_file());
        assert_eq!(
            OutputTarget::resolve_in(&dir.path().join("missing")),
            OutputTarget::NullDevice
        );
        assert_eq!(OutputTarget::NullDevice.as_arg(), null_device());
    }

    #[cfg(unix)]
    #[test]
    fn test_read_only_temp_dir_uses_null_device() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let ro = dir.path().join("ro");
        std::fs::create_dir(&ro).unwrap();
        std::fs::set_permissions(&ro, std::fs::Permissions::from_mode(0o555)).unwrap();
        // root ignores directory permissions
        let writable = std::fs::File::create(ro.join("check")).is_ok();
        if !writable {
            assert_eq!(OutputTarget::resolve_in(&ro), OutputTarget::NullDevice);
        }
        std::fs::set_permissions(&ro, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn test_discard_file_name_is_per_process() {
        let name = discard_file_name();
        assert!(name.contains(&std::process::id().to_string()));
        assert!(name.ends_with(".o"));
    }
}
