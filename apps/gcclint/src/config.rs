//! Project file discovery and effective settings resolution.
//!
//! gcclint reads `gcclint.toml|yaml|yml` from the closest ancestor of the
//! starting directory and merges it with CLI flags into an `Effective`
//! config. The directory holding that file is the project folder used for
//! `${project_folder}` placeholders.
//!
//! ```toml
//! output = "human"
//!
//! [settings]
//! executable = "gcc"
//! extra_flags = "-std=c11 -I${project_folder}/gen"
//! include_dirs = ["${project_folder}/include"]
//! "c++_extra_flags" = ["-std=c++17"]
//! ```
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::error::ConfigError;
use crate::settings::{self, Settings};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAMES: [&str; 3] = ["gcclint.toml", "gcclint.yaml", "gcclint.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `gcclint.toml|yaml`.
pub struct ProjectConfig {
    pub output: Option<String>,
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Default, Clone)]
/// Values given on the command line; `None`/empty means "not given".
pub struct CliOverrides {
    pub project_root: Option<String>,
    pub output: Option<String>,
    pub executable: Option<String>,
    pub extra_flags: Option<String>,
    pub include_dirs: Vec<String>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub project_file: Option<PathBuf>,
    /// Folder of the project file, or the explicit `--project-root`.
    pub project_folder: Option<PathBuf>,
    pub output: String,
    pub settings: Settings,
}

/// Walk upward from `start` to the first directory holding a project file.
pub fn find_project_file(start: &Path) -> Option<PathBuf> {
    let start = fs::canonicalize(start).unwrap_or_else(|_| start.to_path_buf());
    let mut cur = start.as_path();
    loop {
        for name in CONFIG_FILE_NAMES {
            let candidate = cur.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        cur = cur.parent()?;
    }
}

/// Load a project file, choosing the format by extension.
pub fn load_config(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let s = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        serde_yaml::from_str(&s).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    } else {
        toml::from_str(&s).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Project folder for one file: the configured folder, else the file's own
/// directory, else `.`.
pub fn project_folder_for(project_folder: Option<&Path>, active_file: Option<&Path>) -> PathBuf {
    if let Some(p) = project_folder {
        return p.to_path_buf();
    }
    match active_file.and_then(Path::parent) {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Where project file discovery starts: `--project-root`, else the
/// directory of `file`, else the current directory.
pub fn discovery_start(cli: &CliOverrides, file: Option<&Path>) -> PathBuf {
    match (&cli.project_root, file.and_then(Path::parent)) {
        (Some(root), _) => PathBuf::from(root),
        (None, Some(dir)) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Resolve `Effective` by merging CLI flags, the project file found for
/// `file`, and defaults.
pub fn resolve_effective(
    cli: &CliOverrides,
    file: Option<&Path>,
) -> Result<Effective, ConfigError> {
    let project_file = find_project_file(&discovery_start(cli, file));
    effective_for(cli, project_file)
}

/// Merge CLI flags over an already discovered (or absent) project file.
pub fn effective_for(
    cli: &CliOverrides,
    project_file: Option<PathBuf>,
) -> Result<Effective, ConfigError> {
    let cfg = match project_file.as_deref() {
        Some(p) => load_config(p)?,
        None => ProjectConfig::default(),
    };

    let project_folder = project_file
        .as_deref()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .or_else(|| cli.project_root.as_ref().map(PathBuf::from));

    let output = cli
        .output
        .clone()
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());

    let mut merged = cfg.settings;
    if let Some(exe) = cli.executable.as_ref() {
        merged.override_with(settings::EXECUTABLE, exe.as_str());
    }
    if let Some(flags) = cli.extra_flags.as_ref() {
        merged.override_with(settings::EXTRA_FLAGS, flags.as_str());
    }
    if !cli.include_dirs.is_empty() {
        merged.override_with(settings::INCLUDE_DIRS, cli.include_dirs.clone());
    }

    Ok(Effective {
        project_file,
        project_folder,
        output,
        settings: merged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::language::{C_PROFILE, CPP_PROFILE};
    use crate::settings::{resolve, SettingValue};
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_detect_and_load_toml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("gcclint.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
output = "json"
[settings]
executable = "gcc-13"
"c++_extra_flags" = ["-std=c++20"]
include_dirs = ["${project_folder}/include"]
    "#
        )
        .unwrap();
        fs::create_dir_all(root.join("src/deep")).unwrap();

        let cli = CliOverrides::default();
        let file = root.join("src/deep/main.c");
        let eff = resolve_effective(&cli, Some(&file)).unwrap();
        let canon_root = fs::canonicalize(root).unwrap();
        assert_eq!(eff.project_file, Some(canon_root.join("gcclint.toml")));
        assert_eq!(eff.project_folder, Some(canon_root));
        assert_eq!(eff.output, "json");
        assert_eq!(
            eff.settings.get("executable"),
            Some(&SettingValue::from("gcc-13"))
        );
        assert_eq!(
            eff.settings.get("c++_extra_flags"),
            Some(&SettingValue::List(vec!["-std=c++20".into()]))
        );
    }

    #[test]
    fn test_load_yaml_and_defaults() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("gcclint.yaml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
settings:
  extra_flags: -Wextra -Wshadow
  cpp_executable: clang++
            "#
        )
        .unwrap();

        let cli = CliOverrides {
            project_root: root.to_str().map(String::from),
            ..CliOverrides::default()
        };
        let eff = resolve_effective(&cli, None).unwrap();
        // output defaults to human when unspecified
        assert_eq!(eff.output, "human");
        assert_eq!(
            eff.settings.get("extra_flags"),
            Some(&SettingValue::from("-Wextra -Wshadow"))
        );
        assert_eq!(
            eff.settings.get("cpp_executable"),
            Some(&SettingValue::from("clang++"))
        );
    }

    #[test]
    fn test_cli_overrides_language_specific_file_values() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("gcclint.toml"),
            r#"
output = "json"
[settings]
c_executable = "cc"
c_include_dirs = ["/opt/c"]
"#,
        )
        .unwrap();
        let cli = CliOverrides {
            project_root: root.to_str().map(String::from),
            output: Some("human".into()),
            executable: Some("clang".into()),
            include_dirs: vec!["/opt/cli".into()],
            ..CliOverrides::default()
        };
        let eff = resolve_effective(&cli, None).unwrap();
        assert_eq!(eff.output, "human");
        let defaults = Settings::defaults_for(&C_PROFILE);
        assert_eq!(
            resolve(settings::EXECUTABLE, &C_PROFILE, &eff.settings, &defaults),
            Some(&SettingValue::from("clang"))
        );
        assert_eq!(
            resolve(settings::INCLUDE_DIRS, &CPP_PROFILE, &eff.settings, &defaults)
                .map(SettingValue::to_list),
            Some(vec!["/opt/cli".to_string()])
        );
    }

    #[test]
    fn test_missing_project_file_uses_explicit_root() {
        let dir = tempdir().unwrap();
        let cli = CliOverrides {
            project_root: dir.path().to_str().map(String::from),
            ..CliOverrides::default()
        };
        let eff = resolve_effective(&cli, None).unwrap();
        // tempdirs have no gcclint.toml above them in a sane environment
        if eff.project_file.is_none() {
            assert_eq!(eff.project_folder, Some(dir.path().to_path_buf()));
            assert!(eff.settings.is_empty());
        }
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("gcclint.toml"), "[settings\nexecutable = 1").unwrap();
        let cli = CliOverrides {
            project_root: dir.path().to_str().map(String::from),
            ..CliOverrides::default()
        };
        let err = resolve_effective(&cli, None).unwrap_err();
        assert!(matches!(err, ConfigError::Toml { .. }));
    }

    #[test]
    fn test_project_folder_fallbacks() {
        assert_eq!(
            project_folder_for(Some(Path::new("/proj")), Some(Path::new("/x/y.c"))),
            PathBuf::from("/proj")
        );
        assert_eq!(
            project_folder_for(None, Some(Path::new("/x/y.c"))),
            PathBuf::from("/x")
        );
        assert_eq!(project_folder_for(None, Some(Path::new("y.c"))), PathBuf::from("."));
        assert_eq!(project_folder_for(None, None), PathBuf::from("."));
    }
}
