//! Language variants and their static compiler profiles.
//!
//! Each variant owns one immutable `LanguageProfile`. The builder and the
//! settings resolver take a profile instead of branching on the variant.

use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
/// Source language fed to the compiler.
pub enum LanguageVariant {
    C,
    #[serde(rename = "c++")]
    Cpp,
}

#[derive(Debug)]
/// Per-language defaults and matching tables.
pub struct LanguageProfile {
    pub variant: LanguageVariant,
    /// Prefix of language-specific setting keys, e.g. `c++` in `c++_extra_flags`.
    pub key_prefix: &'static str,
    /// Extra prefixes accepted for the same keys (TOML-friendly spellings).
    pub key_aliases: &'static [&'static str],
    pub default_executable: &'static str,
    /// Value passed to `-x`.
    pub lang_flag: &'static str,
    /// Lowercase file extensions without the dot.
    pub extensions: &'static [&'static str],
    /// Editor syntax names this profile is activated for.
    pub syntaxes: &'static [&'static str],
}

pub static C_PROFILE: LanguageProfile = LanguageProfile {
    variant: LanguageVariant::C,
    key_prefix: "c",
    key_aliases: &[],
    default_executable: "gcc",
    lang_flag: "c",
    extensions: &["c", "h"],
    syntaxes: &["c", "c improved"],
};

pub static CPP_PROFILE: LanguageProfile = LanguageProfile {
    variant: LanguageVariant::Cpp,
    key_prefix: "c++",
    key_aliases: &["cpp"],
    default_executable: "g++",
    lang_flag: "c++",
    extensions: &[
        "cc", "cpp", "cxx", "c++", "hh", "hpp", "hxx", "h++", "ipp", "tpp",
    ],
    syntaxes: &["c++", "c++11"],
};

impl LanguageVariant {
    pub fn profile(self) -> &'static LanguageProfile {
        match self {
            LanguageVariant::C => &C_PROFILE,
            LanguageVariant::Cpp => &CPP_PROFILE,
        }
    }

    /// Map an editor syntax name to a variant.
    ///
    /// Only `c` and `c improved` select C; every other syntax the linter is
    /// activated for compiles as C++.
    pub fn from_syntax(syntax: &str) -> Self {
        let s = syntax.trim().to_ascii_lowercase();
        if C_PROFILE.syntaxes.contains(&s.as_str()) {
            LanguageVariant::C
        } else {
            LanguageVariant::Cpp
        }
    }

    /// Detect the variant from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        // Upper-case .C/.H is the traditional C++ spelling
        if ext == "C" || ext == "H" {
            return Some(LanguageVariant::Cpp);
        }
        let ext = ext.to_ascii_lowercase();
        [&C_PROFILE, &CPP_PROFILE]
            .into_iter()
            .find(|p| p.extensions.contains(&ext.as_str()))
            .map(|p| p.variant)
    }
}

impl fmt::Display for LanguageVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile().lang_flag)
    }
}

impl FromStr for LanguageVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" => Ok(LanguageVariant::C),
            "c++" | "cpp" | "cxx" => Ok(LanguageVariant::Cpp),
            other => Err(format!("unknown language '{}' (expected c or c++)", other)),
        }
    }
}
