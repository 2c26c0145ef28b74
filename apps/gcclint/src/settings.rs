//! Settings map and the language-specific override lookup.
//!
//! A setting is looked up as `<lang>_<name>` first (`c_extra_flags`,
//! `c++_extra_flags`), then as the generic `<name>`, then in the defaults.
//! Values that are neither a string nor a list of strings are dropped at
//! load time.

use crate::models::language::{LanguageProfile, C_PROFILE, CPP_PROFILE};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

pub const EXECUTABLE: &str = "executable";
pub const EXTRA_FLAGS: &str = "extra_flags";
pub const INCLUDE_DIRS: &str = "include_dirs";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
/// A single setting value: one string or a list of strings.
pub enum SettingValue {
    Text(String),
    List(Vec<String>),
}

impl SettingValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SettingValue::Text(s) => Some(s),
            SettingValue::List(_) => None,
        }
    }

    /// View the value as a list. A non-empty string becomes a single item.
    pub fn to_list(&self) -> Vec<String> {
        match self {
            SettingValue::Text(s) if s.is_empty() => Vec::new(),
            SettingValue::Text(s) => vec![s.clone()],
            SettingValue::List(v) => v.clone(),
        }
    }
}

impl From<&str> for SettingValue {
    fn from(s: &str) -> Self {
        SettingValue::Text(s.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(s: String) -> Self {
        SettingValue::Text(s)
    }
}

impl From<Vec<String>> for SettingValue {
    fn from(v: Vec<String>) -> Self {
        SettingValue::List(v)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Text(String),
    List(Vec<String>),
    Other(IgnoredAny),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Option name to value mapping as provided by the project file or CLI.
pub struct Settings(BTreeMap<String, SettingValue>);

impl<'de> Deserialize<'de> for Settings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, RawValue>::deserialize(deserializer)?;
        let map = raw
            .into_iter()
            .filter_map(|(k, v)| match v {
                RawValue::Text(s) => Some((k, SettingValue::Text(s))),
                RawValue::List(l) => Some((k, SettingValue::List(l))),
                RawValue::Other(_) => None,
            })
            .collect();
        Ok(Settings(map))
    }
}

impl Settings {
    pub fn new() -> Self {
        Settings::default()
    }

    /// Built-in fallbacks for every recognized option of `profile`.
    pub fn defaults_for(profile: &LanguageProfile) -> Self {
        let mut s = Settings::new();
        s.insert(EXECUTABLE, profile.default_executable);
        s.insert(EXTRA_FLAGS, "");
        s.insert(INCLUDE_DIRS, Vec::<String>::new());
        s
    }

    pub fn insert(&mut self, key: &str, value: impl Into<SettingValue>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Set the generic `name` and drop every language-specific variant so
    /// the new value wins for all languages.
    pub fn override_with(&mut self, name: &str, value: impl Into<SettingValue>) {
        for profile in [&C_PROFILE, &CPP_PROFILE] {
            let prefixes =
                std::iter::once(profile.key_prefix).chain(profile.key_aliases.iter().copied());
            for prefix in prefixes {
                self.0.remove(&format!("{}_{}", prefix, name));
            }
        }
        self.insert(name, value);
    }
}

/// Look up `name` for `profile`: language key, aliases, generic key, then defaults.
pub fn resolve<'a>(
    name: &str,
    profile: &LanguageProfile,
    settings: &'a Settings,
    defaults: &'a Settings,
) -> Option<&'a SettingValue> {
    std::iter::once(profile.key_prefix)
        .chain(profile.key_aliases.iter().copied())
        .find_map(|prefix| settings.get(&format!("{}_{}", prefix, name)))
        .or_else(|| settings.get(name))
        .or_else(|| defaults.get(name))
}
