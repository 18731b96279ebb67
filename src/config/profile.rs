//! Project and profile settings
//!
//! The project document names the profile to use and may override its target.
//! A profile holds one raw settings map per target under `outputs`. Documents
//! are accepted as YAML text; reading them from disk is up to the caller.

use super::{ConfigError, ConfigResult};
use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

/// Top-level keys of a profiles document that are not profiles
const NON_PROFILE_KEYS: &[&str] = &["config"];

/// Project settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,

    /// Project version; unquoted numbers such as `0.1` are kept as text
    #[serde(
        default,
        deserialize_with = "lenient_version",
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<String>,

    /// Profile to use; defaults to the project name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Target overriding the profile's own `target`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    #[serde(
        default,
        rename = "config-version",
        skip_serializing_if = "Option::is_none"
    )]
    pub config_version: Option<u32>,
}

fn lenient_version<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Option::<serde_yaml::Value>::deserialize(deserializer)? {
        None | Some(serde_yaml::Value::Null) => Ok(None),
        Some(serde_yaml::Value::String(s)) => Ok(Some(s)),
        Some(serde_yaml::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a version string, got {:?}",
            other
        ))),
    }
}

impl ProjectConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Parse a project document from YAML
    pub fn parse(content: &str) -> ConfigResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse project settings: {}", e)))
    }

    /// Name of the profile this project uses
    pub fn profile_name(&self) -> &str {
        self.profile.as_deref().unwrap_or(&self.name)
    }
}

/// One profile: a default target and the raw settings of every target
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub target: String,

    #[serde(default)]
    pub outputs: IndexMap<String, Value>,
}

impl ProfileConfig {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            outputs: IndexMap::new(),
        }
    }

    /// Add or replace the settings of one target
    pub fn with_output(mut self, target: impl Into<String>, settings: Value) -> Self {
        self.outputs.insert(target.into(), settings);
        self
    }

    /// Parse a single profile from YAML
    pub fn parse(content: &str) -> ConfigResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse profile: {}", e)))
    }

    /// Raw settings of a target
    pub fn output(&self, target: &str) -> ConfigResult<&Value> {
        self.outputs
            .get(target)
            .ok_or_else(|| ConfigError::UnknownTarget(target.to_string()))
    }

    /// Target to use: the override when given, otherwise the profile default
    pub fn select_target<'a>(&'a self, target_override: Option<&'a str>) -> &'a str {
        target_override.unwrap_or(&self.target)
    }
}

/// A profiles document: profiles keyed by name
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfilesFile {
    profiles: IndexMap<String, ProfileConfig>,
}

impl ProfilesFile {
    /// Parse a profiles document from YAML.
    ///
    /// The global `config` block is skipped.
    pub fn parse(content: &str) -> ConfigResult<Self> {
        let raw: IndexMap<String, serde_yaml::Value> = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse profiles: {}", e)))?;

        let mut profiles = IndexMap::new();
        for (name, value) in raw {
            if NON_PROFILE_KEYS.contains(&name.as_str()) {
                debug!("Skipping non-profile key '{}'", name);
                continue;
            }
            let profile: ProfileConfig = serde_yaml::from_value(value).map_err(|e| {
                ConfigError::Parse(format!("Failed to parse profile '{}': {}", name, e))
            })?;
            profiles.insert(name, profile);
        }
        Ok(Self { profiles })
    }

    pub fn insert(&mut self, name: impl Into<String>, profile: ProfileConfig) {
        self.profiles.insert(name.into(), profile);
    }

    pub fn get(&self, name: &str) -> ConfigResult<&ProfileConfig> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }
}

impl FromIterator<(String, ProfileConfig)> for ProfilesFile {
    fn from_iter<I: IntoIterator<Item = (String, ProfileConfig)>>(iter: I) -> Self {
        Self {
            profiles: iter.into_iter().collect(),
        }
    }
}
