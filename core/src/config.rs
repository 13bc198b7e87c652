//! Registry definitions as YAML or JSON documents.
//!
//! A [`RegistryConfig`] describes a registry tree declaratively so that a
//! command line can be defined outside of code and built at runtime.
//!
//! # Example YAML
//!
//! ```yaml
//! flags:
//!   - key: verbose
//!     short: v
//!     kind: switch
//!     help: verbose output
//!   - key: sync
//!     short: S
//!     kind: sub
//!     help: package sync
//!     group:
//!       flags:
//!         - key: install
//!           short: i
//!         - key: uninstall
//!           short: u
//!         - key: target
//!           short: t
//!           kind: required
//!           param_help: name
//!       exclusive: [install, uninstall]
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::registry::{Flag, FlagKind, Registry};

/// Declarative form of a [`Registry`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Flags in definition order.
    #[serde(default)]
    pub flags: Vec<FlagConfig>,
    /// Keys of the exclusive set.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclusive: Vec<String>,
}

/// Declarative form of a [`Flag`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagConfig {
    pub key: String,
    /// Single-character short key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    #[serde(default)]
    pub kind: FlagKind,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub help: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub param_help: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default: String,
    /// Nested registry, required for `kind: sub` and rejected otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<RegistryConfig>,
}

impl RegistryConfig {
    /// Parses a YAML document.
    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Parses a JSON document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Loads a document from disk.
    ///
    /// Files ending in `.json` are read as JSON, anything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        debug!(path = %path.display(), bytes = raw.len(), "Loading registry definition");

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&raw)
        } else {
            Self::from_yaml_str(&raw)
        }
    }

    /// Describes an existing registry.
    pub fn from_registry(registry: &Registry) -> Self {
        Self {
            flags: registry.flags().iter().map(FlagConfig::from_flag).collect(),
            exclusive: registry
                .exclusive_keys()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    /// Builds the registry tree this document describes.
    pub fn build(&self) -> Result<Registry, ConfigError> {
        let mut registry = Registry::new();
        for flag in &self.flags {
            registry.define(flag.build()?)?;
        }
        if !self.exclusive.is_empty() {
            let keys: Vec<&str> = self.exclusive.iter().map(String::as_str).collect();
            registry.set_exclusive(&keys)?;
        }
        Ok(registry)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl FlagConfig {
    fn from_flag(flag: &Flag) -> Self {
        Self {
            key: flag.key().to_string(),
            short: flag.short().map(String::from),
            kind: flag.kind(),
            help: flag.help().to_string(),
            param_help: flag.param_help().to_string(),
            default: flag.default_value().to_string(),
            group: flag.group().map(RegistryConfig::from_registry),
        }
    }

    fn build(&self) -> Result<Flag, ConfigError> {
        let flag = match (self.kind, &self.group) {
            (FlagKind::Sub, Some(group)) => Flag::sub(&self.key, group.build()?),
            (FlagKind::Sub, None) => return Err(ConfigError::MissingGroup(self.key.clone())),
            (_, Some(_)) => return Err(ConfigError::UnexpectedGroup(self.key.clone())),
            (FlagKind::Optional, None) => Flag::optional(&self.key),
            (FlagKind::Required, None) => Flag::required(&self.key),
            (FlagKind::Switch, None) => Flag::switch(&self.key),
        };
        let flag = flag
            .with_help(&self.help)
            .with_param_help(&self.param_help)
            .with_default(&self.default);

        match self.short_key()? {
            Some(short) => Ok(flag.with_short(short)),
            None => Ok(flag),
        }
    }

    fn short_key(&self) -> Result<Option<char>, ConfigError> {
        let Some(raw) = self.short.as_deref().filter(|raw| !raw.is_empty()) else {
            return Ok(None);
        };
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(short), None) => Ok(Some(short)),
            _ => Err(ConfigError::InvalidShortKey(raw.to_string())),
        }
    }
}
