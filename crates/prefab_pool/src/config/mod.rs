//! Configuration system
//!
//! Pool policies can be described in TOML or RON files. Settings only carry
//! plain values; callbacks are attached in code on top of the converted
//! [`PoolPolicy`].
//!
//! ```toml
//! items_container = "PooledItems"
//!
//! [[templates]]
//! name = "Bullet"
//!
//! [templates.policy]
//! max_capacity = 64
//! group_returned = true
//! prewarm = 16
//! ```

pub use serde::{Deserialize, Serialize};

use crate::pool::PoolPolicy;
use crate::runtime::ObjectRuntime;
use std::collections::HashSet;
use std::path::Path;

/// Settings that can be stored next to a game's assets
///
/// The format follows the file extension: `.toml` or `.ron`. Loaded values
/// are not validated here; [`PoolSettings::validate`] checks capacities and
/// template names before they reach a registry.
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load settings from a `.toml` or `.ron` file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let format = Format::from_path(path)?;
        let contents = std::fs::read_to_string(path)?;

        match format {
            Format::Toml => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Format::Ron => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Save settings to a `.toml` or `.ron` file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = match Format::from_path(path)? {
            Format::Toml => toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?,
            Format::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };

        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// On-disk settings format, picked by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Toml,
    Ron,
}

impl Format {
    fn from_path(path: &str) -> Result<Self, ConfigError> {
        match Path::new(path).extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.to_string())),
        }
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Settings parsed but are not usable
    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// Serializable part of a [`PoolPolicy`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySettings {
    /// Max capacity; `None` means unbounded
    pub max_capacity: Option<usize>,
    /// Force instances active on get
    pub activate_on_get: bool,
    /// Group returned instances under a per-template container
    pub group_returned: bool,
    /// Instances to create up front
    pub prewarm: usize,
}

impl PolicySettings {
    /// Build a callback-free policy from these settings
    pub fn to_policy<R: ObjectRuntime>(&self) -> PoolPolicy<R> {
        PoolPolicy::new(self.max_capacity.unwrap_or(usize::MAX))
            .activate_on_get(self.activate_on_get)
            .group_returned(self.group_returned)
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_capacity == Some(0) {
            return Err(ConfigError::Invalid("max_capacity must be greater than zero".to_string()));
        }
        Ok(())
    }
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            max_capacity: None,
            activate_on_get: true,
            group_returned: false,
            prewarm: 0,
        }
    }
}

/// Settings for one template, looked up by name in the host scene
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSettings {
    /// Template name
    pub name: String,
    /// Pool policy for the template
    #[serde(default)]
    pub policy: PolicySettings,
}

/// Top-level pool settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    /// Name of the container returned instances are parked under
    pub items_container: Option<String>,
    /// Per-template policies
    pub templates: Vec<TemplateSettings>,
}

impl PoolSettings {
    /// Validate every template entry
    ///
    /// Names must be non-empty and unique.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for template in &self.templates {
            if template.name.is_empty() {
                return Err(ConfigError::Invalid("template name cannot be empty".to_string()));
            }
            if !seen.insert(template.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "template '{}' is configured more than once",
                    template.name
                )));
            }
            template
                .policy
                .validate()
                .map_err(|e| ConfigError::Invalid(format!("template '{}': {}", template.name, e)))?;
        }
        Ok(())
    }

    /// Settings for a template by name
    pub fn template(&self, name: &str) -> Option<&PolicySettings> {
        self.templates
            .iter()
            .find(|template| template.name == name)
            .map(|template| &template.policy)
    }
}

impl Config for PoolSettings {}
