use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Result, RttiError};
use crate::logging::{LogConfig, LogFormat, LogOutput};

/// Environment override for `registry.collision_policy`
pub const COLLISION_POLICY_ENV: &str = "RTTIMETA_COLLISION_POLICY";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RttiConfig {
    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub log: LogSettings,
}

/// What a registry does when two classes share an id
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Keep the first class, record the collision silently
    Allow,
    /// Keep the first class, record and log the collision
    #[default]
    Warn,
    /// Refuse the second class with `RttiError::IdCollision`
    Reject,
}

impl CollisionPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "allow" => Some(Self::Allow),
            "warn" => Some(Self::Warn),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub collision_policy: CollisionPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormatSetting,

    /// Directory for daily-rotated log files; stderr when absent
    #[serde(default)]
    pub directory: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormatSetting {
    #[default]
    Pretty,
    Compact,
    Json,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormatSetting::default(),
            directory: None,
        }
    }
}

impl LogSettings {
    pub fn to_log_config(&self) -> LogConfig {
        let format = match self.format {
            LogFormatSetting::Pretty => LogFormat::Pretty,
            LogFormatSetting::Compact => LogFormat::Compact,
            LogFormatSetting::Json => LogFormat::Json,
        };
        let output = match &self.directory {
            Some(directory) => LogOutput::File {
                directory: directory.clone(),
                prefix: "rttimeta".to_string(),
            },
            None => LogOutput::Stderr,
        };

        LogConfig::new()
            .with_level(crate::logging::parse_level(&self.level))
            .with_format(format)
            .with_output(output)
    }
}

impl RttiConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| RttiError::config(None, e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| RttiError::config(Some(path.to_path_buf()), e.to_string()))?;
        toml::from_str(&content)
            .map_err(|e| RttiError::config(Some(path.to_path_buf()), e.to_string()))
    }

    /// Load from `path`, or defaults when no path is given. A path that
    /// cannot be read is an error. Env overrides apply either way.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_env_overrides()
    }

    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_policy_override(std::env::var(COLLISION_POLICY_ENV).ok().as_deref())
    }

    fn with_policy_override(mut self, value: Option<&str>) -> Result<Self> {
        if let Some(value) = value {
            self.registry.collision_policy = CollisionPolicy::parse(value).ok_or_else(|| {
                RttiError::config(
                    None,
                    format!("{}: unknown collision policy '{}'", COLLISION_POLICY_ENV, value),
                )
            })?;
        }
        Ok(self)
    }
}
