use crate::error::ScheduleError;
use crate::task::DependencyType;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

pub const DEPENDENCY_POLICY_ENV: &str = "SCHEDULE_ENGINE_DEPENDENCY_POLICY";
pub const MAX_CONFLICT_TASKS_ENV: &str = "SCHEDULE_ENGINE_MAX_CONFLICT_TASKS";

/// What to do with a dependency code outside FS/SS/FF/SF at the input boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyTypePolicy {
    #[default]
    Reject,
    FallbackToFinishToStart,
}

impl DependencyTypePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyTypePolicy::Reject => "reject",
            DependencyTypePolicy::FallbackToFinishToStart => "fallback_to_finish_to_start",
        }
    }
}

impl FromStr for DependencyTypePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(DependencyTypePolicy::Reject),
            "fallback_to_finish_to_start" | "fallback" | "fs" => {
                Ok(DependencyTypePolicy::FallbackToFinishToStart)
            }
            _ => Err(ConfigError::InvalidValue {
                key: DEPENDENCY_POLICY_ENV,
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] io::Error),

    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub dependency_type_policy: DependencyTypePolicy,
    /// Run structural validation on every loaded snapshot.
    pub validate_snapshots: bool,
    /// Upper bound callers apply before an all-pairs conflict scan.
    pub max_conflict_scan_tasks: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dependency_type_policy: DependencyTypePolicy::Reject,
            validate_snapshots: true,
            max_conflict_scan_tasks: 500,
        }
    }
}

impl EngineConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }

    pub fn save_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Apply `SCHEDULE_ENGINE_*` environment overrides on top of `self`.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(DEPENDENCY_POLICY_ENV) {
            self.dependency_type_policy = value.parse()?;
        }
        if let Some(value) = lookup(MAX_CONFLICT_TASKS_ENV) {
            self.max_conflict_scan_tasks =
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: MAX_CONFLICT_TASKS_ENV,
                        value,
                    })?;
        }
        Ok(self)
    }

    /// Parse a boundary dependency code under the configured policy.
    pub fn parse_dependency_type(&self, code: &str) -> Result<DependencyType, ScheduleError> {
        if code.trim().is_empty() {
            return Ok(DependencyType::FinishToStart);
        }
        match code.parse::<DependencyType>() {
            Ok(parsed) => Ok(parsed),
            Err(err) => match self.dependency_type_policy {
                DependencyTypePolicy::Reject => Err(err),
                DependencyTypePolicy::FallbackToFinishToStart => {
                    warn!(code, "unknown dependency type, treating as FS");
                    Ok(DependencyType::FinishToStart)
                }
            },
        }
    }
}
