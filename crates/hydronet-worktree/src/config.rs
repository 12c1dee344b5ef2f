//! Worktree configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Worktree configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorktreeConfig {
    /// Display name of the main branch; reserved for scenarios
    pub main_branch_name: String,
    /// Prefix for generated scenario names ("Scenario 1", ...)
    pub scenario_name_prefix: String,
    /// Maximum number of scenario branches, unlimited when unset
    pub max_scenarios: Option<usize>,
    /// Log version drift outside branch switches
    pub report_drift: bool,
}

impl WorktreeConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With scenario cap
    #[inline]
    #[must_use]
    pub fn with_max_scenarios(mut self, max: usize) -> Self {
        self.max_scenarios = Some(max);
        self
    }

    /// With scenario name prefix
    #[inline]
    #[must_use]
    pub fn with_scenario_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.scenario_name_prefix = prefix.into();
        self
    }

    /// With drift reporting toggled
    #[inline]
    #[must_use]
    pub fn with_drift_reporting(mut self, enabled: bool) -> Self {
        self.report_drift = enabled;
        self
    }

    /// Parse from TOML; missing keys keep their defaults
    ///
    /// # Errors
    /// Returns error on invalid TOML or mistyped keys
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}

impl Default for WorktreeConfig {
    fn default() -> Self {
        Self {
            main_branch_name: "main".to_string(),
            scenario_name_prefix: "Scenario".to_string(),
            max_scenarios: None,
            report_drift: true,
        }
    }
}
