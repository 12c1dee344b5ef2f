//! CLI configuration file

use anyhow::{Context, Result};
use hydronet_worktree::WorktreeConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Contents of `hydronet.toml`
///
/// ```toml
/// log_level = "debug"
///
/// [worktree]
/// scenario_name_prefix = "Variant"
/// max_scenarios = 8
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct CliConfig {
    /// Filter used when `RUST_LOG` is unset
    pub(crate) log_level: String,
    pub(crate) worktree: WorktreeConfig,
}

impl CliConfig {
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&source).with_context(|| format!("parsing config {}", path.display()))
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            worktree: WorktreeConfig::default(),
        }
    }
}
