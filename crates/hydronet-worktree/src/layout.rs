//! Persisted worktree layout
//!
//! A worktree is stored as JSON: branches, their version records, the active
//! branch and the shared base snapshot. The live document is not stored; it
//! is re-materialized from the base snapshot when the layout is opened.

use crate::error::{PersistError, WorktreeError};
use crate::branch::Branch;
use crate::version::Version;
use hydronet_model::{BranchId, Snapshot, VersionId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Serializable worktree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorktreeLayout {
    pub branches: Vec<Branch>,
    pub versions: Vec<Version>,
    pub active_branch_id: BranchId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_snapshot: Option<Snapshot>,
}

impl WorktreeLayout {
    /// Check referential integrity before anything is rebuilt
    ///
    /// # Errors
    /// - [`WorktreeError::InvalidLayout`] for structural problems
    /// - [`WorktreeError::BaseMismatch`] if a version was seeded from a
    ///   different base snapshot
    pub fn validate(&self) -> Result<(), WorktreeError> {
        let invalid = |reason: String| Err(WorktreeError::InvalidLayout(reason));

        if !self.branches.iter().any(Branch::is_main) {
            return invalid("no main branch".to_string());
        }
        if !self.branches.iter().any(|b| b.id == self.active_branch_id) {
            return invalid(format!("active branch {} not present", self.active_branch_id));
        }
        if self.branches.len() > 1 && self.base_snapshot.is_none() {
            return invalid("scenario branches without a base snapshot".to_string());
        }

        let versions: HashMap<&VersionId, &Version> =
            self.versions.iter().map(|v| (&v.id, v)).collect();
        if versions.len() != self.versions.len() {
            return invalid("duplicate version ids".to_string());
        }

        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        let mut owned = HashSet::new();
        for branch in &self.branches {
            if !ids.insert(&branch.id) {
                return invalid(format!("duplicate branch id {}", branch.id));
            }
            if !names.insert(branch.name.as_str()) {
                return invalid(format!("duplicate branch name '{}'", branch.name));
            }
            for version_id in branch.version_ids() {
                let Some(version) = versions.get(version_id) else {
                    return Err(WorktreeError::MissingVersion(version_id.clone()));
                };
                if !owned.insert(version_id) {
                    return invalid(format!("version {version_id} owned twice"));
                }
                if !version.log.is_consistent() {
                    return invalid(format!("version {version_id} has an inconsistent log"));
                }
                if let (Some(base), Some(seeded)) = (&self.base_snapshot, version.log.base_state()) {
                    if seeded != base.state_id {
                        return Err(WorktreeError::BaseMismatch {
                            branch: branch.id.clone(),
                            expected: base.state_id,
                            actual: seeded,
                        });
                    }
                }
            }
        }

        if owned.len() != self.versions.len() {
            return invalid("orphan version records".to_string());
        }
        Ok(())
    }

    /// Write as pretty JSON
    ///
    /// # Errors
    /// Returns error if encoding or the write fails
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| PersistError::io_error(path, e))?;
        tracing::debug!(path = %path.display(), branches = self.branches.len(), "saved worktree layout");
        Ok(())
    }

    /// Read from JSON and validate
    ///
    /// # Errors
    /// Returns error if the file cannot be read, decoded or validated
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| PersistError::io_error(path, e))?;
        let layout: Self = serde_json::from_str(&content)?;
        layout.validate()?;
        Ok(layout)
    }
}
