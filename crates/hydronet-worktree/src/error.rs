//! Error types for the worktree
//!
//! Provides error handling for:
//! - Rejected edits (validation and apply failures, store unchanged)
//! - Fatal history replays (undo, redo and branch switches)
//! - Branch metadata operations
//! - Persisted layouts and configuration files

use hydronet_model::{BranchId, StateId, ValidationError, VersionId};
use hydronet_store::ApplyError;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

/// Main worktree error type
#[derive(Debug, thiserror::Error)]
pub enum WorktreeError {
    /// Moment rejected before reaching the log
    #[error("invalid moment: {0}")]
    Validation(#[from] ValidationError),

    /// Edit rejected by the store; nothing changed
    #[error("edit rejected: {0}")]
    Apply(#[from] ApplyError),

    /// Recorded history failed to re-apply; store state is undefined
    #[error("replay failed on branch {branch} at delta {index}: {source}")]
    Replay {
        branch: BranchId,
        index: usize,
        #[source]
        source: ApplyError,
    },

    /// No branch with this id
    #[error("unknown branch: {0}")]
    UnknownBranch(BranchId),

    /// Branch references a version the worktree does not own
    #[error("missing version record: {0}")]
    MissingVersion(VersionId),

    /// Version was seeded from a different base snapshot
    #[error("branch {branch} was seeded from {actual}, worktree base is {expected}")]
    BaseMismatch {
        branch: BranchId,
        expected: StateId,
        actual: StateId,
    },

    /// Empty or whitespace-only name
    #[error("branch name must not be empty")]
    EmptyName,

    /// Name reserved for the main branch
    #[error("branch name '{0}' is reserved")]
    ReservedName(String),

    /// Name already used by another branch
    #[error("branch name '{0}' already exists")]
    DuplicateName(String),

    /// Main branch cannot be deleted or renamed
    #[error("the main branch cannot be {0}")]
    MainBranchImmutable(&'static str),

    /// Configured scenario cap reached
    #[error("scenario limit reached (max: {0})")]
    ScenarioLimit(usize),

    /// Persisted layout is internally inconsistent
    #[error("invalid layout: {0}")]
    InvalidLayout(String),
}

impl WorktreeError {
    /// Whether the worktree/store pair may now be inconsistent
    ///
    /// Callers must treat these as fatal (prompt a reload), never retry.
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Replay { .. } | Self::MissingVersion(_) | Self::BaseMismatch { .. }
        )
    }

    /// Whether the error stems from a rejected request with no side effects
    #[inline]
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::Apply(_)
                | Self::UnknownBranch(_)
                | Self::EmptyName
                | Self::ReservedName(_)
                | Self::DuplicateName(_)
                | Self::MainBranchImmutable(_)
                | Self::ScenarioLimit(_)
        )
    }
}

/// Store tag disagrees with the active branch's recorded tag
///
/// Expected mid-replay (and corrected by the switch); an anomaly anywhere
/// else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriftWarning {
    pub branch: BranchId,
    pub expected: StateId,
    pub observed: StateId,
}

impl Display for DriftWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "model version drift on branch {}: expected {}, observed {}",
            self.branch, self.expected, self.observed
        )
    }
}

/// Errors saving or loading a persisted worktree
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// IO error
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding error
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Layout rejected while rebuilding the worktree
    #[error(transparent)]
    Worktree(#[from] WorktreeError),
}

impl PersistError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML syntax or schema error
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydronet_model::AssetId;

    #[test]
    fn replay_errors_are_fatal() {
        let err = WorktreeError::Replay {
            branch: BranchId::main(),
            index: 3,
            source: ApplyError::MissingAsset(AssetId::from("J1")),
        };
        assert!(err.is_fatal());
        assert!(!err.is_user_error());
        assert!(err.to_string().contains("delta 3"));
    }

    #[test]
    fn rejected_edits_are_user_errors() {
        let err = WorktreeError::from(ApplyError::MissingAsset(AssetId::from("J1")));
        assert!(err.is_user_error());
        assert!(!err.is_fatal());
    }
}
