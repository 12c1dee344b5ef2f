//! Named timelines

use hydronet_model::{BranchId, DeltaStats, VersionId};
use serde::{Deserialize, Serialize};

/// Named, independently undo-able timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    /// Branch identity
    pub id: BranchId,
    /// Display name, unique within a worktree
    pub name: String,
    /// Committed version
    pub head_revision_id: VersionId,
    /// In-progress version layered beyond the head
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_version_id: Option<VersionId>,
}

impl Branch {
    /// New branch without a draft
    #[inline]
    #[must_use]
    pub fn new(id: BranchId, name: impl Into<String>, head_revision_id: VersionId) -> Self {
        Self {
            id,
            name: name.into(),
            head_revision_id,
            draft_version_id: None,
        }
    }

    /// Version that edits land on: the draft when present, else the head
    #[inline]
    #[must_use]
    pub fn working_version_id(&self) -> &VersionId {
        self.draft_version_id
            .as_ref()
            .unwrap_or(&self.head_revision_id)
    }

    /// Every version this branch owns
    pub fn version_ids(&self) -> impl Iterator<Item = &VersionId> {
        std::iter::once(&self.head_revision_id).chain(self.draft_version_id.as_ref())
    }

    /// Whether this is the main branch
    #[inline]
    #[must_use]
    pub fn is_main(&self) -> bool {
        self.id.is_main()
    }
}

/// Display row for the scenario switcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchSummary {
    pub id: BranchId,
    pub name: String,
    pub is_active: bool,
    pub is_main: bool,
    pub has_draft: bool,
    /// Applied delta counts above the divergence point
    pub stats: DeltaStats,
    /// Undo position relative to the divergence point
    pub pointer: isize,
}
