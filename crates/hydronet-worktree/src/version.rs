//! Per-branch version records

use crate::moment_log::MomentLog;
use hydronet_model::{DeltaStats, StateId, VersionId};
use serde::{Deserialize, Serialize};

/// One branch's frozen timeline
///
/// The log is always relative to the worktree's base snapshot: replaying it
/// means restoring that snapshot and re-applying the deltas above the floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    /// Version identity
    pub id: VersionId,
    /// Deltas, pointer and floor as of the last freeze
    pub log: MomentLog,
    /// Model version tag as of the last freeze
    pub state_id: StateId,
}

impl Version {
    /// New version with a generated id
    #[inline]
    #[must_use]
    pub fn new(log: MomentLog, state_id: StateId) -> Self {
        Self {
            id: VersionId::generate(),
            log,
            state_id,
        }
    }

    /// Record the live timeline onto this version
    pub fn freeze(&mut self, log: &MomentLog, state_id: StateId) {
        self.log.clone_from(log);
        self.state_id = state_id;
    }

    /// Delta counts above the floor
    #[inline]
    #[must_use]
    pub fn stats(&self) -> DeltaStats {
        self.log.stats()
    }
}
