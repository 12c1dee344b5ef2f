//! Model store contract
//!
//! Provides the [`ModelStore`] trait: the live, mutable network document that
//! moment logs and worktrees drive.

use crate::error::ApplyError;
use hydronet_model::{AssetId, AssetState, Fingerprint, FingerprintError, Moment, Snapshot, StateId};
use std::fmt::Debug;

/// Live network document
///
/// Two write paths share the same transactional semantics:
/// - [`apply_moment`](Self::apply_moment) records a genuine new edit and
///   mints a fresh version tag.
/// - [`materialize`](Self::materialize) lands a moment without touching the
///   tag. Replay and restore go through this path.
///
/// # Contract
/// - Either every put/delete of a moment lands or none does
/// - Both write paths return the inverse moment, computed against the state
///   the moment was applied to
/// - `restore_to_base` is idempotent
pub trait ModelStore: Debug {
    /// Apply a new edit and mint a fresh version tag
    ///
    /// # Errors
    /// Returns error (leaving the store unchanged) if the moment is invalid
    /// or inconsistent with the current document
    fn apply_moment(&mut self, moment: &Moment) -> Result<Moment, ApplyError>;

    /// Land a moment without changing the version tag
    ///
    /// # Errors
    /// Same as [`apply_moment`](Self::apply_moment)
    fn materialize(&mut self, moment: &Moment) -> Result<Moment, ApplyError>;

    /// Capture every element into a snapshot under a freshly minted tag
    ///
    /// The store adopts the minted tag as its current version.
    fn capture_model_snapshot(&mut self) -> Snapshot;

    /// Replace the whole document with exactly the snapshot's elements
    fn restore_to_base(&mut self, snapshot: &Snapshot);

    /// Current version tag
    fn model_version(&self) -> StateId;

    /// Overwrite the version tag
    fn set_model_version(&mut self, state_id: StateId);

    /// Look up an element
    fn asset(&self, id: &AssetId) -> Option<&AssetState>;

    /// Iterate over every element
    fn assets(&self) -> Box<dyn Iterator<Item = (&AssetId, &AssetState)> + '_>;

    /// Number of elements
    fn asset_count(&self) -> usize {
        self.assets().count()
    }

    /// Sorted element ids
    fn asset_ids(&self) -> Vec<AssetId> {
        let mut ids: Vec<_> = self.assets().map(|(id, _)| id.clone()).collect();
        ids.sort();
        ids
    }

    /// Content digest of the current document
    ///
    /// # Errors
    /// Returns error if an element fails to serialize
    fn fingerprint(&self) -> Result<Fingerprint, FingerprintError> {
        Fingerprint::of_assets(self.assets())
    }
}
