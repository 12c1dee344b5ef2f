//! Transactional deltas on the network document
//!
//! Provides [`Moment`], the unit of change recorded in moment logs and
//! replayed when switching branches.

use crate::asset::AssetState;
use crate::id::AssetId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::ops::AddAssign;

/// Note prefix used by file imports
pub const IMPORT_NOTE_PREFIX: &str = "Import";

/// Atomic delta: created/updated elements plus deleted ids
///
/// # Invariants
/// - No id appears in both `put_assets` and `delete_assets`
/// - No id is put twice
///
/// Both are checked by [`Moment::validate`]; stores and worktrees call it
/// before anything reaches a log.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Moment {
    /// Optional human-readable label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// Created or updated elements, in application order
    #[serde(default)]
    pub put_assets: Vec<(AssetId, AssetState)>,

    /// Removed elements
    #[serde(default)]
    pub delete_assets: BTreeSet<AssetId>,
}

impl Moment {
    /// Empty moment
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty moment with a note
    #[inline]
    #[must_use]
    pub fn with_note(note: impl Into<String>) -> Self {
        Self {
            note: Some(note.into()),
            ..Self::default()
        }
    }

    /// Start building a moment
    #[inline]
    #[must_use]
    pub fn builder() -> MomentBuilder {
        MomentBuilder::new()
    }

    /// Whether the moment changes nothing
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.put_assets.is_empty() && self.delete_assets.is_empty()
    }

    /// Whether this moment came from a file import
    #[must_use]
    pub fn is_import(&self) -> bool {
        self.note
            .as_deref()
            .is_some_and(|n| n.starts_with(IMPORT_NOTE_PREFIX))
    }

    /// Put/delete counts for this moment
    #[inline]
    #[must_use]
    pub fn stats(&self) -> DeltaStats {
        DeltaStats {
            deltas: 1,
            puts: self.put_assets.len(),
            deletes: self.delete_assets.len(),
        }
    }

    /// Look up a put by id
    #[must_use]
    pub fn put(&self, id: &AssetId) -> Option<&AssetState> {
        self.put_assets
            .iter()
            .find_map(|(put_id, state)| (put_id == id).then_some(state))
    }

    /// Check structural invariants
    ///
    /// # Errors
    /// - [`ValidationError::PutAndDelete`] if an id is both put and deleted
    /// - [`ValidationError::DuplicatePut`] if an id is put more than once
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::with_capacity(self.put_assets.len());
        for (id, _) in &self.put_assets {
            if self.delete_assets.contains(id) {
                return Err(ValidationError::PutAndDelete(id.clone()));
            }
            if !seen.insert(id) {
                return Err(ValidationError::DuplicatePut(id.clone()));
            }
        }
        Ok(())
    }
}

/// Delta counts for display and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeltaStats {
    /// Number of moments
    pub deltas: usize,
    /// Total puts across moments
    pub puts: usize,
    /// Total deletes across moments
    pub deletes: usize,
}

impl AddAssign for DeltaStats {
    fn add_assign(&mut self, rhs: Self) {
        self.deltas += rhs.deltas;
        self.puts += rhs.puts;
        self.deletes += rhs.deletes;
    }
}

impl<'a> FromIterator<&'a Moment> for DeltaStats {
    fn from_iter<I: IntoIterator<Item = &'a Moment>>(iter: I) -> Self {
        let mut stats = Self::default();
        for moment in iter {
            stats += moment.stats();
        }
        stats
    }
}

/// Rejected moments
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Same id in puts and deletes
    #[error("asset {0} is both put and deleted in one moment")]
    PutAndDelete(AssetId),

    /// Same id put twice
    #[error("asset {0} is put more than once in one moment")]
    DuplicatePut(AssetId),
}

/// Builder for constructing moments
#[derive(Debug, Default)]
pub struct MomentBuilder {
    note: Option<String>,
    put_assets: Vec<(AssetId, AssetState)>,
    delete_assets: BTreeSet<AssetId>,
}

impl MomentBuilder {
    /// Create new builder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set note
    #[inline]
    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Add a put
    #[inline]
    #[must_use]
    pub fn put(mut self, id: impl Into<AssetId>, state: AssetState) -> Self {
        self.put_assets.push((id.into(), state));
        self
    }

    /// Add a delete
    #[inline]
    #[must_use]
    pub fn delete(mut self, id: impl Into<AssetId>) -> Self {
        self.delete_assets.insert(id.into());
        self
    }

    /// Build and validate
    ///
    /// # Errors
    /// Returns error if the moment violates its invariants
    pub fn build(self) -> Result<Moment, ValidationError> {
        let moment = Moment {
            note: self.note,
            put_assets: self.put_assets,
            delete_assets: self.delete_assets,
        };
        moment.validate()?;
        Ok(moment)
    }
}
