//! Editing session
//!
//! Bundles a [`Worktree`], the live [`ModelStore`] it drives and the cached
//! simulation results for that store. Results are keyed by the store's
//! version tag, so edits make them stale without explicit bookkeeping; a
//! branch switch drops them outright once the target is materialized.

use crate::error::WorktreeError;
use crate::worktree::{SwitchOutcome, Worktree};
use hydronet_model::{BranchId, LogId, Moment, StateId};
use hydronet_store::{ModelStore, SimulationCache};

/// Worktree, store and simulation cache for one open document
#[derive(Debug)]
pub struct Session<S, R> {
    worktree: Worktree,
    store: S,
    results: SimulationCache<R>,
}

impl<S: ModelStore, R> Session<S, R> {
    /// Session over an existing worktree/store pair
    pub fn new(worktree: Worktree, store: S) -> Self {
        Self {
            worktree,
            store,
            results: SimulationCache::new(),
        }
    }

    /// The worktree
    #[inline]
    #[must_use]
    pub fn worktree(&self) -> &Worktree {
        &self.worktree
    }

    /// The live document
    #[inline]
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Split into parts
    pub fn into_parts(self) -> (Worktree, S) {
        (self.worktree, self.store)
    }

    /// Replace the document with an import
    ///
    /// # Errors
    /// See [`Worktree::load_document`]
    pub fn load_document(&mut self, import: Moment) -> Result<LogId, WorktreeError> {
        let log_id = self.worktree.load_document(&mut self.store, import)?;
        self.results.invalidate();
        Ok(log_id)
    }

    /// See [`Worktree::commit`]
    ///
    /// # Errors
    /// Returns error if the edit is rejected
    pub fn commit(&mut self, moment: Moment) -> Result<StateId, WorktreeError> {
        self.worktree.commit(&mut self.store, moment)
    }

    /// See [`Worktree::undo`]
    ///
    /// # Errors
    /// Fatal if recorded history fails to apply
    pub fn undo(&mut self) -> Result<bool, WorktreeError> {
        self.worktree.undo(&mut self.store)
    }

    /// See [`Worktree::redo`]
    ///
    /// # Errors
    /// Fatal if recorded history fails to apply
    pub fn redo(&mut self) -> Result<bool, WorktreeError> {
        self.worktree.redo(&mut self.store)
    }

    /// Create a scenario and make it live
    ///
    /// # Errors
    /// See [`Worktree::create_scenario`]
    pub fn create_scenario(&mut self, name: impl Into<String>) -> Result<BranchId, WorktreeError> {
        let id = self.worktree.create_scenario(&mut self.store, name)?;
        self.results.invalidate();
        Ok(id)
    }

    /// Switch branches, dropping cached results after the target is live
    ///
    /// # Errors
    /// See [`Worktree::switch_branch`]
    pub fn switch_branch(&mut self, target: &BranchId) -> Result<SwitchOutcome, WorktreeError> {
        let outcome = self.worktree.switch_branch(&mut self.store, target)?;
        if outcome.changed() && self.results.invalidate() {
            tracing::debug!(branch = %outcome.to, "dropped simulation results");
        }
        Ok(outcome)
    }

    /// See [`Worktree::delete_branch`]
    ///
    /// # Errors
    /// See [`Worktree::delete_branch`]
    pub fn delete_branch(&mut self, id: &BranchId) -> Result<(), WorktreeError> {
        let was_active = self.worktree.active_branch_id() == id;
        self.worktree.delete_branch(&mut self.store, id)?;
        if was_active {
            self.results.invalidate();
        }
        Ok(())
    }

    /// Record solver output for the current document
    pub fn record_results(&mut self, results: R) {
        self.results.store(self.store.model_version(), results);
    }

    /// Solver output, if it matches the current document
    #[must_use]
    pub fn results(&self) -> Option<&R> {
        self.results.get(self.store.model_version())
    }
}
