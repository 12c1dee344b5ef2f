//! Branch registry and switching
//!
//! The [`Worktree`] owns every branch and version (arena plus index: branches
//! hold version ids, never references) and the shared base snapshot. Exactly
//! one branch is live in the model store at a time; its history sits in the
//! worktree's active log and is written back to its version record whenever
//! the worktree leaves it.

use crate::branch::{Branch, BranchSummary};
use crate::config::WorktreeConfig;
use crate::error::{DriftWarning, WorktreeError};
use crate::layout::WorktreeLayout;
use crate::moment_log::MomentLog;
use crate::replay;
use crate::version::Version;
use hydronet_model::{BranchId, DeltaStats, LogId, Moment, Snapshot, StateId, VersionId};
use hydronet_store::ModelStore;
use indexmap::IndexMap;

/// Result of a branch switch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchOutcome {
    /// Branch that was live before
    pub from: BranchId,
    /// Branch that is live now
    pub to: BranchId,
    /// Deltas replayed on top of the base snapshot
    pub replayed: usize,
    /// Version tag installed for the target
    pub state_id: StateId,
    /// Whether replay left the tag off the target's recorded value
    pub drift_corrected: bool,
}

impl SwitchOutcome {
    /// Whether the live branch actually changed
    #[inline]
    #[must_use]
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Registry of branches and versions over one network document
///
/// Every operation takes the model store explicitly; the worktree holds no
/// reference to it.
#[derive(Debug, Clone)]
pub struct Worktree {
    config: WorktreeConfig,
    branches: IndexMap<BranchId, Branch>,
    versions: IndexMap<VersionId, Version>,
    active_branch_id: BranchId,
    base_snapshot: Option<Snapshot>,
    /// Live history of the active branch
    log: MomentLog,
    /// Tag the worktree last left the store at
    live_state: StateId,
}

impl Worktree {
    /// Worktree for the document currently in `store`, with only "main"
    ///
    /// Elements already in the store seed main's log as its snapshot delta,
    /// so a main-only worktree can always be rebuilt from its log.
    #[must_use]
    pub fn open(store: &dyn ModelStore, config: WorktreeConfig) -> Self {
        let state_id = store.model_version();
        let mut log = MomentLog::new();
        if store.asset_count() > 0 {
            let snapshot = Snapshot::capture(state_id, store.assets());
            log.set_snapshot(snapshot.moment, state_id);
        }
        Self::with_main(config, log, state_id)
    }

    fn with_main(config: WorktreeConfig, log: MomentLog, state_id: StateId) -> Self {
        let version = Version::new(log.clone(), state_id);
        let main = Branch::new(
            BranchId::main(),
            config.main_branch_name.clone(),
            version.id.clone(),
        );

        let mut branches = IndexMap::new();
        branches.insert(main.id.clone(), main);
        let mut versions = IndexMap::new();
        versions.insert(version.id.clone(), version);

        Self {
            config,
            branches,
            versions,
            active_branch_id: BranchId::main(),
            base_snapshot: None,
            log,
            live_state: state_id,
        }
    }

    /// Rebuild from a persisted layout and materialize its active branch
    ///
    /// # Errors
    /// - [`WorktreeError::InvalidLayout`] / [`WorktreeError::BaseMismatch`]
    ///   if the layout is inconsistent (store untouched)
    /// - [`WorktreeError::Replay`] if the active branch fails to replay
    pub fn from_layout(
        layout: WorktreeLayout,
        store: &mut dyn ModelStore,
        config: WorktreeConfig,
    ) -> Result<Self, WorktreeError> {
        layout.validate()?;

        let WorktreeLayout {
            branches,
            versions,
            active_branch_id,
            base_snapshot,
        } = layout;

        let branches: IndexMap<_, _> = branches.into_iter().map(|b| (b.id.clone(), b)).collect();
        let versions: IndexMap<_, _> = versions.into_iter().map(|v| (v.id.clone(), v)).collect();

        let active = branches
            .get(&active_branch_id)
            .ok_or_else(|| WorktreeError::UnknownBranch(active_branch_id.clone()))?;
        let version_id = active.working_version_id();
        let version = versions
            .get(version_id)
            .ok_or_else(|| WorktreeError::MissingVersion(version_id.clone()))?;

        let replayed = replay::rebuild(store, base_snapshot.as_ref(), &version.log, &active_branch_id)?;
        store.set_model_version(version.state_id);
        tracing::info!(
            branch = %active_branch_id,
            branches = branches.len(),
            replayed,
            "restored worktree from layout"
        );

        Ok(Self {
            config,
            log: version.log.clone(),
            live_state: version.state_id,
            branches,
            versions,
            active_branch_id,
            base_snapshot,
        })
    }

    /// Persistable view of the worktree, with the live branch frozen in
    #[must_use]
    pub fn to_layout(&self, store: &dyn ModelStore) -> WorktreeLayout {
        let active_version = self
            .active_branch()
            .ok()
            .map(|b| b.working_version_id().clone());
        let versions = self
            .versions
            .values()
            .map(|version| {
                let mut version = version.clone();
                if active_version.as_ref() == Some(&version.id) {
                    version.freeze(&self.log, store.model_version());
                }
                version
            })
            .collect();

        WorktreeLayout {
            branches: self.branches.values().cloned().collect(),
            versions,
            active_branch_id: self.active_branch_id.clone(),
            base_snapshot: self.base_snapshot.clone(),
        }
    }

    /// Replace the document with a freshly imported one
    ///
    /// Empties the store, applies `import`, and resets the worktree to a
    /// single "main" branch whose log (with a new identity) is seeded with
    /// the import. Scenarios and the base snapshot are discarded.
    ///
    /// # Errors
    /// Returns error if the import is invalid; store and worktree are then
    /// left as they were.
    pub fn load_document(
        &mut self,
        store: &mut dyn ModelStore,
        import: Moment,
    ) -> Result<LogId, WorktreeError> {
        import.validate()?;

        let previous_state = store.model_version();
        let backup = store.capture_model_snapshot();
        store.restore_to_base(&Snapshot::empty(StateId::mint()));
        if let Err(err) = store.apply_moment(&import) {
            store.restore_to_base(&backup);
            store.set_model_version(previous_state);
            return Err(err.into());
        }

        let state_id = store.model_version();
        let mut log = MomentLog::new();
        let log_id = log.id();
        let note = import.note.clone();
        log.set_snapshot(import, state_id);

        *self = Self::with_main(self.config.clone(), log, state_id);
        tracing::info!(%log_id, note = note.as_deref(), assets = store.asset_count(), "loaded document");
        Ok(log_id)
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &WorktreeConfig {
        &self.config
    }

    /// Id of the live branch
    #[inline]
    #[must_use]
    pub fn active_branch_id(&self) -> &BranchId {
        &self.active_branch_id
    }

    /// The live branch
    ///
    /// # Errors
    /// Only if the worktree is internally inconsistent
    pub fn active_branch(&self) -> Result<&Branch, WorktreeError> {
        self.branch(&self.active_branch_id)
    }

    /// Live history of the active branch
    #[inline]
    #[must_use]
    pub fn active_log(&self) -> &MomentLog {
        &self.log
    }

    /// Shared base snapshot, once captured
    #[inline]
    #[must_use]
    pub fn base_snapshot(&self) -> Option<&Snapshot> {
        self.base_snapshot.as_ref()
    }

    /// Look up a branch
    ///
    /// # Errors
    /// [`WorktreeError::UnknownBranch`] if absent
    pub fn branch(&self, id: &BranchId) -> Result<&Branch, WorktreeError> {
        self.branches
            .get(id)
            .ok_or_else(|| WorktreeError::UnknownBranch(id.clone()))
    }

    /// Look up a branch by display name
    #[must_use]
    pub fn branch_by_name(&self, name: &str) -> Option<&Branch> {
        self.branches.values().find(|b| b.name == name)
    }

    /// Look up a version record
    #[must_use]
    pub fn version(&self, id: &VersionId) -> Option<&Version> {
        self.versions.get(id)
    }

    /// Recorded (frozen) version of a branch
    ///
    /// For the live branch this is the state as of the last freeze, not the
    /// live log.
    ///
    /// # Errors
    /// Returns error if the branch or its version is missing
    pub fn frozen_version(&self, id: &BranchId) -> Result<&Version, WorktreeError> {
        let version_id = self.branch(id)?.working_version_id();
        self.versions
            .get(version_id)
            .ok_or_else(|| WorktreeError::MissingVersion(version_id.clone()))
    }

    /// Number of branches, "main" included
    #[inline]
    #[must_use]
    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    /// Number of scenario branches
    #[inline]
    #[must_use]
    pub fn scenario_count(&self) -> usize {
        self.branches.len().saturating_sub(1)
    }

    /// Current history of a branch: live log if active, frozen log otherwise
    ///
    /// # Errors
    /// Returns error if the branch or its version is missing
    pub fn branch_log(&self, id: &BranchId) -> Result<&MomentLog, WorktreeError> {
        if *id == self.active_branch_id {
            return Ok(&self.log);
        }
        Ok(&self.frozen_version(id)?.log)
    }

    /// Delta counts of a branch above its divergence point
    ///
    /// # Errors
    /// Returns error if the branch or its version is missing
    pub fn branch_stats(&self, id: &BranchId) -> Result<DeltaStats, WorktreeError> {
        Ok(self.branch_log(id)?.stats())
    }

    /// Display row for one branch
    ///
    /// # Errors
    /// Returns error if the branch or its version is missing
    pub fn branch_summary(&self, id: &BranchId) -> Result<BranchSummary, WorktreeError> {
        let branch = self.branch(id)?;
        let log = self.branch_log(id)?;
        Ok(BranchSummary {
            id: branch.id.clone(),
            name: branch.name.clone(),
            is_active: *id == self.active_branch_id,
            is_main: branch.is_main(),
            has_draft: branch.draft_version_id.is_some(),
            stats: log.stats(),
            pointer: log.relative_pointer(),
        })
    }

    /// Display rows for every branch, in creation order
    ///
    /// # Errors
    /// Returns error if any branch's version is missing
    pub fn branches(&self) -> Result<Vec<BranchSummary>, WorktreeError> {
        self.branches
            .keys()
            .map(|id| self.branch_summary(id))
            .collect()
    }

    // ---------------------------------------------------------------------
    // Edits and undo/redo
    // ---------------------------------------------------------------------

    /// Validate, apply and record a new edit on the active branch
    ///
    /// Empty moments are accepted and ignored.
    ///
    /// # Errors
    /// [`WorktreeError::Validation`] / [`WorktreeError::Apply`] if rejected;
    /// neither store nor log changes.
    pub fn commit(
        &mut self,
        store: &mut dyn ModelStore,
        moment: Moment,
    ) -> Result<StateId, WorktreeError> {
        moment.validate()?;
        if moment.is_empty() {
            return Ok(store.model_version());
        }
        self.report_drift(store);

        let inverse = store.apply_moment(&moment)?;
        tracing::debug!(
            branch = %self.active_branch_id,
            note = moment.note.as_deref(),
            puts = moment.put_assets.len(),
            deletes = moment.delete_assets.len(),
            "committed moment"
        );
        self.log.append(moment, inverse);
        self.live_state = store.model_version();
        Ok(self.live_state)
    }

    /// Whether the active branch can step back
    #[inline]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.log.can_undo()
    }

    /// Whether the active branch can step forward
    #[inline]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.log.can_redo()
    }

    /// Revert the active branch's latest applied delta
    ///
    /// Returns `false` (no-op) when nothing can be undone.
    ///
    /// # Errors
    /// [`WorktreeError::Replay`] if the recorded inverse no longer applies
    pub fn undo(&mut self, store: &mut dyn ModelStore) -> Result<bool, WorktreeError> {
        let Some(entry) = self.log.undo_target() else {
            return Ok(false);
        };
        let inverse = entry.inverse.clone();
        self.report_drift(store);

        store
            .apply_moment(&inverse)
            .map_err(|source| self.history_error(self.log.pointer(), source))?;
        self.log.undo();
        self.live_state = store.model_version();
        tracing::debug!(branch = %self.active_branch_id, pointer = self.log.pointer(), "undo");
        Ok(true)
    }

    /// Re-apply the active branch's next undone delta
    ///
    /// Returns `false` (no-op) when nothing can be redone.
    ///
    /// # Errors
    /// [`WorktreeError::Replay`] if the recorded delta no longer applies
    pub fn redo(&mut self, store: &mut dyn ModelStore) -> Result<bool, WorktreeError> {
        let Some(entry) = self.log.redo_target() else {
            return Ok(false);
        };
        let moment = entry.moment.clone();
        self.report_drift(store);

        store
            .apply_moment(&moment)
            .map_err(|source| self.history_error(self.log.pointer() + 1, source))?;
        self.log.redo();
        self.live_state = store.model_version();
        tracing::debug!(branch = %self.active_branch_id, pointer = self.log.pointer(), "redo");
        Ok(true)
    }

    fn history_error(&self, index: isize, source: hydronet_store::ApplyError) -> WorktreeError {
        tracing::error!(branch = %self.active_branch_id, index, %source, "recorded history failed to apply");
        WorktreeError::Replay {
            branch: self.active_branch_id.clone(),
            index: usize::try_from(index).unwrap_or_default(),
            source,
        }
    }

    // ---------------------------------------------------------------------
    // Drift
    // ---------------------------------------------------------------------

    /// Compare the store's tag against the tag the worktree left it at
    #[must_use]
    pub fn drift(&self, store: &dyn ModelStore) -> Option<DriftWarning> {
        let observed = store.model_version();
        (observed != self.live_state).then(|| DriftWarning {
            branch: self.active_branch_id.clone(),
            expected: self.live_state,
            observed,
        })
    }

    /// Log drift found outside a switch; it means something bypassed the log
    fn report_drift(&self, store: &dyn ModelStore) {
        if !self.config.report_drift {
            return;
        }
        if let Some(warning) = self.drift(store) {
            tracing::warn!(
                branch = %warning.branch,
                expected = %warning.expected,
                observed = %warning.observed,
                "model version drift outside branch switch"
            );
        }
    }

    // ---------------------------------------------------------------------
    // Branch lifecycle
    // ---------------------------------------------------------------------

    /// First "<prefix> N" name not taken yet
    #[must_use]
    pub fn next_scenario_name(&self) -> String {
        let prefix = &self.config.scenario_name_prefix;
        (self.scenario_count() + 1..)
            .map(|n| format!("{prefix} {n}"))
            .find(|name| self.branch_by_name(name).is_none())
            .unwrap_or_else(|| prefix.clone())
    }

    /// Create a scenario branch seeded from the base snapshot and switch to it
    ///
    /// The base snapshot is captured from the store on first use, freezing
    /// the divergence point shared by every scenario created afterwards.
    ///
    /// # Errors
    /// Returns error if the name is empty, reserved or taken, or the scenario
    /// cap is reached. Nothing changes in those cases.
    pub fn create_scenario(
        &mut self,
        store: &mut dyn ModelStore,
        name: impl Into<String>,
    ) -> Result<BranchId, WorktreeError> {
        let name = self.validate_name(&name.into(), None)?;
        if let Some(max) = self.config.max_scenarios {
            if self.scenario_count() >= max {
                return Err(WorktreeError::ScenarioLimit(max));
            }
        }
        self.report_drift(store);

        if self.base_snapshot.is_none() {
            let snapshot = store.capture_model_snapshot();
            self.log.raise_floor(snapshot.state_id);
            self.live_state = snapshot.state_id;
            tracing::info!(
                state_id = %snapshot.state_id,
                assets = snapshot.asset_count(),
                "captured base snapshot"
            );
            self.base_snapshot = Some(snapshot);
        }
        self.freeze_active(store)?;

        let base = self
            .base_snapshot
            .as_ref()
            .ok_or_else(|| WorktreeError::InvalidLayout("base snapshot missing".to_string()))?;

        let mut log = MomentLog::new();
        log.set_snapshot(base.moment.clone(), base.state_id);
        let version = Version::new(log, base.state_id);
        let branch = Branch::new(BranchId::generate(), name, version.id.clone());
        let branch_id = branch.id.clone();

        store.restore_to_base(base);
        self.log = version.log.clone();
        self.live_state = base.state_id;
        self.active_branch_id = branch_id.clone();

        tracing::info!(branch = %branch_id, name = %branch.name, "created scenario");
        self.versions.insert(version.id.clone(), version);
        self.branches.insert(branch_id.clone(), branch);
        Ok(branch_id)
    }

    /// Make `target` the live branch
    ///
    /// 1. Freeze the active branch (log and tag written to its version)
    /// 2. Restore the store to the base snapshot
    /// 3. Replay the target's deltas in recorded order
    /// 4. Install the target's recorded tag and bind its log
    ///
    /// Switching to the active branch is a no-op.
    ///
    /// # Errors
    /// - [`WorktreeError::UnknownBranch`] / [`WorktreeError::BaseMismatch`]
    ///   before anything changes
    /// - [`WorktreeError::Replay`] mid-switch: fatal, state undefined
    pub fn switch_branch(
        &mut self,
        store: &mut dyn ModelStore,
        target: &BranchId,
    ) -> Result<SwitchOutcome, WorktreeError> {
        let from = self.active_branch_id.clone();
        if *target == from {
            return Ok(SwitchOutcome {
                from,
                to: target.clone(),
                replayed: 0,
                state_id: store.model_version(),
                drift_corrected: false,
            });
        }

        let target_version = self.frozen_version(target)?;
        let base = self
            .base_snapshot
            .clone()
            .ok_or_else(|| WorktreeError::UnknownBranch(target.clone()))?;
        if let Some(seeded) = target_version.log.base_state() {
            if seeded != base.state_id {
                return Err(WorktreeError::BaseMismatch {
                    branch: target.clone(),
                    expected: base.state_id,
                    actual: seeded,
                });
            }
        }
        let target_log = target_version.log.clone();
        let target_state = target_version.state_id;

        // 1. freeze
        self.report_drift(store);
        self.freeze_active(store)?;

        // 2 + 3. restore and replay
        let replayed = replay::rebuild(store, Some(&base), &target_log, target)?;

        // 4. finalize
        let observed = store.model_version();
        let drift_corrected = observed != target_state;
        if drift_corrected {
            tracing::debug!(
                branch = %target,
                expected = %target_state,
                observed = %observed,
                "correcting version tag after replay"
            );
        }
        store.set_model_version(target_state);
        self.log = target_log;
        self.live_state = target_state;
        self.active_branch_id = target.clone();

        tracing::info!(%from, to = %target, replayed, "switched branch");
        Ok(SwitchOutcome {
            from,
            to: target.clone(),
            replayed,
            state_id: target_state,
            drift_corrected,
        })
    }

    /// Rename a scenario branch
    ///
    /// # Errors
    /// Returns error for "main", unknown branches, and invalid names
    pub fn rename_branch(&mut self, id: &BranchId, name: impl Into<String>) -> Result<(), WorktreeError> {
        if id.is_main() {
            return Err(WorktreeError::MainBranchImmutable("renamed"));
        }
        self.branch(id)?;
        let name = self.validate_name(&name.into(), Some(id))?;

        if let Some(branch) = self.branches.get_mut(id) {
            tracing::info!(branch = %id, from = %branch.name, to = %name, "renamed branch");
            branch.name = name;
        }
        Ok(())
    }

    /// Delete a scenario branch and its versions
    ///
    /// Deleting the active branch switches to "main" first.
    ///
    /// # Errors
    /// Returns error for "main" and unknown branches, or if the fallback
    /// switch fails
    pub fn delete_branch(
        &mut self,
        store: &mut dyn ModelStore,
        id: &BranchId,
    ) -> Result<Branch, WorktreeError> {
        if id.is_main() {
            return Err(WorktreeError::MainBranchImmutable("deleted"));
        }
        self.branch(id)?;

        if *id == self.active_branch_id {
            self.switch_branch(store, &BranchId::main())?;
        }

        let branch = self
            .branches
            .shift_remove(id)
            .ok_or_else(|| WorktreeError::UnknownBranch(id.clone()))?;
        for version_id in branch.version_ids() {
            self.versions.shift_remove(version_id);
        }
        tracing::info!(branch = %id, name = %branch.name, "deleted branch");
        Ok(branch)
    }

    /// Write the live log and store tag back to the active version
    fn freeze_active(&mut self, store: &dyn ModelStore) -> Result<(), WorktreeError> {
        let version_id = self.branch(&self.active_branch_id)?.working_version_id().clone();
        let version = self
            .versions
            .get_mut(&version_id)
            .ok_or(WorktreeError::MissingVersion(version_id))?;
        version.freeze(&self.log, store.model_version());
        Ok(())
    }

    fn validate_name(&self, name: &str, renaming: Option<&BranchId>) -> Result<String, WorktreeError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WorktreeError::EmptyName);
        }
        if name == self.config.main_branch_name || name == BranchId::MAIN {
            return Err(WorktreeError::ReservedName(name.to_string()));
        }
        let taken = self
            .branches
            .values()
            .any(|b| b.name == name && Some(&b.id) != renaming);
        if taken {
            return Err(WorktreeError::DuplicateName(name.to_string()));
        }
        Ok(name.to_string())
    }
}
