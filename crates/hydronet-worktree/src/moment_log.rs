//! Append-only moment history with an undo/redo pointer
//!
//! The log is a dumb history: it never looks at the live document. Callers
//! apply the moments it hands out and move the pointer once application
//! succeeded.

use hydronet_model::{DeltaStats, LogId, Moment, StateId};
use serde::{Deserialize, Serialize};

/// One recorded delta plus the moment that reverts it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedMoment {
    /// Forward delta, as committed
    pub moment: Moment,
    /// Inverse computed by the store when the delta first landed
    pub inverse: Moment,
}

/// Ordered history of moments for one timeline
///
/// # Invariants
/// - `-1 <= floor <= pointer <= len - 1` (with `pointer = -1` for no history)
/// - Entries at or below `floor` are folded into the base snapshot and are
///   never undone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomentLog {
    id: LogId,
    deltas: Vec<LoggedMoment>,
    pointer: isize,
    floor: isize,
    /// Tag of the snapshot this log was seeded from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_state: Option<StateId>,
}

impl MomentLog {
    /// Empty log with a fresh identity
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: LogId::new(),
            deltas: Vec::new(),
            pointer: -1,
            floor: -1,
            base_state: None,
        }
    }

    /// Log identity
    #[inline]
    #[must_use]
    pub fn id(&self) -> LogId {
        self.id
    }

    /// Index of the last applied delta, `-1` when none
    #[inline]
    #[must_use]
    pub fn pointer(&self) -> isize {
        self.pointer
    }

    /// Last index folded into the base snapshot
    #[inline]
    #[must_use]
    pub fn floor(&self) -> isize {
        self.floor
    }

    /// Pointer counted from the floor: `-1` when no user delta is applied
    #[inline]
    #[must_use]
    pub fn relative_pointer(&self) -> isize {
        self.pointer - self.floor - 1
    }

    /// Snapshot tag this log was seeded from
    #[inline]
    #[must_use]
    pub fn base_state(&self) -> Option<StateId> {
        self.base_state
    }

    /// Total recorded deltas, including any undone tail
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    /// Whether nothing has been recorded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// Every recorded entry, including the undone tail
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[LoggedMoment] {
        &self.deltas
    }

    /// Copy of this log under a fresh identity
    #[must_use]
    pub fn fork(&self) -> Self {
        Self {
            id: LogId::new(),
            ..self.clone()
        }
    }

    /// Record a delta, forfeiting any undone tail
    pub fn append(&mut self, moment: Moment, inverse: Moment) {
        let keep = usize::try_from(self.pointer + 1).unwrap_or(0);
        self.deltas.truncate(keep);
        self.deltas.push(LoggedMoment { moment, inverse });
        self.pointer = self.last_index();
    }

    /// Entry that [`undo`](Self::undo) would revert
    #[must_use]
    pub fn undo_target(&self) -> Option<&LoggedMoment> {
        if self.pointer > self.floor {
            self.entry(self.pointer)
        } else {
            None
        }
    }

    /// Entry that [`redo`](Self::redo) would re-apply
    #[must_use]
    pub fn redo_target(&self) -> Option<&LoggedMoment> {
        if self.pointer < self.last_index() {
            self.entry(self.pointer + 1)
        } else {
            None
        }
    }

    /// Whether undo would do anything
    #[inline]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.undo_target().is_some()
    }

    /// Whether redo would do anything
    #[inline]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.redo_target().is_some()
    }

    /// Step back one delta; `false` at the lower boundary
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.pointer -= 1;
        true
    }

    /// Step forward one delta; `false` at the upper boundary
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.pointer += 1;
        true
    }

    /// Applied deltas strictly after `from_pointer`, up to the pointer
    pub fn get_deltas(&self, from_pointer: isize) -> impl Iterator<Item = &Moment> + '_ {
        self.applied_after(from_pointer).map(|(_, moment)| moment)
    }

    /// Applied deltas above the floor, with their log indices
    ///
    /// This is what replays on top of the base snapshot.
    pub fn replay_deltas(&self) -> impl Iterator<Item = (usize, &Moment)> + '_ {
        self.applied_after(self.floor)
    }

    /// Every applied delta from the start of the log, with indices
    pub fn all_applied(&self) -> impl Iterator<Item = (usize, &Moment)> + '_ {
        self.applied_after(-1)
    }

    /// Counts over applied deltas above the floor
    #[must_use]
    pub fn stats(&self) -> DeltaStats {
        self.replay_deltas().map(|(_, moment)| moment).collect()
    }

    /// Reset to a single synthetic full-state delta
    ///
    /// Discards all history; pointer and floor become 0.
    pub fn set_snapshot(&mut self, moment: Moment, state_id: StateId) {
        self.deltas = vec![LoggedMoment {
            moment,
            inverse: Moment::default(),
        }];
        self.pointer = 0;
        self.floor = 0;
        self.base_state = Some(state_id);
    }

    /// Fold everything up to the pointer into the base
    pub fn raise_floor(&mut self, state_id: StateId) {
        self.floor = self.pointer;
        self.base_state = Some(state_id);
    }

    /// Check structural invariants (used on loaded layouts)
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        -1 <= self.floor && self.floor <= self.pointer && self.pointer <= self.last_index()
    }

    fn last_index(&self) -> isize {
        isize::try_from(self.deltas.len()).map_or(isize::MAX, |len| len - 1)
    }

    fn entry(&self, index: isize) -> Option<&LoggedMoment> {
        usize::try_from(index).ok().and_then(|i| self.deltas.get(i))
    }

    fn applied_after(&self, from_pointer: isize) -> impl Iterator<Item = (usize, &Moment)> + '_ {
        let start = usize::try_from(from_pointer + 1).unwrap_or(0);
        let end = usize::try_from(self.pointer + 1).unwrap_or(0);
        self.deltas
            .iter()
            .enumerate()
            .take(end)
            .skip(start)
            .map(|(index, entry)| (index, &entry.moment))
    }
}

impl Default for MomentLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydronet_test_utils::{add_junction, close_p1, delete_asset, sample_network};

    fn log_with(n: usize) -> MomentLog {
        let mut log = MomentLog::new();
        for i in 0..n {
            log.append(add_junction(&format!("J{i}")), delete_asset(&format!("J{i}")));
        }
        log
    }

    #[test]
    fn new_log_has_no_history() {
        let log = MomentLog::new();
        assert_eq!(log.pointer(), -1);
        assert!(log.is_empty());
        assert!(!log.can_undo());
        assert!(!log.can_redo());
        assert_eq!(log.get_deltas(-1).count(), 0);
    }

    #[test]
    fn append_advances_pointer() {
        let log = log_with(3);
        assert_eq!(log.pointer(), 2);
        assert_eq!(log.len(), 3);
        assert_eq!(log.get_deltas(-1).count(), 3);
        assert_eq!(log.get_deltas(0).count(), 2);
    }

    #[test]
    fn undo_redo_boundaries() {
        let mut log = log_with(2);
        assert!(!log.redo());
        assert!(log.undo());
        assert!(log.undo());
        assert_eq!(log.pointer(), -1);
        assert!(!log.undo());
        assert!(log.redo());
        assert_eq!(log.pointer(), 0);
    }

    #[test]
    fn undo_target_is_current_entry() {
        let mut log = log_with(2);
        assert_eq!(log.undo_target().unwrap().moment, add_junction("J1"));
        log.undo();
        assert_eq!(log.redo_target().unwrap().moment, add_junction("J1"));
        assert_eq!(log.undo_target().unwrap().inverse, delete_asset("J0"));
    }

    #[test]
    fn append_after_undo_discards_tail() {
        let mut log = log_with(3);
        log.undo();
        log.undo();
        log.append(close_p1(), close_p1());

        assert_eq!(log.len(), 2);
        assert_eq!(log.pointer(), 1);
        assert!(!log.redo());
        assert_eq!(log.get_deltas(-1).last(), Some(&close_p1()));
    }

    #[test]
    fn get_deltas_stops_at_pointer() {
        let mut log = log_with(3);
        log.undo();
        let deltas: Vec<_> = log.get_deltas(-1).cloned().collect();
        assert_eq!(deltas, vec![add_junction("J0"), add_junction("J1")]);
    }

    #[test]
    fn set_snapshot_resets_history() {
        let mut log = log_with(3);
        let id = log.id();
        let tag = StateId::mint();
        log.set_snapshot(sample_network(), tag);

        assert_eq!(log.id(), id);
        assert_eq!(log.len(), 1);
        assert_eq!(log.pointer(), 0);
        assert_eq!(log.floor(), 0);
        assert_eq!(log.relative_pointer(), -1);
        assert_eq!(log.base_state(), Some(tag));
        assert!(!log.can_undo());
        assert_eq!(log.replay_deltas().count(), 0);
        assert_eq!(log.stats(), DeltaStats::default());
    }

    #[test]
    fn floor_blocks_undo() {
        let mut log = log_with(2);
        log.raise_floor(StateId::mint());
        assert!(!log.can_undo());

        log.append(close_p1(), close_p1());
        assert_eq!(log.relative_pointer(), 0);
        assert!(log.undo());
        assert!(!log.undo());
        assert_eq!(log.pointer(), 1);
    }

    #[test]
    fn stats_cover_deltas_above_floor() {
        let mut log = MomentLog::new();
        log.set_snapshot(sample_network(), StateId::mint());
        log.append(close_p1(), close_p1());

        assert_eq!(
            log.stats(),
            DeltaStats {
                deltas: 1,
                puts: 1,
                deletes: 0
            }
        );
        assert_eq!(log.relative_pointer(), 0);
        let replayed: Vec<_> = log.replay_deltas().map(|(i, _)| i).collect();
        assert_eq!(replayed, vec![1]);
    }

    #[test]
    fn fork_keeps_history_under_new_id() {
        let mut log = log_with(2);
        log.undo();
        let fork = log.fork();

        assert_ne!(fork.id(), log.id());
        assert_eq!(fork.entries(), log.entries());
        assert_eq!(fork.pointer(), 0);
        assert!(fork.can_redo());
    }

    #[test]
    fn consistency_check() {
        let log = log_with(2);
        assert!(log.is_consistent());

        let mut broken = log.clone();
        broken.pointer = 5;
        assert!(!broken.is_consistent());
    }
}
