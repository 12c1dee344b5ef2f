//! Snapshot-and-replay reconstruction
//!
//! Rebuilds a branch's document from the shared base: restore the base
//! snapshot, then materialize the branch's deltas in recorded order. Replay
//! goes through [`ModelStore::materialize`], so it never mints version tags;
//! the caller installs the branch's recorded tag afterwards.

use crate::error::WorktreeError;
use crate::moment_log::MomentLog;
use hydronet_model::{BranchId, Moment, Snapshot, StateId};
use hydronet_store::ModelStore;

/// Restore `base` and replay `log` on top of it
///
/// Without a base snapshot (only "main" exists) the base is the empty
/// document and every applied delta replays, including those at or below the
/// floor.
///
/// Returns the number of deltas replayed.
///
/// # Errors
/// [`WorktreeError::Replay`] if any delta fails to land. The store is then
/// partially rebuilt and must be considered undefined.
pub(crate) fn rebuild(
    store: &mut dyn ModelStore,
    base: Option<&Snapshot>,
    log: &MomentLog,
    branch: &BranchId,
) -> Result<usize, WorktreeError> {
    match base {
        Some(snapshot) => {
            store.restore_to_base(snapshot);
            replay(store, log.replay_deltas(), branch)
        }
        None => {
            store.restore_to_base(&Snapshot::empty(StateId::mint()));
            replay(store, log.all_applied(), branch)
        }
    }
}

/// Materialize deltas strictly in the order given
fn replay<'a, I>(store: &mut dyn ModelStore, deltas: I, branch: &BranchId) -> Result<usize, WorktreeError>
where
    I: IntoIterator<Item = (usize, &'a Moment)>,
{
    let mut replayed = 0;
    for (index, moment) in deltas {
        store
            .materialize(moment)
            .map_err(|source| WorktreeError::Replay {
                branch: branch.clone(),
                index,
                source,
            })?;
        tracing::trace!(%branch, index, note = moment.note.as_deref(), "replayed delta");
        replayed += 1;
    }
    Ok(replayed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydronet_model::AssetId;
    use hydronet_store::{ApplyError, HydraulicModel};
    use hydronet_test_utils::{add_junction, close_p1, delete_asset, sample_network};

    #[test]
    fn rebuild_on_base_skips_floor() {
        let mut model = HydraulicModel::new();
        model.apply_moment(&sample_network()).unwrap();
        let base = model.capture_model_snapshot();

        let mut log = MomentLog::new();
        log.set_snapshot(base.moment.clone(), base.state_id);
        log.append(close_p1(), Moment::default());

        let mut target = HydraulicModel::new();
        let replayed = rebuild(&mut target, Some(&base), &log, &BranchId::main()).unwrap();

        assert_eq!(replayed, 1);
        assert_eq!(target.asset_count(), 3);
        assert_eq!(target.model_version(), base.state_id);
    }

    #[test]
    fn rebuild_without_base_replays_everything() {
        let mut log = MomentLog::new();
        log.append(sample_network(), Moment::default());
        log.append(add_junction("J3"), delete_asset("J3"));
        log.raise_floor(StateId::mint());

        let mut target = HydraulicModel::new();
        let replayed = rebuild(&mut target, None, &log, &BranchId::main()).unwrap();
        assert_eq!(replayed, 2);
        assert_eq!(target.asset_count(), 4);
    }

    #[test]
    fn failing_delta_reports_index() {
        let mut log = MomentLog::new();
        log.append(sample_network(), Moment::default());
        log.append(delete_asset("J9"), Moment::default());

        let mut target = HydraulicModel::new();
        let err = rebuild(&mut target, None, &log, &BranchId::main()).unwrap_err();
        assert!(matches!(
            err,
            WorktreeError::Replay {
                index: 1,
                source: ApplyError::MissingAsset(ref id),
                ..
            } if *id == AssetId::from("J9")
        ));
        assert!(err.is_fatal());
    }
}
