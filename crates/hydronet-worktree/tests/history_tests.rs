use hydronet_model::{AssetId, BranchId, Moment};
use hydronet_store::{HydraulicModel, ModelStore};
use hydronet_test_utils::{junction_at, sample_network};
use hydronet_worktree::{Worktree, WorktreeConfig};
use proptest::prelude::*;

/// `(node slot, delete?, x)`: puts junction `N{slot}` at `x`, or deletes it if
/// it exists and `delete` is set
type Edit = (usize, bool, f64);

fn edits() -> impl Strategy<Value = Vec<Edit>> {
    proptest::collection::vec((0..4usize, any::<bool>(), 0.0..1000.0f64), 1..12)
}

fn to_moment(store: &HydraulicModel, (slot, delete, x): Edit) -> Moment {
    let id = format!("N{slot}");
    let builder = Moment::builder().note(format!("Edit {id}"));
    let builder = if delete && store.asset(&AssetId::from(id.as_str())).is_some() {
        builder.delete(id.as_str())
    } else {
        builder.put(id.as_str(), junction_at(x, 0.0))
    };
    builder.build().unwrap()
}

fn on_scenario() -> (Worktree, HydraulicModel) {
    let mut store = HydraulicModel::new();
    let mut worktree = Worktree::open(&store, WorktreeConfig::default());
    worktree.load_document(&mut store, sample_network()).unwrap();
    worktree.create_scenario(&mut store, "History").unwrap();
    (worktree, store)
}

proptest! {
    #[test]
    fn prop_undo_redo_are_exact_inverses(edits in edits()) {
        let (mut worktree, mut store) = on_scenario();
        let start = store.fingerprint().unwrap();

        for edit in &edits {
            let moment = to_moment(&store, *edit);
            worktree.commit(&mut store, moment).unwrap();
        }
        let end = store.fingerprint().unwrap();

        for _ in 0..edits.len() {
            prop_assert!(worktree.undo(&mut store).unwrap());
        }
        prop_assert!(!worktree.undo(&mut store).unwrap());
        prop_assert_eq!(store.fingerprint().unwrap(), start);

        for _ in 0..edits.len() {
            prop_assert!(worktree.redo(&mut store).unwrap());
        }
        prop_assert!(!worktree.redo(&mut store).unwrap());
        prop_assert_eq!(store.fingerprint().unwrap(), end);
    }

    #[test]
    fn prop_append_after_undo_discards_tail(edits in edits(), k in 0..12usize) {
        let (mut worktree, mut store) = on_scenario();
        for edit in &edits {
            let moment = to_moment(&store, *edit);
            worktree.commit(&mut store, moment).unwrap();
        }

        let k = k.min(edits.len());
        for _ in 0..k {
            worktree.undo(&mut store).unwrap();
        }
        let moment = to_moment(&store, (0, false, 1234.5));
        worktree.commit(&mut store, moment).unwrap();

        prop_assert!(!worktree.can_redo());
        prop_assert!(!worktree.redo(&mut store).unwrap());
        prop_assert_eq!(worktree.active_log().len(), 1 + edits.len() - k + 1);
        prop_assert_eq!(worktree.active_log().stats().deltas, edits.len() - k + 1);
    }

    #[test]
    fn prop_replay_matches_live_state(edits in edits(), undos in 0..12usize) {
        let (mut worktree, mut store) = on_scenario();
        let scenario = worktree.active_branch_id().clone();
        for edit in &edits {
            let moment = to_moment(&store, *edit);
            worktree.commit(&mut store, moment).unwrap();
        }
        for _ in 0..undos.min(edits.len()) {
            worktree.undo(&mut store).unwrap();
        }
        let live = store.fingerprint().unwrap();
        let tag = store.model_version();

        worktree.switch_branch(&mut store, &BranchId::main()).unwrap();
        worktree.switch_branch(&mut store, &scenario).unwrap();

        prop_assert_eq!(store.fingerprint().unwrap(), live);
        prop_assert_eq!(store.model_version(), tag);
    }
}
