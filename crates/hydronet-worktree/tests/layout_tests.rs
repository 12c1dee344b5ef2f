use hydronet_model::{AssetId, BranchId, LinkStatus};
use hydronet_store::{HydraulicModel, ModelStore};
use hydronet_test_utils::{add_junction, close_p1, move_j2, sample_network};
use hydronet_worktree::{PersistError, Worktree, WorktreeConfig, WorktreeError, WorktreeLayout};
use pretty_assertions::assert_eq;

#[test]
fn test_layout_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("network.worktree.json");

    let mut store = HydraulicModel::new();
    let mut worktree = Worktree::open(&store, WorktreeConfig::default());
    worktree.load_document(&mut store, sample_network()).unwrap();
    let a = worktree.create_scenario(&mut store, "A").unwrap();
    worktree.commit(&mut store, close_p1()).unwrap();
    worktree.commit(&mut store, add_junction("J3")).unwrap();
    worktree.undo(&mut store).unwrap();
    let b = worktree.create_scenario(&mut store, "B").unwrap();
    worktree.commit(&mut store, move_j2(75.0)).unwrap();
    worktree.switch_branch(&mut store, &a).unwrap();

    let live = store.fingerprint().unwrap();
    let tag = store.model_version();
    let summaries = worktree.branches().unwrap();
    worktree.to_layout(&store).save(&path).unwrap();

    let mut reopened_store = HydraulicModel::new();
    let layout = WorktreeLayout::load(&path).unwrap();
    let mut reopened =
        Worktree::from_layout(layout, &mut reopened_store, WorktreeConfig::default()).unwrap();

    assert_eq!(reopened.branches().unwrap(), summaries);
    assert_eq!(reopened.active_branch_id(), &a);
    assert_eq!(reopened_store.fingerprint().unwrap(), live);
    assert_eq!(reopened_store.model_version(), tag);

    // The undone delta is still redoable after the reload
    assert!(reopened.can_redo());
    reopened.redo(&mut reopened_store).unwrap();
    assert!(reopened_store.asset(&AssetId::from("J3")).is_some());

    reopened.switch_branch(&mut reopened_store, &b).unwrap();
    let status = reopened_store
        .asset(&AssetId::from("P1"))
        .and_then(|p| p.status());
    assert_eq!(status, Some(LinkStatus::Open));
}

#[test]
fn test_main_only_layout_replays_from_empty() {
    let mut store = HydraulicModel::new();
    let mut worktree = Worktree::open(&store, WorktreeConfig::default());
    worktree.load_document(&mut store, sample_network()).unwrap();
    worktree.commit(&mut store, close_p1()).unwrap();
    let layout = worktree.to_layout(&store);
    assert!(layout.base_snapshot.is_none());

    let mut reopened_store = HydraulicModel::new();
    let reopened = Worktree::from_layout(layout, &mut reopened_store, WorktreeConfig::default()).unwrap();
    assert_eq!(reopened_store.fingerprint().unwrap(), store.fingerprint().unwrap());
    assert_eq!(reopened_store.model_version(), store.model_version());
    assert!(reopened.can_undo());
    assert!(reopened.active_branch_id().is_main());
}

#[test]
fn test_corrupt_layout_leaves_store_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");

    let mut store = HydraulicModel::new();
    let mut worktree = Worktree::open(&store, WorktreeConfig::default());
    worktree.load_document(&mut store, sample_network()).unwrap();
    worktree.create_scenario(&mut store, "A").unwrap();

    let mut layout = worktree.to_layout(&store);
    layout.active_branch_id = BranchId::from("missing");
    std::fs::write(&path, serde_json::to_string(&layout).unwrap()).unwrap();

    let err = WorktreeLayout::load(&path).unwrap_err();
    assert!(matches!(
        err,
        PersistError::Worktree(WorktreeError::InvalidLayout(_))
    ));

    let mut other = HydraulicModel::new();
    let version = other.model_version();
    assert!(Worktree::from_layout(layout, &mut other, WorktreeConfig::default()).is_err());
    assert_eq!(other.model_version(), version);
    assert!(other.is_empty());
}

#[test]
fn test_worktree_opened_on_populated_store_round_trips() {
    let mut store = HydraulicModel::new();
    store.apply_moment(&sample_network()).unwrap();
    let mut worktree = Worktree::open(&store, WorktreeConfig::default());
    worktree.commit(&mut store, close_p1()).unwrap();

    let layout = worktree.to_layout(&store);
    let mut reopened_store = HydraulicModel::new();
    let mut reopened =
        Worktree::from_layout(layout, &mut reopened_store, WorktreeConfig::default()).unwrap();

    assert_eq!(reopened_store.asset_count(), 3);
    assert_eq!(reopened_store.fingerprint().unwrap(), store.fingerprint().unwrap());
    assert_eq!(reopened_store.model_version(), store.model_version());

    // The pre-existing document is not undoable, the later edit is
    assert!(reopened.undo(&mut reopened_store).unwrap());
    assert!(!reopened.undo(&mut reopened_store).unwrap());
    let status = reopened_store
        .asset(&AssetId::from("P1"))
        .and_then(|p| p.status());
    assert_eq!(status, Some(LinkStatus::Open));
}
