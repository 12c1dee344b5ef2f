//! Built-in walkthrough on a two-junction network

use anyhow::{ensure, Context, Result};
use hydronet_model::{AssetId, AssetState, BranchId, LinkStatus, Moment, Position};
use hydronet_store::{HydraulicModel, ModelStore};
use hydronet_worktree::{Worktree, WorktreeConfig};

fn junction(x: f64) -> AssetState {
    AssetState::Junction {
        position: Position::new(x, 0.0),
        elevation: 10.0,
        base_demand: 1.0,
    }
}

fn pipe(status: LinkStatus) -> AssetState {
    AssetState::Pipe {
        connections: (AssetId::from("J1"), AssetId::from("J2")),
        length: 100.0,
        diameter: 300.0,
        roughness: 130.0,
        status,
    }
}

fn p1_status(store: &HydraulicModel) -> Option<LinkStatus> {
    store.asset(&AssetId::from("P1")).and_then(AssetState::status)
}

/// Import J1–P1–J2, close P1 on a scenario, and hop between branches
pub(crate) fn run(config: WorktreeConfig) -> Result<(Worktree, HydraulicModel)> {
    let mut store = HydraulicModel::new();
    let mut worktree = Worktree::open(&store, config);

    let import = Moment::builder()
        .note("Import demo.inp")
        .put("J1", junction(0.0))
        .put("J2", junction(100.0))
        .put("P1", pipe(LinkStatus::Open))
        .build()?;
    worktree.load_document(&mut store, import)?;

    let name = worktree.next_scenario_name();
    let scenario = worktree
        .create_scenario(&mut store, name)
        .context("creating scenario")?;
    let close = Moment::builder()
        .note("Close P1")
        .put("P1", pipe(LinkStatus::Closed))
        .build()?;
    worktree.commit(&mut store, close)?;

    worktree.switch_branch(&mut store, &BranchId::main())?;
    ensure!(p1_status(&store) == Some(LinkStatus::Open), "P1 should be open on main");

    worktree.switch_branch(&mut store, &scenario)?;
    ensure!(p1_status(&store) == Some(LinkStatus::Closed), "P1 should be closed on the scenario");

    Ok((worktree, store))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_ends_on_scenario() {
        let (worktree, store) = run(WorktreeConfig::default()).unwrap();
        assert_eq!(worktree.branch_count(), 2);
        assert!(!worktree.active_branch_id().is_main());
        assert_eq!(p1_status(&store), Some(LinkStatus::Closed));
        assert_eq!(worktree.active_log().relative_pointer(), 0);
    }
}
