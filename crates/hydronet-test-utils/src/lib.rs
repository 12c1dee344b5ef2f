//! Testing utilities for hydronet workspace
//!
//! Shared fixtures: element states and the small J1–J2–P1 network used by
//! the end-to-end scenario tests.

#![allow(missing_docs)]

use hydronet_model::{AssetId, AssetState, LinkStatus, Moment, Position};

pub fn junction_at(x: f64, y: f64) -> AssetState {
    AssetState::Junction {
        position: Position::new(x, y),
        elevation: 10.0,
        base_demand: 1.0,
    }
}

pub fn junction() -> AssetState {
    junction_at(0.0, 0.0)
}

pub fn reservoir(head: f64) -> AssetState {
    AssetState::Reservoir {
        position: Position::new(0.0, 0.0),
        head,
    }
}

pub fn pipe(start: &str, end: &str, status: LinkStatus) -> AssetState {
    AssetState::Pipe {
        connections: (AssetId::from(start), AssetId::from(end)),
        length: 100.0,
        diameter: 300.0,
        roughness: 130.0,
        status,
    }
}

pub fn open_pipe(start: &str, end: &str) -> AssetState {
    pipe(start, end, LinkStatus::Open)
}

/// Import moment for `{J1, J2, P1 (J1–J2, open)}`
pub fn sample_network() -> Moment {
    Moment::builder()
        .note("Import sample.inp")
        .put("J1", junction_at(0.0, 0.0))
        .put("J2", junction_at(100.0, 0.0))
        .put("P1", open_pipe("J1", "J2"))
        .build()
        .unwrap()
}

/// `putAssets=[P1 status=closed]`
pub fn close_p1() -> Moment {
    Moment::builder()
        .note("Close P1")
        .put("P1", pipe("J1", "J2", LinkStatus::Closed))
        .build()
        .unwrap()
}

/// Moves J2 to `x`
pub fn move_j2(x: f64) -> Moment {
    Moment::builder()
        .note("Move J2")
        .put("J2", junction_at(x, 0.0))
        .build()
        .unwrap()
}

/// Adds junction `id`
pub fn add_junction(id: &str) -> Moment {
    Moment::builder()
        .note(format!("Add {id}"))
        .put(id, junction())
        .build()
        .unwrap()
}

/// Deletes a bare junction `id`
pub fn delete_asset(id: &str) -> Moment {
    Moment::builder()
        .note(format!("Delete {id}"))
        .delete(id)
        .build()
        .unwrap()
}
