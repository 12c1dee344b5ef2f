//! hydronet Model
//!
//! Network elements and the transactional deltas that change them.
//!
//! # Core Concepts
//!
//! - [`AssetState`]: Complete state of one network element
//! - [`Moment`]: Atomic delta (puts + deletes) on the network document
//! - [`Snapshot`]: Full-state materialization plus an opaque version tag
//! - [`StateId`]: Opaque model version tag used for drift and staleness checks
//! - [`Fingerprint`]: Blake3 digest of an asset set
//!
//! # Example
//!
//! ```rust,ignore
//! use hydronet_model::{AssetState, LinkStatus, Moment};
//!
//! let close = Moment::builder()
//!     .note("Close P1")
//!     .put("P1", pipe.with_status(LinkStatus::Closed))
//!     .build()?;
//! assert_eq!(close.stats().puts, 1);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod asset;
mod fingerprint;
mod id;
mod moment;
mod snapshot;

// Re-exports
pub use asset::{AssetKind, AssetState, LinkStatus, Position, ValveKind};
pub use fingerprint::{Fingerprint, FingerprintError};
pub use id::{AssetId, BranchId, LogId, StateId, VersionId};
pub use moment::{
    DeltaStats, Moment, MomentBuilder, ValidationError, IMPORT_NOTE_PREFIX,
};
pub use snapshot::{Snapshot, SNAPSHOT_NOTE};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
