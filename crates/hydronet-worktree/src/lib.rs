//! hydronet Worktree
//!
//! Undo/redo history and scenario branches over one hydraulic network
//! document.
//!
//! # Core Concepts
//!
//! - [`MomentLog`]: Ordered deltas with an undo/redo pointer
//! - [`Version`]: A branch's frozen timeline plus its model version tag
//! - [`Branch`]: Named timeline; "main" is the imported document
//! - [`Worktree`]: Branch registry, shared base snapshot, switching protocol
//! - [`Session`]: Worktree, store and simulation cache bundled together
//!
//! # Switching
//!
//! All branches diverge from one base snapshot. Switching freezes the live
//! branch, restores the base snapshot, replays the target's deltas and
//! installs its recorded version tag.
//!
//! # Example
//!
//! ```rust,ignore
//! use hydronet_store::HydraulicModel;
//! use hydronet_worktree::{Worktree, WorktreeConfig};
//!
//! let mut store = HydraulicModel::new();
//! let mut worktree = Worktree::open(&store, WorktreeConfig::default());
//! worktree.load_document(&mut store, import)?;
//!
//! let scenario = worktree.create_scenario(&mut store, "Closed valves")?;
//! worktree.commit(&mut store, close_p1)?;
//! worktree.switch_branch(&mut store, &BranchId::main())?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod branch;
mod config;
mod error;
mod layout;
mod moment_log;
mod replay;
mod session;
mod version;
mod worktree;

// Re-exports
pub use branch::{Branch, BranchSummary};
pub use config::WorktreeConfig;
pub use error::{ConfigError, DriftWarning, PersistError, WorktreeError};
pub use layout::WorktreeLayout;
pub use moment_log::{LoggedMoment, MomentLog};
pub use session::Session;
pub use version::Version;
pub use worktree::{SwitchOutcome, Worktree};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
