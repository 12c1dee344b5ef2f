//! hydronet Store
//!
//! The live network document that moment logs and worktrees drive.
//!
//! # Core Concepts
//!
//! - [`ModelStore`]: Contract for the live document (apply, materialize,
//!   snapshot, restore, version tag)
//! - [`HydraulicModel`]: In-memory reference store
//! - [`SimulationCache`]: Solver results keyed by model version
//! - [`ApplyError`]: Why a moment could not land
//!
//! # Example
//!
//! ```rust,ignore
//! use hydronet_store::{HydraulicModel, ModelStore};
//!
//! let mut model = HydraulicModel::new();
//! let inverse = model.apply_moment(&import)?;
//! let snapshot = model.capture_model_snapshot();
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod cache;
mod error;
mod model;
mod store;

pub use cache::SimulationCache;
pub use error::ApplyError;
pub use model::HydraulicModel;
pub use store::ModelStore;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
