//! Error types for the model store

use hydronet_model::{AssetId, ValidationError};

/// Errors applying a moment to the live document
///
/// Application is transactional: when any of these is returned the store is
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    /// Moment violates its own invariants
    #[error("invalid moment: {0}")]
    Invalid(#[from] ValidationError),

    /// Delete of an element that does not exist
    #[error("cannot delete missing asset {0}")]
    MissingAsset(AssetId),

    /// Link endpoint would not exist (or is not a node) after the moment
    #[error("link {link} references missing node {node}")]
    DanglingLink { link: AssetId, node: AssetId },

    /// Node deleted while a surviving link still references it
    #[error("node {node} is still referenced by link {link}")]
    NodeInUse { node: AssetId, link: AssetId },
}

impl ApplyError {
    /// Id of the element the failure is about
    #[must_use]
    pub fn asset_id(&self) -> &AssetId {
        match self {
            Self::Invalid(ValidationError::PutAndDelete(id) | ValidationError::DuplicatePut(id))
            | Self::MissingAsset(id) => id,
            Self::DanglingLink { link, .. } => link,
            Self::NodeInUse { node, .. } => node,
        }
    }
}
