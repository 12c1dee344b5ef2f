//! Full-state materializations

use crate::asset::AssetState;
use crate::id::{AssetId, StateId};
use crate::moment::Moment;
use serde::{Deserialize, Serialize};

/// Note attached to snapshot moments
pub const SNAPSHOT_NOTE: &str = "Snapshot";

/// Full document state plus the version tag it was captured under
///
/// `moment.put_assets` enumerates every element at capture time; it is not
/// a diff and never carries deletes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Version tag minted at capture
    pub state_id: StateId,

    /// Every element, as puts
    pub moment: Moment,
}

impl Snapshot {
    /// Build a snapshot from a materialized asset set
    #[must_use]
    pub fn capture<'a, I>(state_id: StateId, assets: I) -> Self
    where
        I: IntoIterator<Item = (&'a AssetId, &'a AssetState)>,
    {
        let put_assets = assets
            .into_iter()
            .map(|(id, state)| (id.clone(), state.clone()))
            .collect();
        Self {
            state_id,
            moment: Moment {
                note: Some(SNAPSHOT_NOTE.to_string()),
                put_assets,
                delete_assets: Default::default(),
            },
        }
    }

    /// Snapshot of an empty document
    #[must_use]
    pub fn empty(state_id: StateId) -> Self {
        Self::capture(state_id, std::iter::empty::<(&AssetId, &AssetState)>())
    }

    /// Number of elements
    #[inline]
    #[must_use]
    pub fn asset_count(&self) -> usize {
        self.moment.put_assets.len()
    }

    /// Iterate over captured elements
    pub fn assets(&self) -> impl Iterator<Item = (&AssetId, &AssetState)> {
        self.moment.put_assets.iter().map(|(id, state)| (id, state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Position;

    #[test]
    fn capture_enumerates_every_asset() {
        let id = AssetId::from("R1");
        let state = AssetState::Reservoir {
            position: Position::new(0.0, 0.0),
            head: 50.0,
        };
        let tag = StateId::mint();
        let snapshot = Snapshot::capture(tag, [(&id, &state)]);

        assert_eq!(snapshot.state_id, tag);
        assert_eq!(snapshot.asset_count(), 1);
        assert!(snapshot.moment.delete_assets.is_empty());
        assert_eq!(snapshot.moment.note.as_deref(), Some(SNAPSHOT_NOTE));
        assert_eq!(snapshot.assets().next(), Some((&id, &state)));
    }

    #[test]
    fn empty_snapshot_has_no_assets() {
        assert_eq!(Snapshot::empty(StateId::mint()).asset_count(), 0);
    }
}
