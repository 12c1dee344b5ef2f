//! In-memory hydraulic model
//!
//! [`HydraulicModel`] is the reference [`ModelStore`]: an insertion-ordered
//! map of elements plus a version tag. Every check runs before the first
//! mutation, which is what makes application all-or-nothing.

use crate::error::ApplyError;
use crate::store::ModelStore;
use hydronet_model::{AssetId, AssetState, Moment, Snapshot, StateId};
use indexmap::IndexMap;

/// Live network document held in memory
#[derive(Debug, Clone)]
pub struct HydraulicModel {
    /// Elements by id, in creation order
    assets: IndexMap<AssetId, AssetState>,
    /// Version tag
    version: StateId,
}

impl HydraulicModel {
    /// Empty document under a fresh tag
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            assets: IndexMap::new(),
            version: StateId::mint(),
        }
    }

    /// Document materialized from a snapshot
    #[must_use]
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let mut model = Self::new();
        model.restore_to_base(snapshot);
        model
    }

    /// Whether the document has no elements
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Remove every element (fresh document)
    pub fn clear(&mut self) {
        self.assets.clear();
        self.version = StateId::mint();
    }

    /// Whether `id` exists once `moment` has landed
    fn exists_after(&self, moment: &Moment, id: &AssetId) -> Option<bool> {
        if let Some(state) = moment.put(id) {
            return Some(!state.is_link());
        }
        if moment.delete_assets.contains(id) {
            return None;
        }
        self.assets.get(id).map(|state| !state.is_link())
    }

    /// Check a moment against the current document without mutating it
    fn check(&self, moment: &Moment) -> Result<(), ApplyError> {
        moment.validate()?;

        for id in &moment.delete_assets {
            if !self.assets.contains_key(id) {
                return Err(ApplyError::MissingAsset(id.clone()));
            }
        }

        for (link, state) in &moment.put_assets {
            if let Some((start, end)) = state.connections() {
                for node in [start, end] {
                    if self.exists_after(moment, node) != Some(true) {
                        return Err(ApplyError::DanglingLink {
                            link: link.clone(),
                            node: node.clone(),
                        });
                    }
                }
            }
        }

        // Nodes that stop being nodes: deleted, or replaced by a link
        let retired = moment.delete_assets.iter().chain(
            moment
                .put_assets
                .iter()
                .filter(|(id, state)| {
                    state.is_link() && self.assets.get(id).is_some_and(|prev| !prev.is_link())
                })
                .map(|(id, _)| id),
        );

        // Links left untouched by the moment must keep both endpoints
        for node in retired {
            let survivor = self.assets.iter().find(|(id, state)| {
                state.references(node)
                    && !moment.delete_assets.contains(*id)
                    && moment.put(id).is_none()
            });
            if let Some((link, _)) = survivor {
                return Err(ApplyError::NodeInUse {
                    node: node.clone(),
                    link: link.clone(),
                });
            }
        }

        Ok(())
    }

    /// Write a checked moment, returning its inverse
    fn write(&mut self, moment: &Moment) -> Moment {
        let mut inverse = Moment {
            note: moment.note.clone(),
            ..Moment::default()
        };

        for (id, state) in &moment.put_assets {
            match self.assets.insert(id.clone(), state.clone()) {
                Some(previous) => inverse.put_assets.push((id.clone(), previous)),
                None => {
                    inverse.delete_assets.insert(id.clone());
                }
            }
        }

        for id in &moment.delete_assets {
            if let Some(previous) = self.assets.shift_remove(id) {
                inverse.put_assets.push((id.clone(), previous));
            }
        }

        inverse
    }
}

impl Default for HydraulicModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelStore for HydraulicModel {
    fn apply_moment(&mut self, moment: &Moment) -> Result<Moment, ApplyError> {
        let inverse = self.materialize(moment)?;
        self.version = StateId::mint();
        Ok(inverse)
    }

    fn materialize(&mut self, moment: &Moment) -> Result<Moment, ApplyError> {
        self.check(moment)?;
        Ok(self.write(moment))
    }

    fn capture_model_snapshot(&mut self) -> Snapshot {
        self.version = StateId::mint();
        tracing::debug!(
            state_id = %self.version,
            assets = self.assets.len(),
            "captured model snapshot"
        );
        Snapshot::capture(self.version, self.assets.iter())
    }

    fn restore_to_base(&mut self, snapshot: &Snapshot) {
        self.assets = snapshot
            .moment
            .put_assets
            .iter()
            .map(|(id, state)| (id.clone(), state.clone()))
            .collect();
        self.version = snapshot.state_id;
    }

    fn model_version(&self) -> StateId {
        self.version
    }

    fn set_model_version(&mut self, state_id: StateId) {
        self.version = state_id;
    }

    fn asset(&self, id: &AssetId) -> Option<&AssetState> {
        self.assets.get(id)
    }

    fn assets(&self) -> Box<dyn Iterator<Item = (&AssetId, &AssetState)> + '_> {
        Box::new(self.assets.iter())
    }

    fn asset_count(&self) -> usize {
        self.assets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydronet_model::{LinkStatus, Position};

    fn junction() -> AssetState {
        AssetState::Junction {
            position: Position::new(0.0, 0.0),
            elevation: 10.0,
            base_demand: 1.0,
        }
    }

    fn pipe(a: &str, b: &str) -> AssetState {
        AssetState::Pipe {
            connections: (AssetId::from(a), AssetId::from(b)),
            length: 100.0,
            diameter: 200.0,
            roughness: 120.0,
            status: LinkStatus::Open,
        }
    }

    fn seeded() -> HydraulicModel {
        let mut model = HydraulicModel::new();
        let moment = Moment::builder()
            .put("J1", junction())
            .put("J2", junction())
            .put("P1", pipe("J1", "J2"))
            .build()
            .unwrap();
        model.apply_moment(&moment).unwrap();
        model
    }

    #[test]
    fn apply_mints_new_version() {
        let mut model = seeded();
        let before = model.model_version();
        let close = Moment::builder()
            .put("P1", pipe("J1", "J2").with_status(LinkStatus::Closed))
            .build()
            .unwrap();
        model.apply_moment(&close).unwrap();
        assert_ne!(model.model_version(), before);
    }

    #[test]
    fn materialize_keeps_version() {
        let mut model = seeded();
        let before = model.model_version();
        let add = Moment::builder().put("J3", junction()).build().unwrap();
        model.materialize(&add).unwrap();
        assert_eq!(model.model_version(), before);
        assert_eq!(model.asset_count(), 4);
    }

    #[test]
    fn inverse_restores_previous_state() {
        let mut model = seeded();
        let fingerprint = model.fingerprint().unwrap();

        let edit = Moment::builder()
            .put("P1", pipe("J1", "J2").with_status(LinkStatus::Closed))
            .put("J3", junction())
            .build()
            .unwrap();
        let inverse = model.apply_moment(&edit).unwrap();

        assert!(inverse.delete_assets.contains(&AssetId::from("J3")));
        assert_eq!(inverse.put_assets.len(), 1);

        model.apply_moment(&inverse).unwrap();
        assert_eq!(model.fingerprint().unwrap(), fingerprint);
    }

    #[test]
    fn deleting_missing_asset_fails_without_mutation() {
        let mut model = seeded();
        let version = model.model_version();
        let moment = Moment::builder()
            .put("J3", junction())
            .delete("J9")
            .build()
            .unwrap();

        let result = model.apply_moment(&moment);
        assert_eq!(result, Err(ApplyError::MissingAsset(AssetId::from("J9"))));
        assert!(model.asset(&AssetId::from("J3")).is_none());
        assert_eq!(model.model_version(), version);
    }

    #[test]
    fn link_to_missing_node_is_rejected() {
        let mut model = seeded();
        let moment = Moment::builder().put("P2", pipe("J1", "J7")).build().unwrap();
        assert!(matches!(
            model.apply_moment(&moment),
            Err(ApplyError::DanglingLink { .. })
        ));
    }

    #[test]
    fn link_created_with_its_nodes_is_accepted() {
        let mut model = seeded();
        let moment = Moment::builder()
            .put("J3", junction())
            .put("P2", pipe("J2", "J3"))
            .build()
            .unwrap();
        assert!(model.apply_moment(&moment).is_ok());
    }

    #[test]
    fn node_in_use_cannot_be_deleted_alone() {
        let mut model = seeded();
        let moment = Moment::builder().delete("J1").build().unwrap();
        let result = model.apply_moment(&moment);
        assert_eq!(
            result,
            Err(ApplyError::NodeInUse {
                node: AssetId::from("J1"),
                link: AssetId::from("P1"),
            })
        );

        let with_link = Moment::builder().delete("J1").delete("P1").build().unwrap();
        assert!(model.apply_moment(&with_link).is_ok());
        assert_eq!(model.asset_count(), 1);
    }

    #[test]
    fn node_in_use_cannot_become_a_link() {
        let mut model = seeded();
        let version = model.model_version();
        let moment = Moment::builder()
            .put("J9", junction())
            .put("J1", pipe("J2", "J9"))
            .build()
            .unwrap();

        let result = model.apply_moment(&moment);
        assert_eq!(
            result,
            Err(ApplyError::NodeInUse {
                node: AssetId::from("J1"),
                link: AssetId::from("P1"),
            })
        );
        assert!(!model.asset(&AssetId::from("J1")).unwrap().is_link());
        assert!(model.asset(&AssetId::from("J9")).is_none());
        assert_eq!(model.model_version(), version);
    }

    #[test]
    fn unused_node_can_become_a_link() {
        let mut model = seeded();
        let moment = Moment::builder()
            .put("J3", junction())
            .put("J4", junction())
            .build()
            .unwrap();
        model.apply_moment(&moment).unwrap();

        let replace = Moment::builder().put("J4", pipe("J2", "J3")).build().unwrap();
        assert!(model.apply_moment(&replace).is_ok());
        assert!(model.asset(&AssetId::from("J4")).unwrap().is_link());
    }

    #[test]
    fn overlapping_moment_is_invalid() {
        let mut model = seeded();
        let moment = Moment {
            note: None,
            put_assets: vec![(AssetId::from("J1"), junction())],
            delete_assets: [AssetId::from("J1")].into_iter().collect(),
        };
        assert!(matches!(model.apply_moment(&moment), Err(ApplyError::Invalid(_))));
    }

    #[test]
    fn snapshot_and_restore() {
        let mut model = seeded();
        let snapshot = model.capture_model_snapshot();
        assert_eq!(model.model_version(), snapshot.state_id);
        assert_eq!(snapshot.asset_count(), 3);

        let add = Moment::builder().put("J3", junction()).build().unwrap();
        model.apply_moment(&add).unwrap();

        model.restore_to_base(&snapshot);
        assert_eq!(model.asset_count(), 3);
        assert_eq!(model.model_version(), snapshot.state_id);
        assert_eq!(
            model.asset_ids(),
            vec![AssetId::from("J1"), AssetId::from("J2"), AssetId::from("P1")]
        );
    }

    #[test]
    fn clear_empties_document() {
        let mut model = seeded();
        model.clear();
        assert!(model.is_empty());
    }
}
