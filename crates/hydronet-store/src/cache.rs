//! Simulation result cache
//!
//! Solver output is keyed by the model version tag it was computed against,
//! so staleness is detected without hashing the document.

use crate::store::ModelStore;
use hydronet_model::StateId;

/// Results of the last simulation run, tagged with the model version
#[derive(Debug, Clone)]
pub struct SimulationCache<R> {
    entry: Option<(StateId, R)>,
}

impl<R> SimulationCache<R> {
    /// Empty cache
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { entry: None }
    }

    /// Record results computed against `state_id`
    pub fn store(&mut self, state_id: StateId, results: R) {
        self.entry = Some((state_id, results));
    }

    /// Results, if they were computed against `current`
    #[must_use]
    pub fn get(&self, current: StateId) -> Option<&R> {
        match &self.entry {
            Some((state_id, results)) if *state_id == current => Some(results),
            _ => None,
        }
    }

    /// Results, if they match the store's current version
    #[must_use]
    pub fn get_for(&self, store: &dyn ModelStore) -> Option<&R> {
        self.get(store.model_version())
    }

    /// Tag the cached results were computed against
    #[inline]
    #[must_use]
    pub fn state_id(&self) -> Option<StateId> {
        self.entry.as_ref().map(|(state_id, _)| *state_id)
    }

    /// Whether any results are held, fresh or not
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }

    /// Drop cached results; returns whether anything was dropped
    pub fn invalidate(&mut self) -> bool {
        self.entry.take().is_some()
    }
}

impl<R> Default for SimulationCache<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HydraulicModel;

    #[test]
    fn stale_results_are_hidden() {
        let mut cache = SimulationCache::new();
        let tag = StateId::mint();
        cache.store(tag, 42_u32);

        assert_eq!(cache.get(tag), Some(&42));
        assert_eq!(cache.get(StateId::mint()), None);
        assert_eq!(cache.state_id(), Some(tag));
    }

    #[test]
    fn get_for_uses_store_version() {
        let model = HydraulicModel::new();
        let mut cache = SimulationCache::new();
        cache.store(model.model_version(), "results");
        assert_eq!(cache.get_for(&model), Some(&"results"));
    }

    #[test]
    fn invalidate_reports_drop() {
        let mut cache = SimulationCache::<()>::new();
        assert!(!cache.invalidate());
        cache.store(StateId::mint(), ());
        assert!(cache.invalidate());
        assert!(cache.is_empty());
    }
}
