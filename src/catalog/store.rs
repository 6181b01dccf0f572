use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use super::model_list::{dedupe_by_model_string, model_string_keys, ModelFinder};
use crate::core::model::AircraftModel;
use crate::core::types::Simulator;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read model set: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse model set: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Model set file version for compatibility checking
pub const MODEL_SET_VERSION: &str = "1.0.0";

/// Serializable model set format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSetData {
    pub version: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub simulator: Simulator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<AircraftModel>,
    pub models: Vec<AircraftModel>,
}

impl ModelSetData {
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let data: Self = serde_json::from_str(json)?;
        if data.version != MODEL_SET_VERSION {
            tracing::warn!(
                expected = MODEL_SET_VERSION,
                found = %data.version,
                "Model set version mismatch"
            );
        }
        Ok(data)
    }
}

/// The active model set of one simulator plus the models disabled for matching.
///
/// Model strings are unique (case-insensitive). Disabled models keep their
/// original position so a restore reproduces the catalog order.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    simulator: Simulator,

    /// Active models, order is the tie-break order
    models: Vec<AircraftModel>,

    /// Index: model string key -> index in models vec
    key_to_index: HashMap<String, usize>,

    /// Index: model string key -> position in the set as loaded
    original_order: HashMap<String, usize>,

    /// Models temporarily excluded from matching
    disabled: Vec<AircraftModel>,

    default_model: Option<AircraftModel>,
}

impl ModelCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a model set file
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        Ok(Self::from_data(ModelSetData::load_from_file(path)?))
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(Self::from_data(ModelSetData::from_json(json)?))
    }

    pub fn from_data(data: ModelSetData) -> Self {
        let mut catalog = Self::new();
        catalog.set_model_set(data.models, data.simulator, true);
        if let Some(model) = data.default_model {
            catalog.set_default_model(model);
        }
        catalog
    }

    /// Export the active set (disabled models included, in original order)
    pub fn to_json(&self) -> Result<String, CatalogError> {
        let data = ModelSetData {
            version: MODEL_SET_VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            simulator: self.simulator,
            default_model: self.default_model.clone(),
            models: self.all_models_in_original_order(),
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Replace the model set.
    ///
    /// Models without model string and duplicates (first one wins) are
    /// dropped. Unless `forced`, an identical set for the same simulator is a
    /// no-op returning 0. Otherwise returns the number of active models.
    pub fn set_model_set(
        &mut self,
        models: Vec<AircraftModel>,
        simulator: Simulator,
        forced: bool,
    ) -> usize {
        let models = dedupe_by_model_string(models);

        if !forced && simulator == self.simulator && self.has_same_model_strings(&models) {
            tracing::debug!(simulator = %simulator, "Model set unchanged, skipping");
            return 0;
        }

        if simulator != self.simulator {
            self.default_model = None;
        }
        self.simulator = simulator;
        self.original_order = models
            .iter()
            .enumerate()
            .map(|(idx, m)| (m.key(), idx))
            .collect();
        self.disabled.clear();
        self.models = models;
        self.rebuild_index();

        tracing::info!(simulator = %simulator, count = self.models.len(), "Model set replaced");
        self.models.len()
    }

    /// Compare against the full set (active and disabled) as a multiset of keys
    fn has_same_model_strings(&self, models: &[AircraftModel]) -> bool {
        if models.len() != self.models.len() + self.disabled.len() {
            return false;
        }
        let mut incoming = model_string_keys(models);
        let mut current = model_string_keys(&self.models);
        current.extend(model_string_keys(&self.disabled));
        incoming.sort_unstable();
        current.sort_unstable();
        incoming == current
    }

    fn rebuild_index(&mut self) {
        self.key_to_index = self
            .models
            .iter()
            .enumerate()
            .map(|(idx, m)| (m.key(), idx))
            .collect();
    }

    /// Move the given models (by model string) to the disabled set.
    ///
    /// A non incremental call restores previously disabled models first.
    /// Returns the number of models disabled by this call.
    pub fn disable_models_for_matching(
        &mut self,
        models: &[AircraftModel],
        incremental: bool,
    ) -> usize {
        if !incremental {
            self.restore_disabled_models();
        }

        let keys: Vec<String> = model_string_keys(models);
        let before = self.models.len();
        let (disabled, active): (Vec<_>, Vec<_>) = std::mem::take(&mut self.models)
            .into_iter()
            .partition(|m| keys.contains(&m.key()));
        self.models = active;
        self.disabled.extend(disabled);
        self.rebuild_index();

        let count = before - self.models.len();
        if count > 0 {
            tracing::info!(count, "Models disabled for matching");
        }
        count
    }

    /// Move every disabled model back, restoring the original order.
    ///
    /// Returns the number of restored models.
    pub fn restore_disabled_models(&mut self) -> usize {
        if self.disabled.is_empty() {
            return 0;
        }
        let count = self.disabled.len();
        self.models = self.all_models_in_original_order();
        self.disabled.clear();
        self.rebuild_index();
        tracing::info!(count, "Disabled models restored");
        count
    }

    fn all_models_in_original_order(&self) -> Vec<AircraftModel> {
        let mut all: Vec<AircraftModel> = self
            .models
            .iter()
            .chain(self.disabled.iter())
            .cloned()
            .collect();
        all.sort_by_key(|m| {
            self.original_order
                .get(&m.key())
                .copied()
                .unwrap_or(usize::MAX)
        });
        all
    }

    pub fn disabled_models(&self) -> &[AircraftModel] {
        &self.disabled
    }

    pub fn is_disabled(&self, model_string: &str) -> bool {
        ModelFinder::new(&self.disabled).contains_model_string(model_string)
    }

    pub fn default_model(&self) -> Option<&AircraftModel> {
        self.default_model.as_ref()
    }

    /// Set the fallback model of the current simulator context
    pub fn set_default_model(&mut self, mut model: AircraftModel) {
        model.default_model = true;
        self.default_model = Some(model);
    }

    pub fn simulator(&self) -> Simulator {
        self.simulator
    }

    pub fn models(&self) -> &[AircraftModel] {
        &self.models
    }

    /// Get an active model by model string
    pub fn get(&self, model_string: &str) -> Option<&AircraftModel> {
        self.key_to_index
            .get(&model_string.trim().to_ascii_uppercase())
            .map(|&idx| &self.models[idx])
    }

    pub fn contains(&self, model_string: &str) -> bool {
        self.get(model_string).is_some()
    }

    /// Catalog position of an active model
    pub fn position(&self, model_string: &str) -> Option<usize> {
        self.key_to_index
            .get(&model_string.trim().to_ascii_uppercase())
            .copied()
    }

    pub fn finder(&self) -> ModelFinder<'_> {
        ModelFinder::new(&self.models)
    }

    /// Number of active models
    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::icao::{AircraftIcaoCode, AirlineIcaoCode, Livery};

    fn model(ms: &str) -> AircraftModel {
        AircraftModel::new(
            ms,
            AircraftIcaoCode::new("A320"),
            Livery::standard(&AirlineIcaoCode::new("DLH")),
        )
    }

    fn catalog(names: &[&str]) -> ModelCatalog {
        let mut catalog = ModelCatalog::new();
        catalog.set_model_set(names.iter().map(|n| model(n)).collect(), Simulator::Msfs, true);
        catalog
    }

    fn keys(catalog: &ModelCatalog) -> Vec<String> {
        model_string_keys(catalog.models())
    }

    #[test]
    fn test_set_model_set_cleans_input() {
        let mut catalog = ModelCatalog::new();
        let count = catalog.set_model_set(
            vec![model("A"), model(""), model("b"), model("a")],
            Simulator::Msfs,
            false,
        );
        assert_eq!(count, 2);
        assert_eq!(keys(&catalog), vec!["A", "B"]);
        assert!(catalog.contains("a"));
    }

    #[test]
    fn test_same_set_reordered_is_noop() {
        let mut catalog = catalog(&["A", "B", "C"]);
        let count = catalog.set_model_set(vec![model("C"), model("a"), model("B")], Simulator::Msfs, false);
        assert_eq!(count, 0);
        assert_eq!(keys(&catalog), vec!["A", "B", "C"]);

        let forced = catalog.set_model_set(vec![model("C"), model("A"), model("B")], Simulator::Msfs, true);
        assert_eq!(forced, 3);
        assert_eq!(keys(&catalog), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_other_simulator_replaces_set() {
        let mut catalog = catalog(&["A", "B"]);
        catalog.set_default_model(model("A"));
        let count = catalog.set_model_set(vec![model("A"), model("B")], Simulator::Xplane, false);
        assert_eq!(count, 2);
        assert_eq!(catalog.simulator(), Simulator::Xplane);
        assert!(catalog.default_model().is_none());
    }

    #[test]
    fn test_disable_and_restore_preserves_order() {
        let mut catalog = catalog(&["A", "B", "C", "D"]);
        assert_eq!(catalog.disable_models_for_matching(&[model("B")], true), 1);
        assert_eq!(catalog.disable_models_for_matching(&[model("d")], true), 1);
        assert_eq!(keys(&catalog), vec!["A", "C"]);
        assert!(catalog.is_disabled("B"));
        assert_eq!(catalog.get("C").map(|m| m.key()), Some("C".to_string()));

        assert_eq!(catalog.restore_disabled_models(), 2);
        assert_eq!(keys(&catalog), vec!["A", "B", "C", "D"]);
        assert!(catalog.disabled_models().is_empty());
        assert_eq!(catalog.restore_disabled_models(), 0);
    }

    #[test]
    fn test_non_incremental_disable_restores_first() {
        let mut catalog = catalog(&["A", "B", "C"]);
        catalog.disable_models_for_matching(&[model("A")], true);
        catalog.disable_models_for_matching(&[model("C")], false);
        assert_eq!(keys(&catalog), vec!["A", "B"]);
        assert_eq!(catalog.disabled_models().len(), 1);
    }

    #[test]
    fn test_disable_unknown_is_noop() {
        let mut catalog = catalog(&["A"]);
        assert_eq!(catalog.disable_models_for_matching(&[model("X")], true), 0);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_same_set_with_disabled_models_is_noop() {
        let mut catalog = catalog(&["A", "B"]);
        catalog.disable_models_for_matching(&[model("A")], true);
        assert_eq!(catalog.set_model_set(vec![model("A"), model("B")], Simulator::Msfs, false), 0);
        assert_eq!(catalog.disabled_models().len(), 1);
    }

    #[test]
    fn test_json_round_trip_keeps_default_model() {
        let mut catalog = catalog(&["A", "B"]);
        catalog.set_default_model(model("B"));
        let json = catalog.to_json().unwrap();
        assert!(json.contains("\"version\""));

        let loaded = ModelCatalog::from_json(&json).unwrap();
        assert_eq!(keys(&loaded), vec!["A", "B"]);
        assert_eq!(loaded.simulator(), Simulator::Msfs);
        assert!(loaded.default_model().is_some_and(|m| m.default_model));
    }

    #[test]
    fn test_load_from_missing_file() {
        let result = ModelCatalog::load_from_file(Path::new("/nonexistent/models.json"));
        assert!(matches!(result, Err(CatalogError::ReadError(_))));
    }
}
