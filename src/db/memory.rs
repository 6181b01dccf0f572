use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::{DbCache, DbCacheError};
use crate::core::icao::{AircraftCategory, AircraftIcaoCode, AirlineIcaoCode, Livery};
use crate::core::model::AircraftModel;
use crate::core::types::ModelType;

/// Snapshot version for compatibility checking
pub const SNAPSHOT_VERSION: &str = "1.0.0";

/// Serializable database snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DbSnapshot {
    pub version: String,
    #[serde(default)]
    pub aircraft_icaos: Vec<AircraftIcaoCode>,
    #[serde(default)]
    pub airlines: Vec<AirlineIcaoCode>,
    #[serde(default)]
    pub liveries: Vec<Livery>,
    #[serde(default)]
    pub models: Vec<AircraftModel>,
    #[serde(default)]
    pub categories: Vec<AircraftCategory>,
}

/// Database cache held in memory, indexed by designator, code and key
#[derive(Debug, Default)]
pub struct InMemoryDbCache {
    snapshot: DbSnapshot,

    /// Index: upper-cased model string -> index in models
    model_by_string: HashMap<String, usize>,
    model_by_key: HashMap<i32, usize>,

    aircraft_by_designator: HashMap<String, usize>,
    aircraft_by_key: HashMap<i32, usize>,

    airline_by_designator: HashMap<String, usize>,

    livery_by_code: HashMap<String, usize>,
    livery_by_key: HashMap<i32, usize>,
}

fn index_by_string<T>(items: &[T], key: impl Fn(&T) -> &str) -> HashMap<String, usize> {
    let mut index = HashMap::new();
    for (idx, item) in items.iter().enumerate() {
        let k = key(item).trim().to_ascii_uppercase();
        if !k.is_empty() {
            // first entry wins
            index.entry(k).or_insert(idx);
        }
    }
    index
}

fn index_by_key<T>(items: &[T], key: impl Fn(&T) -> Option<i32>) -> HashMap<i32, usize> {
    let mut index = HashMap::new();
    for (idx, item) in items.iter().enumerate() {
        if let Some(k) = key(item) {
            index.entry(k).or_insert(idx);
        }
    }
    index
}

impl InMemoryDbCache {
    pub fn new(snapshot: DbSnapshot) -> Self {
        Self {
            model_by_string: index_by_string(&snapshot.models, |m| m.model_string.as_str()),
            model_by_key: index_by_key(&snapshot.models, |m| m.db_key),
            aircraft_by_designator: index_by_string(&snapshot.aircraft_icaos, |a| a.designator.as_str()),
            aircraft_by_key: index_by_key(&snapshot.aircraft_icaos, |a| a.db_key),
            airline_by_designator: index_by_string(&snapshot.airlines, |a| a.designator.as_str()),
            livery_by_code: index_by_string(&snapshot.liveries, |l| l.combined_code.as_str()),
            livery_by_key: index_by_key(&snapshot.liveries, |l| l.db_key),
            snapshot,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load_from_file(path: &Path) -> Result<Self, DbCacheError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, DbCacheError> {
        let snapshot: DbSnapshot = serde_json::from_str(json)?;
        if snapshot.version != SNAPSHOT_VERSION {
            tracing::warn!(
                expected = SNAPSHOT_VERSION,
                found = %snapshot.version,
                "Database snapshot version mismatch"
            );
        }
        tracing::info!(
            aircraft = snapshot.aircraft_icaos.len(),
            airlines = snapshot.airlines.len(),
            liveries = snapshot.liveries.len(),
            models = snapshot.models.len(),
            "Database snapshot loaded"
        );
        Ok(Self::new(snapshot))
    }

    pub fn snapshot(&self) -> &DbSnapshot {
        &self.snapshot
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.aircraft_icaos.is_empty()
            && self.snapshot.airlines.is_empty()
            && self.snapshot.liveries.is_empty()
            && self.snapshot.models.is_empty()
    }

    fn model_at(&self, idx: usize) -> AircraftModel {
        self.snapshot.models[idx]
            .clone()
            .with_model_type(ModelType::DatabaseEntry)
    }
}

fn upper(s: &str) -> String {
    s.trim().to_ascii_uppercase()
}

impl DbCache for InMemoryDbCache {
    fn find_model(&self, model_string: &str) -> Option<AircraftModel> {
        self.model_by_string
            .get(&upper(model_string))
            .map(|&idx| self.model_at(idx))
    }

    fn find_model_by_key(&self, key: i32) -> Option<AircraftModel> {
        self.model_by_key.get(&key).map(|&idx| self.model_at(idx))
    }

    fn find_aircraft_icao(&self, designator: &str) -> Option<AircraftIcaoCode> {
        self.aircraft_by_designator
            .get(&upper(designator))
            .map(|&idx| self.snapshot.aircraft_icaos[idx].clone())
    }

    fn find_aircraft_icao_by_key(&self, key: i32) -> Option<AircraftIcaoCode> {
        self.aircraft_by_key
            .get(&key)
            .map(|&idx| self.snapshot.aircraft_icaos[idx].clone())
    }

    fn find_airline_icao(&self, designator: &str) -> Option<AirlineIcaoCode> {
        self.airline_by_designator
            .get(&upper(designator))
            .map(|&idx| self.snapshot.airlines[idx].clone())
    }

    fn find_airline_by_name_or_telephony(
        &self,
        name: &str,
        telephony: &str,
    ) -> Option<AirlineIcaoCode> {
        self.snapshot
            .airlines
            .iter()
            .find(|a| a.matches_name_or_telephony(name, telephony))
            .cloned()
    }

    fn find_livery(&self, combined_code: &str) -> Option<Livery> {
        self.livery_by_code
            .get(&upper(combined_code))
            .map(|&idx| self.snapshot.liveries[idx].clone())
    }

    fn find_livery_by_key(&self, key: i32) -> Option<Livery> {
        self.livery_by_key
            .get(&key)
            .map(|&idx| self.snapshot.liveries[idx].clone())
    }

    fn aircraft_icaos_for_airline(&self, airline_designator: &str) -> Vec<AircraftIcaoCode> {
        let mut seen = HashSet::new();
        self.snapshot
            .models
            .iter()
            .filter(|m| m.airline().matches_designator(airline_designator))
            .filter(|m| seen.insert(m.aircraft_icao.designator.clone()))
            .map(|m| {
                self.find_aircraft_icao(&m.aircraft_icao.designator)
                    .unwrap_or_else(|| m.aircraft_icao.clone())
            })
            .collect()
    }

    fn categories(&self) -> Vec<AircraftCategory> {
        self.snapshot.categories.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> DbSnapshot {
        let dlh = AirlineIcaoCode::new("DLH")
            .with_name("Lufthansa")
            .with_telephony("LUFTHANSA")
            .with_db_key(10);
        let a320 = AircraftIcaoCode::new("A320")
            .with_combined_type("L2J")
            .with_family("A320")
            .with_db_key(1);
        let b738 = AircraftIcaoCode::new("B738").with_combined_type("L2J").with_db_key(2);
        let dlh_std = Livery::standard(&dlh).with_db_key(100);
        DbSnapshot {
            version: SNAPSHOT_VERSION.to_string(),
            aircraft_icaos: vec![a320.clone(), b738],
            airlines: vec![dlh],
            liveries: vec![dlh_std.clone()],
            models: vec![AircraftModel::new("A320 DLH", a320, dlh_std).with_db_key(1000)],
            categories: vec![AircraftCategory::new("glider", &[2])],
        }
    }

    #[test]
    fn test_lookups() {
        let cache = InMemoryDbCache::new(snapshot());
        assert_eq!(cache.find_aircraft_icao("a320").and_then(|a| a.db_key), Some(1));
        assert_eq!(cache.find_aircraft_icao_by_key(2).map(|a| a.designator), Some("B738".to_string()));
        assert!(cache.find_aircraft_icao("B744").is_none());
        assert_eq!(cache.find_airline_icao("dlh").and_then(|a| a.db_key), Some(10));
        assert_eq!(
            cache
                .find_airline_by_name_or_telephony("", "lufthansa")
                .map(|a| a.designator),
            Some("DLH".to_string())
        );
        assert_eq!(cache.find_livery_by_key(100).map(|l| l.combined_code), Some("DLH._STD".to_string()));
        assert!(cache
            .find_standard_livery(&AirlineIcaoCode::new("DLH"))
            .is_some());
        assert_eq!(cache.categories().len(), 1);
    }

    #[test]
    fn test_models_are_database_entries() {
        let cache = InMemoryDbCache::new(snapshot());
        let model = cache.find_model("a320 dlh").unwrap();
        assert_eq!(model.model_type, ModelType::DatabaseEntry);
        assert_eq!(cache.find_model_by_key(1000).map(|m| m.model_string), Some("A320 DLH".to_string()));
    }

    #[test]
    fn test_aircraft_for_airline() {
        let cache = InMemoryDbCache::new(snapshot());
        let aircraft = cache.aircraft_icaos_for_airline("DLH");
        assert_eq!(aircraft.len(), 1);
        assert_eq!(aircraft[0].designator, "A320");
        assert!(cache.aircraft_icaos_for_airline("AUA").is_empty());
    }

    #[test]
    fn test_json_snapshot() {
        let json = serde_json::to_string(&snapshot()).unwrap();
        let cache = InMemoryDbCache::from_json(&json).unwrap();
        assert!(!cache.is_empty());
        assert!(InMemoryDbCache::empty().is_empty());
        assert!(matches!(
            InMemoryDbCache::from_json("{"),
            Err(DbCacheError::ParseError(_))
        ));
    }
}
