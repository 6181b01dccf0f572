use serde::{Deserialize, Serialize};

use super::icao::{AircraftCategory, AircraftIcaoCode, AirlineIcaoCode, Livery};
use super::types::{ModelMode, ModelType, Simulator};

/// An installed (or database described) aircraft model.
///
/// The model string is the unique key within a model set and is compared
/// case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AircraftModel {
    pub model_string: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distributor: Option<String>,

    #[serde(default)]
    pub simulator: Simulator,

    #[serde(default)]
    pub aircraft_icao: AircraftIcaoCode,

    #[serde(default)]
    pub livery: Livery,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub mode: ModelMode,

    #[serde(default)]
    pub model_type: ModelType,

    /// Callsign the model was matched for, only set on match results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callsign: Option<String>,

    /// Database key, set for models backed by the authoritative database
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_key: Option<i32>,

    #[serde(default)]
    pub default_model: bool,
}

impl AircraftModel {
    pub fn new(model_string: &str, aircraft_icao: AircraftIcaoCode, livery: Livery) -> Self {
        Self {
            model_string: model_string.trim().to_string(),
            aircraft_icao,
            livery,
            ..Self::default()
        }
    }

    /// Empty model carrying only the callsign, used when nothing else is available
    #[must_use]
    pub fn empty_for(callsign: &str) -> Self {
        Self {
            callsign: Some(callsign.to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_distributor(mut self, distributor: &str) -> Self {
        self.distributor = Some(distributor.to_string());
        self
    }

    #[must_use]
    pub fn with_simulator(mut self, simulator: Simulator) -> Self {
        self.simulator = simulator;
        self
    }

    #[must_use]
    pub fn with_db_key(mut self, key: i32) -> Self {
        self.db_key = Some(key);
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: ModelMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_model_type(mut self, model_type: ModelType) -> Self {
        self.model_type = model_type;
        self
    }

    #[must_use]
    pub fn with_callsign(mut self, callsign: &str) -> Self {
        self.callsign = Some(callsign.to_string());
        self
    }

    /// Uniqueness key of the model string
    #[must_use]
    pub fn key(&self) -> String {
        self.model_string.to_ascii_uppercase()
    }

    #[must_use]
    pub fn has_model_string(&self) -> bool {
        !self.model_string.is_empty()
    }

    #[must_use]
    pub fn matches_model_string(&self, model_string: &str) -> bool {
        self.has_model_string() && self.model_string.eq_ignore_ascii_case(model_string.trim())
    }

    #[must_use]
    pub fn is_db_entry(&self) -> bool {
        self.db_key.is_some()
    }

    #[must_use]
    pub fn is_excluded(&self) -> bool {
        self.mode == ModelMode::Exclude
    }

    #[must_use]
    pub fn airline(&self) -> &AirlineIcaoCode {
        &self.livery.airline
    }

    #[must_use]
    pub fn category(&self) -> Option<&AircraftCategory> {
        self.aircraft_icao.category.as_ref()
    }

    #[must_use]
    pub fn family(&self) -> Option<&str> {
        self.aircraft_icao.family.as_deref()
    }

    #[must_use]
    pub fn combined_type(&self) -> Option<&str> {
        self.aircraft_icao.combined_type.as_deref()
    }

    #[must_use]
    pub fn is_military(&self) -> bool {
        self.aircraft_icao.military || self.livery.airline.military
    }

    #[must_use]
    pub fn is_vtol(&self) -> bool {
        self.aircraft_icao.vtol
    }

    #[must_use]
    pub fn has_color_livery(&self) -> bool {
        self.livery.is_color_livery()
    }

    /// Aircraft and airline designators, e.g. `A320 AUA`
    #[must_use]
    pub fn icao_summary(&self) -> String {
        let airline = &self.livery.airline.designator;
        if airline.is_empty() {
            self.aircraft_icao.designator.clone()
        } else {
            format!("{} {airline}", self.aircraft_icao.designator)
        }
    }
}

impl std::fmt::Display for AircraftModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' {}", self.model_string, self.icao_summary())?;
        if self.livery.has_combined_code() {
            write!(f, " {}", self.livery.combined_code)?;
        }
        Ok(())
    }
}
