use serde::{Deserialize, Serialize};

use super::icao::{AircraftCategory, AircraftIcaoCode, AirlineIcaoCode, Livery};
use super::model::AircraftModel;
use super::types::{ModelType, Simulator};
use crate::utils::validation::{COLOR_LIVERY_MARKER, STANDARD_LIVERY_SUFFIX};

/// Raw strings as received from the network, never modified by matching
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkValues {
    #[serde(default)]
    pub aircraft_icao: String,
    #[serde(default)]
    pub airline_icao: String,
    #[serde(default)]
    pub airline_name: String,
    #[serde(default)]
    pub telephony: String,
    #[serde(default)]
    pub livery: String,
    #[serde(default)]
    pub model_string: String,
}

/// A remote aircraft as seen by the matcher.
///
/// `model` holds the currently known canonical values: initially derived from
/// the network strings, later replaced by the reverse lookup result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAircraft {
    pub callsign: String,

    #[serde(default)]
    pub network: NetworkValues,

    #[serde(default)]
    pub model: AircraftModel,

    #[serde(default)]
    pub simulator: Simulator,
}

impl RemoteAircraft {
    pub fn new(callsign: &str) -> Self {
        let callsign = callsign.trim().to_ascii_uppercase();
        let mut model = AircraftModel::default().with_model_type(ModelType::QueriedFromNetwork);
        model.callsign = Some(callsign.clone());
        Self {
            callsign,
            ..Self::default()
        }
        .with_model(model)
    }

    /// Build a remote aircraft from the typical network tuple
    pub fn from_network(
        callsign: &str,
        aircraft_icao: &str,
        airline_icao: &str,
        livery: &str,
        model_string: &str,
    ) -> Self {
        Self::new(callsign)
            .with_aircraft_icao(aircraft_icao)
            .with_airline_icao(airline_icao)
            .with_livery(livery)
            .with_model_string(model_string)
    }

    #[must_use]
    pub fn with_aircraft_icao(mut self, designator: &str) -> Self {
        self.network.aircraft_icao = designator.trim().to_string();
        self.model.aircraft_icao.designator = designator.trim().to_ascii_uppercase();
        self
    }

    #[must_use]
    pub fn with_airline_icao(mut self, designator: &str) -> Self {
        self.network.airline_icao = designator.trim().to_string();
        self.model.livery.airline.designator = designator.trim().to_ascii_uppercase();
        self
    }

    #[must_use]
    pub fn with_airline_name(mut self, name: &str) -> Self {
        self.network.airline_name = name.trim().to_string();
        let airline = std::mem::take(&mut self.model.livery.airline);
        self.model.livery.airline = airline.with_name(name);
        self
    }

    #[must_use]
    pub fn with_telephony(mut self, telephony: &str) -> Self {
        self.network.telephony = telephony.trim().to_string();
        let airline = std::mem::take(&mut self.model.livery.airline);
        self.model.livery.airline = airline.with_telephony(telephony);
        self
    }

    /// Network livery string; only combined codes are taken over as livery
    #[must_use]
    pub fn with_livery(mut self, livery: &str) -> Self {
        let livery = livery.trim();
        self.network.livery = livery.to_string();
        let upper = livery.to_ascii_uppercase();
        if upper.starts_with(COLOR_LIVERY_MARKER) || upper.contains('.') {
            let airline = self.model.livery.airline.clone();
            self.model.livery = Livery::new(&upper, airline);
        }
        self
    }

    #[must_use]
    pub fn with_model_string(mut self, model_string: &str) -> Self {
        self.network.model_string = model_string.trim().to_string();
        self.model.model_string = model_string.trim().to_string();
        self
    }

    #[must_use]
    pub fn with_combined_type(mut self, combined_type: &str) -> Self {
        let icao = std::mem::take(&mut self.model.aircraft_icao);
        self.model.aircraft_icao = icao.with_combined_type(combined_type);
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: AircraftCategory) -> Self {
        self.model.aircraft_icao.category = Some(category);
        self
    }

    #[must_use]
    pub fn with_military(mut self, military: bool) -> Self {
        self.model.aircraft_icao.military = military;
        self
    }

    #[must_use]
    pub fn with_vtol(mut self, vtol: bool) -> Self {
        self.model.aircraft_icao.vtol = vtol;
        self
    }

    #[must_use]
    pub fn with_simulator(mut self, simulator: Simulator) -> Self {
        self.simulator = simulator;
        self
    }

    /// Replace the known model, the callsign is kept
    #[must_use]
    pub fn with_model(mut self, mut model: AircraftModel) -> Self {
        model.callsign = Some(self.callsign.clone());
        self.model = model;
        self
    }

    #[must_use]
    pub fn aircraft_icao(&self) -> &AircraftIcaoCode {
        &self.model.aircraft_icao
    }

    #[must_use]
    pub fn airline(&self) -> &AirlineIcaoCode {
        &self.model.livery.airline
    }

    #[must_use]
    pub fn livery(&self) -> &Livery {
        &self.model.livery
    }

    #[must_use]
    pub fn model_string(&self) -> &str {
        &self.model.model_string
    }

    #[must_use]
    pub fn has_model_string(&self) -> bool {
        self.model.has_model_string()
    }

    #[must_use]
    pub fn category(&self) -> Option<&AircraftCategory> {
        self.model.category()
    }

    #[must_use]
    pub fn combined_type(&self) -> Option<&str> {
        self.model.combined_type()
    }

    /// Livery code to match against: explicit livery, else the airline's standard livery
    #[must_use]
    pub fn livery_code_or_standard(&self) -> String {
        if self.model.livery.has_combined_code() {
            return self.model.livery.combined_code.clone();
        }
        let airline = self.airline();
        if airline.has_designator() {
            format!("{}{STANDARD_LIVERY_SUFFIX}", airline.designator)
        } else {
            String::new()
        }
    }
}
