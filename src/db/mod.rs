//! Authoritative database query contract.
//!
//! The matcher never talks to a live database. It queries an already
//! populated, read-only cache through [`DbCache`], which must be safe to
//! share between threads. [`memory::InMemoryDbCache`] is the provided
//! implementation, loaded from a JSON snapshot.

pub mod memory;

use thiserror::Error;

use crate::core::icao::{AircraftCategory, AircraftIcaoCode, AirlineIcaoCode, Livery};
use crate::core::model::AircraftModel;

#[derive(Error, Debug)]
pub enum DbCacheError {
    #[error("Failed to read database snapshot: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse database snapshot: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Lookups against the database cache. Misses are `None`, never errors.
pub trait DbCache: Send + Sync {
    fn find_model(&self, model_string: &str) -> Option<AircraftModel>;

    fn find_model_by_key(&self, key: i32) -> Option<AircraftModel>;

    fn find_aircraft_icao(&self, designator: &str) -> Option<AircraftIcaoCode>;

    fn find_aircraft_icao_by_key(&self, key: i32) -> Option<AircraftIcaoCode>;

    fn find_airline_icao(&self, designator: &str) -> Option<AirlineIcaoCode>;

    /// Airline by name or telephony designator, case-insensitive
    fn find_airline_by_name_or_telephony(
        &self,
        name: &str,
        telephony: &str,
    ) -> Option<AirlineIcaoCode>;

    fn find_livery(&self, combined_code: &str) -> Option<Livery>;

    fn find_livery_by_key(&self, key: i32) -> Option<Livery>;

    /// Aircraft flown by an airline according to the database models
    fn aircraft_icaos_for_airline(&self, airline_designator: &str) -> Vec<AircraftIcaoCode>;

    /// Flat category list, the input of the category index
    fn categories(&self) -> Vec<AircraftCategory>;

    fn find_standard_livery(&self, airline: &AirlineIcaoCode) -> Option<Livery> {
        let code = Livery::standard_code(airline);
        if code.is_empty() {
            return None;
        }
        self.find_livery(&code)
    }
}
