//! Reverse lookup of sparse network data.
//!
//! Turns network strings into canonical aircraft ICAO, airline ICAO and
//! livery records. Each step only runs if the previous one produced nothing:
//!
//! 1. model string in the database
//! 2. model string in the model set
//! 3. database ids carried in the network livery string
//! 4. aircraft designator via the database, else among the airline's aircraft
//! 5. airline designator via the database, else by name or telephony
//!    (memoized per callsign), else derived from the callsign
//! 6. the reverse lookup script, whose overrides are taken over verbatim
//!
//! Misses never fail, they yield default records.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::catalog::model_list::ModelFinder;
use crate::core::icao::{AircraftIcaoCode, AirlineIcaoCode, Livery};
use crate::core::model::AircraftModel;
use crate::core::remote::RemoteAircraft;
use crate::core::types::{DbTripleIds, ModelType};
use crate::db::DbCache;
use crate::matching::log::{log_details, LogCategory, LogSink};
use crate::matching::script::{MatchingScriptInput, ScriptEngine, ScriptReturnValues, ScriptStage};
use crate::setup::{MatcherSetup, MatchingModeFlag};
use crate::utils::validation::airline_designator_from_callsign;

pub struct ReverseLookupResolver {
    db: Arc<dyn DbCache>,
    script_engine: Option<Arc<dyn ScriptEngine>>,
    /// Callsign -> airline resolved by name or telephony
    airline_memo: Mutex<HashMap<String, AirlineIcaoCode>>,
}

impl ReverseLookupResolver {
    pub fn new(db: Arc<dyn DbCache>) -> Self {
        Self {
            db,
            script_engine: None,
            airline_memo: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_script_engine(mut self, engine: Arc<dyn ScriptEngine>) -> Self {
        self.script_engine = Some(engine);
        self
    }

    pub fn db(&self) -> &Arc<dyn DbCache> {
        &self.db
    }

    pub fn script_engine(&self) -> Option<&Arc<dyn ScriptEngine>> {
        self.script_engine.as_ref()
    }

    /// Forget memoized airlines, e.g. for a new session
    pub fn clear_memo(&self) {
        self.airline_memo
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Resolve the full model of a remote aircraft.
    ///
    /// The result carries the callsign and `ModelType::ReverseLookup`, unless
    /// it is a model of the set, which keeps its own type.
    pub fn reverse_lookup_model(
        &self,
        remote: &RemoteAircraft,
        model_set: &[AircraftModel],
        setup: &MatcherSetup,
        log: &mut dyn LogSink,
    ) -> AircraftModel {
        let callsign = remote.callsign.as_str();
        let model = self
            .lookup_by_model_string(remote, model_set, setup, log)
            .or_else(|| self.lookup_by_livery_ids(remote, setup, log))
            .unwrap_or_else(|| self.lookup_by_parts(remote, model_set, log));

        let mut model = model.with_callsign(callsign);
        if setup.do_run_reverse_lookup_script() {
            model = self.run_reverse_lookup_script(remote, model, setup, log);
        }

        log_details(
            log,
            callsign,
            LogCategory::ReverseLookup,
            format!("Reverse lookup result: {model}"),
        );
        model
    }

    fn lookup_by_model_string(
        &self,
        remote: &RemoteAircraft,
        model_set: &[AircraftModel],
        setup: &MatcherSetup,
        log: &mut dyn LogSink,
    ) -> Option<AircraftModel> {
        let callsign = remote.callsign.as_str();
        if !setup.is_reverse_lookup_model_string() || !remote.has_model_string() {
            return None;
        }
        let model_string = remote.model_string();

        if let Some(db_model) = self.db.find_model(model_string) {
            log_details(
                log,
                callsign,
                LogCategory::ReverseLookup,
                format!("Model string '{model_string}' found in DB: {}", db_model.icao_summary()),
            );
            return Some(db_model.with_model_type(ModelType::ReverseLookup));
        }

        let set_model = ModelFinder::new(model_set).find_by_model_string(model_string)?;
        if !set_model.is_db_entry() && setup.mode.contains(MatchingModeFlag::ExcludeNoDbData) {
            log_details(
                log,
                callsign,
                LogCategory::ReverseLookup,
                format!("Model string '{model_string}' in set, but without DB data, ignored"),
            );
            return None;
        }
        log_details(
            log,
            callsign,
            LogCategory::ReverseLookup,
            format!("Model string '{model_string}' found in model set: {}", set_model.icao_summary()),
        );
        Some(set_model.clone())
    }

    fn lookup_by_livery_ids(
        &self,
        remote: &RemoteAircraft,
        setup: &MatcherSetup,
        log: &mut dyn LogSink,
    ) -> Option<AircraftModel> {
        if !setup.is_reverse_lookup_livery_ids() {
            return None;
        }
        let ids = DbTripleIds::parse_network_livery(&remote.network.livery)?;
        let callsign = remote.callsign.as_str();

        if let Some(model) = ids.model.and_then(|key| self.db.find_model_by_key(key)) {
            log_details(
                log,
                callsign,
                LogCategory::ReverseLookup,
                format!("Model found by DB id {}: {}", model.db_key.unwrap_or_default(), model.model_string),
            );
            return Some(model.with_model_type(ModelType::ReverseLookup));
        }

        let livery = ids.livery.and_then(|key| self.db.find_livery_by_key(key));
        let aircraft = ids.aircraft.and_then(|key| self.db.find_aircraft_icao_by_key(key));
        if livery.is_none() && aircraft.is_none() {
            log_details(
                log,
                callsign,
                LogCategory::ReverseLookup,
                format!("No DB data for ids in '{}'", remote.network.livery),
            );
            return None;
        }

        let mut aircraft = aircraft.unwrap_or_default();
        aircraft.update_missing_parts(remote.aircraft_icao());
        let livery = livery.unwrap_or_else(|| self.reverse_lookup_standard_livery(remote.airline(), callsign, log));
        log_details(
            log,
            callsign,
            LogCategory::ReverseLookup,
            format!("Resolved by DB ids: '{aircraft}' '{}'", livery.combined_code),
        );
        Some(
            AircraftModel::new(remote.model_string(), aircraft, livery)
                .with_model_type(ModelType::ReverseLookup),
        )
    }

    fn lookup_by_parts(
        &self,
        remote: &RemoteAircraft,
        model_set: &[AircraftModel],
        log: &mut dyn LogSink,
    ) -> AircraftModel {
        let callsign = remote.callsign.as_str();
        let remote_airline = remote.airline();

        let mut airline = self.reverse_lookup_airline_icao(
            &remote_airline.designator,
            remote_airline.name.as_deref().unwrap_or_default(),
            remote_airline.telephony.as_deref().unwrap_or_default(),
            callsign,
            log,
        );
        airline.update_missing_parts(remote_airline);

        let mut aircraft = self.reverse_lookup_aircraft_icao(
            &remote.aircraft_icao().designator,
            &airline.designator,
            model_set,
            callsign,
            log,
        );
        aircraft.update_missing_parts(remote.aircraft_icao());

        let livery = if remote.livery().has_combined_code() {
            let code = remote.livery().combined_code.as_str();
            match self.db.find_livery(code) {
                Some(livery) => {
                    log_details(log, callsign, LogCategory::ReverseLookup, format!("Livery '{code}' found in DB"));
                    livery
                }
                None => Livery::new(code, airline.clone()),
            }
        } else {
            self.reverse_lookup_standard_livery(&airline, callsign, log)
        };

        AircraftModel::new(remote.model_string(), aircraft, livery)
            .with_model_type(ModelType::ReverseLookup)
    }

    /// Resolve an aircraft designator, constrained to the airline's aircraft on a DB miss
    pub fn reverse_lookup_aircraft_icao(
        &self,
        designator: &str,
        airline_designator: &str,
        model_set: &[AircraftModel],
        callsign: &str,
        log: &mut dyn LogSink,
    ) -> AircraftIcaoCode {
        let designator = designator.trim();
        if !designator.is_empty() {
            if let Some(icao) = self.db.find_aircraft_icao(designator) {
                log_details(
                    log,
                    callsign,
                    LogCategory::ReverseLookup,
                    format!("Aircraft '{designator}' found in DB"),
                );
                return icao;
            }
            log_details(
                log,
                callsign,
                LogCategory::ReverseLookup,
                format!("Aircraft '{designator}' not in DB"),
            );
        }

        if !airline_designator.trim().is_empty() {
            if let Some(icao) =
                self.search_among_airline_aircraft(designator, airline_designator, model_set, callsign, log)
            {
                return icao;
            }
        }

        AircraftIcaoCode::new(designator)
    }

    /// Search the designator among the aircraft an airline is known to fly:
    /// exact designator, then family, then designator prefix. Without a
    /// designator the airline must fly exactly one aircraft type.
    fn search_among_airline_aircraft(
        &self,
        designator: &str,
        airline_designator: &str,
        model_set: &[AircraftModel],
        callsign: &str,
        log: &mut dyn LogSink,
    ) -> Option<AircraftIcaoCode> {
        let mut known = self.db.aircraft_icaos_for_airline(airline_designator);
        for d in ModelFinder::new(model_set).aircraft_designators_of_airline(airline_designator) {
            if !known.iter().any(|k| k.matches_designator(&d)) {
                known.push(self.db.find_aircraft_icao(&d).unwrap_or_else(|| AircraftIcaoCode::new(&d)));
            }
        }
        if known.is_empty() {
            log_details(
                log,
                callsign,
                LogCategory::ReverseLookup,
                format!("No aircraft known for airline '{airline_designator}'"),
            );
            return None;
        }

        let found = if designator.is_empty() {
            (known.len() == 1).then(|| known[0].clone())
        } else {
            let upper = designator.to_ascii_uppercase();
            known
                .iter()
                .find(|k| k.matches_designator(designator))
                .or_else(|| known.iter().find(|k| k.matches_family(designator)))
                .or_else(|| known.iter().find(|k| k.designator.starts_with(&upper)))
                .cloned()
        };

        match &found {
            Some(icao) => log_details(
                log,
                callsign,
                LogCategory::ReverseLookup,
                format!(
                    "Aircraft '{designator}' resolved to '{}' among {} aircraft of '{airline_designator}'",
                    icao.designator,
                    known.len()
                ),
            ),
            None => log_details(
                log,
                callsign,
                LogCategory::ReverseLookup,
                format!("Aircraft '{designator}' not among aircraft of '{airline_designator}'"),
            ),
        }
        found
    }

    /// Resolve an airline by designator, name/telephony or callsign
    pub fn reverse_lookup_airline_icao(
        &self,
        designator: &str,
        name: &str,
        telephony: &str,
        callsign: &str,
        log: &mut dyn LogSink,
    ) -> AirlineIcaoCode {
        let designator = designator.trim();
        if !designator.is_empty() {
            if let Some(airline) = self.db.find_airline_icao(designator) {
                log_details(
                    log,
                    callsign,
                    LogCategory::ReverseLookup,
                    format!("Airline '{designator}' found in DB"),
                );
                return airline;
            }
        }

        if let Some(airline) = self.memoized_airline(callsign) {
            log_details(
                log,
                callsign,
                LogCategory::ReverseLookup,
                format!("Airline '{}' from previous lookup", airline.designator),
            );
            return airline;
        }

        if !name.trim().is_empty() || !telephony.trim().is_empty() {
            if let Some(airline) = self.db.find_airline_by_name_or_telephony(name, telephony) {
                log_details(
                    log,
                    callsign,
                    LogCategory::ReverseLookup,
                    format!(
                        "Airline '{}' found by name '{name}' or telephony '{telephony}'",
                        airline.designator
                    ),
                );
                self.memoize_airline(callsign, &airline);
                return airline;
            }
        }

        if let Some(from_callsign) = airline_designator_from_callsign(callsign) {
            if from_callsign != designator {
                if let Some(airline) = self.db.find_airline_icao(&from_callsign) {
                    log_details(
                        log,
                        callsign,
                        LogCategory::ReverseLookup,
                        format!("Airline '{from_callsign}' derived from callsign"),
                    );
                    self.memoize_airline(callsign, &airline);
                    return airline;
                }
            }
        }

        log_details(
            log,
            callsign,
            LogCategory::ReverseLookup,
            format!("Airline '{designator}' not resolved, using network values"),
        );
        AirlineIcaoCode::new(designator)
            .with_name(name)
            .with_telephony(telephony)
    }

    /// Standard livery of an airline, a synthesized one on a DB miss
    pub fn reverse_lookup_standard_livery(
        &self,
        airline: &AirlineIcaoCode,
        callsign: &str,
        log: &mut dyn LogSink,
    ) -> Livery {
        if let Some(livery) = self.db.find_standard_livery(airline) {
            log_details(
                log,
                callsign,
                LogCategory::ReverseLookup,
                format!("Standard livery '{}' found in DB", livery.combined_code),
            );
            return livery;
        }
        Livery::standard(airline)
    }

    fn memoized_airline(&self, callsign: &str) -> Option<AirlineIcaoCode> {
        self.airline_memo
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(callsign)
            .cloned()
    }

    fn memoize_airline(&self, callsign: &str, airline: &AirlineIcaoCode) {
        if callsign.is_empty() {
            return;
        }
        self.airline_memo
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(callsign.to_string(), airline.clone());
    }

    fn run_reverse_lookup_script(
        &self,
        remote: &RemoteAircraft,
        model: AircraftModel,
        setup: &MatcherSetup,
        log: &mut dyn LogSink,
    ) -> AircraftModel {
        let callsign = remote.callsign.as_str();
        let (Some(engine), Some(file)) = (&self.script_engine, setup.reverse_lookup_script.file.as_deref()) else {
            return model;
        };

        let input = MatchingScriptInput::new(ScriptStage::ReverseLookup, remote, &model);
        match engine.run(file, &input) {
            Ok(values) => self.apply_script_overrides(model, &values, callsign, log),
            Err(e) => {
                tracing::warn!(callsign, error = %e, "Reverse lookup script failed");
                log_details(log, callsign, LogCategory::Script, format!("Script failed: {e}"));
                model
            }
        }
    }

    /// Take over script overrides verbatim, enriched from the DB where it knows the values
    pub fn apply_script_overrides(
        &self,
        mut model: AircraftModel,
        values: &ScriptReturnValues,
        callsign: &str,
        log: &mut dyn LogSink,
    ) -> AircraftModel {
        if let Some(message) = &values.log_message {
            log_details(log, callsign, LogCategory::Script, message);
        }
        if !values.has_overrides() {
            log_details(log, callsign, LogCategory::Script, "Script returned no overrides");
            return model;
        }

        if let Some(designator) = values.aircraft_icao() {
            model.aircraft_icao = self
                .db
                .find_aircraft_icao(designator)
                .unwrap_or_else(|| AircraftIcaoCode::new(designator));
        }
        if let Some(designator) = values.airline_icao() {
            let airline = self
                .db
                .find_airline_icao(designator)
                .unwrap_or_else(|| AirlineIcaoCode::new(designator));
            model.livery = Livery::standard(&airline);
        }
        if let Some(code) = values.livery() {
            let airline = model.airline().clone();
            model.livery = self
                .db
                .find_livery(code)
                .unwrap_or_else(|| Livery::new(code, airline));
        }
        if let Some(model_string) = values.model_string() {
            model.model_string = model_string.to_string();
        }

        log_details(
            log,
            callsign,
            LogCategory::Script,
            format!("Script overrides applied: {}", model.icao_summary()),
        );
        model
    }
}
