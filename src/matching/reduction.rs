//! Stepwise reduction of the candidate models.
//!
//! Every filter returns the narrowed list and whether it narrowed. A filter
//! never returns an empty list: when nothing matches, the input comes back
//! unchanged with `reduced == false`.
//!
//! Order of the pipeline:
//!
//! 1. exact model string (a single hit ends the pipeline)
//! 2. livery plus aircraft ICAO
//! 3. aircraft ICAO, airline first when configured, family fallbacks
//! 4. combined type, relaxed by the force mode
//! 5. manufacturer
//! 6. military / civilian and VTOL
//! 7. airline, airline group, airline name or telephony
//! 8. categories

use crate::catalog::categories::CategoryIndex;
use crate::catalog::model_list::{model_strings_summary, ModelFinder};
use crate::core::model::AircraftModel;
use crate::core::remote::RemoteAircraft;
use crate::matching::log::{log_details, LogCategory, LogSink};
use crate::setup::{MatcherSetup, MatchingModeFlag};

/// Result of the whole pipeline
#[derive(Debug, Clone)]
pub struct ReductionResult {
    pub candidates: Vec<AircraftModel>,
    /// At least one filter narrowed the candidates
    pub reduced: bool,
    /// Ended by an exact model string match
    pub exact_model_string: bool,
}

/// Keep `narrowed` unless it is empty
fn narrow(
    candidates: Vec<AircraftModel>,
    narrowed: Vec<AircraftModel>,
    what: &str,
    callsign: &str,
    log: &mut dyn LogSink,
) -> (Vec<AircraftModel>, bool) {
    if narrowed.is_empty() {
        log_details(
            log,
            callsign,
            LogCategory::Matching,
            format!("Not reduced by {what}, no match among {} models", candidates.len()),
        );
        return (candidates, false);
    }
    log_details(
        log,
        callsign,
        LogCategory::Matching,
        format!(
            "Reduced by {what} to {} of {} models: {}",
            narrowed.len(),
            candidates.len(),
            model_strings_summary(&narrowed, 5)
        ),
    );
    (narrowed, true)
}

/// Drop models without database data (`ExcludeNoDbData`) and excluded models (`ExcludeNoExcluded`)
pub fn apply_exclusions(
    remote: &RemoteAircraft,
    candidates: Vec<AircraftModel>,
    setup: &MatcherSetup,
    log: &mut dyn LogSink,
) -> Vec<AircraftModel> {
    let callsign = remote.callsign.as_str();
    let mut candidates = candidates;
    if setup.mode.contains(MatchingModeFlag::ExcludeNoDbData) {
        let with_db = ModelFinder::new(&candidates).find_with_db_data();
        candidates = narrow(candidates, with_db, "excluding models without DB data", callsign, log).0;
    }
    if setup.mode.contains(MatchingModeFlag::ExcludeNoExcluded) {
        let included = ModelFinder::new(&candidates).find_not_excluded();
        candidates = narrow(candidates, included, "excluding excluded models", callsign, log).0;
    }
    candidates
}

/// Exact model string match
pub fn reduce_by_model_string(
    remote: &RemoteAircraft,
    candidates: Vec<AircraftModel>,
    log: &mut dyn LogSink,
) -> (Vec<AircraftModel>, bool) {
    if !remote.has_model_string() {
        log_details(
            log,
            &remote.callsign,
            LogCategory::Matching,
            "No model string, no exact match possible",
        );
        return (candidates, false);
    }
    let found = ModelFinder::new(&candidates).find_all_by_model_string(remote.model_string());
    narrow(
        candidates,
        found,
        &format!("model string '{}'", remote.model_string()),
        &remote.callsign,
        log,
    )
}

/// Livery plus aircraft designator.
///
/// Without livery code the airline's standard livery is used, and if that
/// finds nothing, the airline designator.
pub fn reduce_by_livery_and_aircraft(
    remote: &RemoteAircraft,
    candidates: Vec<AircraftModel>,
    log: &mut dyn LogSink,
) -> (Vec<AircraftModel>, bool) {
    let designator = &remote.aircraft_icao().designator;
    let livery_code = remote.livery_code_or_standard();
    if designator.is_empty() || livery_code.is_empty() {
        log_details(
            log,
            &remote.callsign,
            LogCategory::Matching,
            "Missing aircraft designator or livery, no livery match possible",
        );
        return (candidates, false);
    }

    let finder = ModelFinder::new(&candidates);
    let mut found = finder.find_by_aircraft_and_livery(designator, &livery_code);
    if found.is_empty() && !remote.livery().has_combined_code() {
        found = finder.find_by_aircraft_and_airline(designator, &remote.airline().designator);
    }
    narrow(
        candidates,
        found,
        &format!("livery '{livery_code}' and aircraft '{designator}'"),
        &remote.callsign,
        log,
    )
}

pub fn reduce_by_aircraft(
    remote: &RemoteAircraft,
    candidates: Vec<AircraftModel>,
    log: &mut dyn LogSink,
) -> (Vec<AircraftModel>, bool) {
    let designator = &remote.aircraft_icao().designator;
    if designator.is_empty() {
        log_details(log, &remote.callsign, LogCategory::Matching, "No aircraft designator");
        return (candidates, false);
    }
    let found = ModelFinder::new(&candidates).find_by_aircraft_designator(designator);
    narrow(
        candidates,
        found,
        &format!("aircraft '{designator}'"),
        &remote.callsign,
        log,
    )
}

/// Family, then the designator treated as family, then the pseudo family
/// (same combined type and manufacturer) if allowed
pub fn reduce_by_family(
    remote: &RemoteAircraft,
    allow_pseudo_family: bool,
    candidates: Vec<AircraftModel>,
    log: &mut dyn LogSink,
) -> (Vec<AircraftModel>, bool) {
    let icao = remote.aircraft_icao();
    let callsign = remote.callsign.as_str();

    if let Some(family) = icao.family.as_deref() {
        let found = ModelFinder::new(&candidates).find_by_family(family);
        if !found.is_empty() {
            return narrow(candidates, found, &format!("real family '{family}'"), callsign, log);
        }
    }

    if icao.has_designator() {
        let found = ModelFinder::new(&candidates).find_by_family(&icao.designator);
        if !found.is_empty() {
            return narrow(
                candidates,
                found,
                &format!("ICAO '{}' treated as family", icao.designator),
                callsign,
                log,
            );
        }
    }

    if allow_pseudo_family {
        if let (Some(combined_type), Some(manufacturer)) =
            (icao.combined_type.as_deref(), icao.manufacturer.as_deref())
        {
            let found = ModelFinder::new(&candidates)
                .find_by_combined_type_and_manufacturer(combined_type, manufacturer);
            return narrow(
                candidates,
                found,
                &format!("pseudo family '{combined_type}' '{manufacturer}'"),
                callsign,
                log,
            );
        }
    }

    log_details(log, callsign, LogCategory::Matching, "Not reduced by family");
    (candidates, false)
}

/// Aircraft designator, falling back to the family steps when enabled
pub fn reduce_by_aircraft_or_family(
    remote: &RemoteAircraft,
    candidates: Vec<AircraftModel>,
    setup: &MatcherSetup,
    log: &mut dyn LogSink,
) -> (Vec<AircraftModel>, bool) {
    let (candidates, reduced) = reduce_by_aircraft(remote, candidates, log);
    if reduced || !setup.mode.contains(MatchingModeFlag::ByFamily) {
        return (candidates, reduced);
    }
    reduce_by_family(remote, setup.pseudo_family, candidates, log)
}

/// Combined type; when it has no models, relaxed to the components the force mode names
pub fn reduce_by_combined_type(
    remote: &RemoteAircraft,
    candidates: Vec<AircraftModel>,
    setup: &MatcherSetup,
    log: &mut dyn LogSink,
) -> (Vec<AircraftModel>, bool) {
    let Some(combined_type) = remote.combined_type().filter(|_| remote.aircraft_icao().has_valid_combined_type()) else {
        log_details(log, &remote.callsign, LogCategory::Matching, "No valid combined type");
        return (candidates, false);
    };

    let finder = ModelFinder::new(&candidates);
    let found = finder.find_by_combined_type(combined_type);
    if !found.is_empty() || setup.force_mode.is_nothing() {
        return narrow(
            candidates,
            found,
            &format!("combined type '{combined_type}'"),
            &remote.callsign,
            log,
        );
    }

    let relaxed = finder.find_by_forced_combined_type(combined_type, setup.force_mode);
    narrow(
        candidates,
        relaxed,
        &format!("combined type '{combined_type}' forcing {}", setup.force_mode),
        &remote.callsign,
        log,
    )
}

/// Force mode as a standalone filter, used before scoring
pub fn reduce_by_force_mode(
    remote: &RemoteAircraft,
    candidates: Vec<AircraftModel>,
    setup: &MatcherSetup,
    log: &mut dyn LogSink,
) -> (Vec<AircraftModel>, bool) {
    if setup.force_mode.is_nothing() {
        return (candidates, false);
    }
    let Some(combined_type) = remote.combined_type() else {
        return (candidates, false);
    };
    let found = ModelFinder::new(&candidates).find_by_forced_combined_type(combined_type, setup.force_mode);
    narrow(
        candidates,
        found,
        &format!("force mode {} of '{combined_type}'", setup.force_mode),
        &remote.callsign,
        log,
    )
}

pub fn reduce_by_manufacturer(
    remote: &RemoteAircraft,
    candidates: Vec<AircraftModel>,
    log: &mut dyn LogSink,
) -> (Vec<AircraftModel>, bool) {
    let Some(manufacturer) = remote.aircraft_icao().manufacturer.as_deref() else {
        log_details(log, &remote.callsign, LogCategory::Matching, "No manufacturer");
        return (candidates, false);
    };
    let found = ModelFinder::new(&candidates).find_by_manufacturer(manufacturer);
    narrow(
        candidates,
        found,
        &format!("manufacturer '{manufacturer}'"),
        &remote.callsign,
        log,
    )
}

/// Military or civilian, depending on the remote aircraft and the enabled flags
pub fn reduce_by_military_flag(
    remote: &RemoteAircraft,
    remote_military: bool,
    candidates: Vec<AircraftModel>,
    setup: &MatcherSetup,
    log: &mut dyn LogSink,
) -> (Vec<AircraftModel>, bool) {
    let flag = if remote_military {
        MatchingModeFlag::ByMilitary
    } else {
        MatchingModeFlag::ByCivilian
    };
    if !setup.mode.contains(flag) {
        return (candidates, false);
    }
    let found = ModelFinder::new(&candidates).find_by_military(remote_military);
    let what = if remote_military { "military" } else { "civilian" };
    narrow(candidates, found, what, &remote.callsign, log)
}

pub fn reduce_by_vtol_flag(
    remote: &RemoteAircraft,
    candidates: Vec<AircraftModel>,
    log: &mut dyn LogSink,
) -> (Vec<AircraftModel>, bool) {
    let vtol = remote.aircraft_icao().vtol;
    let found = ModelFinder::new(&candidates).find_by_vtol(vtol);
    let what = if vtol { "VTOL" } else { "non VTOL" };
    narrow(candidates, found, what, &remote.callsign, log)
}

/// Airline designator with group handling, then airline name or telephony
pub fn reduce_by_airline(
    remote: &RemoteAircraft,
    candidates: Vec<AircraftModel>,
    setup: &MatcherSetup,
    log: &mut dyn LogSink,
) -> (Vec<AircraftModel>, bool) {
    let airline = remote.airline();
    let callsign = remote.callsign.as_str();
    let finder = ModelFinder::new(&candidates);

    if airline.has_designator() {
        let found: Vec<AircraftModel> =
            if setup.mode.contains(MatchingModeFlag::ByAirlineGroupSameAsAirline) {
                // group members count as the airline
                candidates
                    .iter()
                    .filter(|m| {
                        m.airline().matches_designator(&airline.designator)
                            || m.airline().is_same_group(airline)
                    })
                    .cloned()
                    .collect()
            } else {
                finder.find_by_airline_designator(&airline.designator)
            };
        if !found.is_empty() {
            return narrow(
                candidates,
                found,
                &format!("airline '{}'", airline.designator),
                callsign,
                log,
            );
        }
        if setup.mode.contains(MatchingModeFlag::ByAirlineGroupIfNoAirline) {
            let group = finder.find_by_airline_group(airline);
            if !group.is_empty() {
                let group_name = airline.group_designator.clone().unwrap_or_default();
                return narrow(
                    candidates,
                    group,
                    &format!("airline group '{group_name}' of '{}'", airline.designator),
                    callsign,
                    log,
                );
            }
        }
    }

    let name = airline.name.as_deref().unwrap_or_default();
    let telephony = airline.telephony.as_deref().unwrap_or_default();
    if name.is_empty() && telephony.is_empty() {
        log_details(log, callsign, LogCategory::Matching, "Not reduced by airline");
        return (candidates, false);
    }
    let found = finder.find_by_airline_name_or_telephony(name, telephony);
    narrow(
        candidates,
        found,
        &format!("airline name '{name}' or telephony '{telephony}'"),
        callsign,
        log,
    )
}

/// The configured chain of filters over a model set
pub struct ReductionPipeline<'a> {
    setup: &'a MatcherSetup,
    categories: &'a CategoryIndex,
}

impl<'a> ReductionPipeline<'a> {
    pub fn new(setup: &'a MatcherSetup, categories: &'a CategoryIndex) -> Self {
        Self { setup, categories }
    }

    /// Run every enabled filter over `model_set`
    pub fn run(
        &self,
        remote: &RemoteAircraft,
        model_set: &[AircraftModel],
        log: &mut dyn LogSink,
    ) -> ReductionResult {
        let mode = self.setup.mode;
        let callsign = remote.callsign.as_str();
        let mut any_reduced = false;
        let mut step = |(list, reduced): (Vec<AircraftModel>, bool)| {
            any_reduced |= reduced;
            list
        };

        let mut candidates = apply_exclusions(remote, model_set.to_vec(), self.setup, log);

        if mode.contains(MatchingModeFlag::ByModelString) {
            let (list, reduced) = reduce_by_model_string(remote, candidates, log);
            if reduced && list.len() == 1 {
                log_details(
                    log,
                    callsign,
                    LogCategory::Summary,
                    format!("Exact model string match '{}'", list[0].model_string),
                );
                return ReductionResult {
                    candidates: list,
                    reduced: true,
                    exact_model_string: true,
                };
            }
            candidates = step((list, reduced));
        }

        if mode.contains(MatchingModeFlag::ByLivery) {
            candidates = step(reduce_by_livery_and_aircraft(remote, candidates, log));
        }

        let airline_first = mode.contains(MatchingModeFlag::ByIcaoOrderAirlineFirst);
        if mode.uses_icao_data() {
            if airline_first {
                candidates = step(reduce_by_airline(remote, candidates, self.setup, log));
            }
            candidates = step(reduce_by_aircraft_or_family(remote, candidates, self.setup, log));
        } else if mode.contains(MatchingModeFlag::ByFamily) {
            candidates = step(reduce_by_family(remote, self.setup.pseudo_family, candidates, log));
        }

        if mode.contains(MatchingModeFlag::ByCombinedType) {
            candidates = step(reduce_by_combined_type(remote, candidates, self.setup, log));
        }

        if mode.uses_icao_data() || mode.contains(MatchingModeFlag::ByCombinedType) {
            candidates = step(reduce_by_manufacturer(remote, candidates, log));
        }

        let remote_military = remote.aircraft_icao().military
            || remote.airline().military
            || remote
                .category()
                .is_some_and(|c| self.categories.is_military_category(c));
        candidates = step(reduce_by_military_flag(
            remote,
            remote_military,
            candidates,
            self.setup,
            log,
        ));
        if mode.contains(MatchingModeFlag::ByVtol) {
            candidates = step(reduce_by_vtol_flag(remote, candidates, log));
        }

        if mode.uses_icao_data() && !airline_first {
            candidates = step(reduce_by_airline(remote, candidates, self.setup, log));
        }

        candidates = step(self.categories.reduce_by_categories(
            candidates,
            model_set,
            self.setup,
            remote,
            log,
        ));

        log_details(
            log,
            callsign,
            LogCategory::Summary,
            format!(
                "Reduction left {} of {} models: {}",
                candidates.len(),
                model_set.len(),
                model_strings_summary(&candidates, 5)
            ),
        );

        ReductionResult {
            candidates,
            reduced: any_reduced,
            exact_model_string: false,
        }
    }
}
