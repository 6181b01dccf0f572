use std::collections::HashSet;

use crate::core::icao::{AircraftCategory, AirlineIcaoCode};
use crate::core::model::AircraftModel;
use crate::setup::{ForceMode, ForceModeFlag};

/// Finds models within a model slice.
///
/// Every finder keeps the slice order, so the first element of a result is
/// always the one with the lowest catalog position.
pub struct ModelFinder<'a> {
    models: &'a [AircraftModel],
}

impl<'a> ModelFinder<'a> {
    pub fn new(models: &'a [AircraftModel]) -> Self {
        Self { models }
    }

    fn filtered(&self, predicate: impl Fn(&AircraftModel) -> bool) -> Vec<AircraftModel> {
        self.models.iter().filter(|m| predicate(m)).cloned().collect()
    }

    /// First model with the given model string
    pub fn find_by_model_string(&self, model_string: &str) -> Option<&'a AircraftModel> {
        if model_string.trim().is_empty() {
            return None;
        }
        self.models
            .iter()
            .find(|m| m.matches_model_string(model_string))
    }

    pub fn contains_model_string(&self, model_string: &str) -> bool {
        self.find_by_model_string(model_string).is_some()
    }

    pub fn find_all_by_model_string(&self, model_string: &str) -> Vec<AircraftModel> {
        self.filtered(|m| m.matches_model_string(model_string))
    }

    pub fn find_by_aircraft_designator(&self, designator: &str) -> Vec<AircraftModel> {
        self.filtered(|m| m.aircraft_icao.matches_designator(designator))
    }

    pub fn find_by_family(&self, family: &str) -> Vec<AircraftModel> {
        self.filtered(|m| m.aircraft_icao.matches_family(family))
    }

    pub fn find_by_combined_type(&self, combined_type: &str) -> Vec<AircraftModel> {
        self.filtered(|m| m.aircraft_icao.matches_combined_type(combined_type))
    }

    pub fn find_by_manufacturer(&self, manufacturer: &str) -> Vec<AircraftModel> {
        self.filtered(|m| m.aircraft_icao.matches_manufacturer(manufacturer))
    }

    /// Same combined type and same manufacturer
    pub fn find_by_combined_type_and_manufacturer(
        &self,
        combined_type: &str,
        manufacturer: &str,
    ) -> Vec<AircraftModel> {
        self.filtered(|m| {
            m.aircraft_icao.matches_combined_type(combined_type)
                && m.aircraft_icao.matches_manufacturer(manufacturer)
        })
    }

    /// Models agreeing with `combined_type` on the forced components only
    pub fn find_by_forced_combined_type(
        &self,
        combined_type: &str,
        force: ForceMode,
    ) -> Vec<AircraftModel> {
        if force.is_nothing() {
            return Vec::new();
        }
        let wanted: Vec<char> = combined_type.trim().to_ascii_uppercase().chars().collect();
        if wanted.len() != 3 {
            return Vec::new();
        }
        self.filtered(|m| {
            let icao = &m.aircraft_icao;
            let parts = [
                (ForceModeFlag::ForceType, icao.aircraft_type(), wanted[0]),
                (ForceModeFlag::ForceEngineCount, icao.engine_count(), wanted[1]),
                (ForceModeFlag::ForceEngine, icao.engine_type(), wanted[2]),
            ];
            parts
                .iter()
                .filter(|(flag, _, _)| force.contains(*flag))
                .all(|(_, have, want)| *have == Some(*want))
        })
    }

    pub fn find_by_airline_designator(&self, designator: &str) -> Vec<AircraftModel> {
        self.filtered(|m| m.airline().matches_designator(designator))
    }

    /// Models of airlines in the same group as `airline`
    pub fn find_by_airline_group(&self, airline: &AirlineIcaoCode) -> Vec<AircraftModel> {
        if airline.group_id.is_none() {
            return Vec::new();
        }
        self.filtered(|m| m.airline().is_same_group(airline))
    }

    pub fn find_by_airline_name_or_telephony(
        &self,
        name: &str,
        telephony: &str,
    ) -> Vec<AircraftModel> {
        self.filtered(|m| m.airline().matches_name_or_telephony(name, telephony))
    }

    pub fn find_by_livery_code(&self, combined_code: &str) -> Vec<AircraftModel> {
        self.filtered(|m| m.livery.matches_combined_code(combined_code))
    }

    /// Aircraft designator plus livery code (or airline designator when the code is empty)
    pub fn find_by_aircraft_and_livery(
        &self,
        aircraft_designator: &str,
        livery_code: &str,
    ) -> Vec<AircraftModel> {
        self.filtered(|m| {
            m.aircraft_icao.matches_designator(aircraft_designator)
                && m.livery.matches_combined_code(livery_code)
        })
    }

    pub fn find_by_aircraft_and_airline(
        &self,
        aircraft_designator: &str,
        airline_designator: &str,
    ) -> Vec<AircraftModel> {
        self.filtered(|m| {
            m.aircraft_icao.matches_designator(aircraft_designator)
                && m.airline().matches_designator(airline_designator)
        })
    }

    pub fn contains_aircraft_and_airline(
        &self,
        aircraft_designator: &str,
        airline_designator: &str,
    ) -> bool {
        self.models.iter().any(|m| {
            m.aircraft_icao.matches_designator(aircraft_designator)
                && (airline_designator.is_empty()
                    || m.airline().matches_designator(airline_designator))
        })
    }

    pub fn find_color_liveries(&self) -> Vec<AircraftModel> {
        self.filtered(AircraftModel::has_color_livery)
    }

    pub fn find_by_military(&self, military: bool) -> Vec<AircraftModel> {
        self.filtered(|m| m.is_military() == military)
    }

    pub fn find_by_vtol(&self, vtol: bool) -> Vec<AircraftModel> {
        self.filtered(|m| m.is_vtol() == vtol)
    }

    pub fn find_with_db_data(&self) -> Vec<AircraftModel> {
        self.filtered(AircraftModel::is_db_entry)
    }

    pub fn find_not_excluded(&self) -> Vec<AircraftModel> {
        self.filtered(|m| !m.is_excluded())
    }

    /// Aircraft designator or family matching any of `patterns`
    pub fn find_by_designator_or_family_patterns(&self, patterns: &[&str]) -> Vec<AircraftModel> {
        self.filtered(|m| {
            patterns.iter().any(|p| {
                m.aircraft_icao.matches_designator(p) || m.aircraft_icao.matches_family(p)
            })
        })
    }

    pub fn find_by_category(&self, category: &AircraftCategory) -> Vec<AircraftModel> {
        self.filtered(|m| m.category().is_some_and(|c| c.is_same_category(category)))
    }

    /// Models whose category is any of `categories`
    pub fn find_by_categories(&self, categories: &[AircraftCategory]) -> Vec<AircraftModel> {
        self.filtered(|m| {
            m.category()
                .is_some_and(|c| categories.iter().any(|other| c.is_same_category(other)))
        })
    }

    pub fn find_by_first_level(&self, first_level: u32) -> Vec<AircraftModel> {
        self.filtered(|m| m.category().and_then(AircraftCategory::first_level) == Some(first_level))
    }

    /// Distinct aircraft designators of an airline's models
    pub fn aircraft_designators_of_airline(&self, airline_designator: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.models
            .iter()
            .filter(|m| m.airline().matches_designator(airline_designator))
            .map(|m| m.aircraft_icao.designator.clone())
            .filter(|d| !d.is_empty() && seen.insert(d.clone()))
            .collect()
    }
}

/// Upper-cased model strings, the uniqueness keys of a model list
pub fn model_string_keys(models: &[AircraftModel]) -> Vec<String> {
    models.iter().map(AircraftModel::key).collect()
}

/// Keep the first model per model string and drop models without model string
pub fn dedupe_by_model_string(models: Vec<AircraftModel>) -> Vec<AircraftModel> {
    let mut seen = HashSet::new();
    models
        .into_iter()
        .filter(|m| m.has_model_string() && seen.insert(m.key()))
        .collect()
}

/// Model strings for log output, at most `limit` entries
pub fn model_strings_summary(models: &[AircraftModel], limit: usize) -> String {
    let mut parts: Vec<&str> = models
        .iter()
        .take(limit)
        .map(|m| m.model_string.as_str())
        .collect();
    if models.len() > limit {
        parts.push("...");
    }
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::icao::{AircraftIcaoCode, Livery};

    fn model(ms: &str, icao: &str, ct: &str, airline: &str) -> AircraftModel {
        let airline = AirlineIcaoCode::new(airline);
        AircraftModel::new(
            ms,
            AircraftIcaoCode::new(icao)
                .with_combined_type(ct)
                .with_manufacturer("ACME"),
            Livery::standard(&airline),
        )
    }

    fn models() -> Vec<AircraftModel> {
        vec![
            model("A320_AUA", "A320", "L2J", "AUA"),
            model("B738_DLH", "B738", "L2J", "DLH"),
            model("C172_STD", "C172", "L1P", ""),
            model("A320_DLH", "A320", "L2J", "DLH"),
        ]
    }

    #[test]
    fn test_find_by_model_string_case_insensitive() {
        let models = models();
        let finder = ModelFinder::new(&models);
        assert_eq!(
            finder.find_by_model_string("b738_dlh").map(|m| m.model_string.as_str()),
            Some("B738_DLH")
        );
        assert!(finder.find_by_model_string("").is_none());
    }

    #[test]
    fn test_find_keeps_order() {
        let models = models();
        let finder = ModelFinder::new(&models);
        let a320 = finder.find_by_aircraft_designator("a320");
        assert_eq!(model_string_keys(&a320), vec!["A320_AUA", "A320_DLH"]);
        assert_eq!(finder.find_by_combined_type("L2J").len(), 3);
        assert_eq!(finder.find_by_airline_designator("DLH").len(), 2);
        assert_eq!(finder.find_by_livery_code("AUA._STD").len(), 1);
    }

    #[test]
    fn test_forced_combined_type() {
        let models = models();
        let finder = ModelFinder::new(&models);
        let force_type = ForceMode::from_flags(&[ForceModeFlag::ForceType]);
        assert_eq!(finder.find_by_forced_combined_type("L4T", force_type).len(), 4);

        let force_engine = ForceMode::from_flags(&[ForceModeFlag::ForceEngine]);
        assert_eq!(finder.find_by_forced_combined_type("L1J", force_engine).len(), 3);

        assert!(finder
            .find_by_forced_combined_type("L2J", ForceMode::NOTHING)
            .is_empty());
    }

    #[test]
    fn test_airline_aircraft_designators() {
        let models = models();
        let finder = ModelFinder::new(&models);
        assert_eq!(
            finder.aircraft_designators_of_airline("DLH"),
            vec!["B738".to_string(), "A320".to_string()]
        );
        assert!(finder.contains_aircraft_and_airline("A320", "AUA"));
        assert!(!finder.contains_aircraft_and_airline("B738", "AUA"));
    }

    #[test]
    fn test_dedupe_keeps_first() {
        let mut list = models();
        list.push(model("a320_aua", "A321", "L2J", "AUA"));
        list.push(AircraftModel::default());
        let deduped = dedupe_by_model_string(list);
        assert_eq!(deduped.len(), 4);
        assert_eq!(deduped[0].aircraft_icao.designator, "A320");
    }

    #[test]
    fn test_summary_is_limited() {
        let models = models();
        assert_eq!(model_strings_summary(&models, 2), "A320_AUA, B738_DLH, ...");
    }
}
