use serde::{Deserialize, Serialize};

use crate::utils::validation::{
    is_valid_aircraft_designator, is_valid_airline_designator, is_valid_combined_type,
    normalize_designator, COLOR_LIVERY_MARKER, STANDARD_LIVERY_SUFFIX,
};

/// Node of the hierarchical aircraft category tree.
///
/// The level is the path from the root, e.g. `[2, 1]` renders as `2.1`.
/// Two categories are the same category when their levels are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AircraftCategory {
    pub name: String,

    pub level: Vec<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_key: Option<i32>,
}

impl AircraftCategory {
    pub fn new(name: impl Into<String>, level: &[u32]) -> Self {
        Self {
            name: name.into(),
            level: level.to_vec(),
            db_key: None,
        }
    }

    /// Root level of the subtree this category belongs to
    #[must_use]
    pub fn first_level(&self) -> Option<u32> {
        self.level.first().copied()
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.level.len()
    }

    /// A root node, e.g. `2` but not `2.1`
    #[must_use]
    pub fn is_first_level(&self) -> bool {
        self.depth() == 1
    }

    /// Level of the parent node, empty for roots
    #[must_use]
    pub fn parent_level(&self) -> &[u32] {
        match self.level.split_last() {
            Some((_, parent)) => parent,
            None => &[],
        }
    }

    #[must_use]
    pub fn is_same_category(&self, other: &AircraftCategory) -> bool {
        !self.level.is_empty() && self.level == other.level
    }

    /// Same parent, different node
    #[must_use]
    pub fn is_sibling(&self, other: &AircraftCategory) -> bool {
        self.depth() == other.depth()
            && self.depth() > 1
            && self.parent_level() == other.parent_level()
            && self.level != other.level
    }

    #[must_use]
    pub fn level_string(&self) -> String {
        self.level
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }

    #[must_use]
    pub fn level_and_name(&self) -> String {
        format!("{} {}", self.level_string(), self.name)
    }

    #[must_use]
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(name.trim())
    }
}

impl std::fmt::Display for AircraftCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.level_and_name())
    }
}

/// Aircraft ICAO record, e.g. `A320` / `L2J` / `AIRBUS`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AircraftIcaoCode {
    pub designator: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,

    /// Combined type such as `L2J`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combined_type: Option<String>,

    #[serde(default)]
    pub military: bool,

    #[serde(default)]
    pub vtol: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<AircraftCategory>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_key: Option<i32>,
}

impl AircraftIcaoCode {
    pub fn new(designator: &str) -> Self {
        Self {
            designator: normalize_designator(designator),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_combined_type(mut self, combined_type: &str) -> Self {
        let ct = normalize_designator(combined_type);
        self.combined_type = (!ct.is_empty()).then_some(ct);
        self
    }

    #[must_use]
    pub fn with_family(mut self, family: &str) -> Self {
        let family = normalize_designator(family);
        self.family = (!family.is_empty()).then_some(family);
        self
    }

    #[must_use]
    pub fn with_manufacturer(mut self, manufacturer: &str) -> Self {
        let manufacturer = normalize_designator(manufacturer);
        self.manufacturer = (!manufacturer.is_empty()).then_some(manufacturer);
        self
    }

    #[must_use]
    pub fn with_military(mut self, military: bool) -> Self {
        self.military = military;
        self
    }

    #[must_use]
    pub fn with_vtol(mut self, vtol: bool) -> Self {
        self.vtol = vtol;
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: AircraftCategory) -> Self {
        self.category = Some(category);
        self
    }

    #[must_use]
    pub fn with_db_key(mut self, key: i32) -> Self {
        self.db_key = Some(key);
        self
    }

    #[must_use]
    pub fn has_designator(&self) -> bool {
        !self.designator.is_empty()
    }

    #[must_use]
    pub fn has_valid_designator(&self) -> bool {
        is_valid_aircraft_designator(&self.designator)
    }

    #[must_use]
    pub fn has_valid_combined_type(&self) -> bool {
        self.combined_type
            .as_deref()
            .is_some_and(is_valid_combined_type)
    }

    #[must_use]
    pub fn has_category(&self) -> bool {
        self.category.is_some()
    }

    #[must_use]
    pub fn has_family(&self) -> bool {
        self.family.is_some()
    }

    #[must_use]
    pub fn is_db_entry(&self) -> bool {
        self.db_key.is_some()
    }

    #[must_use]
    pub fn matches_designator(&self, designator: &str) -> bool {
        self.has_designator() && self.designator.eq_ignore_ascii_case(designator.trim())
    }

    #[must_use]
    pub fn matches_family(&self, family: &str) -> bool {
        self.family
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case(family.trim()))
    }

    #[must_use]
    pub fn matches_manufacturer(&self, manufacturer: &str) -> bool {
        self.manufacturer
            .as_deref()
            .is_some_and(|m| m.eq_ignore_ascii_case(manufacturer.trim()))
    }

    #[must_use]
    pub fn matches_combined_type(&self, combined_type: &str) -> bool {
        self.combined_type
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(combined_type.trim()))
    }

    /// Aircraft type char of the combined type (`L` in `L2J`)
    #[must_use]
    pub fn aircraft_type(&self) -> Option<char> {
        self.combined_type_char(0)
    }

    /// Engine count char of the combined type (`2` in `L2J`)
    #[must_use]
    pub fn engine_count(&self) -> Option<char> {
        self.combined_type_char(1)
    }

    /// Engine type char of the combined type (`J` in `L2J`)
    #[must_use]
    pub fn engine_type(&self) -> Option<char> {
        self.combined_type_char(2)
    }

    fn combined_type_char(&self, index: usize) -> Option<char> {
        if !self.has_valid_combined_type() {
            return None;
        }
        self.combined_type.as_deref().and_then(|c| c.chars().nth(index))
    }

    /// Fill empty parts from another code, existing values win
    pub fn update_missing_parts(&mut self, other: &AircraftIcaoCode) {
        if !self.has_designator() {
            self.designator.clone_from(&other.designator);
        }
        if self.family.is_none() {
            self.family.clone_from(&other.family);
        }
        if self.manufacturer.is_none() {
            self.manufacturer.clone_from(&other.manufacturer);
        }
        if self.combined_type.is_none() {
            self.combined_type.clone_from(&other.combined_type);
        }
        if self.category.is_none() {
            self.category.clone_from(&other.category);
        }
        if self.db_key.is_none() {
            self.db_key = other.db_key;
        }
        self.military |= other.military;
        self.vtol |= other.vtol;
    }
}

impl std::fmt::Display for AircraftIcaoCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.designator)?;
        if let Some(ct) = &self.combined_type {
            write!(f, " {ct}")?;
        }
        if let Some(key) = self.db_key {
            write!(f, " ({key})")?;
        }
        Ok(())
    }
}

/// Airline ICAO record, e.g. `DLH` / `Lufthansa` / `LUFTHANSA`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirlineIcaoCode {
    pub designator: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Radio telephony designator, e.g. `LUFTHANSA`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telephony: Option<String>,

    #[serde(default)]
    pub virtual_airline: bool,

    #[serde(default)]
    pub military: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_designator: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_key: Option<i32>,
}

impl AirlineIcaoCode {
    pub fn new(designator: &str) -> Self {
        Self {
            designator: normalize_designator(designator),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        let name = name.trim();
        self.name = (!name.is_empty()).then(|| name.to_string());
        self
    }

    #[must_use]
    pub fn with_telephony(mut self, telephony: &str) -> Self {
        let telephony = normalize_designator(telephony);
        self.telephony = (!telephony.is_empty()).then_some(telephony);
        self
    }

    #[must_use]
    pub fn with_group(mut self, group_id: i32, group_designator: &str) -> Self {
        self.group_id = Some(group_id);
        self.group_designator = Some(normalize_designator(group_designator));
        self
    }

    #[must_use]
    pub fn with_db_key(mut self, key: i32) -> Self {
        self.db_key = Some(key);
        self
    }

    #[must_use]
    pub fn has_designator(&self) -> bool {
        !self.designator.is_empty()
    }

    #[must_use]
    pub fn has_valid_designator(&self) -> bool {
        is_valid_airline_designator(&self.designator)
    }

    #[must_use]
    pub fn has_name_or_telephony(&self) -> bool {
        self.name.is_some() || self.telephony.is_some()
    }

    #[must_use]
    pub fn is_db_entry(&self) -> bool {
        self.db_key.is_some()
    }

    #[must_use]
    pub fn matches_designator(&self, designator: &str) -> bool {
        self.has_designator() && self.designator.eq_ignore_ascii_case(designator.trim())
    }

    /// Case-insensitive match of either the airline name or the telephony designator
    #[must_use]
    pub fn matches_name_or_telephony(&self, name: &str, telephony: &str) -> bool {
        let name = name.trim();
        let telephony = telephony.trim();
        let by_name = !name.is_empty()
            && self
                .name
                .as_deref()
                .is_some_and(|n| n.eq_ignore_ascii_case(name));
        let by_telephony = !telephony.is_empty()
            && self
                .telephony
                .as_deref()
                .is_some_and(|t| t.eq_ignore_ascii_case(telephony));
        by_name || by_telephony
    }

    #[must_use]
    pub fn is_same_group(&self, other: &AirlineIcaoCode) -> bool {
        matches!((self.group_id, other.group_id), (Some(a), Some(b)) if a == b)
    }

    /// Fill empty parts from another code, existing values win
    pub fn update_missing_parts(&mut self, other: &AirlineIcaoCode) {
        if !self.has_designator() {
            self.designator.clone_from(&other.designator);
        }
        if self.name.is_none() {
            self.name.clone_from(&other.name);
        }
        if self.telephony.is_none() {
            self.telephony.clone_from(&other.telephony);
        }
        if self.group_id.is_none() {
            self.group_id = other.group_id;
            self.group_designator.clone_from(&other.group_designator);
        }
        if self.db_key.is_none() {
            self.db_key = other.db_key;
        }
    }
}

impl std::fmt::Display for AirlineIcaoCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.designator)?;
        if let Some(name) = &self.name {
            write!(f, " {name}")?;
        }
        if let Some(key) = self.db_key {
            write!(f, " ({key})")?;
        }
        Ok(())
    }
}

/// Paint scheme, either an airline livery or a color livery without airline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Livery {
    /// Combined code, e.g. `DLH._STD`, `AUA.OLD` or `_CC1020FF`
    pub combined_code: String,

    #[serde(default)]
    pub airline: AirlineIcaoCode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_key: Option<i32>,
}

impl Livery {
    pub fn new(combined_code: &str, airline: AirlineIcaoCode) -> Self {
        Self {
            combined_code: normalize_designator(combined_code),
            airline,
            description: None,
            db_key: None,
        }
    }

    /// The standard livery of an airline
    #[must_use]
    pub fn standard(airline: &AirlineIcaoCode) -> Self {
        Self::new(&Self::standard_code(airline), airline.clone())
    }

    #[must_use]
    pub fn standard_code(airline: &AirlineIcaoCode) -> String {
        if airline.has_designator() {
            format!("{}{STANDARD_LIVERY_SUFFIX}", airline.designator)
        } else {
            String::new()
        }
    }

    /// A color livery (airline independent), `rgb` like `1020FF`
    #[must_use]
    pub fn color(rgb: &str) -> Self {
        Self::new(
            &format!("{COLOR_LIVERY_MARKER}{}", normalize_designator(rgb)),
            AirlineIcaoCode::default(),
        )
    }

    #[must_use]
    pub fn with_db_key(mut self, key: i32) -> Self {
        self.db_key = Some(key);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    #[must_use]
    pub fn has_combined_code(&self) -> bool {
        !self.combined_code.is_empty()
    }

    #[must_use]
    pub fn is_color_livery(&self) -> bool {
        self.combined_code.starts_with(COLOR_LIVERY_MARKER)
    }

    #[must_use]
    pub fn is_airline_livery(&self) -> bool {
        !self.is_color_livery() && self.airline.has_designator()
    }

    #[must_use]
    pub fn is_standard(&self) -> bool {
        self.combined_code.ends_with(STANDARD_LIVERY_SUFFIX)
    }

    #[must_use]
    pub fn is_db_entry(&self) -> bool {
        self.db_key.is_some()
    }

    #[must_use]
    pub fn matches_combined_code(&self, code: &str) -> bool {
        self.has_combined_code() && self.combined_code.eq_ignore_ascii_case(code.trim())
    }
}

impl std::fmt::Display for Livery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.combined_code)?;
        if let Some(key) = self.db_key {
            write!(f, " ({key})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_relations() {
        let glider = AircraftCategory::new("glider", &[2]);
        let sailplane = AircraftCategory::new("sailplane", &[2, 1]);
        let motor_glider = AircraftCategory::new("motor glider", &[2, 2]);
        let sailplane_2 = AircraftCategory::new("sailplane", &[2, 1]);

        assert!(glider.is_first_level());
        assert_eq!(sailplane.first_level(), Some(2));
        assert_eq!(sailplane.parent_level(), &[2]);
        assert!(sailplane.is_sibling(&motor_glider));
        assert!(!sailplane.is_sibling(&sailplane_2));
        assert!(!glider.is_sibling(&AircraftCategory::new("military", &[3])));
        assert!(sailplane.is_same_category(&sailplane_2));
        assert_eq!(motor_glider.level_and_name(), "2.2 motor glider");
    }

    #[test]
    fn test_combined_type_parts() {
        let icao = AircraftIcaoCode::new("a320").with_combined_type("l2j");
        assert_eq!(icao.designator, "A320");
        assert_eq!(icao.aircraft_type(), Some('L'));
        assert_eq!(icao.engine_count(), Some('2'));
        assert_eq!(icao.engine_type(), Some('J'));

        let broken = AircraftIcaoCode::new("XXXX").with_combined_type("??");
        assert_eq!(broken.aircraft_type(), None);
    }

    #[test]
    fn test_update_missing_parts() {
        let mut icao = AircraftIcaoCode::new("B738");
        let db = AircraftIcaoCode::new("B738")
            .with_combined_type("L2J")
            .with_family("B737")
            .with_db_key(7);
        icao.update_missing_parts(&db);
        assert_eq!(icao.combined_type.as_deref(), Some("L2J"));
        assert_eq!(icao.family.as_deref(), Some("B737"));
        assert_eq!(icao.db_key, Some(7));
    }

    #[test]
    fn test_airline_name_or_telephony() {
        let dlh = AirlineIcaoCode::new("DLH")
            .with_name("Lufthansa")
            .with_telephony("Lufthansa");
        assert!(dlh.matches_name_or_telephony("lufthansa", ""));
        assert!(dlh.matches_name_or_telephony("", "LUFTHANSA"));
        assert!(!dlh.matches_name_or_telephony("", ""));
        assert!(!dlh.matches_name_or_telephony("Austrian", "AUSTRIAN"));
    }

    #[test]
    fn test_livery_kinds() {
        let aua = AirlineIcaoCode::new("AUA");
        let standard = Livery::standard(&aua);
        assert_eq!(standard.combined_code, "AUA._STD");
        assert!(standard.is_standard());
        assert!(standard.is_airline_livery());

        let color = Livery::color("ff0000");
        assert_eq!(color.combined_code, "_CCFF0000");
        assert!(color.is_color_livery());
        assert!(!color.is_airline_livery());

        assert_eq!(Livery::standard_code(&AirlineIcaoCode::default()), "");
    }
}
