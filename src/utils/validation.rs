//! Centralized validation and normalization of ICAO-style identifiers.
//!
//! Network data arrives as free text, so every designator is trimmed and
//! upper-cased before it is compared against catalog or database values.

use thiserror::Error;

/// Designator the ICAO uses for gliders without a more specific type
pub const GLIDER_DESIGNATOR: &str = "GLID";

/// Suffix of a standard livery combined code, e.g. `DLH._STD`
pub const STANDARD_LIVERY_SUFFIX: &str = "._STD";

/// Prefix marking a color livery (no airline), e.g. `_CC1020FF`
pub const COLOR_LIVERY_MARKER: &str = "_CC";

/// Maximum length of a model string accepted from network or files
pub const MAX_MODEL_STRING_LENGTH: usize = 255;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid aircraft designator: {0}")]
    AircraftDesignator(String),

    #[error("Invalid airline designator: {0}")]
    AirlineDesignator(String),

    #[error("Invalid combined type: {0}")]
    CombinedType(String),

    #[error("Model string too long ({0} characters)")]
    ModelStringTooLong(usize),

    #[error("Empty model string")]
    EmptyModelString,
}

/// Trim and upper-case a designator or code.
///
/// ```
/// use model_matcher::utils::validation::normalize_designator;
///
/// assert_eq!(normalize_designator(" a320 "), "A320");
/// ```
#[must_use]
pub fn normalize_designator(s: &str) -> String {
    s.trim().to_ascii_uppercase()
}

/// Validate an aircraft ICAO type designator (2-4 alphanumerics, starting with a letter).
///
/// ```
/// use model_matcher::utils::validation::is_valid_aircraft_designator;
///
/// assert!(is_valid_aircraft_designator("A320"));
/// assert!(is_valid_aircraft_designator("B38M"));
/// assert!(!is_valid_aircraft_designator("320"));
/// assert!(!is_valid_aircraft_designator("A3201"));
/// ```
#[must_use]
pub fn is_valid_aircraft_designator(s: &str) -> bool {
    let len = s.len();
    (2..=4).contains(&len)
        && s.chars().next().is_some_and(|c| c.is_ascii_uppercase())
        && s.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// Validate an airline ICAO designator (3 letters, 4 for virtual airlines).
#[must_use]
pub fn is_valid_airline_designator(s: &str) -> bool {
    (3..=4).contains(&s.len()) && s.chars().all(|c| c.is_ascii_uppercase())
}

/// Validate a combined type such as `L2J`.
///
/// First character: aircraft type (L land, S sea, A amphibian, H helicopter,
/// G gyrocopter, T tilt-wing), second: engine count (1-8 or C for coupled),
/// third: engine type (J jet, T turbo, P piston, E electric, R rocket).
#[must_use]
pub fn is_valid_combined_type(s: &str) -> bool {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() != 3 {
        return false;
    }
    matches!(chars[0], 'L' | 'S' | 'A' | 'H' | 'G' | 'T')
        && matches!(chars[1], '1'..='8' | 'C')
        && matches!(chars[2], 'J' | 'T' | 'P' | 'E' | 'R')
}

/// Derive an airline designator from an airline-style callsign (`DLH123` -> `DLH`).
///
/// Returns `None` for general aviation style callsigns such as `DEABC` or `N123AB`.
#[must_use]
pub fn airline_designator_from_callsign(callsign: &str) -> Option<String> {
    let cs = normalize_designator(callsign);
    // byte 3 may fall inside a non-ASCII character
    let (Some(prefix), Some(rest)) = (cs.get(..3), cs.get(3..)) else {
        return None;
    };
    if !is_valid_airline_designator(prefix) {
        return None;
    }
    // flight number has to start with a digit
    if !rest.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(prefix.to_string())
}

/// Validate a model string before it enters a model set.
///
/// # Errors
///
/// Returns an error for empty or oversized model strings.
pub fn validate_model_string(model_string: &str) -> Result<(), ValidationError> {
    let trimmed = model_string.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyModelString);
    }
    if trimmed.len() > MAX_MODEL_STRING_LENGTH {
        return Err(ValidationError::ModelStringTooLong(trimmed.len()));
    }
    Ok(())
}
