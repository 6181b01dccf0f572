use serde::{Deserialize, Serialize};

/// Simulator a model set belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Simulator {
    Fsx,
    P3d,
    Fs9,
    Msfs,
    Msfs2024,
    Xplane,
    Flightgear,
    #[default]
    Unspecified,
}

impl std::fmt::Display for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fsx => write!(f, "FSX"),
            Self::P3d => write!(f, "P3D"),
            Self::Fs9 => write!(f, "FS9"),
            Self::Msfs => write!(f, "MSFS"),
            Self::Msfs2024 => write!(f, "MSFS2024"),
            Self::Xplane => write!(f, "X-Plane"),
            Self::Flightgear => write!(f, "FlightGear"),
            Self::Unspecified => write!(f, "unspecified"),
        }
    }
}

/// Where a model value came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    #[default]
    Unknown,
    /// Queried by network protocol (ICAO data only)
    QueriedFromNetwork,
    /// Model string sent by the remote client
    NetworkModelString,
    /// Result of a reverse lookup
    ReverseLookup,
    /// Result of model matching
    ModelMatching,
    /// Default model assigned by model matching
    ModelMatchingDefault,
    /// Entry of the authoritative database
    DatabaseEntry,
    /// Installed model of the own simulator
    OwnSimulatorModel,
}

/// Whether a model may take part in matching
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelMode {
    #[default]
    Include,
    Exclude,
}

/// How the final model was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// Remote model string equals a model string of the set
    ExactModelString,
    /// Stepwise reduction left a single or picked candidate
    Reduction,
    /// Highest score
    Score,
    /// Combined type default substitution
    CombinedTypeDefault,
    /// Configured default model
    DefaultModel,
    /// Matching-stage script override
    Script,
}

impl std::fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExactModelString => write!(f, "exact model string"),
            Self::Reduction => write!(f, "stepwise reduction"),
            Self::Score => write!(f, "score"),
            Self::CombinedTypeDefault => write!(f, "combined type default"),
            Self::DefaultModel => write!(f, "default model"),
            Self::Script => write!(f, "matching script"),
        }
    }
}

/// Database ids transported in a network livery string from a prior session.
///
/// Format: `swift_m<modelId>l<liveryId>a<aircraftIcaoId>`, each part optional,
/// e.g. `swift_m1234l55a17` or `swift_l55a17`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbTripleIds {
    pub model: Option<i32>,
    pub livery: Option<i32>,
    pub aircraft: Option<i32>,
}

impl DbTripleIds {
    const PREFIX: &'static str = "swift_";

    /// Parse the ids from a network livery string, `None` if it carries no ids
    #[must_use]
    pub fn parse_network_livery(livery: &str) -> Option<Self> {
        let lower = livery.trim().to_ascii_lowercase();
        let body = lower.strip_prefix(Self::PREFIX)?;

        let mut ids = Self::default();
        let mut chars = body.chars().peekable();
        while let Some(tag) = chars.next() {
            let mut digits = String::new();
            while let Some(c) = chars.peek().filter(|c| c.is_ascii_digit()) {
                digits.push(*c);
                chars.next();
            }
            let id: i32 = digits.parse().ok()?;
            match tag {
                'm' => ids.model = Some(id),
                'l' => ids.livery = Some(id),
                'a' => ids.aircraft = Some(id),
                _ => return None,
            }
        }

        if ids.is_empty() {
            None
        } else {
            Some(ids)
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.model.is_none() && self.livery.is_none() && self.aircraft.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_triple() {
        let ids = DbTripleIds::parse_network_livery("swift_m1234l55a17").unwrap();
        assert_eq!(ids.model, Some(1234));
        assert_eq!(ids.livery, Some(55));
        assert_eq!(ids.aircraft, Some(17));
    }

    #[test]
    fn test_parse_partial_triple() {
        let ids = DbTripleIds::parse_network_livery("SWIFT_L55A17").unwrap();
        assert_eq!(ids.model, None);
        assert_eq!(ids.livery, Some(55));
        assert_eq!(ids.aircraft, Some(17));
    }

    #[test]
    fn test_parse_rejects_free_text() {
        assert!(DbTripleIds::parse_network_livery("DLH").is_none());
        assert!(DbTripleIds::parse_network_livery("swift_").is_none());
        assert!(DbTripleIds::parse_network_livery("swift_x12").is_none());
        assert!(DbTripleIds::parse_network_livery("swift_m").is_none());
    }

    #[test]
    fn test_simulator_display() {
        assert_eq!(Simulator::Msfs.to_string(), "MSFS");
        assert_eq!(Simulator::default(), Simulator::Unspecified);
    }
}
