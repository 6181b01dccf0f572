//! Model set verification.
//!
//! Runs when a model set is loaded with `ModelVerificationAtStartup`.
//! Errors make a model unusable for matching. Warnings and infos are
//! only reported.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::core::model::AircraftModel;
use crate::utils::validation::{
    is_valid_aircraft_designator, is_valid_combined_type, validate_model_string,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationMessage {
    pub model_string: String,
    pub severity: Severity,
    pub message: String,
}

impl std::fmt::Display for VerificationMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] '{}': {}", self.severity, self.model_string, self.message)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationReport {
    pub checked: usize,
    pub messages: Vec<VerificationMessage>,
}

impl VerificationReport {
    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|m| m.severity == Severity::Error)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.messages.iter().filter(|m| m.severity == severity).count()
    }

    /// Model strings with at least one error
    pub fn failed_model_strings(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.messages
            .iter()
            .filter(|m| m.severity == Severity::Error && !m.model_string.is_empty())
            .filter(|m| seen.insert(m.model_string.to_ascii_uppercase()))
            .map(|m| m.model_string.clone())
            .collect()
    }
}

/// Verify a model set as loaded (before duplicates are removed).
///
/// With `only_warn_error` informational findings are dropped.
pub fn verify_model_set(models: &[AircraftModel], only_warn_error: bool) -> VerificationReport {
    let mut messages = Vec::new();
    let mut seen = HashSet::new();

    for model in models {
        let ms = model.model_string.clone();
        let mut push = |severity: Severity, message: String| {
            messages.push(VerificationMessage {
                model_string: ms.clone(),
                severity,
                message,
            });
        };

        if let Err(e) = validate_model_string(&model.model_string) {
            push(Severity::Error, e.to_string());
            continue;
        }
        if !seen.insert(model.key()) {
            // the first occurrence stays in the set
            push(Severity::Warning, "Duplicate model string, ignored".to_string());
            continue;
        }

        let icao = &model.aircraft_icao;
        if !icao.has_designator() {
            push(Severity::Error, "No aircraft designator".to_string());
        } else if !is_valid_aircraft_designator(&icao.designator) {
            push(
                Severity::Warning,
                format!("Invalid aircraft designator '{}'", icao.designator),
            );
        }

        match icao.combined_type.as_deref() {
            None => push(Severity::Info, "No combined type".to_string()),
            Some(ct) if !is_valid_combined_type(ct) => {
                push(Severity::Warning, format!("Invalid combined type '{ct}'"));
            }
            Some(_) => {}
        }

        if !model.livery.has_combined_code() && !model.airline().has_designator() {
            push(Severity::Info, "Neither livery nor airline".to_string());
        }
        if !model.is_db_entry() {
            push(Severity::Info, "Not a database model".to_string());
        }
    }

    if only_warn_error {
        messages.retain(|m| m.severity >= Severity::Warning);
    }

    tracing::info!(
        checked = models.len(),
        messages = messages.len(),
        "Model set verified"
    );

    VerificationReport {
        checked: models.len(),
        messages,
    }
}
