//! Matching log: the caller-visible trace of why a model was chosen.
//!
//! Matching code appends through [`log_details`], which mirrors every
//! message to `tracing` at debug level. What reaches the caller's sink is
//! controlled by [`MatchingLog`] via [`FilteredSink`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of a matching log message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogCategory {
    /// Per-filter detail
    Matching,
    /// Stage results and the final decision
    Summary,
    ReverseLookup,
    Script,
    ModelSet,
}

impl std::fmt::Display for LogCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Matching => write!(f, "matching"),
            Self::Summary => write!(f, "summary"),
            Self::ReverseLookup => write!(f, "reverse lookup"),
            Self::Script => write!(f, "script"),
            Self::ModelSet => write!(f, "model set"),
        }
    }
}

/// Receiver of matching log messages
pub trait LogSink {
    fn append(&mut self, callsign: &str, message: &str, category: LogCategory);
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn append(&mut self, _callsign: &str, _message: &str, _category: LogCategory) {}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingMessage {
    pub callsign: String,
    pub message: String,
    pub category: LogCategory,
    pub timestamp: DateTime<Utc>,
}

/// Collects messages in order of appending
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MatchingMessages {
    messages: Vec<MatchingMessage>,
}

impl MatchingMessages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[MatchingMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Any message containing `text` (case-insensitive)
    pub fn contains(&self, text: &str) -> bool {
        let needle = text.to_lowercase();
        self.messages
            .iter()
            .any(|m| m.message.to_lowercase().contains(&needle))
    }

    pub fn for_callsign<'a>(&'a self, callsign: &'a str) -> impl Iterator<Item = &'a MatchingMessage> {
        self.messages
            .iter()
            .filter(move |m| m.callsign.eq_ignore_ascii_case(callsign))
    }

    /// One `callsign [category] message` line per message
    pub fn to_lines(&self) -> Vec<String> {
        self.messages
            .iter()
            .map(|m| format!("{} [{}] {}", m.callsign, m.category, m.message))
            .collect()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl LogSink for MatchingMessages {
    fn append(&mut self, callsign: &str, message: &str, category: LogCategory) {
        self.messages.push(MatchingMessage {
            callsign: callsign.to_string(),
            message: message.to_string(),
            category,
            timestamp: Utc::now(),
        });
    }
}

/// What to pass on to the caller's sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchingLog {
    Nothing,
    /// Model set changes and verification only
    ModelSet,
    /// Stage summaries, reverse lookup and script results
    #[default]
    Simplified,
    /// Everything except model set messages
    Full,
    All,
}

impl MatchingLog {
    #[must_use]
    pub fn accepts(self, category: LogCategory) -> bool {
        match self {
            Self::Nothing => false,
            Self::ModelSet => category == LogCategory::ModelSet,
            Self::Simplified => matches!(
                category,
                LogCategory::Summary | LogCategory::ReverseLookup | LogCategory::Script
            ),
            Self::Full => category != LogCategory::ModelSet,
            Self::All => true,
        }
    }
}

/// Passes on the categories accepted by a [`MatchingLog`]
pub struct FilteredSink<'a> {
    inner: &'a mut dyn LogSink,
    what: MatchingLog,
}

impl<'a> FilteredSink<'a> {
    pub fn new(inner: &'a mut dyn LogSink, what: MatchingLog) -> Self {
        Self { inner, what }
    }
}

impl LogSink for FilteredSink<'_> {
    fn append(&mut self, callsign: &str, message: &str, category: LogCategory) {
        if self.what.accepts(category) {
            self.inner.append(callsign, message, category);
        }
    }
}

/// Append to the sink and mirror to `tracing`
pub fn log_details(
    sink: &mut dyn LogSink,
    callsign: &str,
    category: LogCategory,
    message: impl AsRef<str>,
) {
    let message = message.as_ref();
    tracing::debug!(callsign, category = %category, "{message}");
    sink.append(callsign, message, category);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_in_order() {
        let mut messages = MatchingMessages::new();
        log_details(&mut messages, "DLH1", LogCategory::Matching, "first");
        log_details(&mut messages, "AUA2", LogCategory::Summary, "second");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages.messages()[0].message, "first");
        assert_eq!(messages.for_callsign("aua2").count(), 1);
        assert!(messages.contains("SECOND"));
        assert_eq!(messages.to_lines()[1], "AUA2 [summary] second");
    }

    #[test]
    fn test_filtered_sink() {
        let mut messages = MatchingMessages::new();
        {
            let mut sink = FilteredSink::new(&mut messages, MatchingLog::Simplified);
            log_details(&mut sink, "DLH1", LogCategory::Matching, "detail");
            log_details(&mut sink, "DLH1", LogCategory::Summary, "summary");
            log_details(&mut sink, "DLH1", LogCategory::ModelSet, "set");
        }
        assert_eq!(messages.len(), 1);
        assert!(messages.contains("summary"));
    }

    #[test]
    fn test_matching_log_levels() {
        assert!(!MatchingLog::Nothing.accepts(LogCategory::Summary));
        assert!(MatchingLog::ModelSet.accepts(LogCategory::ModelSet));
        assert!(!MatchingLog::ModelSet.accepts(LogCategory::Matching));
        assert!(MatchingLog::Full.accepts(LogCategory::Matching));
        assert!(!MatchingLog::Full.accepts(LogCategory::ModelSet));
        assert!(MatchingLog::All.accepts(LogCategory::ModelSet));
    }
}
