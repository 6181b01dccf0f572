use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Whether the model set had a model for the aircraft / airline combination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatisticsEntryType {
    Found,
    Missing,
}

impl std::fmt::Display for StatisticsEntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Found => write!(f, "found"),
            Self::Missing => write!(f, "missing"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsEntry {
    pub session_id: String,
    pub aircraft_icao: String,
    pub airline_icao: String,
    pub livery: String,
    pub entry_type: StatisticsEntryType,
    /// Callsign of the first occurrence
    pub callsign: String,
    pub count: u32,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl std::fmt::Display for StatisticsEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} '{}' '{}' '{}' x{}",
            self.session_id, self.entry_type, self.aircraft_icao, self.airline_icao, self.livery, self.count
        )
    }
}

/// Immutable snapshot of the statistics, in order of first occurrence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingStatistics {
    pub entries: Vec<StatisticsEntry>,
}

impl MatchingStatistics {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counters
    pub fn total_count(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.count)).sum()
    }

    pub fn count_by_type(&self, entry_type: StatisticsEntryType) -> usize {
        self.entries.iter().filter(|e| e.entry_type == entry_type).count()
    }

    pub fn for_session<'a>(&'a self, session_id: &'a str) -> impl Iterator<Item = &'a StatisticsEntry> {
        self.entries.iter().filter(move |e| e.session_id == session_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct StatisticsKey {
    session_id: String,
    aircraft_icao: String,
    airline_icao: String,
    livery: String,
    entry_type: StatisticsEntryType,
}

#[derive(Debug, Default)]
struct Entries {
    entries: Vec<StatisticsEntry>,
    index: HashMap<StatisticsKey, usize>,
}

/// Counts what was asked for by the network, safe under concurrent writers
#[derive(Debug, Default)]
pub struct StatisticsTracker {
    inner: Mutex<Entries>,
}

impl StatisticsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count an occurrence. Ignored (returns `false`) when both ICAO
    /// designators are empty.
    pub fn evaluate_statistics_entry(
        &self,
        session_id: &str,
        callsign: &str,
        aircraft_icao: &str,
        airline_icao: &str,
        livery: &str,
        entry_type: StatisticsEntryType,
    ) -> bool {
        let aircraft_icao = aircraft_icao.trim().to_ascii_uppercase();
        let airline_icao = airline_icao.trim().to_ascii_uppercase();
        if aircraft_icao.is_empty() && airline_icao.is_empty() {
            return false;
        }

        let key = StatisticsKey {
            session_id: session_id.to_string(),
            aircraft_icao,
            airline_icao,
            livery: livery.trim().to_ascii_uppercase(),
            entry_type,
        };
        let now = Utc::now();

        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(&idx) = inner.index.get(&key) {
            let entry = &mut inner.entries[idx];
            entry.count += 1;
            entry.last_seen = now;
            return true;
        }

        let entry = StatisticsEntry {
            session_id: key.session_id.clone(),
            aircraft_icao: key.aircraft_icao.clone(),
            airline_icao: key.airline_icao.clone(),
            livery: key.livery.clone(),
            entry_type,
            callsign: callsign.to_string(),
            count: 1,
            first_seen: now,
            last_seen: now,
        };
        let idx = inner.entries.len();
        inner.entries.push(entry);
        inner.index.insert(key, idx);
        true
    }

    pub fn current_statistics(&self, missing_only: bool) -> MatchingStatistics {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let entries = inner
            .entries
            .iter()
            .filter(|e| !missing_only || e.entry_type == StatisticsEntryType::Missing)
            .cloned()
            .collect();
        MatchingStatistics { entries }
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.entries.clear();
        inner.index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_garbage_is_suppressed() {
        let tracker = StatisticsTracker::new();
        assert!(!tracker.evaluate_statistics_entry("s1", "N1", "", " ", "X", StatisticsEntryType::Missing));
        assert!(tracker.current_statistics(false).is_empty());
    }

    #[test]
    fn test_counts_by_key() {
        let tracker = StatisticsTracker::new();
        assert!(tracker.evaluate_statistics_entry("s1", "DLH1", "A320", "DLH", "", StatisticsEntryType::Found));
        tracker.evaluate_statistics_entry("s1", "DLH2", "a320", "dlh", "", StatisticsEntryType::Found);
        tracker.evaluate_statistics_entry("s2", "DLH1", "A320", "DLH", "", StatisticsEntryType::Found);
        tracker.evaluate_statistics_entry("s1", "AUA1", "B738", "AUA", "", StatisticsEntryType::Missing);

        let stats = tracker.current_statistics(false);
        assert_eq!(stats.len(), 3);
        assert_eq!(stats.entries[0].count, 2);
        assert_eq!(stats.entries[0].callsign, "DLH1");
        assert_eq!(stats.total_count(), 4);
        assert_eq!(stats.for_session("s1").count(), 2);
        assert_eq!(stats.count_by_type(StatisticsEntryType::Missing), 1);

        let missing = tracker.current_statistics(true);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing.entries[0].aircraft_icao, "B738");
    }

    #[test]
    fn test_found_after_missing_is_a_separate_entry() {
        let tracker = StatisticsTracker::new();
        tracker.evaluate_statistics_entry("s1", "SWR1", "A20N", "SWR", "", StatisticsEntryType::Missing);
        tracker.evaluate_statistics_entry("s1", "SWR2", "A20N", "SWR", "", StatisticsEntryType::Found);
        tracker.evaluate_statistics_entry("s1", "SWR3", "A20N", "SWR", "", StatisticsEntryType::Missing);

        let missing = tracker.current_statistics(true);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing.entries[0].entry_type, StatisticsEntryType::Missing);
        assert_eq!(missing.entries[0].count, 2);
        assert_eq!(missing.entries[0].callsign, "SWR1");

        let all = tracker.current_statistics(false);
        assert_eq!(all.len(), 2);
        assert_eq!(all.entries[1].entry_type, StatisticsEntryType::Found);
        assert_eq!(all.entries[1].count, 1);
    }

    #[test]
    fn test_snapshot_is_immutable() {
        let tracker = StatisticsTracker::new();
        tracker.evaluate_statistics_entry("s1", "DLH1", "A320", "DLH", "", StatisticsEntryType::Found);
        let snapshot = tracker.current_statistics(false);
        tracker.evaluate_statistics_entry("s1", "DLH1", "A320", "DLH", "", StatisticsEntryType::Found);
        assert_eq!(snapshot.entries[0].count, 1);

        tracker.clear();
        assert!(tracker.current_statistics(false).is_empty());
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn test_concurrent_writers() {
        let tracker = Arc::new(StatisticsTracker::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        tracker.evaluate_statistics_entry("s1", "DLH1", "A320", "DLH", "", StatisticsEntryType::Found);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let stats = tracker.current_statistics(false);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats.entries[0].count, 800);
    }
}
