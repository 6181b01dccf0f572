//! Model matching for remote aircraft.
//!
//! - [`engine::AircraftMatcher`]: entry point, owns model set, setup and statistics
//! - [`reduction`]: stepwise filters over the candidate list
//! - [`scoring`]: weighted scores, tie-breaking and the combined type default
//! - [`reverse_lookup`]: turns raw network values into canonical ICAO data
//! - [`script`]: external script hook for reverse lookup and matching stage
//! - [`statistics`]: counts of requested aircraft / airline combinations
//! - [`log`]: caller-visible matching log
//!
//! ## Algorithms
//!
//! | Algorithm          | Steps                                                     |
//! |--------------------|-----------------------------------------------------------|
//! | stepwise reduce    | filters, pick among survivors, combined type default      |
//! | score based        | exact model string, score the whole set                   |
//! | reduce + score     | filters, score the survivors                              |
//!
//! Every algorithm ends with the default model when nothing credible is found.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use model_matcher::{AircraftMatcher, RemoteAircraft, Simulator};
//! use model_matcher::catalog::store::ModelCatalog;
//! use model_matcher::db::memory::InMemoryDbCache;
//! use model_matcher::matching::log::{MatchingLog, MatchingMessages};
//!
//! let catalog = ModelCatalog::load_from_file("models.json".as_ref()).unwrap();
//! let matcher = AircraftMatcher::new(Arc::new(InMemoryDbCache::empty()));
//! matcher.set_model_set(catalog.models().to_vec(), Simulator::Msfs, true, MatchingLog::Nothing, None);
//!
//! let remote = RemoteAircraft::from_network("DLH123", "A320", "DLH", "", "");
//! let mut log = MatchingMessages::new();
//! let result = matcher.get_closest_match(&remote, MatchingLog::Simplified, Some(&mut log));
//! println!("{} by {}", result.model.model_string, result.method);
//! ```

pub mod engine;
pub mod log;
pub mod reduction;
pub mod reverse_lookup;
pub mod scoring;
pub mod script;
pub mod statistics;

pub use engine::{AircraftMatcher, MatchResult, ModelSetProvider, StatisticsProvider};
pub use log::{LogCategory, LogSink, MatchingLog, MatchingMessages};
