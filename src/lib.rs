//! # model-matcher
//!
//! A library for picking the installed simulator model that best represents a
//! remote aircraft seen on a multiplayer network.
//!
//! A remote pilot only tells the network a few strings: an aircraft ICAO
//! designator, an airline designator, maybe a livery and the model string of
//! their own simulator. The local simulator has a fixed set of installed
//! models. `model-matcher` resolves the strings against a database of
//! aircraft, airlines and liveries and then reduces or scores the model set
//! until a single model is left.
//!
//! ## Features
//!
//! - **Reverse lookup**: canonical ICAO data from model strings, database ids or raw designators
//! - **Stepwise reduction**: model string, livery, aircraft, family, combined type and more
//! - **Scoring**: weighted scores with configurable tie-breaking
//! - **Categories**: glider and military category handling
//! - **Scripts**: external scripts may override the reverse lookup or the match
//! - **Statistics**: which aircraft / airline combinations were asked for and missing
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use model_matcher::{AircraftMatcher, RemoteAircraft};
//! use model_matcher::catalog::store::ModelSetData;
//! use model_matcher::db::memory::InMemoryDbCache;
//! use model_matcher::matching::log::MatchingLog;
//!
//! let data = ModelSetData::load_from_file("models.json".as_ref()).unwrap();
//! let matcher = AircraftMatcher::new(Arc::new(InMemoryDbCache::empty()));
//! matcher.set_model_set(data.models, data.simulator, true, MatchingLog::Nothing, None);
//!
//! let remote = RemoteAircraft::from_network("AUA123", "A320", "AUA", "", "");
//! let result = matcher.get_closest_match(&remote, MatchingLog::Nothing, None);
//! println!("{}: {} ({})", remote.callsign, result.model.model_string, result.method);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Value types for models, ICAO codes, liveries and remote aircraft
//! - [`setup`]: Matcher configuration
//! - [`catalog`]: Model set storage, lookup and verification
//! - [`db`]: Database cache contract
//! - [`matching`]: Matcher, reduction, scoring, reverse lookup and statistics
//! - [`cli`]: Command-line interface implementation
//! - [`web`]: JSON API

pub mod catalog;
pub mod cli;
pub mod core;
pub mod db;
pub mod matching;
pub mod setup;
pub mod utils;
pub mod web;

// Re-export commonly used types for convenience
pub use catalog::store::ModelCatalog;
pub use core::icao::{AircraftCategory, AircraftIcaoCode, AirlineIcaoCode, Livery};
pub use core::model::AircraftModel;
pub use core::remote::RemoteAircraft;
pub use core::types::*;
pub use matching::engine::{AircraftMatcher, MatchResult};
pub use setup::{MatcherSetup, MatchingAlgorithm, MatchingMode, MatchingModeFlag};
