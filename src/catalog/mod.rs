//! Model set storage, lookup and verification.
//!
//! - [`ModelCatalog`](store::ModelCatalog): active models of one simulator plus
//!   the models disabled for matching
//! - [`ModelFinder`](model_list::ModelFinder): order preserving searches over model slices
//! - [`CategoryIndex`](categories::CategoryIndex): category tree and glider reduction
//! - [`verify_model_set`](verification::verify_model_set): model set checks
//!
//! ## Model set files
//!
//! Model sets are JSON files:
//!
//! ```json
//! {
//!   "version": "1.0.0",
//!   "simulator": "msfs",
//!   "models": [
//!     {
//!       "model_string": "A320_AUA",
//!       "aircraft_icao": { "designator": "A320", "combined_type": "L2J" },
//!       "livery": { "combined_code": "AUA._STD", "airline": { "designator": "AUA" } }
//!     }
//!   ]
//! }
//! ```
//!
//! ```rust,no_run
//! use model_matcher::catalog::store::ModelCatalog;
//! use std::path::Path;
//!
//! let catalog = ModelCatalog::load_from_file(Path::new("modelset.json")).unwrap();
//! println!("{} models for {}", catalog.len(), catalog.simulator());
//! ```

pub mod categories;
pub mod model_list;
pub mod store;
pub mod verification;
