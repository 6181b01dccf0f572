//! JSON API over a shared [`AircraftMatcher`](crate::matching::engine::AircraftMatcher).
//!
//! ## Starting the Server
//!
//! ```text
//! # Start on default port 8080
//! model-matcher serve --models models.json
//!
//! # With database data, bound to all interfaces
//! model-matcher serve --models models.json --db db.json --address 0.0.0.0
//! ```
//!
//! ## API Endpoints
//!
//! - `GET /api/setup` - Current matcher setup
//! - `PUT /api/setup` - Replace the setup
//! - `POST /api/match` - Match a remote aircraft (JSON body)
//! - `GET /api/models` - Active model set
//! - `GET /api/statistics?missing_only=true` - Matching statistics
//! - `DELETE /api/statistics` - Clear the statistics

pub mod server;
