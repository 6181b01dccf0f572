//! Core value types shared by catalog, database and matching.
//!
//! - [`AircraftModel`](model::AircraftModel): an installed model, keyed by model string
//! - [`RemoteAircraft`](remote::RemoteAircraft): what the network tells about another pilot
//! - [`AircraftIcaoCode`](icao::AircraftIcaoCode), [`AirlineIcaoCode`](icao::AirlineIcaoCode),
//!   [`Livery`](icao::Livery), [`AircraftCategory`](icao::AircraftCategory): ICAO records
//!
//! ## Conventions
//!
//! | Item            | Example      | Comparison        |
//! |-----------------|--------------|-------------------|
//! | model string    | `A320_AUA`   | case-insensitive  |
//! | aircraft ICAO   | `A320`       | upper-cased       |
//! | combined type   | `L2J`        | upper-cased       |
//! | standard livery | `DLH._STD`   | upper-cased       |
//! | color livery    | `_CC1020FF`  | upper-cased       |

pub mod icao;
pub mod model;
pub mod remote;
pub mod types;
