//! `gt-core`: foundational types for the `geotrack` simulation engine.
//!
//! This crate is a dependency of every other `gt-*` crate.  It has no `gt-*`
//! dependencies and only `thiserror` (plus optional `serde`) externally.
//!
//! # What lives here
//!
//! | Module     | Contents                                                   |
//! |------------|------------------------------------------------------------|
//! | [`ids`]    | `RouteId`, `GeofenceId`, `CollectionId`, `MarkerHandle`    |
//! | [`geo`]    | `GeoPoint`, haversine distance, same-location check        |
//! | [`time`]   | `Tick`                                                     |
//! | [`error`]  | `GtError`, `GtResult`                                      |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{GtError, GtResult};
pub use geo::{EARTH_RADIUS_M, GeoPoint};
pub use ids::{CollectionId, GeofenceId, MarkerHandle, RouteId};
pub use time::Tick;
