//! `gt-geofence`: geofence regions and membership evaluation.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                     |
//! |---------------|--------------------------------------------------------------|
//! | [`fence`]     | `Geofence`, `GeofenceShape` (circle, polygon)                |
//! | [`index`]     | `GeofenceIndex`: R-tree prefilter + exact membership         |
//! | [`gateway`]   | `GeofenceGateway` async trait, `StaticGateway`               |
//! | [`cache`]     | `GeofenceCache`: one fetch per collection per session       |
//! | [`evaluator`] | `GeofenceEvaluator`, `EdgeDetector`, `GeofenceEvent`         |
//! | [`loader`]    | `load_geofences_csv`, `load_geofences_reader`                |
//! | [`error`]     | `GeofenceError`, `GeofenceResult<T>`                         |
//!
//! # Membership
//!
//! A point is inside a circular fence iff its haversine distance to the
//! centre is `<= radius_m`.  The closed boundary is a policy choice and is
//! applied identically on entry and exit, so a point sitting exactly on the
//! boundary never flaps.
//!
//! # Edge detection
//!
//! [`EdgeDetector`] keeps the last inside-set per route.  Each new inside-set
//! is diffed against it: fences only in the new set produce `Enter`, fences
//! only in the old set produce `Exit`.  An unchanged set produces nothing.

pub mod cache;
pub mod error;
pub mod evaluator;
pub mod fence;
pub mod gateway;
pub mod index;
pub mod loader;

#[cfg(test)]
mod tests;

pub use cache::GeofenceCache;
pub use error::{GeofenceError, GeofenceResult};
pub use evaluator::{CrossingKind, EdgeDetector, GeofenceEvaluator, GeofenceEvent, InsideSet, Transition};
pub use fence::{Geofence, GeofenceShape};
pub use gateway::{GeofenceGateway, StaticGateway};
pub use index::GeofenceIndex;
pub use loader::{load_geofences_csv, load_geofences_reader};
