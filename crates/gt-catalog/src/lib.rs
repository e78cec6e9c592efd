//! `gt-catalog`: the fixed table of routes an agent can traverse.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`route`]    | `Route`: id, name, coordinates, geofence collection      |
//! | [`catalog`]  | `RouteCatalog` (`all`, `by_id`), `RouteCatalogBuilder`    |
//! | [`loader`]   | `load_routes_csv`, `load_routes_reader`                   |
//! | [`error`]    | `CatalogError`, `CatalogResult<T>`                        |
//!
//! Routes are immutable once the catalog is built and are handed out as
//! `Arc<Route>` so every agent referencing a route shares one copy.

pub mod catalog;
pub mod error;
pub mod loader;
pub mod route;


pub use catalog::{RouteCatalog, RouteCatalogBuilder};
pub use error::{CatalogError, CatalogResult};
pub use loader::{load_routes_csv, load_routes_reader};
pub use route::Route;
