//! CSV route loader.
//!
//! # CSV format
//!
//! One row per route coordinate.  Rows of one route may be interleaved with
//! other routes; they are ordered by `seq` within the route.
//!
//! ```csv
//! route_id,name,collection_id,seq,lat,lon
//! R1,Harbour loop,harbour,0,0.0,0.0
//! R1,Harbour loop,harbour,1,0.0,1.0
//! R1,Harbour loop,harbour,2,0.0,2.0
//! ```
//!
//! Every row of a route must repeat the same `name` and `collection_id`.
//! Routes appear in the catalog in the order their id is first seen.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use gt_core::GeoPoint;

use crate::{CatalogError, CatalogResult, Route, RouteCatalog, RouteCatalogBuilder};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RouteRecord {
    route_id:      String,
    name:          String,
    collection_id: String,
    seq:           u32,
    lat:           f64,
    lon:           f64,
}

/// Rows of one route buffered before the `Route` is built.
struct PendingRoute {
    name:       String,
    collection: String,
    points:     Vec<(u32, GeoPoint)>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a [`RouteCatalog`] from a CSV file.
pub fn load_routes_csv(path: &Path) -> CatalogResult<RouteCatalog> {
    let file = std::fs::File::open(path).map_err(CatalogError::Io)?;
    let catalog = load_routes_reader(file)?;
    tracing::info!(path = %path.display(), routes = catalog.len(), "route catalog loaded");
    Ok(catalog)
}

/// Like [`load_routes_csv`] but accepts any `Read` source.
///
/// Useful for testing (pass a `std::io::Cursor`) or for catalogs embedded in
/// the binary.
pub fn load_routes_reader<R: Read>(reader: R) -> CatalogResult<RouteCatalog> {
    // ── Parse CSV rows ────────────────────────────────────────────────────
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut order: Vec<String> = Vec::new();
    let mut by_route: HashMap<String, PendingRoute> = HashMap::new();

    for result in csv_reader.deserialize::<RouteRecord>() {
        let row = result.map_err(|e| CatalogError::Parse(e.to_string()))?;
        let point = GeoPoint::try_new(row.lat, row.lon)?;

        match by_route.get_mut(&row.route_id) {
            Some(pending) => {
                if pending.name != row.name || pending.collection != row.collection_id {
                    return Err(CatalogError::Parse(format!(
                        "route {:?}: name/collection_id differ between rows",
                        row.route_id
                    )));
                }
                pending.points.push((row.seq, point));
            }
            None => {
                order.push(row.route_id.clone());
                by_route.insert(row.route_id, PendingRoute {
                    name:       row.name,
                    collection: row.collection_id,
                    points:     vec![(row.seq, point)],
                });
            }
        }
    }

    // ── Build one Route per id, in first-seen order ───────────────────────
    let mut builder = RouteCatalogBuilder::new();
    for id in order {
        let Some(mut pending) = by_route.remove(&id) else {
            continue;
        };
        pending.points.sort_by_key(|&(seq, _)| seq);
        if let Some(w) = pending.points.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(CatalogError::Parse(format!(
                "route {id:?}: duplicate seq {}",
                w[0].0
            )));
        }
        let coordinates = pending.points.into_iter().map(|(_, p)| p).collect();
        builder.add(Route::new(id, pending.name, coordinates, pending.collection)?)?;
    }

    Ok(builder.build())
}
