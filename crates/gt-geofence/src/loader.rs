//! CSV geofence loader.
//!
//! # CSV format
//!
//! One row per circular geofence:
//!
//! ```csv
//! collection_id,geofence_id,lat,lon,radius_m
//! harbour,G1,0.0,1.0,111200
//! harbour,G2,0.5,1.5,2500
//! ```
//!
//! The result is a [`StaticGateway`] serving every collection in the file.
//! Polygon fences are built in code with [`Geofence::polygon`].

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use gt_core::GeoPoint;

use crate::{Geofence, GeofenceError, GeofenceResult, StaticGateway};

#[derive(Deserialize)]
struct GeofenceRecord {
    collection_id: String,
    geofence_id:   String,
    lat:           f64,
    lon:           f64,
    radius_m:      f64,
}

/// Load circular geofences from a CSV file.
pub fn load_geofences_csv(path: &Path) -> GeofenceResult<StaticGateway> {
    let file = std::fs::File::open(path).map_err(GeofenceError::Io)?;
    let gateway = load_geofences_reader(file)?;
    tracing::info!(
        path = %path.display(),
        collections = gateway.collection_count(),
        "geofences loaded"
    );
    Ok(gateway)
}

/// Like [`load_geofences_csv`] but accepts any `Read` source.
pub fn load_geofences_reader<R: Read>(reader: R) -> GeofenceResult<StaticGateway> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut gateway = StaticGateway::new();

    for result in csv_reader.deserialize::<GeofenceRecord>() {
        let row = result.map_err(|e| GeofenceError::Parse(e.to_string()))?;
        let center = GeoPoint::try_new(row.lat, row.lon)?;
        let fence = Geofence::circle(row.geofence_id, center, row.radius_m)?;
        gateway.push(row.collection_id, fence);
    }

    Ok(gateway)
}
