use gt_core::{CollectionId, GeofenceId, GtError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeofenceError {
    #[error("fetching geofence collection {collection} failed: {reason}")]
    Fetch {
        collection: CollectionId,
        reason:     String,
    },

    #[error("unknown geofence collection {0}")]
    UnknownCollection(CollectionId),

    #[error("geofence {id}: radius must be finite and non-negative, got {radius_m}")]
    InvalidRadius { id: GeofenceId, radius_m: f64 },

    #[error("geofence {0}: polygon needs at least 3 vertices")]
    DegeneratePolygon(GeofenceId),

    #[error("geofence parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Core(#[from] GtError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type GeofenceResult<T> = Result<T, GeofenceError>;
