//! Geofence regions.

use gt_core::{EARTH_RADIUS_M, GeoPoint, GeofenceId};

use crate::{GeofenceError, GeofenceResult};

/// The region a geofence covers.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GeofenceShape {
    /// Closed disc: inside iff `distance_m(center) <= radius_m`.
    Circle { center: GeoPoint, radius_m: f64 },
    /// Simple polygon in (lon, lat) space, tested by ray casting.
    /// Vertices are not repeated (the ring closes implicitly).
    Polygon { vertices: Vec<GeoPoint> },
}

/// A geofence: an id and a region.  Treated as a value type.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Geofence {
    id:    GeofenceId,
    shape: GeofenceShape,
}

impl Geofence {
    /// A circular geofence.  `radius_m` must be finite and `>= 0`.
    pub fn circle(
        id:       impl Into<GeofenceId>,
        center:   GeoPoint,
        radius_m: f64,
    ) -> GeofenceResult<Self> {
        let id = id.into();
        if !radius_m.is_finite() || radius_m < 0.0 {
            return Err(GeofenceError::InvalidRadius { id, radius_m });
        }
        Ok(Self { id, shape: GeofenceShape::Circle { center, radius_m } })
    }

    /// A polygonal geofence with at least three vertices.
    pub fn polygon(id: impl Into<GeofenceId>, vertices: Vec<GeoPoint>) -> GeofenceResult<Self> {
        let id = id.into();
        if vertices.len() < 3 {
            return Err(GeofenceError::DegeneratePolygon(id));
        }
        Ok(Self { id, shape: GeofenceShape::Polygon { vertices } })
    }

    pub fn id(&self) -> &GeofenceId {
        &self.id
    }

    pub fn shape(&self) -> &GeofenceShape {
        &self.shape
    }

    /// `true` if `point` lies inside (or on the boundary of) this fence.
    pub fn contains(&self, point: GeoPoint) -> bool {
        match &self.shape {
            GeofenceShape::Circle { center, radius_m } => point.distance_m(*center) <= *radius_m,
            GeofenceShape::Polygon { vertices } => polygon_contains(vertices, point),
        }
    }

    /// Conservative `([min_lat, min_lon], [max_lat, max_lon])` box that
    /// contains every point for which [`contains`][Self::contains] is true.
    pub fn bounds(&self) -> ([f64; 2], [f64; 2]) {
        match &self.shape {
            GeofenceShape::Circle { center, radius_m } => circle_bounds(*center, *radius_m),
            GeofenceShape::Polygon { vertices } => {
                let mut min = [f64::INFINITY; 2];
                let mut max = [f64::NEG_INFINITY; 2];
                for v in vertices {
                    min = [min[0].min(v.lat), min[1].min(v.lon)];
                    max = [max[0].max(v.lat), max[1].max(v.lon)];
                }
                (min, max)
            }
        }
    }
}

// ── Geometry helpers ──────────────────────────────────────────────────────────

/// Padding added to circle boxes so float rounding never excludes a point
/// that the haversine test would accept.
const BOUNDS_PAD_DEG: f64 = 1e-9;

fn circle_bounds(center: GeoPoint, radius_m: f64) -> ([f64; 2], [f64; 2]) {
    let full_lon = (-180.0, 180.0);
    let delta = radius_m / EARTH_RADIUS_M; // angular radius, radians
    let d_lat = delta.to_degrees() + BOUNDS_PAD_DEG;

    let min_lat = center.lat - d_lat;
    let max_lat = center.lat + d_lat;

    // A disc touching a pole spans every longitude.
    let (min_lon, max_lon) = if min_lat <= -90.0 || max_lat >= 90.0 {
        full_lon
    } else {
        let ratio = delta.sin() / center.lat.to_radians().cos();
        if ratio >= 1.0 {
            full_lon
        } else {
            let d_lon = ratio.asin().to_degrees() + BOUNDS_PAD_DEG;
            let (lo, hi) = (center.lon - d_lon, center.lon + d_lon);
            // Boxes crossing the antimeridian are widened to the full range.
            if lo < -180.0 || hi > 180.0 { full_lon } else { (lo, hi) }
        }
    };

    ([min_lat.max(-90.0), min_lon], [max_lat.min(90.0), max_lon])
}

/// Ray casting with x = lon, y = lat.
fn polygon_contains(vertices: &[GeoPoint], point: GeoPoint) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let (x, y) = (point.lon, point.lat);
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (xi, yi) = (vertices[i].lon, vertices[i].lat);
        let (xj, yj) = (vertices[j].lon, vertices[j].lat);
        if ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }
    inside
}
