//! Spatial index over one geofence collection.
//!
//! An R-tree (via `rstar`) holds each fence's conservative lat/lon bounding
//! box.  A membership query first collects the boxes containing the point,
//! then runs the exact test ([`Geofence::contains`]) on those candidates
//! only.  Because the boxes are supersets of the regions, the result equals
//! a linear scan over every fence.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use gt_core::GeoPoint;

use crate::{Geofence, InsideSet};

// ── R-tree entry ──────────────────────────────────────────────────────────────

/// Bounding box of one fence, `[lat, lon]` corners, plus its slot in
/// `GeofenceIndex::fences`.
#[derive(Clone)]
struct FenceEntry {
    min:  [f64; 2],
    max:  [f64; 2],
    slot: usize,
}

impl RTreeObject for FenceEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

impl PointDistance for FenceEntry {
    /// Squared distance from `point` to the box (0 inside).
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let d_lat = (self.min[0] - point[0]).max(point[0] - self.max[0]).max(0.0);
        let d_lon = (self.min[1] - point[1]).max(point[1] - self.max[1]).max(0.0);
        d_lat * d_lat + d_lon * d_lon
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        point[0] >= self.min[0]
            && point[0] <= self.max[0]
            && point[1] >= self.min[1]
            && point[1] <= self.max[1]
    }
}

// ── GeofenceIndex ─────────────────────────────────────────────────────────────

/// The fetched fences of one collection, indexed for point queries.
pub struct GeofenceIndex {
    fences: Vec<Geofence>,
    tree:   RTree<FenceEntry>,
}

impl GeofenceIndex {
    /// Bulk-load an index over `fences`.
    pub fn build(fences: Vec<Geofence>) -> Self {
        let entries = fences
            .iter()
            .enumerate()
            .map(|(slot, fence)| {
                let (min, max) = fence.bounds();
                FenceEntry { min, max, slot }
            })
            .collect();
        Self {
            fences,
            tree: RTree::bulk_load(entries),
        }
    }

    /// Ids of every fence containing `point`.
    pub fn containing(&self, point: GeoPoint) -> InsideSet {
        self.tree
            .locate_all_at_point(&[point.lat, point.lon])
            .map(|entry| &self.fences[entry.slot])
            .filter(|fence| fence.contains(point))
            .map(|fence| fence.id().clone())
            .collect()
    }

    pub fn fences(&self) -> &[Geofence] {
        &self.fences
    }

    pub fn len(&self) -> usize {
        self.fences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fences.is_empty()
    }
}
