//! Membership evaluation and enter/exit edge detection.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use gt_core::{CollectionId, GeoPoint, GeofenceId, RouteId};

use crate::{GeofenceCache, GeofenceGateway, GeofenceIndex, GeofenceResult};

/// Ids of the fences containing a point.  Ordered so that events derived
/// from it are emitted in a stable order.
pub type InsideSet = BTreeSet<GeofenceId>;

// ── Events ────────────────────────────────────────────────────────────────────

/// Direction of a boundary crossing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CrossingKind {
    Enter,
    Exit,
}

/// One fence entered or left, before it is attributed to a time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub geofence: GeofenceId,
    pub kind:     CrossingKind,
}

/// A crossing delivered to observers.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeofenceEvent {
    pub route:     RouteId,
    pub geofence:  GeofenceId,
    pub kind:      CrossingKind,
    pub timestamp: DateTime<Utc>,
}

impl GeofenceEvent {
    pub fn new(route: RouteId, transition: Transition, timestamp: DateTime<Utc>) -> Self {
        Self {
            route,
            geofence: transition.geofence,
            kind: transition.kind,
            timestamp,
        }
    }
}

// ── EdgeDetector ──────────────────────────────────────────────────────────────

/// Remembers the last inside-set of every route and reports what changed.
#[derive(Debug, Default)]
pub struct EdgeDetector {
    last: HashMap<RouteId, InsideSet>,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `now` as the latest inside-set for `route` and return the
    /// transitions relative to the previous one.
    ///
    /// Exits are listed before entries; each group is ordered by fence id.
    pub fn observe(&mut self, route: &RouteId, now: InsideSet) -> Vec<Transition> {
        let previous = self.last.remove(route).unwrap_or_default();

        let exits = previous.difference(&now).map(|id| Transition {
            geofence: id.clone(),
            kind:     CrossingKind::Exit,
        });
        let enters = now.difference(&previous).map(|id| Transition {
            geofence: id.clone(),
            kind:     CrossingKind::Enter,
        });
        let transitions = exits.chain(enters).collect();

        if !now.is_empty() {
            self.last.insert(route.clone(), now);
        }
        transitions
    }

    /// Forget `route`'s inside-set; its next observation starts from "outside
    /// everything" and fires `Enter` for every containing fence.
    pub fn reset(&mut self, route: &RouteId) {
        self.last.remove(route);
    }

    /// The last recorded inside-set for `route` (empty if none).
    pub fn inside(&self, route: &RouteId) -> InsideSet {
        self.last.get(route).cloned().unwrap_or_default()
    }
}

// ── GeofenceEvaluator ─────────────────────────────────────────────────────────

/// Answers "which fences of this collection contain this point?" using a
/// gateway for the definitions and a cache so each collection is fetched
/// once per session.
pub struct GeofenceEvaluator<G: GeofenceGateway> {
    gateway: G,
    cache:   GeofenceCache,
}

impl<G: GeofenceGateway> GeofenceEvaluator<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            cache: GeofenceCache::new(),
        }
    }

    /// Fences of `collection` containing `point`, or the fetch error.
    pub async fn try_evaluate(
        &self,
        point:      GeoPoint,
        collection: &CollectionId,
    ) -> GeofenceResult<InsideSet> {
        let index = self.index(collection).await?;
        Ok(index.containing(point))
    }

    /// Like [`try_evaluate`][Self::try_evaluate], but a fetch failure is
    /// logged and reported as `None`.  The cache is left unpopulated, so the
    /// next call retries the fetch.
    pub async fn evaluate(&self, point: GeoPoint, collection: &CollectionId) -> Option<InsideSet> {
        match self.try_evaluate(point, collection).await {
            Ok(inside) => Some(inside),
            Err(e) => {
                tracing::warn!(
                    collection = %collection,
                    error = %e,
                    "geofence fetch failed; skipping evaluation this tick"
                );
                None
            }
        }
    }

    /// The indexed fences of `collection`, fetching on first use.
    pub async fn index(&self, collection: &CollectionId) -> GeofenceResult<Arc<GeofenceIndex>> {
        self.cache.get_or_fetch(&self.gateway, collection).await
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn cache(&self) -> &GeofenceCache {
        &self.cache
    }
}
