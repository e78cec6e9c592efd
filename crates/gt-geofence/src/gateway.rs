//! The source of geofence definitions.

use std::collections::HashMap;
use std::sync::Arc;

use gt_core::CollectionId;

use crate::{Geofence, GeofenceError, GeofenceResult};

/// Supplies the geofences of a collection.
///
/// Implementations may perform I/O; the engine calls `fetch` at most once per
/// collection per session on success (see [`GeofenceCache`][crate::GeofenceCache])
/// and again on the next tick after a failure.
#[async_trait::async_trait]
pub trait GeofenceGateway: Send + Sync + 'static {
    /// Fetch every geofence in `collection`.
    async fn fetch(&self, collection: &CollectionId) -> GeofenceResult<Vec<Geofence>>;
}

#[async_trait::async_trait]
impl<G: GeofenceGateway + ?Sized> GeofenceGateway for Arc<G> {
    async fn fetch(&self, collection: &CollectionId) -> GeofenceResult<Vec<Geofence>> {
        (**self).fetch(collection).await
    }
}

/// In-memory gateway serving fixed collections.
///
/// Unknown collections fail with [`GeofenceError::UnknownCollection`].
#[derive(Clone, Debug, Default)]
pub struct StaticGateway {
    collections: HashMap<CollectionId, Vec<Geofence>>,
}

impl StaticGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a collection.
    pub fn with_collection(
        mut self,
        collection: impl Into<CollectionId>,
        fences:     Vec<Geofence>,
    ) -> Self {
        self.insert(collection, fences);
        self
    }

    pub fn insert(&mut self, collection: impl Into<CollectionId>, fences: Vec<Geofence>) {
        self.collections.insert(collection.into(), fences);
    }

    /// Append a single fence to `collection`, creating it if absent.
    pub fn push(&mut self, collection: impl Into<CollectionId>, fence: Geofence) {
        self.collections.entry(collection.into()).or_default().push(fence);
    }

    pub fn collection_count(&self) -> usize {
        self.collections.len()
    }
}

#[async_trait::async_trait]
impl GeofenceGateway for StaticGateway {
    async fn fetch(&self, collection: &CollectionId) -> GeofenceResult<Vec<Geofence>> {
        self.collections
            .get(collection)
            .cloned()
            .ok_or_else(|| GeofenceError::UnknownCollection(collection.clone()))
    }
}
