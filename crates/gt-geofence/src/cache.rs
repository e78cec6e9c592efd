//! Per-collection geofence cache.
//!
//! Every collection maps to a `tokio::sync::OnceCell`.  The outer map lock is
//! held only long enough to find or create the cell; the fetch itself runs
//! inside `OnceCell::get_or_try_init`, which lets exactly one caller perform
//! the fetch while concurrent callers for the same collection wait on it.
//! A failed fetch leaves the cell empty, so the next caller retries.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::OnceCell;

use gt_core::CollectionId;

use crate::{GeofenceError, GeofenceGateway, GeofenceIndex, GeofenceResult};

type Slot = Arc<OnceCell<Arc<GeofenceIndex>>>;

/// Collection id → fetched, indexed geofences.  Shared by every route of a
/// scheduler; written at most once per collection.
#[derive(Default)]
pub struct GeofenceCache {
    slots: Mutex<HashMap<CollectionId, Slot>>,
}

impl GeofenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached index for `collection`, fetching it through
    /// `gateway` if this is the first successful request.
    pub async fn get_or_fetch<G>(
        &self,
        gateway:    &G,
        collection: &CollectionId,
    ) -> GeofenceResult<Arc<GeofenceIndex>>
    where
        G: GeofenceGateway + ?Sized,
    {
        let slot = {
            let mut slots = self.slots.lock();
            Arc::clone(slots.entry(collection.clone()).or_default())
        };

        let index = slot
            .get_or_try_init(|| async {
                let fences = gateway.fetch(collection).await?;
                tracing::info!(
                    collection = %collection,
                    fences = fences.len(),
                    "geofence collection fetched"
                );
                Ok::<_, GeofenceError>(Arc::new(GeofenceIndex::build(fences)))
            })
            .await?;

        Ok(Arc::clone(index))
    }

    /// The cached index, if `collection` has been fetched successfully.
    pub fn get(&self, collection: &CollectionId) -> Option<Arc<GeofenceIndex>> {
        self.slots
            .lock()
            .get(collection)
            .and_then(|slot| slot.get().cloned())
    }

    /// Number of collections fetched successfully.
    pub fn len(&self) -> usize {
        self.slots.lock().values().filter(|slot| slot.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached collection; the next request refetches.
    pub fn clear(&self) {
        self.slots.lock().clear();
    }
}
