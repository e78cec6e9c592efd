//! A named path and the geofence collection it is checked against.

use gt_core::{CollectionId, GeoPoint, RouteId};

use crate::{CatalogError, CatalogResult};

/// An immutable route: an ordered, non-empty coordinate sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    id:           RouteId,
    name:         String,
    coordinates:  Vec<GeoPoint>,
    collection:   CollectionId,
}

impl Route {
    /// Build a route.  Fails with [`CatalogError::EmptyRoute`] if
    /// `coordinates` is empty.
    pub fn new(
        id:          impl Into<RouteId>,
        name:        impl Into<String>,
        coordinates: Vec<GeoPoint>,
        collection:  impl Into<CollectionId>,
    ) -> CatalogResult<Self> {
        let id = id.into();
        if coordinates.is_empty() {
            return Err(CatalogError::EmptyRoute(id));
        }
        Ok(Self {
            id,
            name: name.into(),
            coordinates,
            collection: collection.into(),
        })
    }

    pub fn id(&self) -> &RouteId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn coordinates(&self) -> &[GeoPoint] {
        &self.coordinates
    }

    /// The geofence collection this route is evaluated against.
    pub fn collection(&self) -> &CollectionId {
        &self.collection
    }

    /// Number of coordinates; always ≥ 1.
    #[inline]
    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    /// Always `false`; a route has at least one coordinate.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    /// The starting coordinate.
    #[inline]
    pub fn start(&self) -> GeoPoint {
        self.coordinates[0]
    }
}
