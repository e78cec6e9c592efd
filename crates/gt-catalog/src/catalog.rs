//! The `RouteCatalog`: read-only lookup of routes by id.

use std::collections::HashMap;
use std::sync::Arc;

use gt_core::RouteId;

use crate::{CatalogError, CatalogResult, Route};

/// An immutable table of routes.
///
/// Iteration order (`all`) is insertion order.  There is no mutation API;
/// build a catalog with [`RouteCatalogBuilder`] or the CSV loader.
#[derive(Clone, Debug, Default)]
pub struct RouteCatalog {
    routes: Vec<Arc<Route>>,
    by_id:  HashMap<RouteId, usize>,
}

impl RouteCatalog {
    /// All routes in insertion order.
    pub fn all(&self) -> &[Arc<Route>] {
        &self.routes
    }

    /// Look up a route by id.
    pub fn by_id(&self, id: &str) -> Option<&Arc<Route>> {
        self.by_id.get(id).map(|&i| &self.routes[i])
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Iterator over route ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &RouteId> + '_ {
        self.routes.iter().map(|r| r.id())
    }
}

/// Collects routes and rejects duplicate ids.
#[derive(Default)]
pub struct RouteCatalogBuilder {
    catalog: RouteCatalog,
}

impl RouteCatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route.  Fails with [`CatalogError::DuplicateRoute`] if a route
    /// with the same id was already added.
    pub fn add(&mut self, route: Route) -> CatalogResult<&mut Self> {
        if self.catalog.by_id.contains_key(route.id()) {
            return Err(CatalogError::DuplicateRoute(route.id().clone()));
        }
        let index = self.catalog.routes.len();
        self.catalog.by_id.insert(route.id().clone(), index);
        self.catalog.routes.push(Arc::new(route));
        Ok(self)
    }

    /// Chaining variant of [`add`][Self::add].
    pub fn with(mut self, route: Route) -> CatalogResult<Self> {
        self.add(route)?;
        Ok(self)
    }

    pub fn build(self) -> RouteCatalog {
        self.catalog
    }
}
