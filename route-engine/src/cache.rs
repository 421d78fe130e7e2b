//! Caching layer for derived route geometry.
//!
//! Building a [`RouteGeometry`] projects every stop onto the route polyline,
//! which is wasted work when repeated on every vehicle update. Entries are
//! keyed by `(route id, version)` so that editing a route (and bumping its
//! version) never serves stale offsets.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::domain::{Route, RouteId};
use crate::eta::RouteGeometry;

/// Cache key for route geometry: (route id, route version).
type GeometryKey = (RouteId, u64);

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct GeometryCacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for GeometryCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60 * 60),
            max_capacity: 1000,
        }
    }
}

/// Cache of polyline-derived geometry per route version.
#[derive(Clone)]
pub struct GeometryCache {
    entries: MokaCache<GeometryKey, Arc<RouteGeometry>>,
}

impl GeometryCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &GeometryCacheConfig) -> Self {
        let entries = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { entries }
    }

    /// Geometry for `route`, building and caching it on a miss.
    ///
    /// Returns `None` for routes without a usable polyline; nothing is
    /// cached for them.
    pub async fn geometry_for(&self, route: &Route) -> Option<Arc<RouteGeometry>> {
        let key = (route.id(), route.version());
        self.entries
            .optionally_get_with(key, async { RouteGeometry::build(route).map(Arc::new) })
            .await
    }

    /// Get cache statistics (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Drop the cached geometry for one route version.
    pub async fn invalidate_route(&self, id: RouteId, version: u64) {
        self.entries.invalidate(&(id, version)).await;
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.entries.invalidate_all();
    }
}

impl Default for GeometryCache {
    fn default() -> Self {
        Self::new(&GeometryCacheConfig::default())
    }
}
