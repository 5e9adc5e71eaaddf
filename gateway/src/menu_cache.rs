// Tag-keyed cache of rendered public-menu artifacts. Invalidation by tag is
// how tenants force their menu surface to re-render after a settings change.
use crate::metrics_defs::{MENU_CACHE_HIT, MENU_CACHE_INVALIDATION, MENU_CACHE_MISS};
use moka::sync::Cache;
use shared::counter;
use std::sync::Arc;
use std::time::Duration;

/// Derives the invalidation tag grouping every cached artifact tied to one
/// tenant's public menu.
///
/// The `menu-<public_slug>` scheme is a public contract: any replacement
/// cache layer must preserve it to stay compatible with whatever triggers
/// invalidation.
pub fn menu_tag(slug: &str) -> String {
    format!("menu-{slug}")
}

/// One cached rendering (serialized body plus its content type).
#[derive(Debug, Clone, PartialEq)]
pub struct CachedArtifact {
    pub content_type: &'static str,
    pub body: String,
}

pub struct MenuCache {
    cache: Cache<String, Arc<CachedArtifact>>,
}

impl MenuCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();

        MenuCache { cache }
    }

    pub fn get(&self, tag: &str) -> Option<Arc<CachedArtifact>> {
        let hit = self.cache.get(tag);
        let metric_def = if hit.is_some() {
            MENU_CACHE_HIT
        } else {
            MENU_CACHE_MISS
        };
        counter!(metric_def).increment(1);
        hit
    }

    pub fn insert(&self, tag: &str, artifact: CachedArtifact) {
        self.cache.insert(tag.to_string(), Arc::new(artifact));
    }

    /// Drops every artifact under `tag`. Idempotent: invalidating an absent
    /// or already-invalidated tag is a safe no-op.
    pub fn invalidate(&self, tag: &str) {
        counter!(MENU_CACHE_INVALIDATION).increment(1);
        self.cache.invalidate(tag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(body: &str) -> CachedArtifact {
        CachedArtifact {
            content_type: "application/manifest+json",
            body: body.to_string(),
        }
    }

    #[test]
    fn test_menu_tag_derivation() {
        assert_eq!(menu_tag("joes-grill"), "menu-joes-grill");
    }

    #[test]
    fn test_insert_get_invalidate_roundtrip() {
        let cache = MenuCache::new(10, Duration::from_secs(60));
        let tag = menu_tag("joes-grill");

        assert!(cache.get(&tag).is_none());
        cache.insert(&tag, artifact("{}"));
        assert_eq!(cache.get(&tag).unwrap().body, "{}");

        cache.invalidate(&tag);
        assert!(cache.get(&tag).is_none());
    }

    #[test]
    fn test_invalidation_is_tag_scoped() {
        let cache = MenuCache::new(10, Duration::from_secs(60));
        cache.insert(&menu_tag("joes-grill"), artifact("joes"));
        cache.insert(&menu_tag("marias-pizza"), artifact("marias"));

        cache.invalidate(&menu_tag("joes-grill"));

        assert!(cache.get(&menu_tag("joes-grill")).is_none());
        assert_eq!(cache.get(&menu_tag("marias-pizza")).unwrap().body, "marias");
    }

    #[test]
    fn test_invalidating_absent_tag_is_noop() {
        let cache = MenuCache::new(10, Duration::from_secs(60));
        cache.invalidate("menu-never-cached");
        cache.invalidate("menu-never-cached");
    }
}
