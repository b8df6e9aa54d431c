use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::*;
use crate::cache::MemoryStore;
use crate::metrics::FlushStats;
use crate::registry::{RegistryBuilder, StaticRegistry};
use crate::types::{AttrValue, ContextKey, EntityType};
use yare::parameterized;

mod concurrency;

fn catalog_registry() -> StaticRegistry {
    RegistryBuilder::new()
        .entity("catalog.product", "products")
        .relation("catalog.product", "translations", "catalog.product_translation")
        .relation("catalog.product", "variants", "catalog.variant")
        .entity("catalog.product_translation", "product_translations")
        .relation("catalog.product_translation", "comments", "social.comment")
        .entity("catalog.variant", "variants")
        .path("catalog.variant", &["catalog", "skus"])
        .entity("social.comment", "comments")
        .entity("a", "as")
        .relation("a", "rel1", "b")
        .entity("b", "bs")
        .relation("b", "rel2", "c")
        .entity("c", "cs")
        .build()
        .unwrap()
}

/// Registry wrapper that counts every collaborator call.
struct CountingRegistry {
    inner: StaticRegistry,
    calls: AtomicUsize,
}

impl CountingRegistry {
    fn new() -> Self {
        Self {
            inner: catalog_registry(),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EntityRegistry for CountingRegistry {
    fn entity_type_for_path(&self, names: &[String]) -> Option<EntityType> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.entity_type_for_path(names)
    }

    fn relations_of(&self, entity_type: &EntityType) -> Option<&BTreeMap<String, EntityType>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.relations_of(entity_type)
    }

    fn storage_name_of(&self, entity_type: &EntityType) -> Option<&str> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.storage_name_of(entity_type)
    }
}

/// Sink that keeps every resolution it sees.
#[derive(Default)]
struct RecordingSink {
    resolutions: Mutex<Vec<ResolutionStats>>,
    phases: AtomicUsize,
    flushes: AtomicUsize,
}

impl RecordingSink {
    fn outcomes(&self) -> Vec<CacheOutcome> {
        self.resolutions
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.outcome)
            .collect()
    }
}

impl MetricsSink for RecordingSink {
    fn on_resolution(&self, stats: &ResolutionStats) {
        self.resolutions.lock().unwrap().push(stats.clone());
    }

    fn on_flush(&self, _stats: &FlushStats) {
        self.flushes.fetch_add(1, Ordering::SeqCst);
    }

    fn on_resolution_phases(&self, _stats: &ResolutionStats, phases: &ResolutionPhases) {
        assert!(phases.total_ms >= phases.compute_ms);
        self.phases.fetch_add(1, Ordering::SeqCst);
    }
}

fn resolver() -> Resolver {
    Resolver::new(Arc::new(catalog_registry()), ResolverConfig::default()).unwrap()
}

fn counting_resolver() -> (Resolver, Arc<CountingRegistry>) {
    let registry = Arc::new(CountingRegistry::new());
    let resolver = Resolver::new(registry.clone(), ResolverConfig::default()).unwrap();
    (resolver, registry)
}

#[test]
fn test_new_rejects_invalid_config() {
    let config = ResolverConfig {
        min_pivot_segments: 1,
        ..Default::default()
    };
    let err = Resolver::new(Arc::new(catalog_registry()), config)
        .err()
        .unwrap();
    assert!(matches!(err, ResolveError::InvalidConfig(_)));
}

#[parameterized(
    single_hop = { &["catalog", "product", "42", "translations", "7"], 42, "translations", Some(7) },
    no_relation_id = { &["catalog", "product", "42", "translations"], 42, "translations", None },
    last_pair_wins = { &["a", "1", "rel1", "2", "rel2"], 2, "rel2", None },
    chain_with_id = { &["catalog", "product", "42", "translations", "7", "comments", "9"], 7, "comments", Some(9) },
)]
fn test_pivot_addressing(
    segments: &[&str],
    parent_id: i64,
    relation: &str,
    relation_id: Option<i64>,
) {
    let target = resolver().resolve(segments).unwrap();
    assert!(target.is_pivot);
    assert_eq!(target.parent_id, Some(parent_id));
    assert_eq!(target.relation_name.as_deref(), Some(relation));
    assert_eq!(target.relation_id, relation_id);
}
