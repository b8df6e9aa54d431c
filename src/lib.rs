// src/lib.rs
pub use cache::{
    CacheOutcome, DEFAULT_CACHE_KEY_PREFIX, DEFAULT_CACHE_TTL, DEFAULT_LOCAL_CAPACITY,
    DEFAULT_SHARED_TIMEOUT, FlushCounts, MemoryStore, ResolutionCache, SharedStore,
};
pub use config::ResolverConfig;
pub use detector::{DEFAULT_MIN_PIVOT_SEGMENTS, is_pivot_path};
pub use engine::Resolver;
pub use error::{CacheError, ErrorKind, ResolveError};
pub use loader::{load_config, load_registry};
pub use pivot::{PivotParseResult, parse as parse_pivot};
pub use registry::{
    EntityDef, RegistryBuilder, RegistryDef, StaticRegistry, normalize_name, resolve_entity_type,
};
pub use relation::{resolve_relation, walk_relations};
pub use strategy::{BaseStrategy, PivotStrategy};
pub use timers::PhaseTimer;
pub use traits::{EntityRegistry, ResolveStrategy};
pub use types::{
    AttrValue, ContextKey, EntityType, PathSegment, RequestAttributes, ResolvedTarget,
    SegmentKind, SegmentPath,
};

mod cache;
mod config;
mod detector;
mod engine;
mod error;
mod loader;
pub mod metrics;
mod pivot;
mod registry;
mod relation;
mod strategy;
mod timers;
mod traits;
mod types;
