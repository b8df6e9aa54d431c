use std::collections::BTreeMap;

use crate::error::ResolveError;
use crate::types::{EntityType, ResolvedTarget, SegmentPath};

/// Source of entity metadata: which types exist, how they relate, and where
/// they are stored.
///
/// Implementations are read-only at request time and shared freely across
/// threads. Name and relation arguments are already normalized to snake_case.
pub trait EntityRegistry: Send + Sync {
    /// Explicit or convention-derived type for a normalized name path.
    fn entity_type_for_path(&self, names: &[String]) -> Option<EntityType>;

    /// One-to-many relations declared by `entity_type`, keyed by relation name.
    fn relations_of(&self, entity_type: &EntityType) -> Option<&BTreeMap<String, EntityType>>;

    /// Physical storage name ("table") of `entity_type`.
    fn storage_name_of(&self, entity_type: &EntityType) -> Option<&str>;
}

/// One way of turning a classified path into a [`ResolvedTarget`].
///
/// Strategies are tried in order; the first whose `can_handle` accepts the
/// path does the work.
pub trait ResolveStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn can_handle(&self, path: &SegmentPath) -> bool;

    fn resolve(
        &self,
        path: &SegmentPath,
        registry: &dyn EntityRegistry,
    ) -> Result<ResolvedTarget, ResolveError>;
}
