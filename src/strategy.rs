//! The two resolution strategies: nested relation first, plain entity as the
//! catch-all.

use itertools::Itertools;

use crate::detector::{DEFAULT_MIN_PIVOT_SEGMENTS, is_pivot_path};
use crate::error::ResolveError;
use crate::pivot;
use crate::registry::{normalize_name, resolve_entity_type};
use crate::relation::{resolve_relation, walk_relations};
use crate::traits::{EntityRegistry, ResolveStrategy};
use crate::types::{EntityType, PathSegment, ResolvedTarget, SegmentPath};

fn storage_name(
    registry: &dyn EntityRegistry,
    entity_type: &EntityType,
) -> Result<String, ResolveError> {
    registry
        .storage_name_of(entity_type)
        .map(str::to_string)
        .ok_or_else(|| ResolveError::UnknownEntityType(entity_type.to_string()))
}

/// Handles paths that address a relation under a parent instance.
#[derive(Debug, Clone)]
pub struct PivotStrategy {
    min_segments: usize,
}

impl PivotStrategy {
    pub fn new(min_segments: usize) -> Self {
        Self { min_segments }
    }
}

impl Default for PivotStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_PIVOT_SEGMENTS)
    }
}

impl ResolveStrategy for PivotStrategy {
    fn name(&self) -> &'static str {
        "pivot"
    }

    fn can_handle(&self, path: &SegmentPath) -> bool {
        is_pivot_path(path, self.min_segments)
    }

    fn resolve(
        &self,
        path: &SegmentPath,
        registry: &dyn EntityRegistry,
    ) -> Result<ResolvedTarget, ResolveError> {
        let parsed = pivot::parse(path)?;

        let base_type = resolve_entity_type(registry, &parsed.base_path)?;
        let parent_type = walk_relations(registry, &base_type, &parsed.intermediate_relations)?;
        let related_type = resolve_relation(registry, &parent_type, &parsed.original_relation)?;

        let table_name = storage_name(registry, &related_type)?;
        let pivot_table_name = storage_name(registry, &parent_type)?;

        Ok(ResolvedTarget {
            entity_type: related_type,
            is_pivot: true,
            parent_entity_type: Some(parent_type),
            relation_name: Some(normalize_name(&parsed.original_relation)),
            original_relation_name: Some(parsed.original_relation),
            intermediate_relations: parsed
                .intermediate_relations
                .iter()
                .map(|r| normalize_name(r))
                .collect(),
            parent_id: Some(parsed.parent_id),
            relation_id: parsed.relation_id,
            resource_id: None,
            table_name,
            pivot_table_name: Some(pivot_table_name),
            base_path: parsed.base_path.iter().join("/"),
            full_path: path.full_path(),
            canonical_path_with_ids: parsed.canonical_path_with_ids,
        })
    }
}

/// Catch-all for flat `collection` and `collection/id` paths.
#[derive(Debug, Clone, Default)]
pub struct BaseStrategy;

impl ResolveStrategy for BaseStrategy {
    fn name(&self) -> &'static str {
        "base"
    }

    fn can_handle(&self, _path: &SegmentPath) -> bool {
        true
    }

    fn resolve(
        &self,
        path: &SegmentPath,
        registry: &dyn EntityRegistry,
    ) -> Result<ResolvedTarget, ResolveError> {
        let segments = path.segments();
        let (names, resource_id) = match segments.split_last() {
            Some((last, rest)) if last.is_numeric() => (rest, last.as_id()),
            _ => (segments, None),
        };

        let base_path: Vec<&str> = names
            .iter()
            .filter(|s| s.is_name())
            .map(PathSegment::raw)
            .collect();
        if base_path.is_empty() {
            return Err(ResolveError::EmptyBasePath(path.full_path()));
        }

        let entity_type = resolve_entity_type(registry, &base_path)?;
        let table_name = storage_name(registry, &entity_type)?;

        Ok(ResolvedTarget {
            entity_type,
            is_pivot: false,
            parent_entity_type: None,
            relation_name: None,
            original_relation_name: None,
            intermediate_relations: Vec::new(),
            parent_id: None,
            relation_id: None,
            resource_id,
            table_name,
            pivot_table_name: None,
            base_path: base_path.join("/"),
            full_path: path.full_path(),
            canonical_path_with_ids: path.canonical_with_ids(),
        })
    }
}
