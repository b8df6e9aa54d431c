use tracing::debug;

use crate::error::ResolveError;
use crate::registry::normalize_name;
use crate::traits::EntityRegistry;
use crate::types::EntityType;

/// Resolve one relation hop: the type `owner` reaches through `relation`.
pub fn resolve_relation(
    registry: &dyn EntityRegistry,
    owner: &EntityType,
    relation: &str,
) -> Result<EntityType, ResolveError> {
    let normalized = normalize_name(relation);
    registry
        .relations_of(owner)
        .and_then(|relations| relations.get(&normalized))
        .cloned()
        .ok_or_else(|| ResolveError::UnknownRelation {
            owner: owner.to_string(),
            relation: relation.to_string(),
        })
}

/// Walk a chain of relation hops starting at `start`, returning the type
/// reached after the last hop. An empty chain returns `start`.
pub fn walk_relations<S: AsRef<str>>(
    registry: &dyn EntityRegistry,
    start: &EntityType,
    hops: &[S],
) -> Result<EntityType, ResolveError> {
    hops.iter().try_fold(start.clone(), |current, hop| {
        let next = resolve_relation(registry, &current, hop.as_ref())?;
        debug!(
            event = "Resolve",
            phase = "RelationHop",
            from = current.as_str(),
            relation = hop.as_ref(),
            to = next.as_str()
        );
        Ok(next)
    })
}
