//! Opaque entity type identifiers.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identifier for a kind of addressable resource, e.g. `catalog.product`.
///
/// Request handling only obtains these from an [`crate::EntityRegistry`]; a
/// path that does not map to a registered type fails rather than producing a
/// guessed identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct EntityType(String);

impl EntityType {
    pub fn new(id: impl Into<String>) -> Self {
        EntityType(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for EntityType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for EntityType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_type_display() {
        let ty = EntityType::new("catalog.product");
        assert_eq!(ty.to_string(), "catalog.product");
        assert_eq!(ty.as_str(), "catalog.product");
    }

    #[test]
    fn test_entity_type_serializes_as_string() {
        let ty = EntityType::new("catalog.product");
        assert_eq!(
            serde_json::to_value(&ty).unwrap(),
            serde_json::json!("catalog.product")
        );
    }
}
