//! The normalized result of resolving a request path.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ContextKey, EntityType, RequestAttributes};

/// What a request path addresses.
///
/// Immutable once produced; the resolver hands it out behind an `Arc` so all
/// requests for the same raw path share one value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTarget {
    /// The entity ultimately addressed: the related type for pivot requests,
    /// the base type otherwise.
    pub entity_type: EntityType,
    pub is_pivot: bool,
    pub parent_entity_type: Option<EntityType>,
    /// Normalized (snake_case) relation name.
    pub relation_name: Option<String>,
    /// Relation name as it appeared in the path.
    pub original_relation_name: Option<String>,
    /// Relations walked between the base entity and the parent, in order.
    #[serde(default)]
    pub intermediate_relations: Vec<String>,
    pub parent_id: Option<i64>,
    pub relation_id: Option<i64>,
    /// Trailing id of a plain `collection/id` path.
    pub resource_id: Option<i64>,
    pub table_name: String,
    pub pivot_table_name: Option<String>,
    pub base_path: String,
    pub full_path: String,
    pub canonical_path_with_ids: String,
}

impl ResolvedTarget {
    /// Write every present field into `attrs` under its stable key. Absent
    /// optional fields are left out.
    pub fn attach(&self, attrs: &mut RequestAttributes) {
        attrs.insert(ContextKey::IsPivotRoute, self.is_pivot);
        attrs.insert(ContextKey::ModelClass, self.entity_type.as_str());
        attrs.insert(ContextKey::EntityType, self.entity_type.as_str());
        attrs.insert(ContextKey::TableName, self.table_name.as_str());
        attrs.insert(ContextKey::MainModelPath, self.base_path.as_str());
        attrs.insert(ContextKey::FullPath, self.full_path.as_str());
        attrs.insert(
            ContextKey::FullPathWithIds,
            self.canonical_path_with_ids.as_str(),
        );

        if self.is_pivot {
            attrs.insert(ContextKey::PivotModelClass, self.entity_type.as_str());
        }
        if let Some(parent) = &self.parent_entity_type {
            attrs.insert(ContextKey::ParentModelClass, parent.as_str());
        }
        if let Some(relation) = &self.relation_name {
            attrs.insert(ContextKey::RelationName, relation.as_str());
        }
        if let Some(original) = &self.original_relation_name {
            attrs.insert(ContextKey::OriginalRelationName, original.as_str());
        }
        if !self.intermediate_relations.is_empty() {
            attrs.insert(
                ContextKey::IntermediateRelations,
                self.intermediate_relations.iter().join(","),
            );
        }
        if let Some(id) = self.parent_id {
            attrs.insert(ContextKey::ParentId, id);
        }
        if let Some(id) = self.relation_id {
            attrs.insert(ContextKey::RelationId, id);
        }
        if let Some(id) = self.resource_id {
            attrs.insert(ContextKey::ResourceId, id);
        }
        if let Some(table) = &self.pivot_table_name {
            attrs.insert(ContextKey::PivotTableName, table.as_str());
        }
    }

    /// Convenience wrapper around [`ResolvedTarget::attach`].
    pub fn to_attributes(&self) -> RequestAttributes {
        let mut attrs = RequestAttributes::new();
        self.attach(&mut attrs);
        attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttrValue;

    fn plain_target() -> ResolvedTarget {
        ResolvedTarget {
            entity_type: EntityType::new("catalog.product"),
            is_pivot: false,
            parent_entity_type: None,
            relation_name: None,
            original_relation_name: None,
            intermediate_relations: vec![],
            parent_id: None,
            relation_id: None,
            resource_id: Some(42),
            table_name: "products".into(),
            pivot_table_name: None,
            base_path: "catalog/product".into(),
            full_path: "catalog/product/42".into(),
            canonical_path_with_ids: "catalog/product".into(),
        }
    }

    #[test]
    fn test_attach_plain_omits_relation_keys() {
        let attrs = plain_target().to_attributes();

        assert_eq!(attrs.get(ContextKey::IsPivotRoute), Some(&AttrValue::Bool(false)));
        assert_eq!(attrs.get(ContextKey::ResourceId), Some(&AttrValue::Long(42)));
        assert_eq!(
            attrs.get(ContextKey::ModelClass).and_then(AttrValue::as_str),
            Some("catalog.product")
        );
        for key in [
            ContextKey::ParentModelClass,
            ContextKey::PivotModelClass,
            ContextKey::RelationName,
            ContextKey::OriginalRelationName,
            ContextKey::ParentId,
            ContextKey::RelationId,
            ContextKey::PivotTableName,
            ContextKey::IntermediateRelations,
        ] {
            assert!(!attrs.contains(key), "unexpected key {key}");
        }
    }

    #[test]
    fn test_attach_pivot_sets_relation_keys() {
        let target = ResolvedTarget {
            entity_type: EntityType::new("catalog.product_translation"),
            is_pivot: true,
            parent_entity_type: Some(EntityType::new("catalog.product")),
            relation_name: Some("translations".into()),
            original_relation_name: Some("Translations".into()),
            parent_id: Some(42),
            relation_id: Some(7),
            resource_id: None,
            table_name: "product_translations".into(),
            pivot_table_name: Some("products".into()),
            full_path: "catalog/product/42/Translations/7".into(),
            canonical_path_with_ids: "catalog/product/42/Translations".into(),
            ..plain_target()
        };
        let attrs = target.to_attributes();

        assert_eq!(attrs.get(ContextKey::IsPivotRoute), Some(&AttrValue::Bool(true)));
        assert_eq!(attrs.get(ContextKey::ParentId), Some(&AttrValue::Long(42)));
        assert_eq!(attrs.get(ContextKey::RelationId), Some(&AttrValue::Long(7)));
        assert_eq!(
            attrs.get(ContextKey::PivotModelClass).and_then(AttrValue::as_str),
            Some("catalog.product_translation")
        );
        assert_eq!(
            attrs.get(ContextKey::OriginalRelationName).and_then(AttrValue::as_str),
            Some("Translations")
        );
        assert_eq!(
            attrs.get(ContextKey::PivotTableName).and_then(AttrValue::as_str),
            Some("products")
        );
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(plain_target()).unwrap();
        assert_eq!(json["entityType"], "catalog.product");
        assert_eq!(json["canonicalPathWithIds"], "catalog/product");
        assert_eq!(json["isPivot"], false);
    }
}
