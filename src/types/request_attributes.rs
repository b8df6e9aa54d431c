//! Request attribute bag handed to downstream data-access code.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter};
use utoipa::ToSchema;

use super::AttrValue;

/// Stable keys under which a resolution is attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
pub enum ContextKey {
    #[strum(serialize = "isPivotRoute")]
    IsPivotRoute,
    #[strum(serialize = "modelClass")]
    ModelClass,
    #[strum(serialize = "entityType")]
    EntityType,
    #[strum(serialize = "parentModelClass")]
    ParentModelClass,
    #[strum(serialize = "pivotModelClass")]
    PivotModelClass,
    #[strum(serialize = "relationName")]
    RelationName,
    #[strum(serialize = "originalRelationName")]
    OriginalRelationName,
    #[strum(serialize = "intermediateRelations")]
    IntermediateRelations,
    #[strum(serialize = "parentId")]
    ParentId,
    #[strum(serialize = "relationId")]
    RelationId,
    #[strum(serialize = "resourceId")]
    ResourceId,
    #[strum(serialize = "tableName")]
    TableName,
    #[strum(serialize = "pivotTableName")]
    PivotTableName,
    #[strum(serialize = "mainModelPath")]
    MainModelPath,
    #[strum(serialize = "fullPath")]
    FullPath,
    #[strum(serialize = "fullPathWithIds")]
    FullPathWithIds,
}

/// Ordered attribute bag keyed by [`ContextKey`] names.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct RequestAttributes(BTreeMap<String, AttrValue>);

impl RequestAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one attribute under a stable key.
    pub fn insert(&mut self, key: ContextKey, value: impl Into<AttrValue>) -> Option<AttrValue> {
        self.0.insert(key.to_string(), value.into())
    }

    pub fn get(&self, key: ContextKey) -> Option<&AttrValue> {
        self.0.get(key.as_ref())
    }

    pub fn contains(&self, key: ContextKey) -> bool {
        self.0.contains_key(key.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttrValue)> {
        self.0.iter()
    }
}

impl From<RequestAttributes> for BTreeMap<String, AttrValue> {
    fn from(value: RequestAttributes) -> Self {
        value.0
    }
}

impl<'a> IntoIterator for &'a RequestAttributes {
    type Item = (&'a String, &'a AttrValue);
    type IntoIter = std::collections::btree_map::Iter<'a, String, AttrValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
