//! Statically built entity registry and name normalization.
//!
//! The registry is populated once from declarative metadata, either through
//! [`RegistryBuilder`] or from JSON (see [`crate::loader::load_registry`]),
//! and never changes afterwards.

use std::collections::{BTreeMap, HashMap, hash_map::Entry};

use heck::ToSnakeCase;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ResolveError;
use crate::traits::EntityRegistry;
use crate::types::EntityType;

/// Normalize a path or relation name to the registry's casing.
///
/// `Product`, `product`, `product-variants` and `productVariants` become
/// `product`, `product`, `product_variants` and `product_variants`.
pub fn normalize_name(raw: &str) -> String {
    raw.to_snake_case()
}

/// Identifier the naming convention derives for a name path.
pub(crate) fn conventional_type_id(names: &[String]) -> String {
    names.iter().join(".")
}

/// Resolve a raw name path to a registered entity type.
pub fn resolve_entity_type<S: AsRef<str>>(
    registry: &dyn EntityRegistry,
    names: &[S],
) -> Result<EntityType, ResolveError> {
    let normalized: Vec<String> = names.iter().map(|n| normalize_name(n.as_ref())).collect();
    if normalized.is_empty() {
        return Err(ResolveError::EmptyBasePath(
            "no name segments to resolve".to_string(),
        ));
    }
    registry.entity_type_for_path(&normalized).ok_or_else(|| {
        ResolveError::UnknownEntityType(names.iter().map(AsRef::as_ref).join("/"))
    })
}

/// Declarative metadata for one entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDef {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub table: String,
    /// Explicit path aliases. These win over the naming convention.
    #[serde(default)]
    pub paths: Vec<Vec<String>>,
    /// Relation name -> related entity type.
    #[serde(default)]
    pub relations: BTreeMap<String, String>,
}

/// The whole registry document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryDef {
    #[serde(default)]
    pub entities: Vec<EntityDef>,
}

#[derive(Debug, Clone)]
struct EntityEntry {
    table: String,
    relations: BTreeMap<String, EntityType>,
}

/// Immutable, lock-free registry built from [`EntityDef`]s.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    entities: HashMap<EntityType, EntityEntry>,
    aliases: HashMap<Vec<String>, EntityType>,
}

impl StaticRegistry {
    /// Validate and index a registry document.
    pub fn from_def(def: RegistryDef) -> Result<Self, ResolveError> {
        let mut entities: HashMap<EntityType, EntityEntry> = HashMap::new();
        let mut aliases: HashMap<Vec<String>, EntityType> = HashMap::new();

        // Pass 1: types, tables and aliases.
        for entity in &def.entities {
            let ty = canonical_type(&entity.entity_type)?;
            if entity.table.trim().is_empty() {
                return Err(ResolveError::InvalidRegistry(format!(
                    "entity {ty} has an empty table name"
                )));
            }
            match entities.entry(ty.clone()) {
                Entry::Occupied(_) => {
                    return Err(ResolveError::InvalidRegistry(format!(
                        "entity {ty} is declared more than once"
                    )));
                }
                Entry::Vacant(slot) => {
                    slot.insert(EntityEntry {
                        table: entity.table.clone(),
                        relations: BTreeMap::new(),
                    });
                }
            }
            for path in &entity.paths {
                let key: Vec<String> = path.iter().map(|s| normalize_name(s)).collect();
                if key.is_empty() {
                    return Err(ResolveError::InvalidRegistry(format!(
                        "entity {ty} declares an empty path alias"
                    )));
                }
                if let Some(existing) = aliases.insert(key.clone(), ty.clone())
                    && existing != ty
                {
                    return Err(ResolveError::InvalidRegistry(format!(
                        "path alias {} maps to both {existing} and {ty}",
                        key.join("/")
                    )));
                }
            }
        }

        // Pass 2: relations, now that every target is known.
        for entity in &def.entities {
            let owner = canonical_type(&entity.entity_type)?;
            let mut relations = BTreeMap::new();
            for (name, target) in &entity.relations {
                let target = canonical_type(target)?;
                if !entities.contains_key(&target) {
                    return Err(ResolveError::InvalidRegistry(format!(
                        "relation {owner}.{name} points at unregistered type {target}"
                    )));
                }
                let name = normalize_name(name);
                if relations.insert(name.clone(), target).is_some() {
                    return Err(ResolveError::InvalidRegistry(format!(
                        "relation {name} is declared more than once on {owner}"
                    )));
                }
            }
            if let Some(entry) = entities.get_mut(&owner) {
                entry.relations = relations;
            }
        }

        debug!(
            event = "Registry",
            phase = "Built",
            entities = entities.len(),
            aliases = aliases.len()
        );

        Ok(Self { entities, aliases })
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// All registered types, sorted.
    pub fn entity_types(&self) -> Vec<&EntityType> {
        self.entities.keys().sorted().collect()
    }
}

impl EntityRegistry for StaticRegistry {
    fn entity_type_for_path(&self, names: &[String]) -> Option<EntityType> {
        if let Some(ty) = self.aliases.get(names) {
            return Some(ty.clone());
        }
        let derived = EntityType::new(conventional_type_id(names));
        self.entities.contains_key(&derived).then_some(derived)
    }

    fn relations_of(&self, entity_type: &EntityType) -> Option<&BTreeMap<String, EntityType>> {
        self.entities.get(entity_type).map(|e| &e.relations)
    }

    fn storage_name_of(&self, entity_type: &EntityType) -> Option<&str> {
        self.entities.get(entity_type).map(|e| e.table.as_str())
    }
}

/// Type identifiers are dotted; each part follows the path casing rule.
fn canonical_type(raw: &str) -> Result<EntityType, ResolveError> {
    let parts: Vec<String> = raw
        .split('.')
        .map(|p| normalize_name(p.trim()))
        .collect();
    if parts.iter().any(String::is_empty) {
        return Err(ResolveError::InvalidRegistry(format!(
            "'{raw}' is not a valid entity type identifier"
        )));
    }
    Ok(EntityType::new(conventional_type_id(&parts)))
}

/// Fluent construction of a [`StaticRegistry`].
///
/// ```rust
/// use pathway_core::RegistryBuilder;
///
/// let registry = RegistryBuilder::new()
///     .entity("catalog.product", "products")
///     .relation("catalog.product", "translations", "catalog.product_translation")
///     .entity("catalog.product_translation", "product_translations")
///     .build()
///     .unwrap();
/// assert_eq!(registry.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    defs: Vec<EntityDef>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an entity type and its storage name.
    pub fn entity(mut self, entity_type: &str, table: &str) -> Self {
        self.defs.push(EntityDef {
            entity_type: entity_type.to_string(),
            table: table.to_string(),
            paths: Vec::new(),
            relations: BTreeMap::new(),
        });
        self
    }

    /// Add an explicit path alias to an already declared entity.
    pub fn path(mut self, entity_type: &str, path: &[&str]) -> Self {
        let path = path.iter().map(|s| s.to_string()).collect();
        self.def_mut(entity_type).paths.push(path);
        self
    }

    /// Add a relation to an already declared entity. The target may be
    /// declared later.
    pub fn relation(mut self, owner: &str, name: &str, target: &str) -> Self {
        self.def_mut(owner)
            .relations
            .insert(name.to_string(), target.to_string());
        self
    }

    pub fn build(self) -> Result<StaticRegistry, ResolveError> {
        StaticRegistry::from_def(RegistryDef {
            entities: self.defs,
        })
    }

    // Relations and paths on an undeclared owner create a placeholder with an
    // empty table, which `build` then rejects.
    fn def_mut(&mut self, entity_type: &str) -> &mut EntityDef {
        let idx = match self
            .defs
            .iter()
            .position(|d| d.entity_type == entity_type)
        {
            Some(idx) => idx,
            None => {
                self.defs.push(EntityDef {
                    entity_type: entity_type.to_string(),
                    table: String::new(),
                    paths: Vec::new(),
                    relations: BTreeMap::new(),
                });
                self.defs.len() - 1
            }
        };
        &mut self.defs[idx]
    }
}
