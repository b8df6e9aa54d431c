use crate::config::ResolverConfig;
use crate::error::ResolveError;
use crate::registry::{RegistryDef, StaticRegistry};

/// Build a [`StaticRegistry`] from its JSON metadata document.
///
/// JSON and validation errors both map to `ResolveError::InvalidRegistry`.
///
/// Example:
/// ```rust
/// use pathway_core::load_registry;
/// let text = r#"{
///     "entities": [
///         { "type": "catalog.product", "table": "products",
///           "relations": { "translations": "catalog.product_translation" } },
///         { "type": "catalog.product_translation", "table": "product_translations" }
///     ]
/// }"#;
/// let registry = load_registry(text).unwrap();
/// assert_eq!(registry.len(), 2);
/// ```
pub fn load_registry(text: &str) -> Result<StaticRegistry, ResolveError> {
    let def: RegistryDef = serde_json::from_str(text)?;
    StaticRegistry::from_def(def)
}

/// Parse and validate a [`ResolverConfig`] from JSON. Missing fields take
/// their defaults.
pub fn load_config(text: &str) -> Result<ResolverConfig, ResolveError> {
    let config: ResolverConfig =
        serde_json::from_str(text).map_err(|e| ResolveError::InvalidConfig(e.to_string()))?;
    config.validate()?;
    Ok(config)
}
