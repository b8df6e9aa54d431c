//! Value types shared across the resolver.
//!
//! Canonical string forms:
//! - EntityType: dotted, snake_case, e.g. `catalog.product_translation`
//! - base path: name segments joined by `/`, e.g. `catalog/product`
//! - canonical path with ids: names plus ids that introduce a relation,
//!   e.g. `catalog/product/42/translations`

mod attr_value;
mod entity_type;
mod request_attributes;
mod resolved_target;
mod segment;

pub use attr_value::AttrValue;
pub use entity_type::EntityType;
pub use request_attributes::{ContextKey, RequestAttributes};
pub use resolved_target::ResolvedTarget;
pub use segment::{PathSegment, SegmentKind, SegmentPath};
