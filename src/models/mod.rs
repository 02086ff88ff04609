//! Data model for the transfer document
//!
//! Canonical records produced by normalization (`ColumnRecord`,
//! `ForeignKeyEdge`) and the destination document graph (`Entity`,
//! `Relationship`, `ModelDocument`) serialized in the platform wire format.

pub mod column;
pub mod document;
pub mod entity;
pub mod relationship;

pub use column::{ColumnRecord, ForeignKeyEdge};
pub use document::{ModelDocument, ModelEnvelope, ModelLevel};
pub use entity::{Attribute, AttributeMetadata, Entity};
pub use relationship::{Cardinality, Relationship, RelationshipEndpoint};
