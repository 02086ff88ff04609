//! Entity model for the SDK

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::column::ColumnRecord;

/// Key and type annotations carried on every attribute.
///
/// Field names match the platform wire format exactly (`"PK"`, `"FK"`,
/// `"DATA TYPE"`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttributeMetadata {
    #[serde(rename = "PK")]
    pub primary_key: bool,
    #[serde(rename = "FK")]
    pub foreign_key: bool,
    #[serde(rename = "DATA TYPE")]
    pub data_type: String,
}

/// One attribute of an entity, derived from a normalized column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub metadata: AttributeMetadata,
}

impl Attribute {
    pub fn from_column(column: &ColumnRecord) -> Self {
        Self {
            name: column.name.clone(),
            metadata: AttributeMetadata {
                primary_key: column.primary_key,
                foreign_key: column.foreign_key,
                data_type: column.data_type.clone(),
            },
        }
    }
}

/// A table or view represented as a node in the model graph.
///
/// The identifier is generated once per table per scan and never reused
/// across separate scans. Attributes keep the original table definition
/// order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entity {
    pub id: Uuid,
    pub name: String,
    pub attributes: Vec<Attribute>,
}

impl Entity {
    /// Create a new entity with a fresh random identifier.
    ///
    /// Identifiers are intentionally unstable across runs: the destination
    /// assigns its own identity on import.
    pub fn new(name: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            attributes,
        }
    }
}
