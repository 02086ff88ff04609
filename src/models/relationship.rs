//! Relationship model for the SDK

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cardinality tag carried on a relationship endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    One,
    Many,
}

/// One side of a relationship.
///
/// The source side carries `startType`, the target side `endType`; the wire
/// format never sets both on the same endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelationshipEndpoint {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "startType", skip_serializing_if = "Option::is_none")]
    pub start_type: Option<Cardinality>,
    #[serde(rename = "endType", skip_serializing_if = "Option::is_none")]
    pub end_type: Option<Cardinality>,
    #[serde(rename = "attributeNames")]
    pub attribute_names: Vec<String>,
}

impl RelationshipEndpoint {
    /// Source endpoint: the referenced (primary-key) side, cardinality "one".
    pub fn one(id: Uuid, name: impl Into<String>, attribute_names: Vec<String>) -> Self {
        Self {
            id,
            name: name.into(),
            start_type: Some(Cardinality::One),
            end_type: None,
            attribute_names,
        }
    }

    /// Target endpoint: the referencing (foreign-key) side, cardinality "many".
    pub fn many(id: Uuid, name: impl Into<String>, attribute_names: Vec<String>) -> Self {
        Self {
            id,
            name: name.into(),
            start_type: None,
            end_type: Some(Cardinality::Many),
            attribute_names,
        }
    }
}

/// A directed edge between two entities derived from a foreign-key
/// constraint.
///
/// Source is the referenced table ("one"), target the referencing table
/// ("many"): one reference row relates to many referencing rows. Exists only
/// when both endpoints resolved to known entities within the current scope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Relationship {
    #[serde(rename = "sourceEntity")]
    pub source_entity: RelationshipEndpoint,
    #[serde(rename = "targetEntity")]
    pub target_entity: RelationshipEndpoint,
    #[serde(default)]
    pub description: Vec<String>,
}

impl Relationship {
    pub fn new(source_entity: RelationshipEndpoint, target_entity: RelationshipEndpoint) -> Self {
        Self {
            source_entity,
            target_entity,
            description: Vec::new(),
        }
    }
}
