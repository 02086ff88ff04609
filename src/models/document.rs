//! Model document container

use std::fmt;

use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::relationship::Relationship;

/// Abstraction level of a model.
///
/// The transfer flow imports at `Physical`; the format generically supports
/// the other two.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModelLevel {
    Conceptual,
    Logical,
    Physical,
}

impl fmt::Display for ModelLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self {
            ModelLevel::Conceptual => "conceptual",
            ModelLevel::Logical => "logical",
            ModelLevel::Physical => "physical",
        };
        write!(f, "{}", level)
    }
}

/// Top-level model container.
///
/// Built fresh per transfer request and write-once: no partial updates, no
/// merge with a prior document. Name and destination folder are supplied by
/// the orchestrator, not the builder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub level: ModelLevel,
    #[serde(rename = "folderId", skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<i64>,
    pub entities: Vec<Entity>,
    pub relationships: Vec<Relationship>,
}

impl ModelDocument {
    /// Create an unnamed document at the given level with empty folder
    /// assignment.
    pub fn new(level: ModelLevel, entities: Vec<Entity>, relationships: Vec<Relationship>) -> Self {
        Self {
            name: None,
            level,
            folder_id: None,
            entities,
            relationships,
        }
    }
}

/// Wire envelope for the import endpoint: `{"model": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelEnvelope {
    pub model: ModelDocument,
}
