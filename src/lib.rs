//! Schema Transfer SDK - warehouse schema metadata to modelling platform models
//!
//! Provides the translation engine between a Snowflake-compatible source
//! warehouse and a modelling platform's HTTP API:
//! - Catalog metadata fetching with fallback query strategies
//! - Normalization of heterogeneous catalog rows into canonical records
//! - Entity/relationship document building from columns and foreign keys
//! - Model import/export via the platform API
//! - Connection settings with YAML persistence and validation

pub mod api;
pub mod build;
pub mod config;
pub mod fetch;
pub mod models;
pub mod normalize;
pub mod source;
pub mod transfer;

// Re-export commonly used types
pub use source::{QueryError, QueryExecutor, Row};

pub use fetch::{FetchError, MetadataFetcher, TableKind, TableListing};

pub use models::{
    Attribute, AttributeMetadata, Cardinality, ColumnRecord, Entity, ForeignKeyEdge,
    ModelDocument, ModelEnvelope, ModelLevel, Relationship, RelationshipEndpoint,
};

pub use build::{BuildOutput, ModelBuilder, PartialDataWarning};

pub use api::{ApiError, ImportResponse, ModelApiClient};

pub use config::{ApiSettings, ConnectionMode, Settings, SourceSettings, ValidationError};

pub use transfer::{
    ExportResult, TransferError, TransferOrchestrator, TransferOutcome, TransferRequest,
    export_model,
};
