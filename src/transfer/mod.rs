//! Transfer Orchestrator
//!
//! Ties the pipeline together: fetch catalog metadata for the requested
//! scopes, normalize it, build the document, attach the destination
//! metadata and hand it to the API client. Each transfer is a one-shot,
//! best-effort batch conversion over a single connection; the request is
//! validated before any network call.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::api::{ApiError, ImportResponse, ModelApiClient};
use crate::build::{ModelBuilder, PartialDataWarning};
use crate::config::{ValidationError, parse_folder_id};
use crate::fetch::{FetchError, MetadataFetcher};
use crate::models::{ModelDocument, ModelEnvelope, ModelLevel};
use crate::normalize;
use crate::source::QueryExecutor;

/// Error type for a transfer
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Result of an export: the document plus partial-data warnings.
///
/// Degraded extraction (no foreign keys found, edges dropped) is reported
/// here, not through errors; callers inspect cardinality and warnings.
#[derive(Debug)]
pub struct ExportResult {
    pub document: ModelDocument,
    pub warnings: Vec<PartialDataWarning>,
}

/// Export schema metadata for the given scopes into a model document.
///
/// Scopes that list no tables are skipped. The document comes back at the
/// physical level with no name or folder; the orchestrator attaches those
/// before import. Only a connectivity failure aborts the export.
pub fn export_model<E: QueryExecutor>(
    executor: &mut E,
    schemas: &[String],
    include_views: bool,
) -> Result<ExportResult, FetchError> {
    let mut fetcher = MetadataFetcher::new(executor);
    let mut all_columns = Vec::new();
    let mut all_edges = Vec::new();
    let mut in_scope: HashSet<String> = HashSet::new();

    for schema in schemas {
        info!("Processing schema: {}", schema);

        let listings = fetcher.tables_and_views(schema, include_views)?;
        info!("Found {} tables/views in schema {}", listings.len(), schema);
        if listings.is_empty() {
            debug!("Skipping empty schema {}", schema);
            continue;
        }

        let fk_rows = fetcher.foreign_keys(schema)?;
        let pk_rows = fetcher.primary_keys(schema)?;
        let column_rows = fetcher.columns(schema)?;

        let primary_keys = normalize::primary_key_lookup(&pk_rows);
        let mut columns = normalize::column_records(&column_rows, &primary_keys);

        // The column catalog is unfiltered by kind; keep only listed
        // tables/views so the view-exclusion flag holds on every path.
        let listed: HashSet<String> = listings.into_iter().map(|l| l.name).collect();
        columns.retain(|column| listed.contains(&column.table_name));

        all_edges.extend(normalize::foreign_key_edges(&fk_rows));
        all_columns.extend(columns);
        in_scope.extend(listed);
    }

    let output = ModelBuilder::build(all_columns, &all_edges, &in_scope);
    let document = ModelDocument::new(ModelLevel::Physical, output.entities, output.relationships);

    Ok(ExportResult {
        document,
        warnings: output.warnings,
    })
}

/// One transfer request: what to scan and where the model goes.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub scopes: Vec<String>,
    pub include_views: bool,
    pub model_name: String,
    pub level: ModelLevel,
    /// Destination folder as entered by the caller; must parse as an
    /// integer
    pub folder_id: String,
}

impl TransferRequest {
    /// Validate the request, returning the parsed folder identifier.
    pub fn validate(&self) -> Result<i64, ValidationError> {
        if self.model_name.trim().is_empty() {
            return Err(ValidationError::EmptyModelName);
        }
        parse_folder_id(&self.folder_id)
    }
}

/// Outcome of a successful transfer.
#[derive(Debug)]
pub struct TransferOutcome {
    pub response: ImportResponse,
    pub warnings: Vec<PartialDataWarning>,
    pub entity_count: usize,
    pub relationship_count: usize,
    /// Direct link to the created model, when the response carried an id
    pub model_url: Option<String>,
}

/// Drives one export-and-import round trip.
pub struct TransferOrchestrator {
    client: ModelApiClient,
}

impl TransferOrchestrator {
    pub fn new(client: ModelApiClient) -> Self {
        Self { client }
    }

    /// Export the requested scopes and import the document as a new model.
    ///
    /// Validation runs first, so a malformed request never touches the
    /// warehouse or the API.
    pub fn transfer<E: QueryExecutor>(
        &self,
        executor: &mut E,
        request: &TransferRequest,
    ) -> Result<TransferOutcome, TransferError> {
        let folder_id = request.validate()?;

        let export = export_model(executor, &request.scopes, request.include_views)?;

        let mut document = export.document;
        document.name = Some(request.model_name.clone());
        document.level = request.level;
        document.folder_id = Some(folder_id);

        let entity_count = document.entities.len();
        let relationship_count = document.relationships.len();

        let envelope = ModelEnvelope { model: document };
        let response = self.client.import_model(&envelope)?;

        let model_url = response
            .model_id()
            .map(|id| self.client.model_url(request.level, &id));

        Ok(TransferOutcome {
            response,
            warnings: export.warnings,
            entity_count,
            relationship_count,
            model_url,
        })
    }
}
