//! Metadata Fetcher
//!
//! Issues catalog queries against the source warehouse. Different
//! deployments and permission levels expose different subsets of catalog
//! metadata, so primary-key and foreign-key retrieval run an ordered chain
//! of query strategies: each is tried in strict order and the first one
//! returning at least one row wins. A chain that exhausts every strategy
//! degrades to an empty result instead of aborting the export; only a
//! connectivity failure from the underlying driver is fatal.

use tracing::{debug, warn};

use crate::source::{QueryError, QueryExecutor, Row};

/// Error type for metadata fetching
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Connectivity/auth failure from the underlying driver, surfaced
    /// verbatim
    #[error("Connection error: {0}")]
    Connection(String),
}

/// Kind tag of a catalog object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Table,
    View,
}

impl TableKind {
    /// Parse a source-reported kind tag case-insensitively.
    ///
    /// Anything that is not a base table counts as a view, so kind filters
    /// exclude materialized views and other non-table kinds too.
    pub fn from_tag(tag: &str) -> TableKind {
        let upper = tag.trim().to_uppercase();
        if upper == "TABLE" || upper == "BASE TABLE" {
            TableKind::Table
        } else {
            TableKind::View
        }
    }
}

/// One table or view visible in a schema scope.
#[derive(Debug, Clone, PartialEq)]
pub struct TableListing {
    pub name: String,
    pub kind: TableKind,
}

/// Catalog metadata fetcher over a single live connection.
pub struct MetadataFetcher<'a, E: QueryExecutor> {
    executor: &'a mut E,
}

impl<'a, E: QueryExecutor> MetadataFetcher<'a, E> {
    pub fn new(executor: &'a mut E) -> Self {
        Self { executor }
    }

    /// List tables (and optionally views) visible in a schema scope.
    ///
    /// Primary query against the standard TABLES catalog view with a
    /// server-side type filter. Zero rows (restricted catalog access,
    /// metadata lag) falls back to `SHOW TABLES`, which cannot filter
    /// server-side, so the kind filter is applied client-side. Empty results
    /// are not an error.
    pub fn tables_and_views(
        &mut self,
        schema: &str,
        include_views: bool,
    ) -> Result<Vec<TableListing>, FetchError> {
        let type_filter = if include_views {
            "('BASE TABLE', 'VIEW')"
        } else {
            "('BASE TABLE')"
        };
        let sql = format!(
            "SELECT TABLE_NAME, TABLE_TYPE \
             FROM INFORMATION_SCHEMA.TABLES \
             WHERE TABLE_SCHEMA = '{schema}' AND TABLE_TYPE IN {type_filter}"
        );

        let mut listings: Vec<TableListing> = self
            .run(&sql, schema, "table listing")?
            .iter()
            .filter_map(|row| {
                let name = row.text("TABLE_NAME").or_else(|| row.text_at(0))?;
                let tag = row.text("TABLE_TYPE").or_else(|| row.text_at(1))?;
                Some(TableListing {
                    name: name.to_string(),
                    kind: TableKind::from_tag(tag),
                })
            })
            .collect();

        if listings.is_empty() {
            debug!(
                "Table catalog returned no rows for schema {}, falling back to SHOW TABLES",
                schema
            );
            listings = self
                .run(&format!("SHOW TABLES IN SCHEMA {schema}"), schema, "table enumeration")?
                .iter()
                .filter_map(|row| {
                    let name = row.text("name").or_else(|| row.text_at(1))?;
                    let kind = TableKind::from_tag(row.text("kind").unwrap_or("TABLE"));
                    Some(TableListing {
                        name: name.to_string(),
                        kind,
                    })
                })
                .filter(|listing| include_views || listing.kind == TableKind::Table)
                .collect();
        }

        Ok(listings)
    }

    /// All columns of a schema scope, in table then ordinal order.
    ///
    /// Rows are returned raw; the normalizer merges them with the
    /// primary-key lookup set.
    pub fn columns(&mut self, schema: &str) -> Result<Vec<Row>, FetchError> {
        let sql = format!(
            "SELECT TABLE_SCHEMA, TABLE_NAME, COLUMN_NAME, DATA_TYPE \
             FROM INFORMATION_SCHEMA.COLUMNS \
             WHERE TABLE_SCHEMA = '{schema}' \
             ORDER BY TABLE_NAME, ORDINAL_POSITION"
        );
        self.run(&sql, schema, "column listing")
    }

    /// Primary-key rows for a schema scope.
    ///
    /// Two strategies: the standard key-usage view filtered by the
    /// constraint-name prefix convention, then the native enumeration
    /// command (which reports lower-case field names).
    pub fn primary_keys(&mut self, schema: &str) -> Result<Vec<Row>, FetchError> {
        let key_usage = format!(
            "SELECT TABLE_SCHEMA, TABLE_NAME, COLUMN_NAME \
             FROM INFORMATION_SCHEMA.KEY_COLUMN_USAGE \
             WHERE TABLE_SCHEMA = '{schema}' AND CONSTRAINT_NAME LIKE 'PRIMARY%'"
        );
        let show = format!("SHOW PRIMARY KEYS IN {schema}.*");

        self.run_chain(
            "primary key",
            schema,
            &[("key column usage", key_usage), ("show primary keys", show)],
        )
    }

    /// Foreign-key constraint rows for a schema scope.
    ///
    /// Three strategies in strict order:
    /// 1. Join of the referential-constraint, key-column-usage and
    ///    constraint-column-usage views (needs referential metadata in the
    ///    standard catalog).
    /// 2. Denormalized join of constraint and key-usage views that avoids
    ///    the referential-constraints view; the referenced side of the join
    ///    is distinguished by excluding same-table matches.
    /// 3. The native imported-keys enumeration, whose engine-specific
    ///    column names the normalizer remaps.
    pub fn foreign_keys(&mut self, schema: &str) -> Result<Vec<Row>, FetchError> {
        let referential = format!(
            "SELECT rc.CONSTRAINT_NAME, \
                    ccu.TABLE_SCHEMA AS PK_SCHEMA_NAME, \
                    ccu.TABLE_NAME AS PK_TABLE_NAME, \
                    ccu.COLUMN_NAME AS PK_COLUMN_NAME, \
                    kcu.TABLE_SCHEMA AS FK_SCHEMA_NAME, \
                    kcu.TABLE_NAME AS FK_TABLE_NAME, \
                    kcu.COLUMN_NAME AS FK_COLUMN_NAME \
             FROM INFORMATION_SCHEMA.REFERENTIAL_CONSTRAINTS rc \
             JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE kcu \
               ON rc.CONSTRAINT_NAME = kcu.CONSTRAINT_NAME \
              AND rc.CONSTRAINT_SCHEMA = kcu.CONSTRAINT_SCHEMA \
             JOIN INFORMATION_SCHEMA.CONSTRAINT_COLUMN_USAGE ccu \
               ON rc.UNIQUE_CONSTRAINT_NAME = ccu.CONSTRAINT_NAME \
              AND rc.UNIQUE_CONSTRAINT_SCHEMA = ccu.CONSTRAINT_SCHEMA \
             WHERE kcu.TABLE_SCHEMA = '{schema}'"
        );
        let denormalized = format!(
            "SELECT c.CONSTRAINT_NAME, c.CONSTRAINT_TYPE, \
                    t1.TABLE_SCHEMA AS FK_SCHEMA_NAME, \
                    t1.TABLE_NAME AS FK_TABLE_NAME, \
                    k1.COLUMN_NAME AS FK_COLUMN_NAME, \
                    t2.TABLE_SCHEMA AS PK_SCHEMA_NAME, \
                    t2.TABLE_NAME AS PK_TABLE_NAME, \
                    k2.COLUMN_NAME AS PK_COLUMN_NAME \
             FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS c \
             JOIN INFORMATION_SCHEMA.CONSTRAINT_TABLE_USAGE t1 \
               ON c.CONSTRAINT_NAME = t1.CONSTRAINT_NAME \
             JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE k1 \
               ON c.CONSTRAINT_NAME = k1.CONSTRAINT_NAME \
             JOIN INFORMATION_SCHEMA.CONSTRAINT_TABLE_USAGE t2 \
               ON c.CONSTRAINT_NAME = t2.CONSTRAINT_NAME \
              AND t2.TABLE_NAME != t1.TABLE_NAME \
             JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE k2 \
               ON t2.CONSTRAINT_NAME = k2.CONSTRAINT_NAME \
              AND t2.TABLE_NAME = k2.TABLE_NAME \
             WHERE c.CONSTRAINT_TYPE = 'FOREIGN KEY' AND t1.TABLE_SCHEMA = '{schema}'"
        );
        let imported = format!("SHOW IMPORTED KEYS IN {schema}.*");

        self.run_chain(
            "foreign key",
            schema,
            &[
                ("referential constraints", referential),
                ("constraint table usage", denormalized),
                ("imported keys", imported),
            ],
        )
    }

    /// Run a single query, degrading catalog failures to an empty result.
    fn run(&mut self, sql: &str, schema: &str, what: &str) -> Result<Vec<Row>, FetchError> {
        match self.executor.query(sql, schema) {
            Ok(rows) => Ok(rows),
            Err(QueryError::Catalog(message)) => {
                warn!("{} query failed for schema {}: {}", what, schema, message);
                Ok(Vec::new())
            }
            Err(QueryError::Connection(message)) => Err(FetchError::Connection(message)),
        }
    }

    /// Run strategies in order, returning the first non-empty result.
    ///
    /// Catalog failures and empty results advance the chain; exhausting it
    /// degrades to an empty result. Adding a fourth strategy is a matter of
    /// appending to the caller's list.
    fn run_chain(
        &mut self,
        what: &str,
        schema: &str,
        strategies: &[(&str, String)],
    ) -> Result<Vec<Row>, FetchError> {
        for (label, sql) in strategies {
            debug!("Trying {} strategy '{}' for schema {}", what, label, schema);
            match self.executor.query(sql, schema) {
                Ok(rows) if !rows.is_empty() => {
                    debug!(
                        "{} strategy '{}' succeeded with {} rows",
                        what,
                        label,
                        rows.len()
                    );
                    return Ok(rows);
                }
                Ok(_) => debug!("{} strategy '{}' returned no rows", what, label),
                Err(QueryError::Catalog(message)) => {
                    warn!("{} strategy '{}' failed: {}", what, label, message)
                }
                Err(QueryError::Connection(message)) => {
                    return Err(FetchError::Connection(message));
                }
            }
        }
        warn!(
            "All {} strategies exhausted for schema {}; continuing with an empty result",
            what, schema
        );
        Ok(Vec::new())
    }
}
