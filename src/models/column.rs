//! Column and foreign-key records for the SDK

use serde::{Deserialize, Serialize};

/// One column of a source table or view.
///
/// Produced by the normalizer in catalog-reported ordinal order, one record
/// per (table, column) pair present in the column catalog. Identity is the
/// (table name, column name) pair within a single scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnRecord {
    /// Schema owning the table
    pub schema_name: String,
    /// Table or view owning the column
    pub table_name: String,
    /// Column name
    pub name: String,
    /// Data type as reported by the source catalog (free text, e.g. "NUMBER")
    pub data_type: String,
    /// Whether the column appears in the primary-key lookup set
    #[serde(default)]
    pub primary_key: bool,
    /// Whether the column is the referencing side of a foreign key.
    /// Set during the builder's foreign-key pass, never by the normalizer.
    #[serde(default)]
    pub foreign_key: bool,
}

impl ColumnRecord {
    pub fn new(
        schema_name: impl Into<String>,
        table_name: impl Into<String>,
        name: impl Into<String>,
        data_type: impl Into<String>,
    ) -> Self {
        Self {
            schema_name: schema_name.into(),
            table_name: table_name.into(),
            name: name.into(),
            data_type: data_type.into(),
            primary_key: false,
            foreign_key: false,
        }
    }
}

/// Directed foreign-key edge between two tables.
///
/// Points FROM the table holding the constraint (the referencing, `fk_*`
/// side) TO the table it references (the `pk_*` side). Composite keys
/// collapse to one edge per column pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForeignKeyEdge {
    pub fk_schema: String,
    pub fk_table: String,
    pub fk_column: String,
    pub pk_schema: String,
    pub pk_table: String,
    pub pk_column: String,
}

impl ForeignKeyEdge {
    /// Deduplication key: one relationship per
    /// (source table, source column, target table, target column).
    pub fn dedup_key(&self) -> (&str, &str, &str, &str) {
        (
            self.fk_table.as_str(),
            self.fk_column.as_str(),
            self.pk_table.as_str(),
            self.pk_column.as_str(),
        )
    }
}
