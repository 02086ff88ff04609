//! Schema Normalizer
//!
//! The single adapter boundary between raw catalog rows and the rest of the
//! pipeline. Whichever fallback strategy produced a row set, everything
//! downstream sees one canonical shape: `ColumnRecord` per (table, column)
//! pair, `ForeignKeyEdge` per constraint column pair, and a
//! (schema, table, column) primary-key lookup set. Rows missing a required
//! field are skipped with a warning, never propagated as errors.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::models::{ColumnRecord, ForeignKeyEdge};
use crate::source::Row;

/// (schema, table, column) triple identifying a primary-key column.
pub type PrimaryKeyTriple = (String, String, String);

/// Build the primary-key lookup set from raw key rows.
///
/// Tolerates both retrieval shapes: the standard key-usage view reports
/// upper-case catalog names (`TABLE_SCHEMA`, ...) while the native
/// enumeration reports lower-case ones (`schema_name`, ...). Tuple rows are
/// read positionally in (schema, table, column) order.
pub fn primary_key_lookup(rows: &[Row]) -> HashSet<PrimaryKeyTriple> {
    let mut lookup = HashSet::new();
    for row in rows {
        let schema = row
            .text_any(&["TABLE_SCHEMA", "schema_name"])
            .or_else(|| row.text_at(0));
        let table = row
            .text_any(&["TABLE_NAME", "table_name"])
            .or_else(|| row.text_at(1));
        let column = row
            .text_any(&["COLUMN_NAME", "column_name"])
            .or_else(|| row.text_at(2));

        match (schema, table, column) {
            (Some(schema), Some(table), Some(column)) => {
                lookup.insert((schema.to_string(), table.to_string(), column.to_string()));
            }
            _ => warn!("Skipping malformed primary key row: {:?}", row),
        }
    }
    debug!("Found {} primary key columns", lookup.len());
    lookup
}

/// Merge raw column rows with the primary-key lookup set.
///
/// Produces one record per (table, column) pair present in the column
/// catalog, preserving catalog-reported ordinal order so downstream
/// consumers see attributes in the original table definition order. A table
/// absent from the column catalog yields zero records and therefore no
/// entity.
pub fn column_records(
    rows: &[Row],
    primary_keys: &HashSet<PrimaryKeyTriple>,
) -> Vec<ColumnRecord> {
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let schema = row.text("TABLE_SCHEMA").or_else(|| row.text_at(0));
        let table = row.text("TABLE_NAME").or_else(|| row.text_at(1));
        let column = row.text("COLUMN_NAME").or_else(|| row.text_at(2));
        let data_type = row.text("DATA_TYPE").or_else(|| row.text_at(3));

        let (Some(schema), Some(table), Some(column)) = (schema, table, column) else {
            warn!("Skipping malformed column row: {:?}", row);
            continue;
        };

        let mut record =
            ColumnRecord::new(schema, table, column, data_type.unwrap_or_default());
        record.primary_key = primary_keys.contains(&(
            record.schema_name.clone(),
            record.table_name.clone(),
            record.name.clone(),
        ));
        records.push(record);
    }
    debug!(
        "Normalized {} columns ({} primary key)",
        records.len(),
        records.iter().filter(|r| r.primary_key).count()
    );
    records
}

/// Canonicalize raw foreign-key rows into directed edges.
///
/// Accepts all three retrieval shapes. The imported-keys enumeration uses
/// engine-specific names (`FK_DATABASE_NAME` instead of `FK_SCHEMA_NAME`);
/// known alternates are remapped here so the builder never sees them.
pub fn foreign_key_edges(rows: &[Row]) -> Vec<ForeignKeyEdge> {
    let mut edges = Vec::with_capacity(rows.len());
    for row in rows {
        let fk_schema = row.text_any(&["FK_SCHEMA_NAME", "FK_DATABASE_NAME"]);
        let fk_table = row.text("FK_TABLE_NAME");
        let fk_column = row.text("FK_COLUMN_NAME");
        let pk_schema = row.text_any(&["PK_SCHEMA_NAME", "PK_DATABASE_NAME"]);
        let pk_table = row.text("PK_TABLE_NAME");
        let pk_column = row.text("PK_COLUMN_NAME");

        let (Some(fk_table), Some(fk_column), Some(pk_table), Some(pk_column)) =
            (fk_table, fk_column, pk_table, pk_column)
        else {
            warn!("Skipping malformed foreign key row: {:?}", row);
            continue;
        };

        edges.push(ForeignKeyEdge {
            fk_schema: fk_schema.unwrap_or_default().to_string(),
            fk_table: fk_table.to_string(),
            fk_column: fk_column.to_string(),
            pk_schema: pk_schema.unwrap_or_default().to_string(),
            pk_table: pk_table.to_string(),
            pk_column: pk_column.to_string(),
        });
    }
    debug!("Normalized {} foreign key edges", edges.len());
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_key_lookup_accepts_both_shapes() {
        let rows = vec![
            Row::record([
                ("TABLE_SCHEMA", "PUBLIC"),
                ("TABLE_NAME", "ORDERS"),
                ("COLUMN_NAME", "id"),
            ]),
            Row::record([
                ("schema_name", "PUBLIC"),
                ("table_name", "CUSTOMERS"),
                ("column_name", "id"),
            ]),
            Row::tuple(["PUBLIC", "ITEMS", "sku"]),
        ];

        let lookup = primary_key_lookup(&rows);
        assert_eq!(lookup.len(), 3);
        assert!(lookup.contains(&(
            "PUBLIC".to_string(),
            "CUSTOMERS".to_string(),
            "id".to_string()
        )));
        assert!(lookup.contains(&(
            "PUBLIC".to_string(),
            "ITEMS".to_string(),
            "sku".to_string()
        )));
    }

    #[test]
    fn test_column_records_preserve_ordinal_order() {
        let rows = vec![
            Row::tuple(["PUBLIC", "ORDERS", "id", "NUMBER"]),
            Row::tuple(["PUBLIC", "ORDERS", "customer_id", "NUMBER"]),
            Row::tuple(["PUBLIC", "ORDERS", "placed_at", "TIMESTAMP_NTZ"]),
        ];
        let mut primary_keys = HashSet::new();
        primary_keys.insert((
            "PUBLIC".to_string(),
            "ORDERS".to_string(),
            "id".to_string(),
        ));

        let records = column_records(&rows, &primary_keys);
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["id", "customer_id", "placed_at"]);
        assert!(records[0].primary_key);
        assert!(!records[1].primary_key);
        assert!(!records[0].foreign_key);
    }

    #[test]
    fn test_column_records_accept_named_rows() {
        let rows = vec![Row::record([
            ("TABLE_SCHEMA", "PUBLIC"),
            ("TABLE_NAME", "ORDERS"),
            ("COLUMN_NAME", "id"),
            ("DATA_TYPE", "NUMBER"),
        ])];

        let records = column_records(&rows, &HashSet::new());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].table_name, "ORDERS");
        assert_eq!(records[0].data_type, "NUMBER");
    }

    #[test]
    fn test_malformed_column_rows_are_skipped() {
        let rows = vec![
            Row::record([("TABLE_SCHEMA", "PUBLIC")]),
            Row::tuple(["PUBLIC", "ORDERS", "id", "NUMBER"]),
        ];

        let records = column_records(&rows, &HashSet::new());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "id");
    }

    #[test]
    fn test_foreign_key_edges_remap_alternate_names() {
        let rows = vec![Row::record([
            ("FK_DATABASE_NAME", "PUBLIC"),
            ("FK_TABLE_NAME", "ORDERS"),
            ("FK_COLUMN_NAME", "customer_id"),
            ("PK_DATABASE_NAME", "PUBLIC"),
            ("PK_TABLE_NAME", "CUSTOMERS"),
            ("PK_COLUMN_NAME", "id"),
        ])];

        let edges = foreign_key_edges(&rows);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].fk_schema, "PUBLIC");
        assert_eq!(edges[0].fk_table, "ORDERS");
        assert_eq!(edges[0].pk_table, "CUSTOMERS");
        assert_eq!(edges[0].pk_column, "id");
    }

    #[test]
    fn test_foreign_key_edges_accept_lowercase_fields() {
        // Drivers downcase the imported-keys output on some paths
        let rows = vec![Row::record([
            ("fk_schema_name", "PUBLIC"),
            ("fk_table_name", "ORDERS"),
            ("fk_column_name", "customer_id"),
            ("pk_schema_name", "PUBLIC"),
            ("pk_table_name", "CUSTOMERS"),
            ("pk_column_name", "id"),
        ])];

        let edges = foreign_key_edges(&rows);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].fk_column, "customer_id");
    }

    #[test]
    fn test_malformed_foreign_key_rows_are_skipped() {
        let rows = vec![Row::record([("FK_TABLE_NAME", "ORDERS")])];
        assert!(foreign_key_edges(&rows).is_empty());
    }
}
