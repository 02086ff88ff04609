//! Entity-Relationship Builder
//!
//! Turns normalized columns and foreign-key edges into the model document
//! graph. The builder re-filters against the in-scope table set instead of
//! trusting upstream filtering, assigns each table a fresh identifier the
//! first time it is grouped, and processes every edge for foreign-key flag
//! setting before any entity's attributes are serialized. Empty output is a
//! valid document; degraded extraction is reported through warnings, not
//! errors.

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::info;
use uuid::Uuid;

use crate::models::{
    Attribute, ColumnRecord, Entity, ForeignKeyEdge, Relationship, RelationshipEndpoint,
};

/// Non-fatal annotation on an otherwise successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartialDataWarning {
    /// No foreign-key constraints survived validation; the model has
    /// entities but no relationships.
    NoRelationships,
    /// A foreign-key edge referenced a table outside the requested scope or
    /// one that resolved to no entity.
    UnresolvedEdge { fk_table: String, pk_table: String },
}

impl fmt::Display for PartialDataWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartialDataWarning::NoRelationships => {
                write!(f, "no relationships found in the scanned scope")
            }
            PartialDataWarning::UnresolvedEdge { fk_table, pk_table } => write!(
                f,
                "foreign key {} -> {} skipped: endpoint not in scope or has no columns",
                fk_table, pk_table
            ),
        }
    }
}

/// Result of a build: the document graph plus partial-data warnings.
#[derive(Debug)]
pub struct BuildOutput {
    pub entities: Vec<Entity>,
    pub relationships: Vec<Relationship>,
    pub warnings: Vec<PartialDataWarning>,
}

/// Builds the entity/relationship graph from normalized records.
pub struct ModelBuilder;

impl ModelBuilder {
    /// Build the document graph for one scan.
    ///
    /// `in_scope` is the set of table/view names the caller requested; any
    /// column or edge outside it is dropped here even if upstream already
    /// filtered. An entity exists only for tables with at least one
    /// normalized column, so a permission-restricted table that produced no
    /// column rows never appears as an empty entity.
    pub fn build(
        mut columns: Vec<ColumnRecord>,
        edges: &[ForeignKeyEdge],
        in_scope: &HashSet<String>,
    ) -> BuildOutput {
        // Group columns by owning table, preserving first-observed order.
        // Each table gets its identifier when first grouped.
        let mut group_order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
        let mut entity_ids: HashMap<String, Uuid> = HashMap::new();
        for (index, column) in columns.iter().enumerate() {
            if !in_scope.contains(&column.table_name) {
                continue;
            }
            groups
                .entry(column.table_name.clone())
                .or_insert_with(|| {
                    group_order.push(column.table_name.clone());
                    entity_ids.insert(column.table_name.clone(), Uuid::new_v4());
                    Vec::new()
                })
                .push(index);
        }

        let mut warnings = Vec::new();
        let mut relationships = Vec::new();
        let mut seen_edges = HashSet::new();

        // Every edge is processed before entities are serialized below, so
        // foreign-key flags land on the in-memory columns first.
        for edge in edges {
            if !seen_edges.insert(edge.dedup_key()) {
                continue;
            }

            let source_resolved = groups.contains_key(&edge.fk_table);
            let target_resolved = groups.contains_key(&edge.pk_table);
            if !source_resolved || !target_resolved {
                warnings.push(PartialDataWarning::UnresolvedEdge {
                    fk_table: edge.fk_table.clone(),
                    pk_table: edge.pk_table.clone(),
                });
                continue;
            }

            for &index in &groups[&edge.fk_table] {
                if columns[index].name == edge.fk_column {
                    columns[index].foreign_key = true;
                }
            }

            // Referenced side is "one", referencing side is "many": one
            // reference row relates to many referencing rows.
            relationships.push(Relationship::new(
                RelationshipEndpoint::one(
                    entity_ids[&edge.pk_table],
                    edge.pk_table.clone(),
                    vec![edge.pk_column.clone()],
                ),
                RelationshipEndpoint::many(
                    entity_ids[&edge.fk_table],
                    edge.fk_table.clone(),
                    vec![edge.fk_column.clone()],
                ),
            ));
        }

        let entities: Vec<Entity> = group_order
            .iter()
            .map(|table| Entity {
                id: entity_ids[table],
                name: table.clone(),
                attributes: groups[table]
                    .iter()
                    .map(|&index| Attribute::from_column(&columns[index]))
                    .collect(),
            })
            .collect();

        if relationships.is_empty() {
            warnings.push(PartialDataWarning::NoRelationships);
        }

        info!(
            "Created {} entities and {} relationships",
            entities.len(),
            relationships.len()
        );

        BuildOutput {
            entities,
            relationships,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cardinality;

    fn scope(names: &[&str]) -> HashSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn orders_customers_columns() -> Vec<ColumnRecord> {
        let mut id = ColumnRecord::new("PUBLIC", "ORDERS", "id", "NUMBER");
        id.primary_key = true;
        let customer_id = ColumnRecord::new("PUBLIC", "ORDERS", "customer_id", "NUMBER");
        let mut customers_id = ColumnRecord::new("PUBLIC", "CUSTOMERS", "id", "NUMBER");
        customers_id.primary_key = true;
        vec![id, customer_id, customers_id]
    }

    fn orders_to_customers_edge() -> ForeignKeyEdge {
        ForeignKeyEdge {
            fk_schema: "PUBLIC".to_string(),
            fk_table: "ORDERS".to_string(),
            fk_column: "customer_id".to_string(),
            pk_schema: "PUBLIC".to_string(),
            pk_table: "CUSTOMERS".to_string(),
            pk_column: "id".to_string(),
        }
    }

    #[test]
    fn test_orders_customers_scenario() {
        let output = ModelBuilder::build(
            orders_customers_columns(),
            &[orders_to_customers_edge()],
            &scope(&["ORDERS", "CUSTOMERS"]),
        );

        assert_eq!(output.entities.len(), 2);
        assert_eq!(output.relationships.len(), 1);

        let relationship = &output.relationships[0];
        assert_eq!(relationship.source_entity.name, "CUSTOMERS");
        assert_eq!(relationship.source_entity.start_type, Some(Cardinality::One));
        assert_eq!(relationship.target_entity.name, "ORDERS");
        assert_eq!(relationship.target_entity.end_type, Some(Cardinality::Many));

        let orders = output.entities.iter().find(|e| e.name == "ORDERS").unwrap();
        let fk_attribute = orders
            .attributes
            .iter()
            .find(|a| a.name == "customer_id")
            .unwrap();
        assert!(fk_attribute.metadata.foreign_key);
        assert!(!fk_attribute.metadata.primary_key);
    }

    #[test]
    fn test_relationship_endpoints_reference_known_entities() {
        let output = ModelBuilder::build(
            orders_customers_columns(),
            &[orders_to_customers_edge()],
            &scope(&["ORDERS", "CUSTOMERS"]),
        );

        for relationship in &output.relationships {
            for endpoint in [&relationship.source_entity, &relationship.target_entity] {
                let entity = output
                    .entities
                    .iter()
                    .find(|e| e.id == endpoint.id)
                    .expect("endpoint references a known entity");
                for name in &endpoint.attribute_names {
                    assert!(entity.attributes.iter().any(|a| &a.name == name));
                }
            }
        }
    }

    #[test]
    fn test_duplicate_edges_collapse_to_one_relationship() {
        // Overlapping rows from multiple fallback strategies
        let edges = vec![
            orders_to_customers_edge(),
            orders_to_customers_edge(),
            orders_to_customers_edge(),
        ];
        let output = ModelBuilder::build(
            orders_customers_columns(),
            &edges,
            &scope(&["ORDERS", "CUSTOMERS"]),
        );

        assert_eq!(output.relationships.len(), 1);
    }

    #[test]
    fn test_out_of_scope_edge_is_dropped_with_warning() {
        let output = ModelBuilder::build(
            orders_customers_columns(),
            &[orders_to_customers_edge()],
            &scope(&["ORDERS"]),
        );

        assert_eq!(output.entities.len(), 1);
        assert!(output.relationships.is_empty());
        assert!(output.warnings.iter().any(|w| matches!(
            w,
            PartialDataWarning::UnresolvedEdge { pk_table, .. } if pk_table == "CUSTOMERS"
        )));
        assert!(output
            .warnings
            .contains(&PartialDataWarning::NoRelationships));

        // The flag pass only runs for validated edges
        let orders = &output.entities[0];
        let attribute = orders
            .attributes
            .iter()
            .find(|a| a.name == "customer_id")
            .unwrap();
        assert!(!attribute.metadata.foreign_key);
    }

    #[test]
    fn test_table_without_columns_yields_no_entity() {
        // ORPHAN is in scope but produced no column rows
        let output = ModelBuilder::build(
            orders_customers_columns(),
            &[],
            &scope(&["ORDERS", "CUSTOMERS", "ORPHAN"]),
        );

        assert_eq!(output.entities.len(), 2);
        assert!(!output.entities.iter().any(|e| e.name == "ORPHAN"));
    }

    #[test]
    fn test_columns_outside_scope_are_refiltered() {
        let output = ModelBuilder::build(
            orders_customers_columns(),
            &[],
            &scope(&["CUSTOMERS"]),
        );

        assert_eq!(output.entities.len(), 1);
        assert_eq!(output.entities[0].name, "CUSTOMERS");
    }

    #[test]
    fn test_empty_input_is_a_valid_document() {
        let output = ModelBuilder::build(Vec::new(), &[], &HashSet::new());

        assert!(output.entities.is_empty());
        assert!(output.relationships.is_empty());
        assert_eq!(output.warnings, vec![PartialDataWarning::NoRelationships]);
    }

    #[test]
    fn test_attribute_order_matches_column_order() {
        let columns = vec![
            ColumnRecord::new("PUBLIC", "ORDERS", "id", "NUMBER"),
            ColumnRecord::new("PUBLIC", "ORDERS", "customer_id", "NUMBER"),
            ColumnRecord::new("PUBLIC", "ORDERS", "placed_at", "TIMESTAMP_NTZ"),
        ];
        let output = ModelBuilder::build(columns, &[], &scope(&["ORDERS"]));

        let names: Vec<&str> = output.entities[0]
            .attributes
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["id", "customer_id", "placed_at"]);
    }
}
