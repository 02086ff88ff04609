//! Source-warehouse collaborator boundary
//!
//! Defines the `QueryExecutor` trait the fetcher drives and the `Row` shape
//! query results arrive in. Depending on which catalog path a driver takes,
//! rows come back either as ordered tuples or as name-keyed records; both
//! shapes are supported here so the variance never leaks past the fetcher.

use serde_json::Value;

/// Error type for source-warehouse queries
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Cannot reach or authenticate against the warehouse.
    /// Fatal for the current operation and surfaced verbatim.
    #[error("Connection error: {0}")]
    Connection(String),
    /// A catalog query failed (missing view, insufficient privileges).
    /// Recovered by advancing to the next fallback strategy.
    #[error("Catalog access error: {0}")]
    Catalog(String),
}

/// One result row in whichever shape the driver produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    /// Ordered values, positionally addressed
    Tuple(Vec<Value>),
    /// Name-keyed record, addressed case-insensitively
    Record(Vec<(String, Value)>),
}

impl Row {
    /// Build a tuple row from string values.
    pub fn tuple<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Row::Tuple(values.into_iter().map(|v| Value::String(v.into())).collect())
    }

    /// Build a name-keyed row from (field, value) string pairs.
    pub fn record<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Row::Record(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), Value::String(v.into())))
                .collect(),
        )
    }

    /// Value at a tuple position. `None` for record rows.
    pub fn get(&self, index: usize) -> Option<&Value> {
        match self {
            Row::Tuple(values) => values.get(index),
            Row::Record(_) => None,
        }
    }

    /// Value of a named field, matched case-insensitively. `None` for tuples.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Row::Tuple(_) => None,
            Row::Record(pairs) => pairs
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value),
        }
    }

    /// First present field among several alternate names.
    ///
    /// Fallback catalog paths report the same datum under different names
    /// (e.g. `FK_SCHEMA_NAME` vs `FK_DATABASE_NAME`); callers list all of
    /// them in priority order.
    pub fn field_any(&self, names: &[&str]) -> Option<&Value> {
        names.iter().find_map(|name| self.field(name))
    }

    /// Text at a tuple position.
    pub fn text_at(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(Value::as_str)
    }

    /// Text of a named field.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    /// Text of the first present field among alternates.
    pub fn text_any(&self, names: &[&str]) -> Option<&str> {
        self.field_any(names).and_then(Value::as_str)
    }
}

/// Query executor over one live warehouse connection.
///
/// Implementations wrap the actual driver. The handle is `&mut` per transfer:
/// one connection per transfer request, never shared across concurrent
/// requests.
pub trait QueryExecutor {
    /// Execute a catalog statement and return all rows.
    ///
    /// `schema` is the scope the statement targets; implementations may need
    /// it to set session context before executing.
    fn query(&mut self, sql: &str, schema: &str) -> Result<Vec<Row>, QueryError>;
}
