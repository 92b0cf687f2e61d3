/// Query Execution Module
///
/// This module provides result materialization for SQL statements executed
/// through a session. Rows are converted into display-formatted strings so
/// callers get an engine-agnostic, ordered view of the data.
use postgres::types::FromSql;
use postgres::Row;

/// Represents the materialized result of a SQL query execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    /// Column names from the query result
    pub columns: Vec<String>,
    /// Rows of data as string values
    pub rows: Vec<Vec<String>>,
    /// Number of rows returned
    pub row_count: usize,
}

impl QueryResult {
    /// Creates a new QueryResult from column names and row data
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let row_count = rows.len();
        QueryResult {
            columns,
            rows,
            row_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Materializes driver rows into a `QueryResult` with the given column names.
pub(crate) fn materialize(columns: Vec<String>, rows: &[Row]) -> QueryResult {
    let data = rows
        .iter()
        .map(|row| (0..row.len()).map(|idx| format_value(row, idx)).collect())
        .collect();
    QueryResult::new(columns, data)
}

/// Formats one cell for display.
///
/// Common scalar types are rendered through their natural string form, NULL
/// becomes the literal `NULL`, and values of types with no text conversion
/// are rendered as an opaque `<typename>` marker.
fn format_value(row: &Row, idx: usize) -> String {
    let ty = row.columns()[idx].type_();
    let formatted = match ty.name() {
        "bool" => typed_cell::<bool>(row, idx),
        "int2" => typed_cell::<i16>(row, idx),
        "int4" => typed_cell::<i32>(row, idx),
        "int8" => typed_cell::<i64>(row, idx),
        "float4" => typed_cell::<f32>(row, idx),
        "float8" => typed_cell::<f64>(row, idx),
        "oid" => typed_cell::<u32>(row, idx),
        _ => typed_cell::<String>(row, idx),
    };
    formatted.unwrap_or_else(|| format!("<{}>", ty.name()))
}

fn typed_cell<'a, T>(row: &'a Row, idx: usize) -> Option<String>
where
    T: FromSql<'a> + ToString,
{
    match row.try_get::<_, Option<T>>(idx) {
        Ok(Some(value)) => Some(value.to_string()),
        Ok(None) => Some("NULL".to_string()),
        Err(_) => None,
    }
}
