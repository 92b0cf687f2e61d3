/// Relationship Introspection Module
///
/// Fetches foreign-key metadata from the engine catalog. The handler treats
/// the result as an opaque row set; extraction into `Relationship` values
/// happens here, on the caller side of `execute_query`.
use crate::core::db::connection::DatabaseHandler;
use crate::core::db::query::QueryResult;
use crate::core::Result;
use tracing::warn;

/// Catalog query yielding one row per foreign-key column pair on
/// public-schema tables: constraint name, table, column, referenced table,
/// referenced column. `regclass`/`name` values are cast to text so the rows
/// materialize as plain strings.
pub const RELATION_QUERY: &str = "\
SELECT
    c.conname::text AS constraint_name,
    c.conrelid::regclass::text AS table_name,
    a.attname::text AS column_name,
    c.confrelid::regclass::text AS referenced_table_name,
    af.attname::text AS referenced_column_name
FROM
    pg_constraint AS c
    JOIN pg_attribute AS a ON a.attnum = ANY(c.conkey) AND a.attrelid = c.conrelid
    JOIN pg_attribute AS af ON af.attnum = ANY(c.confkey) AND af.attrelid = c.confrelid
WHERE
    c.contype = 'f'
    AND c.conrelid::regclass::text IN (
        SELECT table_name FROM information_schema.tables WHERE table_schema = 'public')
ORDER BY
    c.conrelid, c.conkey";

/// One foreign-key edge between two tables.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Relationship {
    /// The table holding the foreign-key column
    pub from_table: String,
    /// The foreign-key column
    pub from_column: String,
    /// The referenced table
    pub to_table: String,
    /// The referenced column
    pub to_column: String,
}

/// Extracts relationships from the materialized rows of [`RELATION_QUERY`].
///
/// Rows with fewer columns than expected are skipped with a warning rather
/// than aborting the whole extraction.
pub fn relationships_from_rows(result: &QueryResult) -> Vec<Relationship> {
    let mut relationships = Vec::new();
    for row in &result.rows {
        if row.len() < 5 {
            warn!(columns = row.len(), "skipping malformed relationship row");
            continue;
        }
        relationships.push(Relationship {
            from_table: row[1].clone(),
            from_column: row[2].clone(),
            to_table: row[3].clone(),
            to_column: row[4].clone(),
        });
    }
    relationships
}

/// Fetches the foreign-key relationships of the handler's database.
pub fn fetch_relationships(handler: &mut DatabaseHandler) -> Result<Vec<Relationship>> {
    let result = handler.execute_query(RELATION_QUERY, &[])?;
    Ok(relationships_from_rows(&result))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_relationships_from_rows() {
        let result = QueryResult::new(
            vec![
                "constraint_name".to_string(),
                "table_name".to_string(),
                "column_name".to_string(),
                "referenced_table_name".to_string(),
                "referenced_column_name".to_string(),
            ],
            vec![
                row(&["orders_user_id_fkey", "orders", "user_id", "users", "id"]),
                row(&["items_order_id_fkey", "items", "order_id", "orders", "id"]),
            ],
        );

        let relationships = relationships_from_rows(&result);
        assert_eq!(relationships.len(), 2);
        assert_eq!(
            relationships[0],
            Relationship {
                from_table: "orders".to_string(),
                from_column: "user_id".to_string(),
                to_table: "users".to_string(),
                to_column: "id".to_string(),
            }
        );
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let result = QueryResult::new(
            vec![],
            vec![
                row(&["orders_user_id_fkey", "orders", "user_id", "users", "id"]),
                row(&["truncated", "orders"]),
            ],
        );
        let relationships = relationships_from_rows(&result);
        assert_eq!(relationships.len(), 1);
        assert_eq!(relationships[0].from_table, "orders");
    }

    #[test]
    fn test_empty_result_yields_no_relationships() {
        let result = QueryResult::new(vec![], vec![]);
        assert!(relationships_from_rows(&result).is_empty());
    }
}
