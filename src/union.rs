//! Schema-reconciling UNION ALL
//!
//! Algorithm:
//! 1. Shared column names must have the same declared type.
//! 2. The result schema is the left table's columns in order, followed by
//!    the right table's columns the left lacks, in right order.
//! 3. Left rows then right rows are widened to the result schema, filling
//!    `Value::Absent` for columns the source row does not have.
//!
//! Rows are not deduplicated; the result always has
//! `left.row_count() + right.row_count()` rows. Values are not re-validated:
//! they come from rows that were validated when written.

use crate::errors::{TableError, TableResult};
use crate::schema::Column;
use crate::table::{Row, Table};
use crate::value::Value;

/// Joins the two table names with the union marker
pub fn union_name(left: &Table, right: &Table) -> String {
    format!("{}_UNION_{}", left.name(), right.name())
}

/// Unions two tables under the default `{left}_UNION_{right}` name.
pub fn union_tables(left: &Table, right: &Table) -> TableResult<Table> {
    union_tables_as(left, right, union_name(left, right))
}

/// Unions two tables under an explicit result name.
///
/// # Errors
///
/// Returns `IncompatibleSchema` for the first left column (in left order)
/// whose name appears in `right` with a different type. Nothing is built
/// in that case.
pub fn union_tables_as(left: &Table, right: &Table, name: impl Into<String>) -> TableResult<Table> {
    let columns = merged_columns(left, right)?;

    let rows: Vec<Row> = left
        .rows()
        .iter()
        .chain(right.rows())
        .map(|row| widen(row, &columns))
        .collect();

    let mut result = Table::from_schema(name, columns);
    for row in rows {
        result.push_row_unchecked(row);
    }

    Ok(result)
}

fn merged_columns(left: &Table, right: &Table) -> TableResult<Vec<Column>> {
    let right_types = right.column_types();
    for column in left.columns() {
        if let Some(&other) = right_types.get(column.name()) {
            if other != column.column_type() {
                return Err(TableError::IncompatibleSchema {
                    column: column.name().to_string(),
                    left: column.column_type(),
                    right: other,
                });
            }
        }
    }

    let left_types = left.column_types();
    let mut columns = left.columns().to_vec();
    columns.extend(
        right
            .columns()
            .iter()
            .filter(|c| !left_types.contains_key(c.name()))
            .cloned(),
    );
    Ok(columns)
}

fn widen(row: &Row, columns: &[Column]) -> Row {
    Row::from_values(
        columns
            .iter()
            .map(|c| {
                let value = row.get(c.name()).cloned().unwrap_or(Value::Absent);
                (c.name().to_string(), value)
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{normalize_schema, ColumnType};
    use serde_json::{json, Map, Value as JsonValue};

    fn table(name: &str, schema: &[(&str, &str)], rows: &[JsonValue]) -> Table {
        let mut t = Table::from_schema(name, normalize_schema(schema.iter().copied()).unwrap());
        for row in rows {
            t.add_row(row.as_object().unwrap()).unwrap();
        }
        t
    }

    fn obj(value: JsonValue) -> Map<String, JsonValue> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_union_fills_absent_columns() {
        let a = table("A", &[("id", "integer"), ("name", "string")], &[json!({"id": 1, "name": "Alice"})]);
        let b = table("B", &[("id", "integer"), ("age", "integer")], &[json!({"id": 2, "age": 30})]);

        let result = union_tables(&a, &b).unwrap();
        assert_eq!(result.name(), "A_UNION_B");
        assert_eq!(
            result.schema(),
            vec![
                ("id", ColumnType::Integer),
                ("name", ColumnType::String),
                ("age", ColumnType::Integer)
            ]
        );
        assert_eq!(
            result.get_rows(),
            vec![
                obj(json!({"id": 1, "name": "Alice", "age": null})),
                obj(json!({"id": 2, "name": null, "age": 30})),
            ]
        );
        assert_eq!(result.rows()[0].get("age"), Some(&Value::Absent));
    }

    #[test]
    fn test_union_keeps_duplicates() {
        let rows = [json!({"id": 1, "name": "Bob"}), json!({"id": 1, "name": "Bob"})];
        let a = table("t1", &[("id", "integer"), ("name", "string")], &rows);
        let b = table("t2", &[("id", "integer"), ("name", "string")], &rows[..1]);

        let result = union_tables(&a, &b).unwrap();
        assert_eq!(result.row_count(), 3);
    }

    #[test]
    fn test_union_with_reordered_schema() {
        let a = table("a", &[("id", "integer"), ("name", "string")], &[json!({"id": 1, "name": "x"})]);
        let b = table("b", &[("name", "string"), ("id", "integer")], &[json!({"id": 2, "name": "y"})]);

        let result = union_tables(&a, &b).unwrap();
        assert_eq!(result.schema_signature(), a.schema_signature());
        assert_eq!(result.get_rows()[1], obj(json!({"id": 2, "name": "y"})));
    }

    #[test]
    fn test_union_incompatible_types() {
        let a = table("a", &[("id", "integer")], &[]);
        let b = table("b", &[("id", "string")], &[]);

        let err = union_tables(&a, &b).unwrap_err();
        assert_eq!(
            err,
            TableError::IncompatibleSchema {
                column: "id".into(),
                left: ColumnType::Integer,
                right: ColumnType::String,
            }
        );
    }

    #[test]
    fn test_union_as_uses_given_name() {
        let a = table("a", &[("id", "integer")], &[]);
        let result = union_tables_as(&a, &a, "merged").unwrap();
        assert_eq!(result.name(), "merged");
    }
}
