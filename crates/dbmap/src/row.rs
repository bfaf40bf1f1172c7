//! Owned result rows and the row-to-struct mapping trait.

use crate::error::{DbError, DbResult};
use crate::value::{FromValue, Value, decode_column};
use std::sync::Arc;

/// One materialized result row: a shared column header plus this row's cells.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Column titles, in result order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Raw cell by column name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.values.get(idx)
    }

    /// Decode a cell by column name, returning [`DbError::Decode`] on failure
    /// and [`DbError::NotFound`] for an unknown column.
    pub fn try_get<T: FromValue>(&self, column: &str) -> DbResult<T> {
        let value = self
            .get(column)
            .ok_or_else(|| DbError::not_found(format!("column '{column}'")))?;
        decode_column(column, value.clone())
    }

    /// Decode a cell by position.
    pub fn try_get_index<T: FromValue>(&self, index: usize) -> DbResult<T> {
        let value = self
            .values
            .get(index)
            .ok_or_else(|| DbError::not_found(format!("column index {index}")))?;
        decode_column(&index.to_string(), value.clone())
    }

    /// Consume the row into its cells, in column order.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

/// Trait for converting a result row into a Rust struct.
///
/// Typically derived with `#[derive(FromRow)]`; column names follow the
/// same `#[orm(column = "...")]` rules as the field mapper.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> DbResult<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Row {
        let columns: Arc<[String]> = vec!["id".to_string(), "name".to_string()].into();
        Row::new(columns, vec![Value::Int(7), Value::Text("ada".into())])
    }

    #[test]
    fn decodes_by_name_and_index() {
        let row = sample();
        assert_eq!(row.try_get::<i64>("id").unwrap(), 7);
        assert_eq!(row.try_get_index::<String>(1).unwrap(), "ada");
    }

    #[test]
    fn unknown_column_is_not_found() {
        let row = sample();
        assert!(row.try_get::<i64>("missing").unwrap_err().is_not_found());
    }

    #[test]
    fn decode_failure_names_the_column() {
        let row = sample();
        match row.try_get::<i64>("name").unwrap_err() {
            DbError::Decode { column, .. } => assert_eq!(column, "name"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
