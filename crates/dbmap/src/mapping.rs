//! Struct-to-column mapping tables and INSERT plan rendering.
//!
//! A [`Model`] carries a mapping table generated once per concrete type
//! (by `#[derive(Model)]`, cached in a `OnceLock`) instead of being
//! re-inspected on every call. The table is an ordered list of columns;
//! at most one column may be tagged auto-generated, in which case it is
//! excluded from the insert column list but kept as the write-back target
//! for the database-assigned key.

use crate::dialect::Dialect;
use crate::error::{DbError, DbResult};
use crate::value::Value;

/// One column entry of a mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Column name, unquoted.
    pub name: &'static str,
    /// Excluded from insert lists; write-back target for the generated key.
    pub auto: bool,
}

/// Ordered column/value correspondence for one struct type.
#[derive(Debug, Clone)]
pub struct FieldMapping {
    columns: Vec<Column>,
    auto_count: usize,
}

impl FieldMapping {
    pub fn new(columns: Vec<Column>) -> Self {
        let auto_count = columns.iter().filter(|c| c.auto).count();
        Self {
            columns,
            auto_count,
        }
    }

    /// All columns, auto column included, in declaration order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Columns emitted into INSERT/SELECT lists (auto column excluded).
    pub fn insert_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| !c.auto)
    }

    /// The auto-generated column, when exactly one is tagged.
    pub fn auto_column(&self) -> Option<&Column> {
        if self.auto_count == 1 {
            self.columns.iter().find(|c| c.auto)
        } else {
            None
        }
    }

    pub fn auto_count(&self) -> usize {
        self.auto_count
    }

    /// Quoted, comma-joined insert column list for `dialect`.
    pub fn column_list(&self, dialect: Dialect) -> String {
        self.insert_columns()
            .map(|c| dialect.quote(c.name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A struct with a compile-time-generated mapping table.
///
/// Derive with `#[derive(Model)]`. Field attributes under `#[orm(...)]`:
/// `skip` omits a field, `auto` marks the database-assigned key,
/// `column = "name"` renames, `flatten` splices an embedded model's
/// columns in place. The default column name is the field name.
pub trait Model {
    /// The cached mapping table for this type.
    fn mapping() -> &'static FieldMapping;

    /// Leaf values in insert column order (auto column excluded).
    fn values(&self) -> Vec<Value>;

    /// Write a database-assigned key back into the auto field.
    ///
    /// No-op when the type has no auto column.
    fn set_auto_key(&mut self, key: i64);
}

/// A rendered INSERT statement for one model type and dialect.
#[derive(Debug, Clone)]
pub struct InsertPlan {
    sql: String,
    column_count: usize,
}

impl InsertPlan {
    /// Render `INSERT INTO table (cols...) VALUES (placeholders...)`.
    ///
    /// Fails with [`DbError::NoUsableField`] when the mapping emits zero
    /// insert columns, and with a usage error when more than one column is
    /// tagged auto-generated (e.g. via a flattened embedded struct).
    pub fn build<T: Model>(table: &str, dialect: Dialect) -> DbResult<Self> {
        let mapping = T::mapping();
        if mapping.auto_count() > 1 {
            return Err(DbError::Unsupported(
                "more than one auto-generated column in mapping".to_string(),
            ));
        }
        let column_count = mapping.insert_columns().count();
        if column_count == 0 {
            return Err(DbError::NoUsableField);
        }

        let names = mapping.column_list(dialect);
        let run = dialect.placeholder_run(1, column_count)?;
        Ok(Self {
            sql: format!("INSERT INTO {table} ({names}) VALUES ({run})"),
            column_count,
        })
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }
}
