//! Incremental SQL fragment builder with dialect-aware finalization.
//!
//! Fragments always use the generic `?` placeholder; [`SqlBuilder::sql`]
//! performs one left-to-right rewrite into the dialect's tokens. The
//! rewrite is a pure function of accumulated state — calling `sql()` twice
//! without mutation yields identical text, and builder state is never
//! renumbered in place.
//!
//! Builders are value-like: `clone()` is a deep copy with its own text and
//! argument storage, so a COUNT query and a paged SELECT can diverge after
//! sharing a filter prefix.
//!
//! # Example
//!
//! ```ignore
//! let mut count = SqlBuilder::new(conn.dialect());
//! count.select(&["COUNT(*)"]);
//! count.add("FROM events");
//! count.add_args("WHERE kind = ?", ("login",));
//!
//! let mut page = count.clone();
//! page.select(&["id", "kind", "created_at"]);
//! page.add_args("LIMIT ? OFFSET ?", (20_i64, 0_i64));
//! ```

use crate::client::{ExecResult, Executor, Queryer};
use crate::dialect::Dialect;
use crate::error::{DbError, DbResult};
use crate::mapping::Model;
use crate::query;
use crate::row::{FromRow, Row};
use crate::value::{FromValue, IntoArgs, ToValue, Value};
use std::collections::HashMap;

/// Incremental SQL text/argument accumulator.
#[derive(Debug, Clone)]
pub struct SqlBuilder {
    dialect: Dialect,
    select: Option<String>,
    fragments: Vec<String>,
    args: Vec<Value>,
    separator: String,
}

impl SqlBuilder {
    /// Create a builder for `dialect`.
    pub fn new(dialect: Dialect) -> Self {
        Self::with_separator(dialect, " ")
    }

    /// Create a builder joining fragments with `separator` (e.g. `"\n"`).
    pub fn with_separator(dialect: Dialect, separator: &str) -> Self {
        Self {
            dialect,
            select: None,
            fragments: Vec::new(),
            args: Vec::new(),
            separator: separator.to_string(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Set or overwrite the SELECT column list; `*` when empty.
    pub fn select(&mut self, columns: &[&str]) -> &mut Self {
        let list = if columns.is_empty() {
            "*".to_string()
        } else {
            columns.join(", ")
        };
        self.select = Some(format!("SELECT {list}"));
        self
    }

    /// Set the SELECT column list from a model's mapping (quoted, auto
    /// column excluded).
    pub fn select_model<T: Model>(&mut self) -> DbResult<&mut Self> {
        let mapping = T::mapping();
        if mapping.insert_columns().next().is_none() {
            return Err(DbError::NoUsableField);
        }
        self.select = Some(format!("SELECT {}", mapping.column_list(self.dialect)));
        Ok(self)
    }

    /// Append a text fragment. Empty text is ignored.
    pub fn add(&mut self, text: &str) -> &mut Self {
        if !text.is_empty() {
            self.fragments.push(text.to_string());
        }
        self
    }

    /// Bind one argument value.
    pub fn bind(&mut self, value: impl ToValue) -> &mut Self {
        self.args.push(value.to_value());
        self
    }

    /// Append a fragment and bind its argument values.
    pub fn add_args(&mut self, text: &str, args: impl IntoArgs) -> &mut Self {
        self.add(text);
        self.args.extend(args.into_args());
        self
    }

    /// Append a fragment only when `cond` holds.
    pub fn add_if(&mut self, cond: bool, text: &str) -> &mut Self {
        if cond {
            self.add(text);
        }
        self
    }

    /// Append a fragment and bind its arguments only when `cond` holds.
    pub fn add_args_if(&mut self, cond: bool, text: &str, args: impl IntoArgs) -> &mut Self {
        if cond {
            self.add_args(text, args);
        }
        self
    }

    /// Append `IN (?,...)` matching the collection length and bind each
    /// element in order. An empty collection is a usage error.
    pub fn add_in<I>(&mut self, values: I) -> DbResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: ToValue,
    {
        let values: Vec<Value> = values.into_iter().map(|v| v.to_value()).collect();
        if values.is_empty() {
            return Err(DbError::EmptyInList);
        }
        let run = vec!["?"; values.len()].join(",");
        self.fragments.push(format!("IN ({run})"));
        self.args.extend(values);
        Ok(self)
    }

    /// Bound argument values, in the order their placeholders appear.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Finalize into dialect-specific SQL text.
    ///
    /// Joins fragments with the separator (no trailing separator), then
    /// rewrites every `?` left to right: numbered dialects get sequentially
    /// increasing indices starting at 1, positional dialects keep `?`.
    /// Operates on a rendered copy; repeated calls return identical text.
    pub fn sql(&self) -> String {
        let raw = self.render_raw();
        if !self.dialect.numbered() {
            return raw;
        }
        let mut out = String::with_capacity(raw.len() + 8);
        let mut index = 1;
        for ch in raw.chars() {
            if ch == '?' {
                out.push_str(&self.dialect.placeholder(index));
                index += 1;
            } else {
                out.push(ch);
            }
        }
        out
    }

    fn render_raw(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(self.fragments.len() + 1);
        if let Some(select) = &self.select {
            parts.push(select);
        }
        parts.extend(self.fragments.iter().map(String::as_str));
        parts.join(&self.separator)
    }

    /// Verify the placeholder count matches the bound argument count.
    pub fn check_args(&self) -> DbResult<()> {
        let placeholders = self.render_raw().matches('?').count();
        if placeholders != self.args.len() {
            return Err(DbError::ArgumentMismatch {
                placeholders,
                args: self.args.len(),
            });
        }
        Ok(())
    }

    /// Finalize and execute against `exec`.
    pub async fn execute<E: Executor + ?Sized>(&self, exec: &E) -> DbResult<ExecResult> {
        self.check_args()?;
        query::execute(exec, &self.sql(), &self.args).await
    }

    /// Finalize and fetch all rows.
    pub async fn fetch_rows<Q: Queryer + ?Sized>(&self, queryer: &Q) -> DbResult<Vec<Row>> {
        self.check_args()?;
        query::query_rows(queryer, &self.sql(), &self.args).await
    }

    /// Finalize and fetch all rows mapped to `T`. Zero rows yield an empty vec.
    pub async fn fetch_all_as<T: FromRow, Q: Queryer + ?Sized>(
        &self,
        queryer: &Q,
    ) -> DbResult<Vec<T>> {
        self.check_args()?;
        query::query_all_as(queryer, &self.sql(), &self.args).await
    }

    /// Finalize and fetch the first row mapped to `T`; not-found on zero rows.
    pub async fn fetch_one_as<T: FromRow, Q: Queryer + ?Sized>(&self, queryer: &Q) -> DbResult<T> {
        self.check_args()?;
        query::query_one_as(queryer, &self.sql(), &self.args).await
    }

    /// Finalize and fetch the first column of the first row.
    pub async fn fetch_scalar<T: FromValue, Q: Queryer + ?Sized>(
        &self,
        queryer: &Q,
    ) -> DbResult<T> {
        self.check_args()?;
        query::query_scalar(queryer, &self.sql(), &self.args).await
    }
}

/// A COUNT query and a paged query sharing one filter prefix.
///
/// Derive both builders from a common prefix via `clone()`, then run the
/// pair against one connection.
#[derive(Debug, Clone)]
pub struct PageQuery {
    count: SqlBuilder,
    page: SqlBuilder,
}

impl PageQuery {
    pub fn new(count: SqlBuilder, page: SqlBuilder) -> Self {
        Self { count, page }
    }

    /// Run the COUNT builder and decode its single scalar.
    pub async fn query_count<Q: Queryer + ?Sized>(&self, queryer: &Q) -> DbResult<i64> {
        self.count.check_args()?;
        query::query_scalar(queryer, &self.count.sql(), self.count.args()).await
    }

    /// Run the page builder and return titles plus rows as value sequences.
    pub async fn query_page_rows<Q: Queryer + ?Sized>(
        &self,
        queryer: &Q,
    ) -> DbResult<(Vec<String>, Vec<Vec<Value>>)> {
        self.page.check_args()?;
        query::query_page_rows(queryer, &self.page.sql(), self.page.args()).await
    }

    /// Run the page builder and return titles plus rows as name/value maps.
    pub async fn query_page_maps<Q: Queryer + ?Sized>(
        &self,
        queryer: &Q,
    ) -> DbResult<(Vec<String>, Vec<HashMap<String, Value>>)> {
        self.page.check_args()?;
        query::query_page_maps(queryer, &self.page.sql(), self.page.args()).await
    }
}
