//! Execution and decode helpers over the collaborator traits.
//!
//! Every helper drains and closes the row cursor on every path, wraps
//! client failures with the offending statement text, and logs finalized
//! SQL at `debug` level.

use crate::client::{ExecResult, Executor, Queryer, Rows};
use crate::dialect::Dialect;
use crate::error::{DbError, DbResult};
use crate::mapping::{InsertPlan, Model};
use crate::row::{FromRow, Row};
use crate::value::{FromValue, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Execute a statement, wrapping client failures with the SQL text.
pub async fn execute<E: Executor + ?Sized>(
    exec: &E,
    sql: &str,
    args: &[Value],
) -> DbResult<ExecResult> {
    debug!(sql, args = args.len(), "execute");
    exec.execute(sql, args)
        .await
        .map_err(|e| e.with_statement(sql))
}

/// Insert a model instance into `table`.
///
/// Builds the insert plan from the model's mapping, executes it, and when
/// the mapping has an auto-generated column and the client reports a
/// last-inserted key, writes that key back into the model.
pub async fn insert<T: Model, E: Executor + ?Sized>(
    exec: &E,
    model: &mut T,
    table: &str,
    dialect: Dialect,
) -> DbResult<ExecResult> {
    let plan = InsertPlan::build::<T>(table, dialect)?;
    let args = model.values();
    let result = execute(exec, plan.sql(), &args).await?;
    if T::mapping().auto_column().is_some() {
        if let Some(key) = result.last_insert_id {
            model.set_auto_key(key);
        }
    }
    Ok(result)
}

/// Drain a cursor into its column header plus owned rows, closing it on
/// every path. The header comes from the cursor, so it survives a zero-row
/// result.
async fn drain(mut rows: Box<dyn Rows>) -> DbResult<(Arc<[String]>, Vec<Row>)> {
    let columns: Arc<[String]> = rows.columns().to_vec().into();
    let mut out = Vec::new();
    loop {
        match rows.next_row().await {
            Ok(Some(values)) => out.push(Row::new(columns.clone(), values)),
            Ok(None) => break,
            Err(err) => {
                let _ = rows.close().await;
                return Err(err);
            }
        }
    }
    rows.close().await?;
    Ok((columns, out))
}

/// Run a query and materialize all rows.
pub async fn query_rows<Q: Queryer + ?Sized>(
    queryer: &Q,
    sql: &str,
    args: &[Value],
) -> DbResult<Vec<Row>> {
    let (_, rows) = query_rows_with_titles(queryer, sql, args).await?;
    Ok(rows)
}

async fn query_rows_with_titles<Q: Queryer + ?Sized>(
    queryer: &Q,
    sql: &str,
    args: &[Value],
) -> DbResult<(Arc<[String]>, Vec<Row>)> {
    debug!(sql, args = args.len(), "query");
    let rows = queryer
        .query(sql, args)
        .await
        .map_err(|e| e.with_statement(sql))?;
    drain(rows).await.map_err(|e| e.with_statement(sql))
}

/// Run a query and decode every row into `T`.
///
/// Zero rows yield an empty vec, never an error.
pub async fn query_all_as<T: FromRow, Q: Queryer + ?Sized>(
    queryer: &Q,
    sql: &str,
    args: &[Value],
) -> DbResult<Vec<T>> {
    let rows = query_rows(queryer, sql, args).await?;
    rows.iter().map(T::from_row).collect()
}

/// Run a query and decode the first row into `T`; not-found on zero rows.
pub async fn query_one_as<T: FromRow, Q: Queryer + ?Sized>(
    queryer: &Q,
    sql: &str,
    args: &[Value],
) -> DbResult<T> {
    let rows = query_rows(queryer, sql, args).await?;
    match rows.first() {
        Some(row) => T::from_row(row),
        None => Err(DbError::not_found("query returned no rows")),
    }
}

/// Run a query and decode the first row into `T`, or `None` on zero rows.
pub async fn query_opt_as<T: FromRow, Q: Queryer + ?Sized>(
    queryer: &Q,
    sql: &str,
    args: &[Value],
) -> DbResult<Option<T>> {
    let rows = query_rows(queryer, sql, args).await?;
    rows.first().map(T::from_row).transpose()
}

/// Run a query and decode the first column of the first row.
pub async fn query_scalar<T: FromValue, Q: Queryer + ?Sized>(
    queryer: &Q,
    sql: &str,
    args: &[Value],
) -> DbResult<T> {
    let rows = query_rows(queryer, sql, args).await?;
    match rows.into_iter().next() {
        Some(row) => row.try_get_index(0),
        None => Err(DbError::not_found("query returned no rows")),
    }
}

/// Run a query and decode the first column of every row.
pub async fn query_scalars<T: FromValue, Q: Queryer + ?Sized>(
    queryer: &Q,
    sql: &str,
    args: &[Value],
) -> DbResult<Vec<T>> {
    let rows = query_rows(queryer, sql, args).await?;
    rows.into_iter().map(|row| row.try_get_index(0)).collect()
}

/// Run a query and return column titles plus rows as ordered value sequences.
pub async fn query_page_rows<Q: Queryer + ?Sized>(
    queryer: &Q,
    sql: &str,
    args: &[Value],
) -> DbResult<(Vec<String>, Vec<Vec<Value>>)> {
    let (titles, rows) = query_rows_with_titles(queryer, sql, args).await?;
    let data = rows.into_iter().map(Row::into_values).collect();
    Ok((titles.to_vec(), data))
}

/// Run a query and return column titles plus rows as name/value maps.
///
/// Column order is preserved by the titles list; every map key is a column
/// title (cells holding SQL NULL decode to [`Value::Null`], never a missing
/// entry).
pub async fn query_page_maps<Q: Queryer + ?Sized>(
    queryer: &Q,
    sql: &str,
    args: &[Value],
) -> DbResult<(Vec<String>, Vec<HashMap<String, Value>>)> {
    let (titles, data) = query_page_rows(queryer, sql, args).await?;
    let maps = data
        .into_iter()
        .map(|values| titles.iter().cloned().zip(values).collect())
        .collect();
    Ok((titles, maps))
}

/// Decode one title row plus cell values without a client round trip.
///
/// Used by callers that already hold a cursor; drains and closes it.
pub async fn scan_all_as<T: FromRow>(rows: Box<dyn Rows>) -> DbResult<Vec<T>> {
    let (_, rows) = drain(rows).await?;
    rows.iter().map(T::from_row).collect()
}

/// Decode the first row of a cursor into `T`; not-found on zero rows.
pub async fn scan_one_as<T: FromRow>(rows: Box<dyn Rows>) -> DbResult<T> {
    let (_, rows) = drain(rows).await?;
    match rows.first() {
        Some(row) => T::from_row(row),
        None => Err(DbError::not_found("cursor returned no rows")),
    }
}
