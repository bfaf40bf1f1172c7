//! Collaborator traits for the underlying database client.
//!
//! The actual network client is external to this crate; it is consumed
//! through the narrow, object-safe traits below so that the registry can
//! hold clients of unknown concrete type and helpers can accept either a
//! direct connection or a transaction.
//!
//! Cancellation is carried by the future: dropping or timing out a call's
//! future is the cancellation signal, so there is no separate
//! context-taking variant of any method.

use crate::error::DbResult;
use crate::value::Value;
use async_trait::async_trait;

/// Result of a statement execution.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecResult {
    /// Rows affected by the statement.
    pub rows_affected: u64,
    /// Database-assigned key for the inserted row, when the client reports one.
    pub last_insert_id: Option<i64>,
}

/// Executable statement sink: SQL text plus ordered arguments in, an
/// execution result out.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, sql: &str, args: &[Value]) -> DbResult<ExecResult>;
}

/// Queryable sink: SQL text plus ordered arguments in, a row cursor out.
#[async_trait]
pub trait Queryer: Send + Sync {
    async fn query(&self, sql: &str, args: &[Value]) -> DbResult<Box<dyn Rows>>;
}

/// A result-row cursor.
///
/// Must be released with [`Rows::close`]; the decode helpers in
/// [`query`](crate::query) do so on every path, including errors.
#[async_trait]
pub trait Rows: Send {
    /// Column titles, in result order.
    fn columns(&self) -> &[String];

    /// Fetch the next row's cells in column order, or `None` at end of data.
    async fn next_row(&mut self) -> DbResult<Option<Vec<Value>>>;

    /// Release the cursor.
    async fn close(&mut self) -> DbResult<()>;
}

/// An open transaction. Consuming `commit`/`rollback` end it.
#[async_trait]
pub trait TxHandle: Executor + Queryer {
    async fn commit(self: Box<Self>) -> DbResult<()>;
    async fn rollback(self: Box<Self>) -> DbResult<()>;
}

/// A full client connection: executable, queryable, transactional, closable.
#[async_trait]
pub trait DbClient: Executor + Queryer {
    /// Begin a transaction on this connection.
    async fn begin(&self) -> DbResult<Box<dyn TxHandle + '_>>;

    /// Close the underlying connection.
    ///
    /// Closing twice surfaces the client's own behavior; the registry wrapper
    /// guarantees idempotence above this.
    async fn close(&self) -> DbResult<()>;
}
