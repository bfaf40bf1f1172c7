//! Transaction commit/rollback helpers.
//!
//! The protocol is fixed and two-outcome: run the unit of work; on its
//! failure roll back and return the unit's error; on its success commit
//! and return any commit error. There is no retry. A rollback failure is
//! logged at `error` level (the connection may be unusable) but never
//! overrides the unit-of-work error that triggered it.

use crate::client::TxHandle;
use crate::error::{DbError, DbResult};
use futures_core::future::BoxFuture;
use tracing::error;

/// Run `work` against an open transaction, then commit or roll back.
///
/// # Example
///
/// ```ignore
/// let tx = conn.begin().await?;
/// let moved = dbmap::commit(tx, |tx| Box::pin(async move {
///     execute(tx, "UPDATE accounts SET balance = balance - ? WHERE id = ?",
///             &[Value::Int(100), Value::Int(1)]).await?;
///     Ok(1_u64)
/// })).await?;
/// ```
pub async fn commit<'a, T, F>(tx: Box<dyn TxHandle + 'a>, work: F) -> DbResult<T>
where
    F: for<'b> FnOnce(&'b (dyn TxHandle + 'a)) -> BoxFuture<'b, DbResult<T>>,
{
    match work(tx.as_ref()).await {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(unit_err) => {
            if let Err(rollback_err) = tx.rollback().await {
                log_rollback_failure(&rollback_err);
            }
            Err(unit_err)
        }
    }
}

/// Runs the given block inside a transaction begun on `$client`.
///
/// - Begins via `$client.begin().await`.
/// - Commits on `Ok(_)`, propagating any commit error.
/// - Rolls back on `Err(_)` and returns the block's error; a rollback
///   failure is logged, not returned.
///
/// The block must evaluate to `dbmap::DbResult<T>`.
///
/// # Example
///
/// ```ignore
/// let conn = Registry::global().get("main").await?;
/// dbmap::transaction!(&conn, tx, {
///     dbmap::query::execute(&*tx, "DELETE FROM sessions WHERE user_id = ?",
///                           &[dbmap::Value::Int(9)]).await?;
///     Ok(())
/// })?;
/// ```
#[macro_export]
macro_rules! transaction {
    ($client:expr, $tx:ident, $body:block) => {{
        let $tx = ($client).begin().await?;
        let __dbmap_tx_body_result: $crate::DbResult<_> = async { $body }.await;
        match __dbmap_tx_body_result {
            Ok(value) => {
                $crate::TxHandle::commit($tx).await?;
                $crate::DbResult::Ok(value)
            }
            Err(error) => {
                if let Err(rollback_err) = $crate::TxHandle::rollback($tx).await {
                    $crate::transaction::log_rollback_failure(&rollback_err);
                }
                Err(error)
            }
        }
    }};
}

/// Surface a rollback failure as a high-severity observability event.
///
/// Used by [`commit`] and the [`transaction!`] macro; a failed rollback
/// means the underlying connection may be unusable.
pub fn log_rollback_failure(err: &DbError) {
    error!(error = %err, "transaction rollback failed");
}
