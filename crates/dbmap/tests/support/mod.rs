//! In-memory client double used by the integration tests.
//!
//! Records every statement it receives and serves canned row sets in FIFO
//! order. Failure injection flags cover the execute, commit and rollback
//! paths.

#![allow(dead_code)]

use async_trait::async_trait;
use dbmap::{DbClient, DbError, DbResult, ExecResult, Executor, Queryer, Rows, TxHandle, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct MockState {
    statements: Vec<(String, Vec<Value>)>,
    canned: VecDeque<(Vec<String>, Vec<Vec<Value>>)>,
    last_insert_id: Option<i64>,
    fail_execute: Option<String>,
    fail_commit: bool,
    fail_rollback: bool,
    commits: usize,
    rollbacks: usize,
    closes: usize,
}

/// Shared-state client double. Clones observe the same recorded history.
#[derive(Clone, Default)]
pub struct MockClient {
    state: Arc<Mutex<MockState>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queue one result set for the next query.
    pub fn push_rows(&self, columns: &[&str], rows: Vec<Vec<Value>>) {
        let columns = columns.iter().map(|c| c.to_string()).collect();
        self.lock().canned.push_back((columns, rows));
    }

    /// Report `id` as the generated key of subsequent executes.
    pub fn set_last_insert_id(&self, id: i64) {
        self.lock().last_insert_id = Some(id);
    }

    /// Make the next execute fail with a client error.
    pub fn fail_next_execute(&self, message: &str) {
        self.lock().fail_execute = Some(message.to_string());
    }

    pub fn fail_commit(&self) {
        self.lock().fail_commit = true;
    }

    pub fn fail_rollback(&self) {
        self.lock().fail_rollback = true;
    }

    /// Every statement seen so far, in call order.
    pub fn statements(&self) -> Vec<(String, Vec<Value>)> {
        self.lock().statements.clone()
    }

    pub fn commits(&self) -> usize {
        self.lock().commits
    }

    pub fn rollbacks(&self) -> usize {
        self.lock().rollbacks
    }

    pub fn closes(&self) -> usize {
        self.lock().closes
    }

    fn record_execute(&self, sql: &str, args: &[Value]) -> DbResult<ExecResult> {
        let mut state = self.lock();
        state.statements.push((sql.to_string(), args.to_vec()));
        if let Some(message) = state.fail_execute.take() {
            return Err(DbError::client(message));
        }
        Ok(ExecResult {
            rows_affected: 1,
            last_insert_id: state.last_insert_id,
        })
    }

    fn record_query(&self, sql: &str, args: &[Value]) -> DbResult<Box<dyn Rows>> {
        let mut state = self.lock();
        state.statements.push((sql.to_string(), args.to_vec()));
        let (columns, rows) = state.canned.pop_front().unwrap_or_default();
        Ok(Box::new(MockRows {
            columns,
            rows: rows.into(),
        }))
    }
}

#[async_trait]
impl Executor for MockClient {
    async fn execute(&self, sql: &str, args: &[Value]) -> DbResult<ExecResult> {
        self.record_execute(sql, args)
    }
}

#[async_trait]
impl Queryer for MockClient {
    async fn query(&self, sql: &str, args: &[Value]) -> DbResult<Box<dyn Rows>> {
        self.record_query(sql, args)
    }
}

#[async_trait]
impl DbClient for MockClient {
    async fn begin(&self) -> DbResult<Box<dyn TxHandle + '_>> {
        Ok(Box::new(MockTx {
            client: self.clone(),
        }))
    }

    async fn close(&self) -> DbResult<()> {
        self.lock().closes += 1;
        Ok(())
    }
}

/// A standalone cursor, for helpers that take `Box<dyn Rows>` directly.
pub fn canned_rows(columns: &[&str], rows: Vec<Vec<Value>>) -> Box<dyn Rows> {
    Box::new(MockRows {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        rows: rows.into(),
    })
}

struct MockRows {
    columns: Vec<String>,
    rows: VecDeque<Vec<Value>>,
}

#[async_trait]
impl Rows for MockRows {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    async fn next_row(&mut self) -> DbResult<Option<Vec<Value>>> {
        Ok(self.rows.pop_front())
    }

    async fn close(&mut self) -> DbResult<()> {
        Ok(())
    }
}

struct MockTx {
    client: MockClient,
}

#[async_trait]
impl Executor for MockTx {
    async fn execute(&self, sql: &str, args: &[Value]) -> DbResult<ExecResult> {
        self.client.record_execute(sql, args)
    }
}

#[async_trait]
impl Queryer for MockTx {
    async fn query(&self, sql: &str, args: &[Value]) -> DbResult<Box<dyn Rows>> {
        self.client.record_query(sql, args)
    }
}

#[async_trait]
impl TxHandle for MockTx {
    async fn commit(self: Box<Self>) -> DbResult<()> {
        let mut state = self.client.lock();
        if state.fail_commit {
            return Err(DbError::client("commit refused"));
        }
        state.commits += 1;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> DbResult<()> {
        let mut state = self.client.lock();
        if state.fail_rollback {
            return Err(DbError::client("rollback refused"));
        }
        state.rollbacks += 1;
        Ok(())
    }
}
