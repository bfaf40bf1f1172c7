//! Process-wide named cache of open connections.
//!
//! All registry operations go through one coarse mutex over the name map;
//! the lock is held only for map access. Lazy materialization from a
//! configuration source happens outside the lock and re-checks the map
//! before inserting, so a failed materialization never leaves a
//! half-registered entry.

use crate::client::{DbClient, ExecResult, Executor, Queryer, Rows, TxHandle};
use crate::config::{ConfigSource, Connector};
use crate::dialect::Dialect;
use crate::error::{DbError, DbResult};
use crate::value::Value;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, Weak};
use tracing::warn;

struct RegistryInner {
    entries: Mutex<HashMap<String, Connection>>,
    lazy: Option<(Box<dyn ConfigSource>, Box<dyn Connector>)>,
}

/// Named registry of open connections.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create an empty registry with no lazy source.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                entries: Mutex::new(HashMap::new()),
                lazy: None,
            }),
        }
    }

    /// Create a registry that materializes missing entries from `source`
    /// via `connector` on first lookup.
    pub fn with_source(
        source: impl ConfigSource + 'static,
        connector: impl Connector + 'static,
    ) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                entries: Mutex::new(HashMap::new()),
                lazy: Some((Box::new(source), Box::new(connector))),
            }),
        }
    }

    /// The process-wide default registry (no lazy source).
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::new)
    }

    /// Register a connection under `name`.
    ///
    /// Re-registration of an in-use name is a usage error, never a silent
    /// replacement.
    pub fn register(
        &self,
        name: &str,
        client: Box<dyn DbClient>,
        dialect: Dialect,
    ) -> DbResult<Connection> {
        let mut entries = self.lock_entries();
        if entries.contains_key(name) {
            return Err(DbError::DuplicateName(name.to_string()));
        }
        let conn = self.new_connection(client, dialect);
        entries.insert(name.to_string(), conn.clone());
        Ok(conn)
    }

    /// Look up the connection registered under `name`.
    ///
    /// When absent and a lazy source is installed, materializes a new
    /// connection from the section called `name`, registers it and returns
    /// it. Absent entry with no source is a not-found error.
    pub async fn get(&self, name: &str) -> DbResult<Connection> {
        if let Some(conn) = self.lock_entries().get(name).cloned() {
            return Ok(conn);
        }
        let Some((source, connector)) = self.inner.lazy.as_ref() else {
            return Err(DbError::not_found(format!("connection '{name}'")));
        };

        let spec = source.section(name)?;
        let dialect = spec.dialect(name)?;
        // Connect outside the lock; another caller may materialize the same
        // section concurrently, so re-check before inserting.
        let client = connector.connect(&spec).await?;

        let mut entries = self.lock_entries();
        if let Some(existing) = entries.get(name).cloned() {
            drop(entries);
            if let Err(err) = client.close().await {
                warn!(name, error = %err, "closing redundant materialized connection failed");
            }
            return Ok(existing);
        }
        let conn = self.new_connection(client, dialect);
        entries.insert(name.to_string(), conn.clone());
        Ok(conn)
    }

    /// Close and remove every entry.
    ///
    /// Close failures are logged and do not stop the sweep.
    pub async fn close_all(&self) {
        let drained: Vec<(String, Connection)> = self.lock_entries().drain().collect();
        for (name, conn) in drained {
            if let Err(err) = conn.close().await {
                warn!(name, error = %err, "closing registered connection failed");
            }
        }
    }

    /// Number of registered connections.
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_entries().is_empty()
    }

    fn new_connection(&self, client: Box<dyn DbClient>, dialect: Dialect) -> Connection {
        Connection {
            inner: Arc::new(ConnectionInner {
                client,
                dialect,
                registry: Arc::downgrade(&self.inner),
                closed: AtomicBool::new(false),
            }),
        }
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, Connection>> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

struct ConnectionInner {
    client: Box<dyn DbClient>,
    dialect: Dialect,
    registry: Weak<RegistryInner>,
    closed: AtomicBool,
}

/// A registered connection handle: the boxed client plus its dialect tag.
///
/// Cheap to clone; all clones share the open/closed state.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<ConnectionInner>,
}

// The boxed client rules out a derived impl.
impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("dialect", &self.inner.dialect)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl Connection {
    pub fn dialect(&self) -> Dialect {
        self.inner.dialect
    }

    /// A fragment builder preset with this connection's dialect.
    pub fn builder(&self) -> crate::SqlBuilder {
        crate::SqlBuilder::new(self.inner.dialect)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Begin a transaction on the underlying client.
    pub async fn begin(&self) -> DbResult<Box<dyn TxHandle + '_>> {
        self.ensure_open()?;
        self.inner.client.begin().await
    }

    /// Close this connection.
    ///
    /// Removes itself from its registry by identity (not by name), then
    /// closes the underlying client. A second close is a no-op.
    pub async fn close(&self) -> DbResult<()> {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        if let Some(registry) = self.inner.registry.upgrade() {
            let mut entries = registry
                .entries
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            entries.retain(|_, conn| !Arc::ptr_eq(&conn.inner, &self.inner));
        }
        self.inner.client.close().await
    }

    fn ensure_open(&self) -> DbResult<()> {
        if self.is_closed() {
            return Err(DbError::client("connection is closed"));
        }
        Ok(())
    }
}

#[async_trait]
impl Executor for Connection {
    async fn execute(&self, sql: &str, args: &[Value]) -> DbResult<ExecResult> {
        self.ensure_open()?;
        self.inner.client.execute(sql, args).await
    }
}

#[async_trait]
impl Queryer for Connection {
    async fn query(&self, sql: &str, args: &[Value]) -> DbResult<Box<dyn Rows>> {
        self.ensure_open()?;
        self.inner.client.query(sql, args).await
    }
}
