//! Named configuration source for lazy connection materialization.
//!
//! The registry does not parse configuration files itself; it asks a
//! [`ConfigSource`] for a named section and hands the result to a
//! [`Connector`], which owns the actual client construction.

use crate::client::DbClient;
use crate::dialect::Dialect;
use crate::error::{DbError, DbResult};
use async_trait::async_trait;
use std::time::Duration;

/// One named connection section: driver, data source, optional pool tuning.
///
/// Absent optional keys stay `None`; the connector applies its own defaults.
#[derive(Debug, Clone)]
pub struct ConnectSpec {
    pub driver: String,
    pub dsn: String,
    pub max_lifetime: Option<Duration>,
    pub max_idle_time: Option<Duration>,
    pub max_idle_conns: Option<u32>,
    pub max_open_conns: Option<u32>,
}

impl ConnectSpec {
    pub fn new(driver: impl Into<String>, dsn: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            dsn: dsn.into(),
            max_lifetime: None,
            max_idle_time: None,
            max_idle_conns: None,
            max_open_conns: None,
        }
    }

    /// Resolve the driver identifier to a dialect.
    pub fn dialect(&self, section: &str) -> DbResult<Dialect> {
        Dialect::from_driver(&self.driver)
            .ok_or_else(|| DbError::config(section, format!("unknown driver '{}'", self.driver)))
    }
}

/// A source of named connection sections.
pub trait ConfigSource: Send + Sync {
    /// Look up the section called `name`.
    fn section(&self, name: &str) -> DbResult<ConnectSpec>;
}

/// Turns a [`ConnectSpec`] into a live client connection.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, spec: &ConnectSpec) -> DbResult<Box<dyn DbClient>>;
}
