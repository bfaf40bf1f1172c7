//! # dbmap
//!
//! A lightweight, dialect-portable data-mapping layer between application
//! structs and an external SQL client.
//!
//! ## Features
//!
//! - **Mapped inserts**: `#[derive(Model)]` generates an ordered column
//!   mapping table once per type; `insert()` renders the column list and
//!   placeholder run for the target dialect and writes the
//!   database-assigned key back into the auto field
//! - **Row decoding**: Row → Struct via the `FromRow` trait, slices decode
//!   to empty (never missing) collections, page decoding without a target
//!   struct returns titles plus rows
//! - **Fragment builder**: compose SQL incrementally with generic `?`
//!   placeholders; finalization rewrites them per dialect (`$N`, `:N`,
//!   `@pN`) in one pure pass, and `clone()` derives independent builders
//!   from a shared prefix
//! - **Connection registry**: process-wide named cache of boxed clients
//!   with lazy materialization from a configuration source,
//!   remove-on-close by identity, and a close-all sweep
//! - **Transactions**: a fixed two-outcome commit helper and the
//!   [`transaction!`] macro
//!
//! ## Example
//!
//! ```ignore
//! use dbmap::{Dialect, Model, FromRow, Registry, SqlBuilder};
//!
//! #[derive(Model, FromRow)]
//! struct User {
//!     #[orm(auto)]
//!     id: i64,
//!     username: String,
//!     email: Option<String>,
//! }
//!
//! let conn = Registry::global().get("main").await?;
//!
//! let mut user = User { id: 0, username: "alice".into(), email: None };
//! dbmap::query::insert(&conn, &mut user, "users", conn.dialect()).await?;
//!
//! let mut q = conn.builder();
//! q.select_model::<User>()?;
//! q.add("FROM users");
//! q.add_args("WHERE username = ?", ("alice",));
//! let found: Vec<User> = q.fetch_all_as(&conn).await?;
//! ```

pub mod builder;
pub mod client;
pub mod config;
pub mod dialect;
pub mod error;
pub mod mapping;
pub mod query;
pub mod registry;
pub mod row;
pub mod transaction;
pub mod value;

pub use builder::{PageQuery, SqlBuilder};
pub use client::{DbClient, ExecResult, Executor, Queryer, Rows, TxHandle};
pub use config::{ConfigSource, ConnectSpec, Connector};
pub use dialect::Dialect;
pub use error::{DbError, DbResult};
pub use mapping::{Column, FieldMapping, InsertPlan, Model};
pub use query::insert;
pub use registry::{Connection, Registry};
pub use row::{FromRow, Row};
pub use transaction::commit;
pub use value::{FromValue, IntoArgs, ToValue, Value};

#[cfg(feature = "derive")]
pub use dbmap_derive::{FromRow, Model};
