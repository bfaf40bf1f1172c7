mod support;

use async_trait::async_trait;
use dbmap::{
    ConfigSource, ConnectSpec, Connector, DbClient, DbError, DbResult, Dialect, Registry, Value,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use support::MockClient;

struct OneSection {
    name: &'static str,
    driver: &'static str,
}

impl ConfigSource for OneSection {
    fn section(&self, name: &str) -> DbResult<ConnectSpec> {
        if name == self.name {
            Ok(ConnectSpec::new(self.driver, "host=localhost"))
        } else {
            Err(DbError::config(name, "no such section"))
        }
    }
}

struct CountingConnector {
    template: MockClient,
    connects: Arc<AtomicUsize>,
}

#[async_trait]
impl Connector for CountingConnector {
    async fn connect(&self, _spec: &ConnectSpec) -> DbResult<Box<dyn DbClient>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.template.clone()))
    }
}

#[tokio::test]
async fn register_rejects_duplicate_names() {
    let registry = Registry::new();
    registry
        .register("main", Box::new(MockClient::new()), Dialect::MySql)
        .unwrap();

    let err = registry
        .register("main", Box::new(MockClient::new()), Dialect::Postgres)
        .unwrap_err();
    assert!(matches!(err, DbError::DuplicateName(name) if name == "main"));
    assert_eq!(registry.len(), 1);
}

#[tokio::test]
async fn get_without_a_source_is_not_found() {
    let registry = Registry::new();
    let err = registry.get("absent").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn close_removes_the_entry_and_frees_the_name() {
    let client = MockClient::new();
    let registry = Registry::new();
    let conn = registry
        .register("main", Box::new(client.clone()), Dialect::Sqlite)
        .unwrap();

    conn.close().await.unwrap();
    assert!(conn.is_closed());
    assert_eq!(client.closes(), 1);
    assert!(registry.is_empty());

    // A lookup after close is not-found.
    let err = registry.get("main").await.unwrap_err();
    assert!(err.is_not_found());

    // A second close is a no-op.
    conn.close().await.unwrap();
    assert_eq!(client.closes(), 1);

    // A closed handle refuses further statements.
    let err = dbmap::query::execute(&conn, "SELECT 1", &[]).await.unwrap_err();
    assert!(matches!(err, DbError::Execute { .. }));

    // The name is free again.
    registry
        .register("main", Box::new(MockClient::new()), Dialect::Sqlite)
        .unwrap();
}

#[tokio::test]
async fn clones_share_the_closed_state() {
    let registry = Registry::new();
    let conn = registry
        .register("main", Box::new(MockClient::new()), Dialect::MySql)
        .unwrap();
    let other = conn.clone();

    conn.close().await.unwrap();
    assert!(other.is_closed());

    let shown = format!("{other:?}");
    assert!(shown.contains("Connection"));
    assert!(shown.contains("closed: true"));
}

#[tokio::test]
async fn close_all_sweeps_every_entry() {
    let a = MockClient::new();
    let b = MockClient::new();
    let registry = Registry::new();
    registry
        .register("a", Box::new(a.clone()), Dialect::MySql)
        .unwrap();
    registry
        .register("b", Box::new(b.clone()), Dialect::Postgres)
        .unwrap();

    registry.close_all().await;
    assert!(registry.is_empty());
    assert_eq!(a.closes(), 1);
    assert_eq!(b.closes(), 1);

    assert!(registry.get("a").await.unwrap_err().is_not_found());
    assert!(registry.get("b").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn lazy_source_materializes_once_per_name() {
    let template = MockClient::new();
    template.push_rows(&["one"], vec![vec![Value::Int(1)]]);
    let connects = Arc::new(AtomicUsize::new(0));
    let registry = Registry::with_source(
        OneSection {
            name: "main",
            driver: "postgres",
        },
        CountingConnector {
            template,
            connects: connects.clone(),
        },
    );

    let conn = registry.get("main").await.unwrap();
    assert_eq!(conn.dialect(), Dialect::Postgres);
    assert_eq!(connects.load(Ordering::SeqCst), 1);

    // Second lookup hits the cache.
    let again = registry.get("main").await.unwrap();
    assert_eq!(connects.load(Ordering::SeqCst), 1);

    let one: i64 = dbmap::query::query_scalar(&again, "SELECT 1", &[])
        .await
        .unwrap();
    assert_eq!(one, 1);
}

#[tokio::test]
async fn lazy_source_resolves_driver_aliases() {
    let registry = Registry::with_source(
        OneSection {
            name: "legacy",
            driver: "oci8",
        },
        CountingConnector {
            template: MockClient::new(),
            connects: Arc::new(AtomicUsize::new(0)),
        },
    );
    let conn = registry.get("legacy").await.unwrap();
    assert_eq!(conn.dialect(), Dialect::Oracle);
}

#[tokio::test]
async fn unknown_section_surfaces_the_source_error() {
    let registry = Registry::with_source(
        OneSection {
            name: "main",
            driver: "mysql",
        },
        CountingConnector {
            template: MockClient::new(),
            connects: Arc::new(AtomicUsize::new(0)),
        },
    );
    let err = registry.get("absent").await.unwrap_err();
    assert!(matches!(err, DbError::Config { section, .. } if section == "absent"));
    assert!(registry.is_empty());
}

#[tokio::test]
async fn unknown_driver_never_registers_an_entry() {
    let registry = Registry::with_source(
        OneSection {
            name: "odd",
            driver: "foxpro",
        },
        CountingConnector {
            template: MockClient::new(),
            connects: Arc::new(AtomicUsize::new(0)),
        },
    );
    let err = registry.get("odd").await.unwrap_err();
    assert!(matches!(err, DbError::Config { .. }));
    assert!(registry.is_empty());
}
