mod support;

use dbmap::{DbError, Dialect, FromRow, Model, Value};
use support::MockClient;

#[derive(Debug, Model, FromRow)]
struct User {
    #[orm(auto)]
    id: i64,
    username: String,
    #[orm(column = "email_address")]
    email: Option<String>,
    #[orm(skip)]
    display_cache: String,
}

#[derive(Debug, Model)]
struct Audit {
    created_by: String,
    created_at: i64,
}

#[derive(Debug, Model)]
struct Event {
    #[orm(auto)]
    id: i64,
    kind: String,
    #[orm(flatten)]
    audit: Audit,
}

fn sample_user() -> User {
    User {
        id: 0,
        username: "alice".to_string(),
        email: Some("alice@example.com".to_string()),
        display_cache: String::new(),
    }
}

#[tokio::test]
async fn insert_renders_mapping_and_writes_back_the_key() {
    let client = MockClient::new();
    client.set_last_insert_id(41);

    let mut user = sample_user();
    let result = dbmap::query::insert(&client, &mut user, "users", Dialect::MySql)
        .await
        .unwrap();

    assert_eq!(result.rows_affected, 1);
    assert_eq!(user.id, 41);

    let statements = client.statements();
    assert_eq!(statements.len(), 1);
    assert_eq!(
        statements[0].0,
        "INSERT INTO users (`username`, `email_address`) VALUES (?,?)"
    );
    assert_eq!(
        statements[0].1,
        vec![
            Value::Text("alice".to_string()),
            Value::Text("alice@example.com".to_string()),
        ]
    );
}

#[tokio::test]
async fn insert_uses_numbered_placeholders_on_postgres() {
    let client = MockClient::new();
    let mut user = sample_user();
    dbmap::query::insert(&client, &mut user, "users", Dialect::Postgres)
        .await
        .unwrap();

    assert_eq!(
        client.statements()[0].0,
        "INSERT INTO users (\"username\", \"email_address\") VALUES ($1,$2)"
    );
}

#[tokio::test]
async fn insert_without_generated_key_leaves_the_auto_field_alone() {
    let client = MockClient::new();
    let mut user = sample_user();
    dbmap::query::insert(&client, &mut user, "users", Dialect::Sqlite)
        .await
        .unwrap();
    assert_eq!(user.id, 0);
}

#[tokio::test]
async fn flattened_columns_splice_in_declaration_order() {
    let client = MockClient::new();
    client.set_last_insert_id(7);

    let mut event = Event {
        id: 0,
        kind: "login".to_string(),
        audit: Audit {
            created_by: "system".to_string(),
            created_at: 1_700_000_000,
        },
    };
    dbmap::query::insert(&client, &mut event, "events", Dialect::MySql)
        .await
        .unwrap();

    assert_eq!(event.id, 7);
    let statements = client.statements();
    assert_eq!(
        statements[0].0,
        "INSERT INTO events (`kind`, `created_by`, `created_at`) VALUES (?,?,?)"
    );
    assert_eq!(
        statements[0].1,
        vec![
            Value::Text("login".to_string()),
            Value::Text("system".to_string()),
            Value::Int(1_700_000_000),
        ]
    );
}

#[derive(Debug, Model)]
struct Keyed {
    #[orm(auto)]
    seq: i64,
    label: String,
}

#[derive(Debug, Model)]
struct DoublyKeyed {
    #[orm(auto)]
    id: i64,
    #[orm(flatten)]
    inner: Keyed,
}

#[tokio::test]
async fn two_auto_columns_via_flatten_is_a_usage_error() {
    let client = MockClient::new();
    let mut model = DoublyKeyed {
        id: 0,
        inner: Keyed {
            seq: 0,
            label: "x".to_string(),
        },
    };
    let err = dbmap::query::insert(&client, &mut model, "t", Dialect::MySql)
        .await
        .unwrap_err();
    assert!(err.is_usage());
    assert!(client.statements().is_empty());
}

#[tokio::test]
async fn execute_failure_carries_the_statement_text() {
    let client = MockClient::new();
    client.fail_next_execute("duplicate key");

    let mut user = sample_user();
    let err = dbmap::query::insert(&client, &mut user, "users", Dialect::MySql)
        .await
        .unwrap_err();
    match err {
        DbError::Execute { sql, message } => {
            assert!(sql.starts_with("INSERT INTO users"));
            assert_eq!(message, "duplicate key");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(user.id, 0);
}
