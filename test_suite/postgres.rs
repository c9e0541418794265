//! PostgreSQL-backed department store tests
//!
//! These tests need a running PostgreSQL server and are ignored by default.
//! Run them with `cargo test -- --ignored`.
//!
//! The server is read from `TEST_DATABASE_HOST`, `TEST_DATABASE_PORT`,
//! `TEST_DATABASE_USER` and `TEST_DATABASE_PASSWORD` (defaults: `localhost`,
//! `5432`, `postgres`, `postgres`). Each test creates its own database named
//! `test_department_db_<uuid>`, where `<uuid>` is the UUID with hyphens
//! replaced by underscores.
use secrecy::SecretString;
use sqlx::{Connection as _, Executor as _, PgConnection, PgPool};

use app::create_pg_pool;
use domain::{
    DomainErrorKind,
    models::DepartmentId,
    repositories::{DepartmentInput, DepartmentRepository},
};
use infra::postgres::repositories::PgDepartmentRepository;
use settings::DatabaseSettings;

use crate::helpers::init_tracing;

const TEST_DATABASE_PREFIX: &str = "test_department_db_";

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| String::from(default))
}

fn database_settings_for_testing() -> DatabaseSettings {
    let name = format!("{}{}", TEST_DATABASE_PREFIX, uuid::Uuid::new_v4()).replace('-', "_");
    DatabaseSettings {
        host: env_or("TEST_DATABASE_HOST", "localhost"),
        port: env_or("TEST_DATABASE_PORT", "5432").parse().unwrap(),
        user: env_or("TEST_DATABASE_USER", "postgres"),
        password: SecretString::from(env_or("TEST_DATABASE_PASSWORD", "postgres")),
        name,
        max_connections: 2,
        connection_timeout: 5,
    }
}

/// Creates the test database and returns a migrated connection pool
async fn setup_database() -> PgPool {
    init_tracing();
    let settings = database_settings_for_testing();

    // Connect to the **postgres** database
    let postgres_settings = DatabaseSettings {
        name: String::from("postgres"),
        ..settings.clone()
    };
    let mut conn = PgConnection::connect_with(&postgres_settings.connect_options())
        .await
        .unwrap();

    // Create the test database
    conn.execute(format!("CREATE DATABASE {};", settings.name).as_str())
        .await
        .unwrap();

    create_pg_pool(&settings).await.unwrap()
}

fn input(id: Option<i64>, name: &str) -> DepartmentInput {
    DepartmentInput {
        id: id.map(DepartmentId),
        name: name.to_string(),
    }
}

#[tokio::test]
#[ignore = "requires a PostgreSQL server"]
async fn supplied_id_is_kept_and_serial_continues_after_it() {
    let repo = PgDepartmentRepository::new(setup_database().await);

    let supplied = repo.create(input(Some(10), "Engineering")).await.unwrap();
    let assigned = repo.create(input(None, "Sales")).await.unwrap();

    assert_eq!(supplied.id, DepartmentId(10));
    assert_eq!(supplied.name, "Engineering");
    assert_eq!(assigned.id, DepartmentId(11));
    assert_eq!(
        repo.by_id(DepartmentId(11)).await.unwrap().map(|d| d.name),
        Some(String::from("Sales"))
    );
}

#[tokio::test]
#[ignore = "requires a PostgreSQL server"]
async fn duplicated_id_is_a_validation_error() {
    let repo = PgDepartmentRepository::new(setup_database().await);
    repo.create(input(Some(1), "Engineering")).await.unwrap();

    let error = repo.create(input(Some(1), "Sales")).await.unwrap_err();

    assert_eq!(error.kind, DomainErrorKind::Validation);
    assert!(error.messages[0].contains("Department 1 already exists"));
    assert_eq!(repo.list().await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL server"]
async fn list_is_ordered_by_id() {
    let repo = PgDepartmentRepository::new(setup_database().await);
    repo.create(input(Some(5), "Sales")).await.unwrap();
    repo.create(input(Some(2), "Engineering")).await.unwrap();
    repo.create(input(None, "Finance")).await.unwrap();

    let departments = repo.list().await.unwrap();

    let ids = departments.iter().map(|d| d.id.0).collect::<Vec<_>>();
    assert_eq!(ids, vec![2, 5, 6]);
    assert!(departments.iter().all(|d| d.employees.is_empty()));
    assert_eq!(repo.by_id(DepartmentId(99)).await.unwrap(), None);
}
