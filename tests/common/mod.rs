//! Common test utilities

#![allow(dead_code)]

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Connect to the test database.
///
/// Returns `None` when `DATABASE_URL` is unset or the schema has not been
/// migrated, so the PostgreSQL tests are skipped on machines without a
/// database. Tests never truncate: each one works under a fresh tenant id.
pub async fn setup_test_db() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").ok()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    if !numbering_ledger::db::check_schema(&pool)
        .await
        .expect("Failed to inspect schema")
    {
        eprintln!("skipping: run migrations/0001_init.sql first");
        return None;
    }

    Some(pool)
}
