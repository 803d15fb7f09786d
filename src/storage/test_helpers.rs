//! Shared test helpers for storage-backed tests.

#[cfg(test)]
use sqlx::sqlite::SqlitePoolOptions;
#[cfg(test)]
use sqlx::SqlitePool;

#[cfg(test)]
use crate::storage::run_migrations;

/// Creates a test database pool with migrations applied.
/// Uses an in-memory database for fast test execution.
#[cfg(test)]
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// Inserts a user directly and returns its id.
#[cfg(test)]
pub async fn create_test_user(pool: &SqlitePool, email: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO users (name, email, role, created_at) VALUES (?, ?, 'student', ?) RETURNING id",
    )
    .bind("Test User")
    .bind(email)
    .bind(chrono::Utc::now())
    .fetch_one(pool)
    .await
    .expect("Failed to insert test user")
}
