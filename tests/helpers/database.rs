//! In-memory database setup for integration tests.

use sqlx::SqlitePool;

use issuepilot::adapters::sqlite::{all_migrations, create_test_pool, Migrator};

/// Create an in-memory SQLite pool with all migrations applied.
pub async fn setup_test_db() -> SqlitePool {
    let pool = create_test_pool().await.expect("failed to create test pool");
    Migrator::new(pool.clone())
        .run_embedded_migrations(all_migrations())
        .await
        .expect("failed to run migrations");
    pool
}

pub async fn teardown_test_db(pool: SqlitePool) {
    pool.close().await;
}
