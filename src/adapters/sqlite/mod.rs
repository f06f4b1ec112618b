//! SQLite adapter: connection pool, migrations, and the issue
//! repository implementation.

pub mod connection;
pub mod issue_repository;
pub mod migrations;

pub use connection::{create_pool, create_test_pool, verify_connection, PoolConfig};
pub use issue_repository::SqliteIssueRepository;
pub use migrations::{all_migrations, Migration, Migrator};
