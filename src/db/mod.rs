//! PostgreSQL connection management and DDL bootstrapping.

pub mod pool;
pub mod schema;

pub use pool::ConnectionPool;
pub use schema::{ensure_database_exists, ensure_schema};
