//! BookNest: personal library and reading tracker REST backend.

pub mod cover;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod settings;
pub mod sql;
pub mod state;
pub mod store;
pub mod tenant;
pub mod validation;

pub use db::{ensure_database_exists, ensure_schema, ConnectionPool};
pub use error::{AppError, ConfigError};
pub use extractors::OWNER_ID_HEADER;
pub use response::{success_many, success_one, success_one_ok, ApiResponse, ErrorDetail};
pub use routes::{api_routes, app, common_routes_with_ready};
pub use settings::AppConfig;
pub use state::AppState;
pub use store::{LibraryStore, MemoryStore, PgStore};
