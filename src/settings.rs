//! Process configuration, read once at startup from the environment.
//!
//! `from_lookup` takes any key -> value source so tests never touch process env.

use crate::error::ConfigError;
use crate::model::RatingBounds;
use crate::tenant::TenantSchema;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_COVER_MAX_BYTES: usize = 5 * 1024 * 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    /// In-process store; data is lost on restart.
    Memory,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoverBackend {
    Local { dir: PathBuf },
    S3 { bucket: String, prefix: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoverConfig {
    pub backend: CoverBackend,
    pub max_bytes: usize,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    /// When set, takes precedence over the individual fields.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
    pub ssl_mode: PgSslMode,
    pub max_connections: u32,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .field("ssl_mode", &self.ssl_mode)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        if let Some(url) = &self.url {
            return PgConnectOptions::from_str(url).map_err(|e| ConfigError::Invalid {
                key: "DATABASE_URL",
                message: e.to_string(),
            });
        }
        let mut opts = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.database)
            .ssl_mode(self.ssl_mode);
        if let Some(pw) = &self.password {
            opts = opts.password(pw);
        }
        Ok(opts)
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database: DatabaseConfig,
    pub tenant: TenantSchema,
    pub store: StoreKind,
    pub covers: CoverConfig,
    pub rating: RatingBounds,
}

fn parse<T: FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T::Err: fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(s) => s.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: e.to_string(),
        }),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = parse("BIND_ADDR", get("BIND_ADDR"), SocketAddr::from(([0, 0, 0, 0], 3000)))?;

        let database = DatabaseConfig {
            url: get("DATABASE_URL"),
            host: get("DB_HOST").unwrap_or_else(|| "localhost".into()),
            port: parse("DB_PORT", get("DB_PORT"), 5432u16)?,
            user: get("DB_USER").unwrap_or_else(|| "postgres".into()),
            password: get("DB_PASSWORD"),
            database: get("DB_NAME").unwrap_or_else(|| "booknest".into()),
            ssl_mode: parse("DB_SSL_MODE", get("DB_SSL_MODE"), PgSslMode::Prefer)?,
            max_connections: parse("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"), 5u32)?,
        };

        let project_id = get("PROJECT_ID").ok_or(ConfigError::Missing("PROJECT_ID"))?;
        let tenant = TenantSchema::for_project(&project_id)?;

        let store = match get("STORE").as_deref().map(str::to_lowercase).as_deref() {
            None | Some("postgres") => StoreKind::Postgres,
            Some("memory") => StoreKind::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "STORE",
                    message: format!("expected postgres or memory, got {}", other),
                })
            }
        };

        let backend = match get("COVER_STORE").as_deref().map(str::to_lowercase).as_deref() {
            None | Some("local") => CoverBackend::Local {
                dir: PathBuf::from(get("COVER_DIR").unwrap_or_else(|| "covers".into())),
            },
            Some("s3") => CoverBackend::S3 {
                bucket: get("COVER_BUCKET").ok_or(ConfigError::Missing("COVER_BUCKET"))?,
                prefix: get("COVER_PREFIX").unwrap_or_else(|| "covers".into()),
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "COVER_STORE",
                    message: format!("expected local or s3, got {}", other),
                })
            }
        };
        let covers = CoverConfig {
            backend,
            max_bytes: parse("COVER_MAX_BYTES", get("COVER_MAX_BYTES"), DEFAULT_COVER_MAX_BYTES)?,
        };

        let defaults = RatingBounds::default();
        let rating = RatingBounds {
            min: parse("RATING_MIN", get("RATING_MIN"), defaults.min)?,
            max: parse("RATING_MAX", get("RATING_MAX"), defaults.max)?,
        };
        if rating.min > rating.max {
            return Err(ConfigError::Invalid {
                key: "RATING_MAX",
                message: format!("must be >= RATING_MIN ({})", rating.min),
            });
        }

        Ok(AppConfig {
            bind_addr,
            database,
            tenant,
            store,
            covers,
            rating,
        })
    }
}
