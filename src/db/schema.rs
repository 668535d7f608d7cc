//! Idempotent DDL run at startup: database, tenant schema, library tables.

use crate::error::AppError;
use crate::tenant::{quote_ident, TenantSchema};
use sqlx::postgres::PgConnectOptions;
use sqlx::{ConnectOptions, PgPool};

/// Connects to the `postgres` maintenance database and creates the target
/// database when it does not exist yet.
pub async fn ensure_database_exists(opts: &PgConnectOptions) -> Result<(), AppError> {
    let db_name = match opts.get_database() {
        Some(name) if !name.is_empty() && name != "postgres" => name.to_string(),
        _ => return Ok(()),
    };
    let mut conn = opts.clone().database("postgres").connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
        tracing::info!(database = %db_name, "database created");
    }
    Ok(())
}

fn table_ddl(schema: &TenantSchema) -> Vec<String> {
    let books = schema.qualified("books");
    let shelves = schema.qualified("shelves");
    let reviews = schema.qualified("reviews");
    let goals = schema.qualified("goals");
    vec![
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {books} (
                id UUID PRIMARY KEY,
                owner_id TEXT NOT NULL,
                title TEXT NOT NULL,
                author TEXT NOT NULL,
                year INTEGER NOT NULL,
                genre TEXT NOT NULL,
                page_count INTEGER NOT NULL CHECK (page_count > 0),
                isbn TEXT,
                synopsis TEXT,
                cover TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {shelves} (
                id UUID PRIMARY KEY,
                owner_id TEXT NOT NULL,
                book_id UUID NOT NULL REFERENCES {books} (id) ON DELETE CASCADE,
                status TEXT NOT NULL,
                added_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                started_at TIMESTAMPTZ,
                finished_at TIMESTAMPTZ,
                current_page INTEGER CHECK (current_page >= 0),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                UNIQUE (owner_id, book_id)
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {reviews} (
                id UUID PRIMARY KEY,
                owner_id TEXT NOT NULL,
                book_id UUID NOT NULL REFERENCES {books} (id) ON DELETE CASCADE,
                rating INTEGER NOT NULL,
                text TEXT,
                visibility TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ,
                UNIQUE (owner_id, book_id)
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {goals} (
                id UUID PRIMARY KEY,
                owner_id TEXT NOT NULL,
                year INTEGER NOT NULL,
                target_books INTEGER NOT NULL CHECK (target_books > 0),
                target_pages INTEGER,
                status TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ,
                UNIQUE (owner_id, year)
            )
            "#
        ),
        format!("CREATE INDEX IF NOT EXISTS books_owner_title_idx ON {books} (owner_id, title)"),
        format!("CREATE INDEX IF NOT EXISTS shelves_owner_status_idx ON {shelves} (owner_id, status)"),
    ]
}

/// Create the tenant schema and the four library tables if missing.
pub async fn ensure_schema(pool: &PgPool, schema: &TenantSchema) -> Result<(), AppError> {
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(schema.name())))
        .execute(pool)
        .await?;
    for ddl in table_ddl(schema) {
        sqlx::query(&ddl).execute(pool).await?;
    }
    tracing::info!(schema = %schema, "library tables ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_statement_targets_the_tenant_schema() {
        let schema = TenantSchema::for_project("7").unwrap();
        let ddl = table_ddl(&schema);
        assert_eq!(ddl.len(), 6);
        for stmt in ddl.iter().take(4) {
            assert!(stmt.contains("\"project_7\"."), "{}", stmt);
        }
        assert!(ddl[1].contains("UNIQUE (owner_id, book_id)"));
        assert!(ddl[3].contains("UNIQUE (owner_id, year)"));
    }
}
