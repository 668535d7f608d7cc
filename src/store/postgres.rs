//! PostgreSQL-backed store. Statements come from the SQL builder; rows are
//! read into JSON and deserialized into the domain types.

use super::LibraryStore;
use crate::error::AppError;
use crate::model::*;
use crate::sql::tables::{BOOKS, GOALS, REVIEWS, SHELVES};
use crate::sql::{self, Filter, Order, PgBindValue, QueryBuf, TableDef};
use crate::tenant::TenantSchema;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgStore {
    pool: PgPool,
    schema: TenantSchema,
}

impl PgStore {
    pub fn new(pool: PgPool, schema: TenantSchema) -> Self {
        PgStore { pool, schema }
    }

    async fn fetch_all<T: DeserializeOwned>(&self, q: QueryBuf) -> Result<Vec<T>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter()
            .map(|r| serde_json::from_value(row_to_json(r)).map_err(AppError::from))
            .collect()
    }

    async fn fetch_optional<T: DeserializeOwned>(&self, q: QueryBuf) -> Result<Option<T>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        match query.fetch_optional(&self.pool).await? {
            Some(row) => Ok(Some(serde_json::from_value(row_to_json(&row))?)),
            None => Ok(None),
        }
    }

    async fn fetch_one<T: DeserializeOwned>(&self, q: QueryBuf) -> Result<T, AppError> {
        self.fetch_optional(q)
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))
    }
}

/// The entity's fields that are columns of `table`, in column order.
fn column_values(table: &TableDef, entity: &impl Serialize) -> Result<Vec<(&'static str, Value)>, AppError> {
    let Value::Object(map) = serde_json::to_value(entity)? else {
        return Ok(Vec::new());
    };
    Ok(table
        .columns
        .iter()
        .filter_map(|c| map.get(c.name).map(|v| (c.name, v.clone())))
        .collect())
}

/// Patch fields that were set; `None` fields serialize as null and are skipped.
fn patch_values(table: &TableDef, patch: &impl Serialize) -> Result<Vec<(&'static str, Value)>, AppError> {
    Ok(column_values(table, patch)?
        .into_iter()
        .filter(|(_, v)| !v.is_null())
        .collect())
}

fn unique_violation_as_conflict(err: AppError, message: &str) -> AppError {
    match err {
        AppError::Db(sqlx::Error::Database(db)) if db.is_unique_violation() => AppError::Conflict(message.to_string()),
        other => other,
    }
}

fn owner_key(owner: &str) -> (&'static str, Value) {
    ("owner_id", json!(owner))
}

#[async_trait]
impl LibraryStore for PgStore {
    async fn list_books(&self, owner: &str, filter: &BookFilter) -> Result<Vec<Book>, AppError> {
        let mut filters = vec![Filter::Eq("owner_id", json!(owner))];
        if let Some(g) = filter.genre {
            filters.push(Filter::Eq("genre", json!(g.as_str())));
        }
        if let Some(a) = &filter.author {
            filters.push(Filter::Contains(&["author"], a.clone()));
        }
        if let Some(s) = &filter.search {
            filters.push(Filter::Contains(&["title", "author"], s.clone()));
        }
        let q = sql::select(
            &self.schema,
            &BOOKS,
            &filters,
            &[Order::Asc("title"), Order::Asc("id")],
            Some(filter.limit),
            Some(filter.offset()),
        );
        self.fetch_all(q).await
    }

    async fn get_book(&self, owner: &str, id: Uuid) -> Result<Option<Book>, AppError> {
        let q = sql::select(
            &self.schema,
            &BOOKS,
            &[Filter::Eq("owner_id", json!(owner)), Filter::Eq("id", json!(id))],
            &[],
            None,
            None,
        );
        self.fetch_optional(q).await
    }

    async fn insert_book(&self, book: Book) -> Result<Book, AppError> {
        let q = sql::insert(&self.schema, &BOOKS, &column_values(&BOOKS, &book)?);
        self.fetch_one(q).await
    }

    async fn update_book(
        &self,
        owner: &str,
        id: Uuid,
        patch: &BookPatch,
        cover: Option<String>,
    ) -> Result<Option<Book>, AppError> {
        let mut sets = patch_values(&BOOKS, patch)?;
        if let Some(c) = cover {
            sets.push(("cover", json!(c)));
        }
        let q = sql::update(&self.schema, &BOOKS, &[owner_key(owner), ("id", json!(id))], &sets, None);
        self.fetch_optional(q).await
    }

    async fn delete_book(&self, owner: &str, id: Uuid) -> Result<Option<Book>, AppError> {
        let q = sql::delete(&self.schema, &BOOKS, &[owner_key(owner), ("id", json!(id))]);
        self.fetch_optional(q).await
    }

    async fn list_shelf(&self, owner: &str, status: Option<ShelfStatus>) -> Result<Vec<ShelfEntry>, AppError> {
        let mut filters = vec![Filter::Eq("owner_id", json!(owner))];
        if let Some(s) = status {
            filters.push(Filter::Eq("status", json!(s.as_str())));
        }
        let q = sql::select(&self.schema, &SHELVES, &filters, &[Order::Desc("updated_at"), Order::Asc("id")], None, None);
        self.fetch_all(q).await
    }

    async fn get_shelf(&self, owner: &str, book_id: Uuid) -> Result<Option<ShelfEntry>, AppError> {
        let q = sql::select(
            &self.schema,
            &SHELVES,
            &[Filter::Eq("owner_id", json!(owner)), Filter::Eq("book_id", json!(book_id))],
            &[],
            None,
            None,
        );
        self.fetch_optional(q).await
    }

    async fn put_shelf(&self, owner: &str, book_id: Uuid, placement: &ShelfPlacement) -> Result<ShelfEntry, AppError> {
        let values = [
            ("id", json!(Uuid::new_v4())),
            owner_key(owner),
            ("book_id", json!(book_id)),
            ("status", json!(placement.status.as_str())),
            ("started_at", json!(placement.started_at)),
            ("finished_at", json!(placement.finished_at)),
            ("current_page", json!(placement.current_page)),
        ];
        let q = sql::upsert(
            &self.schema,
            &SHELVES,
            &values,
            &["owner_id", "book_id"],
            &["status", "started_at", "finished_at", "current_page"],
            Some("updated_at"),
        );
        self.fetch_one(q).await
    }

    async fn set_progress(&self, owner: &str, book_id: Uuid, current_page: i32) -> Result<Option<ShelfEntry>, AppError> {
        let q = sql::update(
            &self.schema,
            &SHELVES,
            &[owner_key(owner), ("book_id", json!(book_id))],
            &[("current_page", json!(current_page))],
            Some("updated_at"),
        );
        self.fetch_optional(q).await
    }

    async fn delete_shelf(&self, owner: &str, book_id: Uuid) -> Result<Option<ShelfEntry>, AppError> {
        let q = sql::delete(&self.schema, &SHELVES, &[owner_key(owner), ("book_id", json!(book_id))]);
        self.fetch_optional(q).await
    }

    async fn get_review(&self, owner: &str, book_id: Uuid) -> Result<Option<Review>, AppError> {
        let q = sql::select(
            &self.schema,
            &REVIEWS,
            &[Filter::Eq("owner_id", json!(owner)), Filter::Eq("book_id", json!(book_id))],
            &[],
            None,
            None,
        );
        self.fetch_optional(q).await
    }

    async fn insert_review(&self, review: Review) -> Result<Review, AppError> {
        let q = sql::insert(&self.schema, &REVIEWS, &column_values(&REVIEWS, &review)?);
        self.fetch_one(q)
            .await
            .map_err(|e| unique_violation_as_conflict(e, "review already exists for this book"))
    }

    async fn update_review(&self, owner: &str, book_id: Uuid, patch: &ReviewPatch) -> Result<Option<Review>, AppError> {
        let q = sql::update(
            &self.schema,
            &REVIEWS,
            &[owner_key(owner), ("book_id", json!(book_id))],
            &patch_values(&REVIEWS, patch)?,
            Some("updated_at"),
        );
        self.fetch_optional(q).await
    }

    async fn delete_review(&self, owner: &str, book_id: Uuid) -> Result<Option<Review>, AppError> {
        let q = sql::delete(&self.schema, &REVIEWS, &[owner_key(owner), ("book_id", json!(book_id))]);
        self.fetch_optional(q).await
    }

    async fn list_goals(&self, owner: &str) -> Result<Vec<GoalRecord>, AppError> {
        let q = sql::select(
            &self.schema,
            &GOALS,
            &[Filter::Eq("owner_id", json!(owner))],
            &[Order::Asc("year")],
            None,
            None,
        );
        self.fetch_all(q).await
    }

    async fn get_goal(&self, owner: &str, year: i32) -> Result<Option<GoalRecord>, AppError> {
        let q = sql::select(
            &self.schema,
            &GOALS,
            &[Filter::Eq("owner_id", json!(owner)), Filter::Eq("year", json!(year))],
            &[],
            None,
            None,
        );
        self.fetch_optional(q).await
    }

    async fn insert_goal(&self, goal: GoalRecord) -> Result<GoalRecord, AppError> {
        let year = goal.year;
        let q = sql::insert(&self.schema, &GOALS, &column_values(&GOALS, &goal)?);
        self.fetch_one(q)
            .await
            .map_err(|e| unique_violation_as_conflict(e, &format!("a goal for {} already exists", year)))
    }

    async fn update_goal(&self, owner: &str, year: i32, patch: &GoalPatch) -> Result<Option<GoalRecord>, AppError> {
        let q = sql::update(
            &self.schema,
            &GOALS,
            &[owner_key(owner), ("year", json!(year))],
            &patch_values(&GOALS, patch)?,
            Some("updated_at"),
        );
        self.fetch_optional(q).await
    }

    async fn snapshot(&self, owner: &str) -> Result<LibrarySnapshot, AppError> {
        let by_owner = [Filter::Eq("owner_id", json!(owner))];
        let books = self.fetch_all(sql::select(&self.schema, &BOOKS, &by_owner, &[], None, None)).await?;
        let shelves = self.fetch_all(sql::select(&self.schema, &SHELVES, &by_owner, &[], None, None)).await?;
        let reviews = self.fetch_all(sql::select(&self.schema, &REVIEWS, &by_owner, &[], None, None)).await?;
        Ok(LibrarySnapshot { books, shelves, reviews })
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn row_to_json(row: &sqlx::postgres::PgRow) -> Value {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

/// Decodes the column types the library tables use. A NULL cell decodes as
/// `None` whatever type is tried, so it falls through to `Value::Null`.
fn cell_to_value(row: &sqlx::postgres::PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(u)) = row.try_get::<Option<Uuid>, _>(name) {
        return Value::String(u.to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    Value::Null
}
