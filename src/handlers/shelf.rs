//! Shelf handlers: one entry per (owner, book).

use super::{parse_id, query_object};
use crate::error::AppError;
use crate::extractors::{JsonObject, OwnerId};
use crate::model::{Book, ShelfEntry, ShelfMove};
use crate::response::{success_many, success_one, success_one_ok};
use crate::service::shelf::{check_dates, check_page, plan_move};
use crate::state::AppState;
use crate::validation;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;

async fn owned_book(state: &AppState, owner: &str, book_id: Uuid) -> Result<Book, AppError> {
    state
        .store
        .get_book(owner, book_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("book {}", book_id)))
}

/// Upserts the entry; the flag is true when it did not exist before.
async fn place(state: &AppState, owner: &str, book_id: Uuid, mv: &ShelfMove) -> Result<(ShelfEntry, bool), AppError> {
    let book = owned_book(state, owner, book_id).await?;
    if let Some(page) = mv.current_page {
        check_page(&book, page)?;
    }
    let existing = state.store.get_shelf(owner, book_id).await?;
    let placement = plan_move(existing.as_ref(), mv, Utc::now());
    check_dates(&placement)?;
    let entry = state.store.put_shelf(owner, book_id, &placement).await?;
    tracing::info!(owner, book_id = %book_id, status = %entry.status, "book shelved");
    Ok((entry, existing.is_none()))
}

pub async fn list(
    State(state): State<AppState>,
    owner: OwnerId,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let status = validation::shelf_status_filter(&query_object(params))?;
    let entries = state.store.list_shelf(owner.as_str(), status).await?;
    Ok(success_many(entries))
}

pub async fn create(
    State(state): State<AppState>,
    owner: OwnerId,
    JsonObject(body): JsonObject,
) -> Result<impl IntoResponse, AppError> {
    let (book_id, mv) = validation::shelf_entry(&body)?;
    let (entry, created) = place(&state, owner.as_str(), book_id, &mv).await?;
    Ok(if created { success_one(entry) } else { success_one_ok(entry) })
}

pub async fn get_by_book(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(book_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let book_id = parse_id(&book_id)?;
    let entry = state
        .store
        .get_shelf(owner.as_str(), book_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("shelf entry for book {}", book_id)))?;
    Ok(success_one_ok(entry))
}

pub async fn move_to_shelf(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(book_id): Path<String>,
    JsonObject(body): JsonObject,
) -> Result<impl IntoResponse, AppError> {
    let book_id = parse_id(&book_id)?;
    let mv = validation::shelf_move(&body)?;
    let (entry, created) = place(&state, owner.as_str(), book_id, &mv).await?;
    Ok(if created { success_one(entry) } else { success_one_ok(entry) })
}

/// Moves the page position only; the shelf status is left as it is.
pub async fn update_progress(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(book_id): Path<String>,
    JsonObject(body): JsonObject,
) -> Result<impl IntoResponse, AppError> {
    let book_id = parse_id(&book_id)?;
    let progress = validation::progress_update(&body)?;
    let book = owned_book(&state, owner.as_str(), book_id).await?;
    check_page(&book, progress.current_page)?;
    let entry = state
        .store
        .set_progress(owner.as_str(), book_id, progress.current_page)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("shelf entry for book {}", book_id)))?;
    Ok(success_one_ok(entry))
}

pub async fn remove(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(book_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let book_id = parse_id(&book_id)?;
    state
        .store
        .delete_shelf(owner.as_str(), book_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("shelf entry for book {}", book_id)))?;
    Ok(StatusCode::NO_CONTENT)
}
