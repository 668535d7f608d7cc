//! Book catalog handlers, including cover upload and download.

use super::{current_year, parse_id, query_object};
use crate::cover::{content_type_for_key, cover_key, CoverUpload};
use crate::error::AppError;
use crate::extractors::{BookForm, OwnerId};
use crate::model::Book;
use crate::response::{success_many, success_one, success_one_ok};
use crate::state::AppState;
use crate::validation::{self, ValidationErrors};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
};
use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;

/// Checks and stores an uploaded cover; returns its key.
async fn store_cover(state: &AppState, owner: &str, book_id: Uuid, upload: &CoverUpload) -> Result<String, AppError> {
    let ext = upload.check(state.cover_max_bytes)?;
    let key = cover_key(owner, book_id, ext);
    state.covers.put(&key, upload).await?;
    Ok(key)
}

/// Best effort: a leftover image is harmless, a failed request is not.
async fn discard_cover(state: &AppState, key: &str) {
    if let Err(e) = state.covers.delete(key).await {
        tracing::warn!(key, error = %e, "could not delete cover");
    }
}

pub async fn list(
    State(state): State<AppState>,
    owner: OwnerId,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let filter = validation::book_filter(&query_object(params))?;
    let books = state.store.list_books(owner.as_str(), &filter).await?;
    Ok(success_many(books))
}

pub async fn create(
    State(state): State<AppState>,
    owner: OwnerId,
    form: BookForm,
) -> Result<impl IntoResponse, AppError> {
    let new = validation::new_book(&form.fields, current_year())?;
    let id = Uuid::new_v4();
    let cover = match &form.cover {
        Some(upload) => Some(store_cover(&state, owner.as_str(), id, upload).await?),
        None => None,
    };
    let book = Book {
        id,
        title: new.title,
        author: new.author,
        year: new.year,
        genre: new.genre,
        page_count: new.page_count,
        isbn: new.isbn,
        synopsis: new.synopsis,
        cover: cover.clone(),
        owner_id: owner.0.clone(),
        created_at: Utc::now(),
    };
    let book = match state.store.insert_book(book).await {
        Ok(book) => book,
        Err(e) => {
            if let Some(key) = &cover {
                discard_cover(&state, key).await;
            }
            return Err(e);
        }
    };
    tracing::info!(owner = %owner.0, book_id = %book.id, "book created");
    Ok(success_one(book))
}

pub async fn read(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let book = state
        .store
        .get_book(owner.as_str(), id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("book {}", id)))?;
    Ok(success_one_ok(book))
}

pub async fn update(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(id_str): Path<String>,
    form: BookForm,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let patch = validation::book_patch(&form.fields, current_year())?;
    if patch.is_empty() && form.cover.is_none() {
        return Err(ValidationErrors::single("body", "at least one field or a cover is required").into());
    }
    let existing = state
        .store
        .get_book(owner.as_str(), id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("book {}", id)))?;
    let new_cover = match &form.cover {
        Some(upload) => Some(store_cover(&state, owner.as_str(), id, upload).await?),
        None => None,
    };
    let updated = match state.store.update_book(owner.as_str(), id, &patch, new_cover.clone()).await {
        Ok(Some(book)) => book,
        other => {
            if let Some(key) = &new_cover {
                discard_cover(&state, key).await;
            }
            return Err(match other {
                Err(e) => e,
                _ => AppError::NotFound(format!("book {}", id)),
            });
        }
    };
    if new_cover.is_some() {
        if let Some(old) = &existing.cover {
            discard_cover(&state, old).await;
        }
    }
    tracing::info!(owner = %owner.0, book_id = %id, "book updated");
    Ok(success_one_ok(updated))
}

pub async fn delete(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let removed = state
        .store
        .delete_book(owner.as_str(), id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("book {}", id)))?;
    if let Some(key) = &removed.cover {
        discard_cover(&state, key).await;
    }
    tracing::info!(owner = %owner.0, book_id = %id, "book deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// The stored cover image bytes.
pub async fn cover(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let book = state
        .store
        .get_book(owner.as_str(), id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("book {}", id)))?;
    let key = book
        .cover
        .ok_or_else(|| AppError::NotFound(format!("cover of book {}", id)))?;
    let bytes = state
        .covers
        .get(&key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("cover of book {}", id)))?;
    Ok(([(header::CONTENT_TYPE, content_type_for_key(&key))], bytes))
}
