//! Review handlers: at most one review per (owner, book).

use super::parse_id;
use crate::error::AppError;
use crate::extractors::{JsonObject, OwnerId};
use crate::model::Review;
use crate::response::{success_one, success_one_ok};
use crate::state::AppState;
use crate::validation;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

fn not_found(book_id: Uuid) -> AppError {
    AppError::NotFound(format!("review for book {}", book_id))
}

pub async fn get_by_book(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(book_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let book_id = parse_id(&book_id)?;
    let review = state
        .store
        .get_review(owner.as_str(), book_id)
        .await?
        .ok_or_else(|| not_found(book_id))?;
    Ok(success_one_ok(review))
}

pub async fn create(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(book_id): Path<String>,
    JsonObject(body): JsonObject,
) -> Result<impl IntoResponse, AppError> {
    let book_id = parse_id(&book_id)?;
    let new = validation::new_review(&body, state.rating)?;
    if state.store.get_book(owner.as_str(), book_id).await?.is_none() {
        return Err(AppError::NotFound(format!("book {}", book_id)));
    }
    let review = Review {
        id: Uuid::new_v4(),
        book_id,
        owner_id: owner.0.clone(),
        rating: new.rating,
        text: new.text,
        visibility: new.visibility,
        created_at: Utc::now(),
        updated_at: None,
    };
    let review = state.store.insert_review(review).await?;
    tracing::info!(owner = %owner.0, book_id = %book_id, rating = review.rating, "review created");
    Ok(success_one(review))
}

pub async fn update(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(book_id): Path<String>,
    JsonObject(body): JsonObject,
) -> Result<impl IntoResponse, AppError> {
    let book_id = parse_id(&book_id)?;
    let patch = validation::review_patch(&body, state.rating)?;
    let review = state
        .store
        .update_review(owner.as_str(), book_id, &patch)
        .await?
        .ok_or_else(|| not_found(book_id))?;
    Ok(success_one_ok(review))
}

pub async fn delete(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(book_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let book_id = parse_id(&book_id)?;
    state
        .store
        .delete_review(owner.as_str(), book_id)
        .await?
        .ok_or_else(|| not_found(book_id))?;
    Ok(StatusCode::NO_CONTENT)
}
