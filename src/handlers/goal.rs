//! Yearly goal handlers. Progress is recomputed from the shelf on every read.

use super::{parse_year, query_object};
use crate::error::AppError;
use crate::extractors::{JsonObject, OwnerId};
use crate::model::{GoalRecord, GoalStatus};
use crate::response::{success_many, success_one, success_one_ok};
use crate::service::goal::with_progress;
use crate::state::AppState;
use crate::validation;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;

pub async fn list(
    State(state): State<AppState>,
    owner: OwnerId,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let include_archived = validation::goal_list_query(&query_object(params))?;
    let mut records = state.store.list_goals(owner.as_str()).await?;
    if !include_archived {
        records.retain(|r| r.status != GoalStatus::Archived);
    }
    let snapshot = state.store.snapshot(owner.as_str()).await?;
    let goals: Vec<_> = records.into_iter().map(|r| with_progress(r, &snapshot)).collect();
    Ok(success_many(goals))
}

pub async fn create(
    State(state): State<AppState>,
    owner: OwnerId,
    JsonObject(body): JsonObject,
) -> Result<impl IntoResponse, AppError> {
    let new = validation::new_goal(&body)?;
    let record = GoalRecord {
        id: Uuid::new_v4(),
        owner_id: owner.0.clone(),
        year: new.year,
        target_books: new.target_books,
        target_pages: new.target_pages,
        status: GoalStatus::Active,
        created_at: Utc::now(),
        updated_at: None,
    };
    let record = state.store.insert_goal(record).await?;
    tracing::info!(owner = %owner.0, year = record.year, target_books = record.target_books, "goal created");
    let snapshot = state.store.snapshot(owner.as_str()).await?;
    Ok(success_one(with_progress(record, &snapshot)))
}

pub async fn get_by_year(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(year): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let year = parse_year(&year)?;
    let record = state
        .store
        .get_goal(owner.as_str(), year)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("goal for {}", year)))?;
    let snapshot = state.store.snapshot(owner.as_str()).await?;
    Ok(success_one_ok(with_progress(record, &snapshot)))
}

pub async fn update(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(year): Path<String>,
    JsonObject(body): JsonObject,
) -> Result<impl IntoResponse, AppError> {
    let year = parse_year(&year)?;
    let patch = validation::goal_patch(&body)?;
    let record = state
        .store
        .update_goal(owner.as_str(), year, &patch)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("goal for {}", year)))?;
    let snapshot = state.store.snapshot(owner.as_str()).await?;
    Ok(success_one_ok(with_progress(record, &snapshot)))
}
