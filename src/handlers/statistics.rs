//! Reading statistics for a period, computed from a snapshot of the owner's library.

use super::query_object;
use crate::error::AppError;
use crate::extractors::OwnerId;
use crate::response::success_one_ok;
use crate::service::statistics::compute;
use crate::state::AppState;
use crate::validation;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use std::collections::HashMap;

pub async fn get(
    State(state): State<AppState>,
    owner: OwnerId,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let query = validation::statistics_query(&query_object(params))?;
    let snapshot = state.store.snapshot(owner.as_str()).await?;
    tracing::debug!(owner = %owner.0, period = %query.period, books = snapshot.books.len(), "computing statistics");
    Ok(success_one_ok(compute(owner.as_str(), &query, &snapshot)))
}
