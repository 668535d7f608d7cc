//! HTTP handlers: extract, validate, call the store, wrap in the envelope.

pub mod book;
pub mod goal;
pub mod review;
pub mod shelf;
pub mod statistics;

use crate::error::AppError;
use chrono::{Datelike, Utc};
use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

fn parse_id(id_str: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id_str.trim()).map_err(|_| AppError::BadRequest(format!("invalid id: {}", id_str)))
}

fn parse_year(year_str: &str) -> Result<i32, AppError> {
    year_str
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid year: {}", year_str)))
}

/// Query strings arrive as text; the validation rules coerce numbers.
fn query_object(params: HashMap<String, String>) -> Map<String, Value> {
    params.into_iter().map(|(k, v)| (k, Value::String(v))).collect()
}

fn current_year() -> i32 {
    Utc::now().year()
}
