//! Standard response envelope: `{ data, meta? }` on success, `{ error }` on failure.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};

/// The one serialization contract shared by every handler and by the client.
///
/// `Error` is listed first so untagged deserialization never reads an error
/// body as a success with an optional payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiResponse<T> {
    Error {
        error: ErrorDetail,
    },
    Success {
        data: T,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        meta: Option<Meta>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub count: u64,
}

impl<T> ApiResponse<T> {
    pub fn into_result(self) -> Result<T, ErrorDetail> {
        match self {
            ApiResponse::Success { data, .. } => Ok(data),
            ApiResponse::Error { error } => Err(error),
        }
    }
}

/// 201 with a single entity.
pub fn success_one<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, Json(ApiResponse::Success { data, meta: None }))
}

pub fn success_one_ok<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::OK, Json(ApiResponse::Success { data, meta: None }))
}

pub fn success_many<T: Serialize>(data: Vec<T>) -> (StatusCode, Json<ApiResponse<Vec<T>>>) {
    let count = data.len() as u64;
    (
        StatusCode::OK,
        Json(ApiResponse::Success {
            data,
            meta: Some(Meta { count }),
        }),
    )
}
