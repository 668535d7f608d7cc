//! Router assembly.

mod api;
mod common;
mod openapi;

pub use api::api_routes;
pub use common::common_routes_with_ready;
pub use openapi::ApiDoc;

use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, Router};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Multipart framing and text fields on top of the largest accepted cover.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// The full application: operational routes at the root, the library under `/api/v1`.
pub fn app(state: AppState) -> Router {
    let body_limit = state.cover_max_bytes + FORM_OVERHEAD_BYTES;
    Router::new()
        .merge(common_routes_with_ready(state.clone()))
        .nest("/api/v1", api_routes(state))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
}
