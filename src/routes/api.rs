//! Library routes under `/api/v1`.

use crate::handlers::{book, goal, review, shelf, statistics};
use crate::state::AppState;
use axum::{
    routing::{get, patch},
    Router,
};

pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/book", get(book::list).post(book::create))
        .route("/book/:id", get(book::read).put(book::update).delete(book::delete))
        .route("/book/:id/cover", get(book::cover))
        .route("/shelf", get(shelf::list).post(shelf::create))
        .route(
            "/shelf/book/:book_id",
            get(shelf::get_by_book).post(shelf::move_to_shelf).delete(shelf::remove),
        )
        .route("/shelf/book/:book_id/progress", patch(shelf::update_progress))
        .route(
            "/review/book/:book_id",
            get(review::get_by_book)
                .post(review::create)
                .put(review::update)
                .delete(review::delete),
        )
        .route("/goal", get(goal::list).post(goal::create))
        .route("/goal/:year", get(goal::get_by_year).put(goal::update))
        .route("/statistics", get(statistics::get))
        .route("/openapi.json", get(super::openapi::openapi_json))
        .with_state(state)
}
