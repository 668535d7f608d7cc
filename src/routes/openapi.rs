//! OpenAPI document listing the schema of every entity and request type.

use crate::model::*;
use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "BookNest", description = "Personal library and reading tracker"),
    components(schemas(
        Book,
        Genre,
        NewBook,
        BookPatch,
        BookFilter,
        ShelfStatus,
        ShelfEntry,
        ShelfMove,
        ProgressUpdate,
        Visibility,
        Review,
        NewReview,
        ReviewPatch,
        GoalStatus,
        Goal,
        NewGoal,
        GoalPatch,
        Period,
        StatisticsQuery,
        Statistics,
        GenreCount,
        AuthorCount,
        MonthBucket,
        YearPages,
    ))
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
