//! Shared application state for all routes.

use crate::cover::CoverStore;
use crate::model::RatingBounds;
use crate::store::LibraryStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LibraryStore>,
    pub covers: Arc<dyn CoverStore>,
    pub rating: RatingBounds,
    pub cover_max_bytes: usize,
}
