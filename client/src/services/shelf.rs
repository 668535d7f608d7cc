use crate::error::Result;
use crate::http::{ApiClient, Lookup};
use booknest::model::{ProgressUpdate, ShelfEntry, ShelfMove, ShelfStatus};
use reqwest::Method;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct ShelfService {
    api: ApiClient,
}

impl ShelfService {
    pub fn new(api: ApiClient) -> Self {
        ShelfService { api }
    }

    /// `NotFound` when the book is on no shelf.
    pub async fn get_by_book(&self, book_id: Uuid) -> Result<Lookup<ShelfEntry>> {
        self.api.lookup(&format!("/shelf/book/{}", book_id)).await
    }

    pub async fn list_by_status(&self, status: Option<ShelfStatus>) -> Result<Vec<ShelfEntry>> {
        let query: Vec<(&str, String)> = status.map(|s| ("status", s.as_str().to_string())).into_iter().collect();
        self.api.get("/shelf", &query).await
    }

    pub async fn move_to_shelf(&self, book_id: Uuid, mv: &ShelfMove) -> Result<ShelfEntry> {
        self.api
            .send_json(Method::POST, &format!("/shelf/book/{}", book_id), mv)
            .await
    }

    pub async fn update_progress(&self, book_id: Uuid, current_page: i32) -> Result<ShelfEntry> {
        self.api
            .send_json(
                Method::PATCH,
                &format!("/shelf/book/{}/progress", book_id),
                &ProgressUpdate { current_page },
            )
            .await
    }

    pub async fn remove(&self, book_id: Uuid) -> Result<()> {
        self.api.delete(&format!("/shelf/book/{}", book_id)).await
    }
}
