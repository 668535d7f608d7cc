use crate::error::Result;
use crate::http::{ApiClient, Lookup};
use booknest::model::{NewReview, Review, ReviewPatch};
use reqwest::Method;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct ReviewService {
    api: ApiClient,
}

fn path(book_id: Uuid) -> String {
    format!("/review/book/{}", book_id)
}

impl ReviewService {
    pub fn new(api: ApiClient) -> Self {
        ReviewService { api }
    }

    pub async fn get_by_book(&self, book_id: Uuid) -> Result<Lookup<Review>> {
        self.api.lookup(&path(book_id)).await
    }

    pub async fn create(&self, book_id: Uuid, review: &NewReview) -> Result<Review> {
        self.api.send_json(Method::POST, &path(book_id), review).await
    }

    pub async fn update(&self, book_id: Uuid, patch: &ReviewPatch) -> Result<Review> {
        self.api.send_json(Method::PUT, &path(book_id), patch).await
    }

    pub async fn delete(&self, book_id: Uuid) -> Result<()> {
        self.api.delete(&path(book_id)).await
    }
}
