use super::{run_mutation, Mutation, Pending, Query, QueryState};
use crate::cache::{QueryCache, QueryKey};
use crate::error::Result;
use crate::http::Lookup;
use crate::services::ReviewService;
use booknest::model::{NewReview, Review, ReviewPatch};
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

/// The owner's review of one book, if any.
pub struct ReviewQuery {
    book_id: Uuid,
    query: Query<Lookup<Review>>,
    service: ReviewService,
    cache: Arc<QueryCache>,
    pub creating: Pending,
    pub updating: Pending,
    pub deleting: Pending,
}

impl ReviewQuery {
    pub fn new(service: ReviewService, cache: Arc<QueryCache>, book_id: Uuid) -> Self {
        let loader_service = service.clone();
        let query = Query::new(cache.clone(), QueryKey::review().with(book_id), move || {
            let service = loader_service.clone();
            async move { service.get_by_book(book_id).await }
        });
        ReviewQuery {
            book_id,
            query,
            service,
            cache,
            creating: Pending::default(),
            updating: Pending::default(),
            deleting: Pending::default(),
        }
    }

    pub async fn load(&self) -> QueryState<Lookup<Review>> {
        self.query.load().await
    }

    pub async fn refetch(&self) -> QueryState<Lookup<Review>> {
        self.query.refetch().await
    }

    pub fn state(&self) -> QueryState<Lookup<Review>> {
        self.query.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState<Lookup<Review>>> {
        self.query.subscribe()
    }

    pub async fn create(&self, review: &NewReview) -> Result<Review> {
        let created = run_mutation(
            &self.cache,
            &self.creating,
            Mutation::CreateReview(self.book_id),
            self.service.create(self.book_id, review),
        )
        .await?;
        self.query.load().await;
        Ok(created)
    }

    pub async fn update(&self, patch: &ReviewPatch) -> Result<Review> {
        let updated = run_mutation(
            &self.cache,
            &self.updating,
            Mutation::UpdateReview(self.book_id),
            self.service.update(self.book_id, patch),
        )
        .await?;
        self.query.load().await;
        Ok(updated)
    }

    pub async fn delete(&self) -> Result<()> {
        run_mutation(
            &self.cache,
            &self.deleting,
            Mutation::DeleteReview(self.book_id),
            self.service.delete(self.book_id),
        )
        .await?;
        self.query.load().await;
        Ok(())
    }
}
