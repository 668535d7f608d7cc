use super::{run_mutation, Mutation, Pending, Query, QueryState};
use crate::cache::{QueryCache, QueryKey};
use crate::error::Result;
use crate::http::Lookup;
use crate::services::ShelfService;
use booknest::model::{ShelfEntry, ShelfMove};
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

/// Shelf placement of one book.
pub struct ShelfQuery {
    book_id: Uuid,
    query: Query<Lookup<ShelfEntry>>,
    service: ShelfService,
    cache: Arc<QueryCache>,
    pub moving: Pending,
    pub updating_progress: Pending,
    pub removing: Pending,
}

impl ShelfQuery {
    pub fn new(service: ShelfService, cache: Arc<QueryCache>, book_id: Uuid) -> Self {
        let loader_service = service.clone();
        let query = Query::new(cache.clone(), QueryKey::shelf().with(book_id), move || {
            let service = loader_service.clone();
            async move { service.get_by_book(book_id).await }
        });
        ShelfQuery {
            book_id,
            query,
            service,
            cache,
            moving: Pending::default(),
            updating_progress: Pending::default(),
            removing: Pending::default(),
        }
    }

    pub async fn load(&self) -> QueryState<Lookup<ShelfEntry>> {
        self.query.load().await
    }

    pub async fn refetch(&self) -> QueryState<Lookup<ShelfEntry>> {
        self.query.refetch().await
    }

    pub fn state(&self) -> QueryState<Lookup<ShelfEntry>> {
        self.query.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState<Lookup<ShelfEntry>>> {
        self.query.subscribe()
    }

    pub async fn move_to(&self, mv: &ShelfMove) -> Result<ShelfEntry> {
        let entry = run_mutation(
            &self.cache,
            &self.moving,
            Mutation::MoveToShelf(self.book_id),
            self.service.move_to_shelf(self.book_id, mv),
        )
        .await?;
        self.query.load().await;
        Ok(entry)
    }

    pub async fn update_progress(&self, current_page: i32) -> Result<ShelfEntry> {
        let entry = run_mutation(
            &self.cache,
            &self.updating_progress,
            Mutation::UpdateProgress(self.book_id),
            self.service.update_progress(self.book_id, current_page),
        )
        .await?;
        self.query.load().await;
        Ok(entry)
    }

    pub async fn remove(&self) -> Result<()> {
        run_mutation(
            &self.cache,
            &self.removing,
            Mutation::RemoveFromShelf(self.book_id),
            self.service.remove(self.book_id),
        )
        .await?;
        self.query.load().await;
        Ok(())
    }
}
