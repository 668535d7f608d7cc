use super::{run_mutation, Mutation, Pending, Query, QueryState};
use crate::cache::{QueryCache, QueryKey};
use crate::error::Result;
use crate::services::BookService;
use booknest::cover::CoverUpload;
use booknest::model::{Book, BookFilter, BookPatch, NewBook};
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

/// A filtered page of the catalog, with create/update/delete.
pub struct BookListQuery {
    query: Query<Vec<Book>>,
    service: BookService,
    cache: Arc<QueryCache>,
    pub creating: Pending,
    pub updating: Pending,
    pub deleting: Pending,
}

fn list_key(filter: &BookFilter) -> QueryKey {
    QueryKey::books()
        .with("list")
        .with(filter.search.as_deref().unwrap_or(""))
        .with(filter.genre.map(|g| g.as_str()).unwrap_or(""))
        .with(filter.author.as_deref().unwrap_or(""))
        .with(filter.page)
        .with(filter.limit)
}

impl BookListQuery {
    pub fn new(service: BookService, cache: Arc<QueryCache>, filter: BookFilter) -> Self {
        let loader_service = service.clone();
        let key = list_key(&filter);
        let query = Query::new(cache.clone(), key, move || {
            let service = loader_service.clone();
            let filter = filter.clone();
            async move { service.list(&filter).await }
        });
        BookListQuery {
            query,
            service,
            cache,
            creating: Pending::default(),
            updating: Pending::default(),
            deleting: Pending::default(),
        }
    }

    pub async fn load(&self) -> QueryState<Vec<Book>> {
        self.query.load().await
    }

    pub async fn refetch(&self) -> QueryState<Vec<Book>> {
        self.query.refetch().await
    }

    pub fn state(&self) -> QueryState<Vec<Book>> {
        self.query.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState<Vec<Book>>> {
        self.query.subscribe()
    }

    pub async fn create(&self, book: &NewBook, cover: Option<&CoverUpload>) -> Result<Book> {
        let created = run_mutation(
            &self.cache,
            &self.creating,
            Mutation::CreateBook,
            self.service.create(book, cover),
        )
        .await?;
        self.query.load().await;
        Ok(created)
    }

    pub async fn update(&self, id: Uuid, patch: &BookPatch, cover: Option<&CoverUpload>) -> Result<Book> {
        let updated = run_mutation(
            &self.cache,
            &self.updating,
            Mutation::UpdateBook(id),
            self.service.update(id, patch, cover),
        )
        .await?;
        self.query.load().await;
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        run_mutation(&self.cache, &self.deleting, Mutation::DeleteBook(id), self.service.delete(id)).await?;
        self.query.load().await;
        Ok(())
    }
}
