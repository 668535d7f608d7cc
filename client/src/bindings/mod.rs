//! Data bindings: a cached query whose state is published on a watch
//! channel, plus mutations that invalidate the keys they make stale.

mod book;
mod goal;
mod review;
mod shelf;
mod statistics;

pub use book::BookListQuery;
pub use goal::GoalQuery;
pub use review::ReviewQuery;
pub use shelf::ShelfQuery;
pub use statistics::StatisticsQuery;

use crate::cache::{QueryCache, QueryKey};
use crate::error::Result;
use crate::services::Services;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq)]
pub enum QueryState<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> QueryState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            QueryState::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            QueryState::Failed(m) => Some(m),
            _ => None,
        }
    }
}

type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T>> + Send>>;
type Loader<T> = Arc<dyn Fn() -> BoxFuture<T> + Send + Sync>;

/// One cached read bound to a key.
pub struct Query<T> {
    cache: Arc<QueryCache>,
    key: QueryKey,
    loader: Loader<T>,
    state: watch::Sender<QueryState<T>>,
}

impl<T: Clone + Send + Sync + 'static> Query<T> {
    pub fn new<F, Fut>(cache: Arc<QueryCache>, key: QueryKey, loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (state, _) = watch::channel(QueryState::Idle);
        Query {
            cache,
            key,
            loader: Arc::new(move || Box::pin(loader()) as BoxFuture<T>),
            state,
        }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Serves from the cache when it can; publishes `Loading` only when a
    /// request is actually needed.
    pub async fn load(&self) -> QueryState<T> {
        let next = match self.cache.peek::<T>(&self.key) {
            Some(v) => QueryState::Ready(v),
            None => {
                self.state.send_replace(QueryState::Loading);
                let loader = self.loader.clone();
                match self.cache.fetch(&self.key, move || loader()).await {
                    Ok(v) => QueryState::Ready(v),
                    Err(e) => {
                        tracing::warn!(key = %self.key, error = %e, "query failed");
                        QueryState::Failed(e.to_string())
                    }
                }
            }
        };
        self.state.send_replace(next.clone());
        next
    }

    pub async fn refetch(&self) -> QueryState<T> {
        self.cache.invalidate(&self.key);
        self.load().await
    }

    pub fn state(&self) -> QueryState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState<T>> {
        self.state.subscribe()
    }
}

/// In-flight flag of one mutation. Each mutation of a binding has its own.
#[derive(Debug)]
pub struct Pending(watch::Sender<bool>);

impl Default for Pending {
    fn default() -> Self {
        Pending(watch::channel(false).0)
    }
}

impl Pending {
    pub fn is_pending(&self) -> bool {
        *self.0.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.0.subscribe()
    }
}

struct PendingGuard<'a>(&'a Pending);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0 .0.send_replace(false);
    }
}

/// Every write the client can make, named by what it touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutation {
    CreateBook,
    UpdateBook(Uuid),
    DeleteBook(Uuid),
    MoveToShelf(Uuid),
    RemoveFromShelf(Uuid),
    UpdateProgress(Uuid),
    CreateReview(Uuid),
    UpdateReview(Uuid),
    DeleteReview(Uuid),
    CreateGoal,
    UpdateGoal(i32),
}

impl Mutation {
    /// Cache prefixes made stale by a successful run.
    pub fn invalidates(&self) -> Vec<QueryKey> {
        match *self {
            Mutation::CreateBook => vec![QueryKey::books()],
            Mutation::UpdateBook(_) | Mutation::DeleteBook(_) => vec![
                QueryKey::books(),
                QueryKey::shelf(),
                QueryKey::review(),
                QueryKey::statistics(),
                QueryKey::goal(),
            ],
            Mutation::MoveToShelf(_) | Mutation::RemoveFromShelf(_) => vec![
                QueryKey::shelf(),
                QueryKey::books(),
                QueryKey::statistics(),
                QueryKey::goal(),
            ],
            Mutation::UpdateProgress(book) => vec![QueryKey::shelf().with(book), QueryKey::statistics()],
            Mutation::CreateReview(book) | Mutation::UpdateReview(book) | Mutation::DeleteReview(book) => {
                vec![QueryKey::review().with(book), QueryKey::statistics()]
            }
            Mutation::CreateGoal => vec![QueryKey::goal()],
            Mutation::UpdateGoal(year) => vec![QueryKey::goal().with(year)],
        }
    }
}

/// Runs `op` with `pending` raised, then invalidates on success.
async fn run_mutation<T, Fut>(cache: &QueryCache, pending: &Pending, mutation: Mutation, op: Fut) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    pending.0.send_replace(true);
    let _guard = PendingGuard(pending);
    let out = op.await?;
    cache.invalidate_all(&mutation.invalidates());
    tracing::debug!(?mutation, "mutation applied");
    Ok(out)
}

/// Factory for bindings sharing one cache and one set of services.
#[derive(Clone, Debug)]
pub struct Bindings {
    services: Services,
    cache: Arc<QueryCache>,
}

impl Bindings {
    pub fn new(services: Services, cache: Arc<QueryCache>) -> Self {
        Bindings { services, cache }
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    pub fn books(&self, filter: booknest::model::BookFilter) -> BookListQuery {
        BookListQuery::new(self.services.books.clone(), self.cache.clone(), filter)
    }

    pub fn shelf(&self, book_id: Uuid) -> ShelfQuery {
        ShelfQuery::new(self.services.shelf.clone(), self.cache.clone(), book_id)
    }

    pub fn review(&self, book_id: Uuid) -> ReviewQuery {
        ReviewQuery::new(self.services.reviews.clone(), self.cache.clone(), book_id)
    }

    pub fn goal(&self, year: i32) -> GoalQuery {
        GoalQuery::new(self.services.goals.clone(), self.cache.clone(), year)
    }

    pub fn statistics(&self, query: booknest::model::StatisticsQuery) -> StatisticsQuery {
        StatisticsQuery::new(self.services.statistics.clone(), self.cache.clone(), query)
    }
}
