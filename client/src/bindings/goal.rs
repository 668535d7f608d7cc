use super::{run_mutation, Mutation, Pending, Query, QueryState};
use crate::cache::{QueryCache, QueryKey};
use crate::error::Result;
use crate::http::Lookup;
use crate::services::GoalService;
use booknest::model::{Goal, GoalPatch, NewGoal};
use std::sync::Arc;
use tokio::sync::watch;

/// Goal of one year, with progress as computed by the server.
pub struct GoalQuery {
    year: i32,
    query: Query<Lookup<Goal>>,
    service: GoalService,
    cache: Arc<QueryCache>,
    pub creating: Pending,
    pub updating: Pending,
}

impl GoalQuery {
    pub fn new(service: GoalService, cache: Arc<QueryCache>, year: i32) -> Self {
        let loader_service = service.clone();
        let query = Query::new(cache.clone(), QueryKey::goal().with(year), move || {
            let service = loader_service.clone();
            async move { service.get_by_year(year).await }
        });
        GoalQuery {
            year,
            query,
            service,
            cache,
            creating: Pending::default(),
            updating: Pending::default(),
        }
    }

    pub async fn load(&self) -> QueryState<Lookup<Goal>> {
        self.query.load().await
    }

    pub async fn refetch(&self) -> QueryState<Lookup<Goal>> {
        self.query.refetch().await
    }

    pub fn state(&self) -> QueryState<Lookup<Goal>> {
        self.query.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState<Lookup<Goal>>> {
        self.query.subscribe()
    }

    /// Creates the goal for this binding's year.
    pub async fn create(&self, target_books: i32, target_pages: Option<i32>) -> Result<Goal> {
        let new = NewGoal {
            year: self.year,
            target_books,
            target_pages,
        };
        let goal = run_mutation(&self.cache, &self.creating, Mutation::CreateGoal, self.service.create(&new)).await?;
        self.query.load().await;
        Ok(goal)
    }

    pub async fn update(&self, patch: &GoalPatch) -> Result<Goal> {
        let goal = run_mutation(
            &self.cache,
            &self.updating,
            Mutation::UpdateGoal(self.year),
            self.service.update(self.year, patch),
        )
        .await?;
        self.query.load().await;
        Ok(goal)
    }
}
