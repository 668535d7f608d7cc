use super::{Query, QueryState};
use crate::cache::{QueryCache, QueryKey};
use crate::services::StatisticsService;
use booknest::model::{Statistics, StatisticsQuery as Window};
use std::sync::Arc;
use tokio::sync::watch;

/// Read-only: statistics change through other bindings' mutations.
pub struct StatisticsQuery {
    query: Query<Statistics>,
}

fn key(window: &Window) -> QueryKey {
    let mut key = QueryKey::statistics().with(window.period.as_str());
    if let Some(year) = window.year {
        key = key.with(year);
    }
    if let Some(month) = window.month {
        key = key.with(month);
    }
    key
}

impl StatisticsQuery {
    pub fn new(service: StatisticsService, cache: Arc<QueryCache>, window: Window) -> Self {
        let query = Query::new(cache, key(&window), move || {
            let service = service.clone();
            async move { service.get(&window).await }
        });
        StatisticsQuery { query }
    }

    pub async fn load(&self) -> QueryState<Statistics> {
        self.query.load().await
    }

    pub async fn refetch(&self) -> QueryState<Statistics> {
        self.query.refetch().await
    }

    pub fn state(&self) -> QueryState<Statistics> {
        self.query.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState<Statistics>> {
        self.query.subscribe()
    }
}
