use crate::error::Result;
use crate::http::ApiClient;
use booknest::model::{Statistics, StatisticsQuery};

#[derive(Clone, Debug)]
pub struct StatisticsService {
    api: ApiClient,
}

pub(crate) fn query_pairs(query: &StatisticsQuery) -> Vec<(&'static str, String)> {
    let mut pairs = vec![("period", query.period.as_str().to_string())];
    if let Some(year) = query.year {
        pairs.push(("year", year.to_string()));
    }
    if let Some(month) = query.month {
        pairs.push(("month", month.to_string()));
    }
    pairs
}

impl StatisticsService {
    pub fn new(api: ApiClient) -> Self {
        StatisticsService { api }
    }

    pub async fn get(&self, query: &StatisticsQuery) -> Result<Statistics> {
        self.api.get("/statistics", &query_pairs(query)).await
    }
}
