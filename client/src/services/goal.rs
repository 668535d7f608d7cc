use crate::error::Result;
use crate::http::{ApiClient, Lookup};
use booknest::model::{Goal, GoalPatch, NewGoal};
use reqwest::Method;

#[derive(Clone, Debug)]
pub struct GoalService {
    api: ApiClient,
}

impl GoalService {
    pub fn new(api: ApiClient) -> Self {
        GoalService { api }
    }

    pub async fn list(&self) -> Result<Vec<Goal>> {
        self.api.get("/goal", &[]).await
    }

    pub async fn get_by_year(&self, year: i32) -> Result<Lookup<Goal>> {
        self.api.lookup(&format!("/goal/{}", year)).await
    }

    pub async fn create(&self, goal: &NewGoal) -> Result<Goal> {
        self.api.send_json(Method::POST, "/goal", goal).await
    }

    pub async fn update(&self, year: i32, patch: &GoalPatch) -> Result<Goal> {
        self.api
            .send_json(Method::PUT, &format!("/goal/{}", year), patch)
            .await
    }
}
