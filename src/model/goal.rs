//! Yearly reading goals. Progress is computed on read from the shelf.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

pub const GOAL_MIN_YEAR: i32 = 1900;
pub const GOAL_MAX_YEAR: i32 = 2100;
pub const GOAL_MAX_BOOKS: i32 = 10_000;
pub const GOAL_MAX_PAGES: i32 = 10_000_000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    #[default]
    #[serde(alias = "Ativa")]
    Active,
    #[serde(alias = "Concluída")]
    Completed,
    #[serde(alias = "Arquivada")]
    Archived,
}

impl GoalStatus {
    pub const NAMES: [&'static str; 3] = ["active", "completed", "archived"];

    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Active => "active",
            GoalStatus::Completed => "completed",
            GoalStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" | "ativa" => Ok(GoalStatus::Active),
            "completed" | "concluída" | "concluida" => Ok(GoalStatus::Completed),
            "archived" | "arquivada" => Ok(GoalStatus::Archived),
            other => Err(format!("unknown goal status: {}", other)),
        }
    }
}

/// Goal as persisted; one per (owner, year).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GoalRecord {
    pub id: Uuid,
    pub owner_id: String,
    pub year: i32,
    pub target_books: i32,
    #[serde(default)]
    pub target_pages: Option<i32>,
    pub status: GoalStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Goal as served, with progress filled in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Goal {
    pub id: Uuid,
    pub owner_id: String,
    pub year: i32,
    pub target_books: i32,
    #[serde(default)]
    pub target_pages: Option<i32>,
    pub books_read: i32,
    pub pages_read: i64,
    /// Books-based, capped at 100.
    pub percentage: f64,
    pub status: GoalStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NewGoal {
    pub year: i32,
    pub target_books: i32,
    pub target_pages: Option<i32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GoalPatch {
    pub target_books: Option<i32>,
    pub target_pages: Option<i32>,
    pub status: Option<GoalStatus>,
}
