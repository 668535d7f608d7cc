//! Per-user reading status of a book.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ShelfStatus {
    #[serde(alias = "Quero Ler")]
    ToRead,
    #[serde(alias = "Lendo")]
    Reading,
    #[serde(alias = "Lido")]
    Read,
}

impl ShelfStatus {
    pub const NAMES: [&'static str; 3] = ["to_read", "reading", "read"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShelfStatus::ToRead => "to_read",
            ShelfStatus::Reading => "reading",
            ShelfStatus::Read => "read",
        }
    }
}

impl fmt::Display for ShelfStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShelfStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "to_read" | "to-read" | "quero ler" => Ok(ShelfStatus::ToRead),
            "reading" | "lendo" => Ok(ShelfStatus::Reading),
            "read" | "lido" => Ok(ShelfStatus::Read),
            other => Err(format!("unknown shelf status: {}", other)),
        }
    }
}

/// One entry per (book, owner).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ShelfEntry {
    pub id: Uuid,
    pub status: ShelfStatus,
    pub book_id: Uuid,
    pub owner_id: String,
    pub added_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub current_page: Option<i32>,
    pub updated_at: DateTime<Utc>,
}

/// Validated request to put a book on a shelf.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ShelfMove {
    pub status: ShelfStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub current_page: Option<i32>,
}

/// Fully resolved column values written by a shelf move.
#[derive(Clone, Debug, PartialEq)]
pub struct ShelfPlacement {
    pub status: ShelfStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub current_page: Option<i32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProgressUpdate {
    pub current_page: i32,
}
