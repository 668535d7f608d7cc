use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

pub const REVIEW_TEXT_MAX: usize = 2000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[serde(alias = "Pública")]
    Public,
    #[default]
    #[serde(alias = "Privada")]
    Private,
}

impl Visibility {
    pub const NAMES: [&'static str; 2] = ["public", "private"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "public" | "pública" | "publica" => Ok(Visibility::Public),
            "private" | "privada" => Ok(Visibility::Private),
            other => Err(format!("unknown visibility: {}", other)),
        }
    }
}

/// At most one per (book, owner).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub book_id: Uuid,
    pub owner_id: String,
    pub rating: i32,
    #[serde(default)]
    pub text: Option<String>,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NewReview {
    pub rating: i32,
    pub text: Option<String>,
    pub visibility: Visibility,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReviewPatch {
    pub rating: Option<i32>,
    pub text: Option<String>,
    pub visibility: Option<Visibility>,
}

/// Inclusive rating scale, configurable per deployment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingBounds {
    pub min: i32,
    pub max: i32,
}

impl Default for RatingBounds {
    fn default() -> Self {
        RatingBounds { min: 1, max: 5 }
    }
}
