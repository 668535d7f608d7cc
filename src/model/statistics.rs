//! Reading statistics. Derived on every request, never stored.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    #[serde(alias = "Mensal")]
    Monthly,
    #[serde(alias = "Anual")]
    Yearly,
    #[serde(alias = "Todo o Tempo")]
    AllTime,
}

impl Period {
    pub const NAMES: [&'static str; 3] = ["monthly", "yearly", "all_time"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Monthly => "monthly",
            Period::Yearly => "yearly",
            Period::AllTime => "all_time",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" | "mensal" => Ok(Period::Monthly),
            "yearly" | "anual" => Ok(Period::Yearly),
            "all_time" | "all-time" | "todo o tempo" => Ok(Period::AllTime),
            other => Err(format!("unknown period: {}", other)),
        }
    }
}

/// Validated statistics query. `year` is set for monthly and yearly,
/// `month` (1..=12) only for monthly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct StatisticsQuery {
    pub period: Period,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl StatisticsQuery {
    pub fn all_time() -> Self {
        StatisticsQuery {
            period: Period::AllTime,
            year: None,
            month: None,
        }
    }

    pub fn yearly(year: i32) -> Self {
        StatisticsQuery {
            period: Period::Yearly,
            year: Some(year),
            month: None,
        }
    }

    pub fn monthly(year: i32, month: u32) -> Self {
        StatisticsQuery {
            period: Period::Monthly,
            year: Some(year),
            month: Some(month),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GenreCount {
    pub genre: String,
    pub count: u32,
    pub percentage: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuthorCount {
    pub author: String,
    pub count: u32,
    pub percentage: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MonthBucket {
    pub month: u32,
    pub books: u32,
    pub pages: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct YearPages {
    pub year: i32,
    pub total_pages: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Statistics {
    pub owner_id: String,
    pub period: Period,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub month: Option<u32>,
    pub total_books_read: u32,
    pub total_pages_read: i64,
    pub avg_books_per_month: f64,
    pub avg_pages_per_day: f64,
    pub top_genres: Vec<GenreCount>,
    pub top_authors: Vec<AuthorCount>,
    /// Mean rating of reviews written in the period; 0 when there are none.
    pub average_rating: f64,
    /// Always twelve buckets, January first.
    pub monthly_distribution: Vec<MonthBucket>,
    pub average_reading_days: f64,
    /// Pages of finished books per year over all time, ascending.
    pub pages_by_year: Vec<YearPages>,
}
