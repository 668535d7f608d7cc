//! Book catalog entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

pub const TITLE_MAX: usize = 200;
pub const AUTHOR_MIN: usize = 2;
pub const AUTHOR_MAX: usize = 100;
pub const SYNOPSIS_MAX: usize = 2000;
pub const MIN_YEAR: i32 = 1000;
pub const MIN_PAGES: i32 = 1;
pub const MAX_PAGES: i32 = 10_000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub year: i32,
    pub genre: Genre,
    pub page_count: i32,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub synopsis: Option<String>,
    /// Storage key of the uploaded cover image.
    #[serde(default)]
    pub cover: Option<String>,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub enum Genre {
    #[serde(alias = "Ficção")]
    Fiction,
    #[serde(rename = "Non-Fiction", alias = "Não-Ficção")]
    NonFiction,
    Romance,
    #[serde(alias = "Fantasia")]
    Fantasy,
    #[serde(rename = "Science Fiction", alias = "Ficção Científica")]
    ScienceFiction,
    #[serde(alias = "Mistério")]
    Mystery,
    Thriller,
    #[serde(alias = "Terror")]
    Horror,
    #[serde(alias = "Biografia")]
    Biography,
    #[serde(alias = "História")]
    History,
    #[serde(rename = "Self-Help", alias = "Autoajuda")]
    SelfHelp,
    #[serde(alias = "Negócios")]
    Business,
    #[serde(alias = "Poesia")]
    Poetry,
    Drama,
    #[serde(alias = "Aventura")]
    Adventure,
    #[serde(alias = "Infantil")]
    Children,
    #[serde(rename = "Young Adult", alias = "Jovem Adulto")]
    YoungAdult,
    #[serde(alias = "Clássico")]
    Classic,
    #[serde(alias = "Outro")]
    Other,
}

impl Genre {
    pub const ALL: [Genre; 19] = [
        Genre::Fiction,
        Genre::NonFiction,
        Genre::Romance,
        Genre::Fantasy,
        Genre::ScienceFiction,
        Genre::Mystery,
        Genre::Thriller,
        Genre::Horror,
        Genre::Biography,
        Genre::History,
        Genre::SelfHelp,
        Genre::Business,
        Genre::Poetry,
        Genre::Drama,
        Genre::Adventure,
        Genre::Children,
        Genre::YoungAdult,
        Genre::Classic,
        Genre::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Fiction => "Fiction",
            Genre::NonFiction => "Non-Fiction",
            Genre::Romance => "Romance",
            Genre::Fantasy => "Fantasy",
            Genre::ScienceFiction => "Science Fiction",
            Genre::Mystery => "Mystery",
            Genre::Thriller => "Thriller",
            Genre::Horror => "Horror",
            Genre::Biography => "Biography",
            Genre::History => "History",
            Genre::SelfHelp => "Self-Help",
            Genre::Business => "Business",
            Genre::Poetry => "Poetry",
            Genre::Drama => "Drama",
            Genre::Adventure => "Adventure",
            Genre::Children => "Children",
            Genre::YoungAdult => "Young Adult",
            Genre::Classic => "Classic",
            Genre::Other => "Other",
        }
    }

    /// Name used by the Portuguese web client.
    pub fn portuguese(&self) -> &'static str {
        match self {
            Genre::Fiction => "Ficção",
            Genre::NonFiction => "Não-Ficção",
            Genre::Romance => "Romance",
            Genre::Fantasy => "Fantasia",
            Genre::ScienceFiction => "Ficção Científica",
            Genre::Mystery => "Mistério",
            Genre::Thriller => "Thriller",
            Genre::Horror => "Terror",
            Genre::Biography => "Biografia",
            Genre::History => "História",
            Genre::SelfHelp => "Autoajuda",
            Genre::Business => "Negócios",
            Genre::Poetry => "Poesia",
            Genre::Drama => "Drama",
            Genre::Adventure => "Aventura",
            Genre::Children => "Infantil",
            Genre::YoungAdult => "Jovem Adulto",
            Genre::Classic => "Clássico",
            Genre::Other => "Outro",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Genre::as_str).collect()
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Genre {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Genre::ALL
            .iter()
            .copied()
            .find(|g| {
                g.as_str().eq_ignore_ascii_case(s) || g.portuguese().to_lowercase() == s.to_lowercase()
            })
            .ok_or_else(|| format!("unknown genre: {}", s))
    }
}

/// Validated input for creating a book.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub year: i32,
    pub genre: Genre,
    pub page_count: i32,
    pub isbn: Option<String>,
    pub synopsis: Option<String>,
}

/// Validated partial update. `None` leaves the column untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<i32>,
    pub genre: Option<Genre>,
    pub page_count: Option<i32>,
    pub isbn: Option<String>,
    pub synopsis: Option<String>,
}

impl BookPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.year.is_none()
            && self.genre.is_none()
            && self.page_count.is_none()
            && self.isbn.is_none()
            && self.synopsis.is_none()
    }

    pub fn apply(&self, book: &mut Book) {
        if let Some(v) = &self.title {
            book.title = v.clone();
        }
        if let Some(v) = &self.author {
            book.author = v.clone();
        }
        if let Some(v) = self.year {
            book.year = v;
        }
        if let Some(v) = self.genre {
            book.genre = v;
        }
        if let Some(v) = self.page_count {
            book.page_count = v;
        }
        if let Some(v) = &self.isbn {
            book.isbn = Some(v.clone());
        }
        if let Some(v) = &self.synopsis {
            book.synopsis = Some(v.clone());
        }
    }
}

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 200;

/// List filters. `search` matches title or author, case-insensitively.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookFilter {
    pub search: Option<String>,
    pub genre: Option<Genre>,
    pub author: Option<String>,
    /// 1-based.
    pub page: u32,
    pub limit: u32,
}

impl Default for BookFilter {
    fn default() -> Self {
        BookFilter {
            search: None,
            genre: None,
            author: None,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl BookFilter {
    pub fn offset(&self) -> u32 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    pub fn matches(&self, book: &Book) -> bool {
        if let Some(g) = self.genre {
            if book.genre != g {
                return false;
            }
        }
        if let Some(a) = &self.author {
            if !book.author.to_lowercase().contains(&a.to_lowercase()) {
                return false;
            }
        }
        if let Some(s) = &self.search {
            let s = s.to_lowercase();
            if !book.title.to_lowercase().contains(&s) && !book.author.to_lowercase().contains(&s) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genre_names_round_trip_through_serde() {
        for g in Genre::ALL {
            let json = serde_json::to_value(g).unwrap();
            assert_eq!(json, serde_json::Value::String(g.as_str().to_string()));
            assert_eq!(g.as_str().parse::<Genre>().unwrap(), g);
        }
    }

    #[test]
    fn genre_parse_ignores_case() {
        assert_eq!("science fiction".parse::<Genre>(), Ok(Genre::ScienceFiction));
        assert!("Cookbook".parse::<Genre>().is_err());
    }

    #[test]
    fn genre_accepts_portuguese_names() {
        assert_eq!("Ficção Científica".parse::<Genre>(), Ok(Genre::ScienceFiction));
        assert_eq!("fantasia".parse::<Genre>(), Ok(Genre::Fantasy));
        assert_eq!("Jovem Adulto".parse::<Genre>(), Ok(Genre::YoungAdult));
        let parsed: Genre = serde_json::from_value(serde_json::json!("Autoajuda")).unwrap();
        assert_eq!(parsed, Genre::SelfHelp);
        assert_eq!(serde_json::to_value(Genre::Horror).unwrap(), serde_json::json!("Horror"));
    }

    #[test]
    fn filter_offset_is_page_based() {
        let f = BookFilter { page: 3, limit: 20, ..Default::default() };
        assert_eq!(f.offset(), 40);
        let f = BookFilter { page: 0, ..Default::default() };
        assert_eq!(f.offset(), 0);
    }
}
