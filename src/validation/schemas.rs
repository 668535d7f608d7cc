//! Composite schemas, one per request shape.

use super::{rules, Fields, ValidationErrors};
use crate::model::*;
use serde_json::{Map, Value};

/// Publication year in `MIN_YEAR..=current_year`, with year-specific messages.
fn publication_year(v: &Value, current_year: i32) -> Result<i32, String> {
    let n = rules::integer(v)?;
    if n < MIN_YEAR as i64 {
        return Err(format!("must be {} or later", MIN_YEAR));
    }
    if n > current_year as i64 {
        return Err(format!("cannot be later than {}", current_year));
    }
    Ok(n as i32)
}

fn page_count(v: &Value) -> Result<i32, String> {
    rules::int32_range(v, MIN_PAGES, MAX_PAGES)
}

fn genre(v: &Value) -> Result<Genre, String> {
    rules::choice(v, &Genre::names())
}

pub fn new_book(input: &Map<String, Value>, current_year: i32) -> Result<NewBook, ValidationErrors> {
    let mut f = Fields::new(input);
    let title = f.required("title", |v| rules::text(v, 1, TITLE_MAX));
    let author = f.required("author", |v| rules::text(v, AUTHOR_MIN, AUTHOR_MAX));
    let year = f.required("year", |v| publication_year(v, current_year));
    let genre = f.required("genre", genre);
    let page_count = f.required("page_count", page_count);
    let isbn = f.optional("isbn", rules::isbn);
    let synopsis = f.optional("synopsis", |v| rules::text(v, 1, SYNOPSIS_MAX));

    let (Some(title), Some(author), Some(year), Some(genre), Some(page_count)) =
        (title, author, year, genre, page_count)
    else {
        return Err(f.into_errors());
    };
    f.finish()?;
    Ok(NewBook {
        title,
        author,
        year,
        genre,
        page_count,
        isbn,
        synopsis,
    })
}

/// Validates only the fields present. An empty patch is allowed here because
/// a book update may carry nothing but a new cover.
pub fn book_patch(input: &Map<String, Value>, current_year: i32) -> Result<BookPatch, ValidationErrors> {
    let mut f = Fields::new(input);
    let patch = BookPatch {
        title: f.optional("title", |v| rules::text(v, 1, TITLE_MAX)),
        author: f.optional("author", |v| rules::text(v, AUTHOR_MIN, AUTHOR_MAX)),
        year: f.optional("year", |v| publication_year(v, current_year)),
        genre: f.optional("genre", genre),
        page_count: f.optional("page_count", page_count),
        isbn: f.optional("isbn", rules::isbn),
        synopsis: f.optional("synopsis", |v| rules::text(v, 1, SYNOPSIS_MAX)),
    };
    f.finish()?;
    Ok(patch)
}

pub fn book_filter(input: &Map<String, Value>) -> Result<BookFilter, ValidationErrors> {
    let mut f = Fields::new(input);
    let filter = BookFilter {
        search: f.optional("search", |v| rules::text(v, 1, TITLE_MAX)),
        genre: f.optional("genre", genre),
        author: f.optional("author", |v| rules::text(v, 1, AUTHOR_MAX)),
        page: f
            .optional("page", rules::positive_id)
            .map(|n| n.min(u32::MAX as i64) as u32)
            .unwrap_or(1),
        limit: f
            .optional("limit", |v| rules::int_range(v, 1, MAX_PAGE_SIZE as i64))
            .map(|n| n as u32)
            .unwrap_or(DEFAULT_PAGE_SIZE),
    };
    f.finish()?;
    Ok(filter)
}

fn shelf_status(v: &Value) -> Result<ShelfStatus, String> {
    rules::choice(v, &ShelfStatus::NAMES)
}

fn current_page(v: &Value) -> Result<i32, String> {
    rules::int32_range(v, 0, MAX_PAGES)
}

fn read_shelf_move(f: &mut Fields<'_>) -> Option<ShelfMove> {
    let status = f.required("status", shelf_status);
    let started_at = f.optional("started_at", rules::datetime);
    let finished_at = f.optional("finished_at", rules::datetime);
    let current_page = f.optional("current_page", current_page);
    if let (Some(s), Some(e)) = (started_at, finished_at) {
        if e < s {
            f.reject("finished_at", "finished_at cannot be before started_at");
        }
    }
    Some(ShelfMove {
        status: status?,
        started_at,
        finished_at,
        current_page,
    })
}

pub fn shelf_move(input: &Map<String, Value>) -> Result<ShelfMove, ValidationErrors> {
    let mut f = Fields::new(input);
    let Some(mv) = read_shelf_move(&mut f) else {
        return Err(f.into_errors());
    };
    f.finish()?;
    Ok(mv)
}

/// `POST /shelf`: the book id travels in the body.
pub fn shelf_entry(input: &Map<String, Value>) -> Result<(uuid::Uuid, ShelfMove), ValidationErrors> {
    let mut f = Fields::new(input);
    let book_id = f.required("book_id", rules::uuid);
    let mv = read_shelf_move(&mut f);
    let (Some(book_id), Some(mv)) = (book_id, mv) else {
        return Err(f.into_errors());
    };
    f.finish()?;
    Ok((book_id, mv))
}

pub fn shelf_status_filter(input: &Map<String, Value>) -> Result<Option<ShelfStatus>, ValidationErrors> {
    let mut f = Fields::new(input);
    let status = f.optional("status", shelf_status);
    f.finish()?;
    Ok(status)
}

pub fn progress_update(input: &Map<String, Value>) -> Result<ProgressUpdate, ValidationErrors> {
    let mut f = Fields::new(input);
    let page = f.required("current_page", current_page);
    let Some(current_page) = page else {
        return Err(f.into_errors());
    };
    f.finish()?;
    Ok(ProgressUpdate { current_page })
}

fn rating(v: &Value, bounds: RatingBounds) -> Result<i32, String> {
    rules::int32_range(v, bounds.min, bounds.max)
}

fn visibility(v: &Value) -> Result<Visibility, String> {
    rules::choice(v, &Visibility::NAMES)
}

pub fn new_review(input: &Map<String, Value>, bounds: RatingBounds) -> Result<NewReview, ValidationErrors> {
    let mut f = Fields::new(input);
    let rating = f.required("rating", |v| rating(v, bounds));
    let text = f.optional("text", |v| rules::text(v, 1, REVIEW_TEXT_MAX));
    let visibility = f.optional("visibility", visibility).unwrap_or_default();
    let Some(rating) = rating else {
        return Err(f.into_errors());
    };
    f.finish()?;
    Ok(NewReview {
        rating,
        text,
        visibility,
    })
}

pub fn review_patch(input: &Map<String, Value>, bounds: RatingBounds) -> Result<ReviewPatch, ValidationErrors> {
    let mut f = Fields::new(input);
    let patch = ReviewPatch {
        rating: f.optional("rating", |v| rating(v, bounds)),
        text: f.optional("text", |v| rules::text(v, 1, REVIEW_TEXT_MAX)),
        visibility: f.optional("visibility", visibility),
    };
    if !f.has("rating") && !f.has("text") && !f.has("visibility") {
        f.reject("body", "at least one of rating, text, visibility is required");
    }
    f.finish()?;
    Ok(patch)
}

fn goal_year(v: &Value) -> Result<i32, String> {
    rules::int32_range(v, GOAL_MIN_YEAR, GOAL_MAX_YEAR)
}

fn target_books(v: &Value) -> Result<i32, String> {
    rules::int32_range(v, 1, GOAL_MAX_BOOKS)
}

fn target_pages(v: &Value) -> Result<i32, String> {
    rules::int32_range(v, 1, GOAL_MAX_PAGES)
}

pub fn new_goal(input: &Map<String, Value>) -> Result<NewGoal, ValidationErrors> {
    let mut f = Fields::new(input);
    let year = f.required("year", goal_year);
    let target_books = f.required("target_books", target_books);
    let target_pages = f.optional("target_pages", target_pages);
    let (Some(year), Some(target_books)) = (year, target_books) else {
        return Err(f.into_errors());
    };
    f.finish()?;
    Ok(NewGoal {
        year,
        target_books,
        target_pages,
    })
}

pub fn goal_patch(input: &Map<String, Value>) -> Result<GoalPatch, ValidationErrors> {
    let mut f = Fields::new(input);
    let patch = GoalPatch {
        target_books: f.optional("target_books", target_books),
        target_pages: f.optional("target_pages", target_pages),
        status: f.optional("status", |v| rules::choice(v, &GoalStatus::NAMES)),
    };
    if !f.has("target_books") && !f.has("target_pages") && !f.has("status") {
        f.reject("body", "at least one of target_books, target_pages, status is required");
    }
    f.finish()?;
    Ok(patch)
}

/// `GET /goal?include_archived=0|1`; archived goals are listed by default.
pub fn goal_list_query(input: &Map<String, Value>) -> Result<bool, ValidationErrors> {
    let mut f = Fields::new(input);
    let include_archived = f.optional("include_archived", rules::bit).unwrap_or(true);
    f.finish()?;
    Ok(include_archived)
}

/// Portuguese query keys, mapped to the canonical ones.
const STATISTICS_ALIASES: [(&str, &str); 3] = [
    ("periodo", "period"),
    ("ano_referencia", "year"),
    ("mes_referencia", "month"),
];

pub fn statistics_query(input: &Map<String, Value>) -> Result<StatisticsQuery, ValidationErrors> {
    let mut normalized = input.clone();
    for (alias, canonical) in STATISTICS_ALIASES {
        if let Some(v) = input.get(alias) {
            normalized.entry(canonical.to_string()).or_insert_with(|| v.clone());
        }
    }
    let mut f = Fields::new(&normalized);
    let period = f.required("period", |v| rules::choice::<Period>(v, &Period::NAMES));
    let (year, month) = match period {
        Some(Period::Monthly) => (
            f.required("year", |v| rules::int32_range(v, MIN_YEAR, 9999)),
            f.required("month", |v| rules::int_range(v, 1, 12)).map(|m| m as u32),
        ),
        Some(Period::Yearly) => (
            f.required("year", |v| rules::int32_range(v, MIN_YEAR, 9999)),
            None,
        ),
        _ => (None, None),
    };
    let Some(period) = period else {
        return Err(f.into_errors());
    };
    f.finish()?;
    Ok(StatisticsQuery { period, year, month })
}
