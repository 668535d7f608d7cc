//! Goal progress, computed from the owner's finished books.

use crate::model::{Goal, GoalRecord, GoalStatus, LibrarySnapshot, ShelfStatus};
use chrono::Datelike;
use std::collections::HashMap;

/// Books and pages finished within `year`.
fn finished_in(year: i32, snapshot: &LibrarySnapshot) -> (i32, i64) {
    let pages: HashMap<_, _> = snapshot.books.iter().map(|b| (b.id, b.page_count)).collect();
    snapshot
        .shelves
        .iter()
        .filter(|e| e.status == ShelfStatus::Read)
        .filter(|e| e.finished_at.is_some_and(|f| f.year() == year))
        .filter_map(|e| pages.get(&e.book_id))
        .fold((0, 0), |(books, total), p| (books + 1, total + *p as i64))
}

pub fn with_progress(record: GoalRecord, snapshot: &LibrarySnapshot) -> Goal {
    let (books_read, pages_read) = finished_in(record.year, snapshot);
    let percentage = if record.target_books > 0 {
        let raw = books_read as f64 / record.target_books as f64 * 100.0;
        (raw.min(100.0) * 10.0).round() / 10.0
    } else {
        0.0
    };
    let pages_met = record.target_pages.map_or(true, |t| pages_read >= t as i64);
    // A status set by the owner sticks; only an active goal is derived.
    let status = match record.status {
        GoalStatus::Active if books_read >= record.target_books && pages_met => GoalStatus::Completed,
        stored => stored,
    };
    Goal {
        id: record.id,
        owner_id: record.owner_id,
        year: record.year,
        target_books: record.target_books,
        target_pages: record.target_pages,
        books_read,
        pages_read,
        percentage,
        status,
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}
