//! Reading statistics derived from an owner's snapshot.
//!
//! A book counts as read in a period when its shelf entry is `read` and its
//! `finished_at` falls inside the period.

use crate::model::*;
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

const TOP_N: usize = 5;

fn round(x: f64, places: i32) -> f64 {
    let f = 10f64.powi(places);
    (x * f).round() / f
}

fn month_start(year: i32, month: u32) -> Option<DateTime<Utc>> {
    let date = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

/// Half-open `[start, end)` plus the number of days and calendar months it spans.
struct Window {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    days: i64,
    months: i64,
}

impl Window {
    fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t < self.end
    }
}

fn calendar_window(query: &StatisticsQuery) -> Option<Window> {
    let year = query.year?;
    let (start, end, months) = match (query.period, query.month) {
        (Period::Monthly, Some(m)) => {
            let (ny, nm) = if m == 12 { (year + 1, 1) } else { (year, m + 1) };
            (month_start(year, m)?, month_start(ny, nm)?, 1)
        }
        (Period::Yearly, _) => (month_start(year, 1)?, month_start(year + 1, 1)?, 12),
        _ => return None,
    };
    Some(Window {
        start,
        end,
        days: (end - start).num_days(),
        months,
    })
}

/// From the first finish to the last, inclusive of both days and months.
fn all_time_window(finishes: &[DateTime<Utc>]) -> Option<Window> {
    let first = *finishes.iter().min()?;
    let last = *finishes.iter().max()?;
    let months = (last.year() as i64 * 12 + last.month() as i64) - (first.year() as i64 * 12 + first.month() as i64) + 1;
    Some(Window {
        start: first,
        end: last + chrono::Duration::seconds(1),
        days: (last.date_naive() - first.date_naive()).num_days() + 1,
        months,
    })
}

struct ReadBook<'a> {
    book: &'a Book,
    entry: &'a ShelfEntry,
    finished: DateTime<Utc>,
}

fn ranked<K: Ord + Clone>(counts: HashMap<K, u32>) -> Vec<(K, u32)> {
    let mut v: Vec<(K, u32)> = counts.into_iter().collect();
    v.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    v.truncate(TOP_N);
    v
}

fn percentage(count: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        round(count as f64 / total as f64 * 100.0, 1)
    }
}

pub fn compute(owner: &str, query: &StatisticsQuery, snapshot: &LibrarySnapshot) -> Statistics {
    let books: HashMap<Uuid, &Book> = snapshot.books.iter().map(|b| (b.id, b)).collect();
    let finished: Vec<ReadBook<'_>> = snapshot
        .shelves
        .iter()
        .filter(|e| e.status == ShelfStatus::Read)
        .filter_map(|e| {
            let book = books.get(&e.book_id)?;
            Some(ReadBook {
                book,
                entry: e,
                finished: e.finished_at?,
            })
        })
        .collect();

    let window = match query.period {
        Period::AllTime => all_time_window(&finished.iter().map(|r| r.finished).collect::<Vec<_>>()),
        _ => calendar_window(query),
    };
    let in_period: Vec<&ReadBook<'_>> = match (&window, query.period) {
        (_, Period::AllTime) => finished.iter().collect(),
        (Some(w), _) => finished.iter().filter(|r| w.contains(r.finished)).collect(),
        (None, _) => Vec::new(),
    };

    let total_books_read = in_period.len() as u32;
    let total_pages_read: i64 = in_period.iter().map(|r| r.book.page_count as i64).sum();
    let (avg_books_per_month, avg_pages_per_day) = match &window {
        Some(w) if total_books_read > 0 => (
            round(total_books_read as f64 / w.months.max(1) as f64, 2),
            round(total_pages_read as f64 / w.days.max(1) as f64, 2),
        ),
        _ => (0.0, 0.0),
    };

    let mut genres: HashMap<&'static str, u32> = HashMap::new();
    let mut authors: HashMap<String, u32> = HashMap::new();
    for r in &in_period {
        *genres.entry(r.book.genre.as_str()).or_default() += 1;
        *authors.entry(r.book.author.clone()).or_default() += 1;
    }
    let top_genres = ranked(genres)
        .into_iter()
        .map(|(genre, count)| GenreCount {
            genre: genre.to_string(),
            count,
            percentage: percentage(count, total_books_read),
        })
        .collect();
    let top_authors = ranked(authors)
        .into_iter()
        .map(|(author, count)| AuthorCount {
            author,
            count,
            percentage: percentage(count, total_books_read),
        })
        .collect();

    let ratings: Vec<i32> = snapshot
        .reviews
        .iter()
        .filter(|r| match (&window, query.period) {
            (_, Period::AllTime) => true,
            (Some(w), _) => w.contains(r.created_at),
            (None, _) => false,
        })
        .map(|r| r.rating)
        .collect();
    let average_rating = if ratings.is_empty() {
        0.0
    } else {
        round(ratings.iter().sum::<i32>() as f64 / ratings.len() as f64, 2)
    };

    let mut monthly_distribution: Vec<MonthBucket> = (1..=12)
        .map(|month| MonthBucket { month, books: 0, pages: 0 })
        .collect();
    for r in &in_period {
        let bucket = &mut monthly_distribution[r.finished.month0() as usize];
        bucket.books += 1;
        bucket.pages += r.book.page_count as i64;
    }

    let durations: Vec<i64> = in_period
        .iter()
        .filter_map(|r| {
            let started = r.entry.started_at?;
            Some((r.finished.date_naive() - started.date_naive()).num_days().max(0))
        })
        .collect();
    let average_reading_days = if durations.is_empty() {
        0.0
    } else {
        round(durations.iter().sum::<i64>() as f64 / durations.len() as f64, 1)
    };

    let mut by_year: BTreeMap<i32, i64> = BTreeMap::new();
    for r in &finished {
        *by_year.entry(r.finished.year()).or_default() += r.book.page_count as i64;
    }
    let pages_by_year = by_year
        .into_iter()
        .map(|(year, total_pages)| YearPages { year, total_pages })
        .collect();

    Statistics {
        owner_id: owner.to_string(),
        period: query.period,
        year: query.year,
        month: query.month,
        total_books_read,
        total_pages_read,
        avg_books_per_month,
        avg_pages_per_day,
        top_genres,
        top_authors,
        average_rating,
        monthly_distribution,
        average_reading_days,
        pages_by_year,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Library {
        snap: LibrarySnapshot,
    }

    impl Library {
        fn new() -> Self {
            Library { snap: LibrarySnapshot::default() }
        }

        fn read(&mut self, author: &str, genre: Genre, pages: i32, started: Option<(i32, u32, u32)>, finished: (i32, u32, u32)) -> Uuid {
            let ts = |(y, m, d): (i32, u32, u32)| Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap();
            let book = Book {
                id: Uuid::new_v4(),
                title: format!("{} book", author),
                author: author.into(),
                year: 2000,
                genre,
                page_count: pages,
                isbn: None,
                synopsis: None,
                cover: None,
                owner_id: "ana".into(),
                created_at: ts(finished),
            };
            self.snap.shelves.push(ShelfEntry {
                id: Uuid::new_v4(),
                status: ShelfStatus::Read,
                book_id: book.id,
                owner_id: "ana".into(),
                added_at: ts(finished),
                started_at: started.map(ts),
                finished_at: Some(ts(finished)),
                current_page: None,
                updated_at: ts(finished),
            });
            let id = book.id;
            self.snap.books.push(book);
            id
        }

        fn review(&mut self, book_id: Uuid, rating: i32, created: (i32, u32, u32)) {
            self.snap.reviews.push(Review {
                id: Uuid::new_v4(),
                book_id,
                owner_id: "ana".into(),
                rating,
                text: None,
                visibility: Visibility::Private,
                created_at: Utc.with_ymd_and_hms(created.0, created.1, created.2, 0, 0, 0).unwrap(),
                updated_at: None,
            });
        }
    }

    #[test]
    fn yearly_counts_only_finishes_inside_the_year() {
        let mut lib = Library::new();
        lib.read("Rosa", Genre::Fiction, 300, Some((2024, 1, 1)), (2024, 1, 11));
        lib.read("Rosa", Genre::Fiction, 200, None, (2024, 12, 31));
        lib.read("Amado", Genre::Romance, 500, None, (2023, 12, 31));

        let s = compute("ana", &StatisticsQuery::yearly(2024), &lib.snap);
        assert_eq!(s.total_books_read, 2);
        assert_eq!(s.total_pages_read, 500);
        assert_eq!(s.avg_books_per_month, round(2.0 / 12.0, 2));
        assert_eq!(s.avg_pages_per_day, round(500.0 / 366.0, 2));
        assert_eq!(s.top_genres, vec![GenreCount { genre: "Fiction".into(), count: 2, percentage: 100.0 }]);
        assert_eq!(s.monthly_distribution.len(), 12);
        assert_eq!(s.monthly_distribution[0].books, 1);
        assert_eq!(s.monthly_distribution[11].pages, 200);
        assert_eq!(s.average_reading_days, 10.0);
        // pages_by_year ignores the period.
        assert_eq!(
            s.pages_by_year,
            vec![YearPages { year: 2023, total_pages: 500 }, YearPages { year: 2024, total_pages: 500 }]
        );
    }

    #[test]
    fn monthly_uses_the_calendar_month() {
        let mut lib = Library::new();
        lib.read("Rosa", Genre::Fiction, 290, None, (2024, 2, 10));
        lib.read("Rosa", Genre::Fiction, 100, None, (2024, 3, 1));
        let s = compute("ana", &StatisticsQuery::monthly(2024, 2), &lib.snap);
        assert_eq!(s.total_books_read, 1);
        assert_eq!(s.avg_books_per_month, 1.0);
        assert_eq!(s.avg_pages_per_day, 10.0);

        let dec = compute("ana", &StatisticsQuery::monthly(2024, 12), &lib.snap);
        assert_eq!(dec.total_books_read, 0);
        assert_eq!(dec.avg_pages_per_day, 0.0);
    }

    #[test]
    fn all_time_spans_first_to_last_finish() {
        let mut lib = Library::new();
        lib.read("A", Genre::Fiction, 100, None, (2023, 1, 1));
        lib.read("B", Genre::Poetry, 100, None, (2023, 1, 10));
        let s = compute("ana", &StatisticsQuery::all_time(), &lib.snap);
        assert_eq!(s.total_books_read, 2);
        assert_eq!(s.avg_books_per_month, 2.0);
        assert_eq!(s.avg_pages_per_day, 20.0);
    }

    #[test]
    fn top_lists_keep_five_sorted_by_count_then_name() {
        let mut lib = Library::new();
        for (i, author) in ["F", "E", "D", "C", "B", "A"].iter().enumerate() {
            lib.read(author, Genre::Fiction, 10, None, (2024, 5, 1 + i as u32));
        }
        lib.read("F", Genre::Drama, 10, None, (2024, 5, 20));
        let s = compute("ana", &StatisticsQuery::yearly(2024), &lib.snap);
        let names: Vec<&str> = s.top_authors.iter().map(|a| a.author.as_str()).collect();
        assert_eq!(names, ["F", "A", "B", "C", "D"]);
        assert_eq!(s.top_authors[0].percentage, round(2.0 / 7.0 * 100.0, 1));
        assert_eq!(s.top_genres[0].genre, "Fiction");
        assert_eq!(s.top_genres[1].genre, "Drama");
    }

    #[test]
    fn average_rating_covers_reviews_written_in_the_period() {
        let mut lib = Library::new();
        let a = lib.read("A", Genre::Fiction, 10, None, (2024, 5, 1));
        let b = lib.read("B", Genre::Fiction, 10, None, (2023, 5, 1));
        lib.review(a, 5, (2024, 6, 1));
        lib.review(b, 2, (2024, 7, 1));
        let s = compute("ana", &StatisticsQuery::yearly(2024), &lib.snap);
        assert_eq!(s.average_rating, 3.5);
        let s = compute("ana", &StatisticsQuery::yearly(2022), &lib.snap);
        assert_eq!(s.average_rating, 0.0);
    }

    #[test]
    fn empty_library_yields_zeroes() {
        let s = compute("ana", &StatisticsQuery::all_time(), &LibrarySnapshot::default());
        assert_eq!(s.total_books_read, 0);
        assert_eq!(s.avg_books_per_month, 0.0);
        assert!(s.top_genres.is_empty());
        assert_eq!(s.monthly_distribution.len(), 12);
        assert!(s.pages_by_year.is_empty());
    }
}
