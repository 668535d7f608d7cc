//! Resolving a shelf move into the values that get stored.

use crate::error::AppError;
use crate::model::{Book, ShelfEntry, ShelfMove, ShelfPlacement, ShelfStatus};
use crate::validation::ValidationErrors;
use chrono::{DateTime, Utc};

/// Explicit dates in the move win. Otherwise:
/// * `to_read` clears both dates;
/// * `reading` keeps an existing start or starts now, and clears the finish;
/// * `read` keeps an existing start and finishes now.
///
/// Any transition is allowed, including moving back to an earlier shelf.
pub fn plan_move(existing: Option<&ShelfEntry>, mv: &ShelfMove, now: DateTime<Utc>) -> ShelfPlacement {
    let previous_start = existing.and_then(|e| e.started_at);
    let previous_page = existing.and_then(|e| e.current_page);
    match mv.status {
        ShelfStatus::ToRead => ShelfPlacement {
            status: ShelfStatus::ToRead,
            started_at: mv.started_at,
            finished_at: mv.finished_at,
            current_page: mv.current_page,
        },
        ShelfStatus::Reading => ShelfPlacement {
            status: ShelfStatus::Reading,
            started_at: mv.started_at.or(previous_start).or(Some(now)),
            finished_at: mv.finished_at,
            current_page: mv.current_page.or(previous_page),
        },
        ShelfStatus::Read => ShelfPlacement {
            status: ShelfStatus::Read,
            started_at: mv.started_at.or(previous_start),
            finished_at: mv.finished_at.or(Some(now)),
            current_page: mv.current_page.or(previous_page),
        },
    }
}

/// Checks the stored dates, not just the ones sent: a move can pair an old
/// start with a new finish, or a new start with an implied finish of now.
pub fn check_dates(placement: &ShelfPlacement) -> Result<(), AppError> {
    if let (Some(started), Some(finished)) = (placement.started_at, placement.finished_at) {
        if finished < started {
            return Err(ValidationErrors::single(
                "finished_at",
                format!("finished_at cannot be before started_at ({})", started.to_rfc3339()),
            )
            .into());
        }
    }
    Ok(())
}

/// A page position must lie within the book.
pub fn check_page(book: &Book, current_page: i32) -> Result<(), AppError> {
    if current_page > book.page_count {
        return Err(ValidationErrors::single(
            "current_page",
            format!("current_page cannot exceed the book's {} pages", book.page_count),
        )
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
    }

    fn mv(status: ShelfStatus) -> ShelfMove {
        ShelfMove {
            status,
            started_at: None,
            finished_at: None,
            current_page: None,
        }
    }

    fn entry(started: Option<DateTime<Utc>>, page: Option<i32>) -> ShelfEntry {
        ShelfEntry {
            id: Uuid::new_v4(),
            status: ShelfStatus::Reading,
            book_id: Uuid::new_v4(),
            owner_id: "ana".into(),
            added_at: at(1),
            started_at: started,
            finished_at: None,
            current_page: page,
            updated_at: at(1),
        }
    }

    #[test]
    fn starting_to_read_stamps_the_start_once() {
        let p = plan_move(None, &mv(ShelfStatus::Reading), at(5));
        assert_eq!(p.started_at, Some(at(5)));
        assert_eq!(p.finished_at, None);

        let existing = entry(Some(at(2)), Some(30));
        let p = plan_move(Some(&existing), &mv(ShelfStatus::Reading), at(5));
        assert_eq!(p.started_at, Some(at(2)));
        assert_eq!(p.current_page, Some(30));
    }

    #[test]
    fn finishing_stamps_the_finish_and_keeps_the_start() {
        let existing = entry(Some(at(2)), Some(100));
        let p = plan_move(Some(&existing), &mv(ShelfStatus::Read), at(9));
        assert_eq!(p.started_at, Some(at(2)));
        assert_eq!(p.finished_at, Some(at(9)));
    }

    #[test]
    fn resolved_dates_must_be_ordered() {
        let existing = entry(Some(at(10)), None);
        let early_finish = ShelfMove {
            finished_at: Some(at(4)),
            ..mv(ShelfStatus::Read)
        };
        let p = plan_move(Some(&existing), &early_finish, at(20));
        assert!(check_dates(&p).is_err());

        let future_start = ShelfMove {
            started_at: Some(at(25)),
            ..mv(ShelfStatus::Read)
        };
        let p = plan_move(None, &future_start, at(20));
        assert_eq!(p.finished_at, Some(at(20)));
        assert!(check_dates(&p).is_err());

        let p = plan_move(Some(&existing), &mv(ShelfStatus::Read), at(20));
        assert!(check_dates(&p).is_ok());
    }

    #[test]
    fn explicit_dates_win() {
        let m = ShelfMove {
            status: ShelfStatus::Read,
            started_at: Some(at(1)),
            finished_at: Some(at(3)),
            current_page: None,
        };
        let p = plan_move(Some(&entry(Some(at(2)), None)), &m, at(9));
        assert_eq!((p.started_at, p.finished_at), (Some(at(1)), Some(at(3))));
    }

    #[test]
    fn back_to_to_read_resets_dates() {
        let existing = entry(Some(at(2)), Some(10));
        let p = plan_move(Some(&existing), &mv(ShelfStatus::ToRead), at(9));
        assert_eq!(p.status, ShelfStatus::ToRead);
        assert_eq!((p.started_at, p.finished_at, p.current_page), (None, None, None));
    }
}
