//! Persistence boundary. Every call is scoped to one owner; no method ever
//! reads or writes another owner's rows.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::error::AppError;
use crate::model::*;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait LibraryStore: Send + Sync {
    /// Ordered by title, paged by `filter`.
    async fn list_books(&self, owner: &str, filter: &BookFilter) -> Result<Vec<Book>, AppError>;
    async fn get_book(&self, owner: &str, id: Uuid) -> Result<Option<Book>, AppError>;
    async fn insert_book(&self, book: Book) -> Result<Book, AppError>;
    /// `cover`, when given, replaces the stored cover key.
    async fn update_book(
        &self,
        owner: &str,
        id: Uuid,
        patch: &BookPatch,
        cover: Option<String>,
    ) -> Result<Option<Book>, AppError>;
    /// Also removes the book's shelf entry and review.
    async fn delete_book(&self, owner: &str, id: Uuid) -> Result<Option<Book>, AppError>;

    /// Most recently updated first.
    async fn list_shelf(&self, owner: &str, status: Option<ShelfStatus>) -> Result<Vec<ShelfEntry>, AppError>;
    async fn get_shelf(&self, owner: &str, book_id: Uuid) -> Result<Option<ShelfEntry>, AppError>;
    /// Insert or replace the single entry for (owner, book).
    async fn put_shelf(&self, owner: &str, book_id: Uuid, placement: &ShelfPlacement) -> Result<ShelfEntry, AppError>;
    async fn set_progress(&self, owner: &str, book_id: Uuid, current_page: i32) -> Result<Option<ShelfEntry>, AppError>;
    async fn delete_shelf(&self, owner: &str, book_id: Uuid) -> Result<Option<ShelfEntry>, AppError>;

    async fn get_review(&self, owner: &str, book_id: Uuid) -> Result<Option<Review>, AppError>;
    /// `Conflict` when the owner already reviewed the book.
    async fn insert_review(&self, review: Review) -> Result<Review, AppError>;
    async fn update_review(&self, owner: &str, book_id: Uuid, patch: &ReviewPatch) -> Result<Option<Review>, AppError>;
    async fn delete_review(&self, owner: &str, book_id: Uuid) -> Result<Option<Review>, AppError>;

    /// Ascending by year.
    async fn list_goals(&self, owner: &str) -> Result<Vec<GoalRecord>, AppError>;
    async fn get_goal(&self, owner: &str, year: i32) -> Result<Option<GoalRecord>, AppError>;
    /// `Conflict` when a goal for that year exists.
    async fn insert_goal(&self, goal: GoalRecord) -> Result<GoalRecord, AppError>;
    async fn update_goal(&self, owner: &str, year: i32, patch: &GoalPatch) -> Result<Option<GoalRecord>, AppError>;

    /// All books, shelf entries and reviews of one owner.
    async fn snapshot(&self, owner: &str) -> Result<LibrarySnapshot, AppError>;

    /// Cheap round trip used by `/ready`.
    async fn ping(&self) -> Result<(), AppError>;
}
