//! In-process store for development (`STORE=memory`) and tests.

use super::LibraryStore;
use crate::error::AppError;
use crate::model::*;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct OwnerData {
    books: HashMap<Uuid, Book>,
    /// Keyed by book id: one entry per (owner, book).
    shelves: HashMap<Uuid, ShelfEntry>,
    reviews: HashMap<Uuid, Review>,
    goals: BTreeMap<i32, GoalRecord>,
}

#[derive(Default)]
pub struct MemoryStore {
    owners: RwLock<HashMap<String, OwnerData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LibraryStore for MemoryStore {
    async fn list_books(&self, owner: &str, filter: &BookFilter) -> Result<Vec<Book>, AppError> {
        let owners = self.owners.read().await;
        let Some(data) = owners.get(owner) else {
            return Ok(Vec::new());
        };
        let mut books: Vec<Book> = data.books.values().filter(|b| filter.matches(b)).cloned().collect();
        books.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(books
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.limit as usize)
            .collect())
    }

    async fn get_book(&self, owner: &str, id: Uuid) -> Result<Option<Book>, AppError> {
        let owners = self.owners.read().await;
        Ok(owners.get(owner).and_then(|d| d.books.get(&id)).cloned())
    }

    async fn insert_book(&self, book: Book) -> Result<Book, AppError> {
        let mut owners = self.owners.write().await;
        let data = owners.entry(book.owner_id.clone()).or_default();
        data.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn update_book(
        &self,
        owner: &str,
        id: Uuid,
        patch: &BookPatch,
        cover: Option<String>,
    ) -> Result<Option<Book>, AppError> {
        let mut owners = self.owners.write().await;
        let Some(book) = owners.get_mut(owner).and_then(|d| d.books.get_mut(&id)) else {
            return Ok(None);
        };
        patch.apply(book);
        if cover.is_some() {
            book.cover = cover;
        }
        Ok(Some(book.clone()))
    }

    async fn delete_book(&self, owner: &str, id: Uuid) -> Result<Option<Book>, AppError> {
        let mut owners = self.owners.write().await;
        let Some(data) = owners.get_mut(owner) else {
            return Ok(None);
        };
        let removed = data.books.remove(&id);
        if removed.is_some() {
            data.shelves.remove(&id);
            data.reviews.remove(&id);
        }
        Ok(removed)
    }

    async fn list_shelf(&self, owner: &str, status: Option<ShelfStatus>) -> Result<Vec<ShelfEntry>, AppError> {
        let owners = self.owners.read().await;
        let Some(data) = owners.get(owner) else {
            return Ok(Vec::new());
        };
        let mut entries: Vec<ShelfEntry> = data
            .shelves
            .values()
            .filter(|e| status.map_or(true, |s| e.status == s))
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        Ok(entries)
    }

    async fn get_shelf(&self, owner: &str, book_id: Uuid) -> Result<Option<ShelfEntry>, AppError> {
        let owners = self.owners.read().await;
        Ok(owners.get(owner).and_then(|d| d.shelves.get(&book_id)).cloned())
    }

    async fn put_shelf(&self, owner: &str, book_id: Uuid, placement: &ShelfPlacement) -> Result<ShelfEntry, AppError> {
        let mut owners = self.owners.write().await;
        let data = owners.entry(owner.to_string()).or_default();
        let now = Utc::now();
        let entry = data.shelves.entry(book_id).or_insert_with(|| ShelfEntry {
            id: Uuid::new_v4(),
            status: placement.status,
            book_id,
            owner_id: owner.to_string(),
            added_at: now,
            started_at: None,
            finished_at: None,
            current_page: None,
            updated_at: now,
        });
        entry.status = placement.status;
        entry.started_at = placement.started_at;
        entry.finished_at = placement.finished_at;
        entry.current_page = placement.current_page;
        entry.updated_at = now;
        Ok(entry.clone())
    }

    async fn set_progress(&self, owner: &str, book_id: Uuid, current_page: i32) -> Result<Option<ShelfEntry>, AppError> {
        let mut owners = self.owners.write().await;
        let Some(entry) = owners.get_mut(owner).and_then(|d| d.shelves.get_mut(&book_id)) else {
            return Ok(None);
        };
        entry.current_page = Some(current_page);
        entry.updated_at = Utc::now();
        Ok(Some(entry.clone()))
    }

    async fn delete_shelf(&self, owner: &str, book_id: Uuid) -> Result<Option<ShelfEntry>, AppError> {
        let mut owners = self.owners.write().await;
        Ok(owners.get_mut(owner).and_then(|d| d.shelves.remove(&book_id)))
    }

    async fn get_review(&self, owner: &str, book_id: Uuid) -> Result<Option<Review>, AppError> {
        let owners = self.owners.read().await;
        Ok(owners.get(owner).and_then(|d| d.reviews.get(&book_id)).cloned())
    }

    async fn insert_review(&self, review: Review) -> Result<Review, AppError> {
        let mut owners = self.owners.write().await;
        let data = owners.entry(review.owner_id.clone()).or_default();
        if data.reviews.contains_key(&review.book_id) {
            return Err(AppError::Conflict("review already exists for this book".into()));
        }
        data.reviews.insert(review.book_id, review.clone());
        Ok(review)
    }

    async fn update_review(&self, owner: &str, book_id: Uuid, patch: &ReviewPatch) -> Result<Option<Review>, AppError> {
        let mut owners = self.owners.write().await;
        let Some(review) = owners.get_mut(owner).and_then(|d| d.reviews.get_mut(&book_id)) else {
            return Ok(None);
        };
        if let Some(rating) = patch.rating {
            review.rating = rating;
        }
        if let Some(text) = &patch.text {
            review.text = Some(text.clone());
        }
        if let Some(visibility) = patch.visibility {
            review.visibility = visibility;
        }
        review.updated_at = Some(Utc::now());
        Ok(Some(review.clone()))
    }

    async fn delete_review(&self, owner: &str, book_id: Uuid) -> Result<Option<Review>, AppError> {
        let mut owners = self.owners.write().await;
        Ok(owners.get_mut(owner).and_then(|d| d.reviews.remove(&book_id)))
    }

    async fn list_goals(&self, owner: &str) -> Result<Vec<GoalRecord>, AppError> {
        let owners = self.owners.read().await;
        Ok(owners
            .get(owner)
            .map(|d| d.goals.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn get_goal(&self, owner: &str, year: i32) -> Result<Option<GoalRecord>, AppError> {
        let owners = self.owners.read().await;
        Ok(owners.get(owner).and_then(|d| d.goals.get(&year)).cloned())
    }

    async fn insert_goal(&self, goal: GoalRecord) -> Result<GoalRecord, AppError> {
        let mut owners = self.owners.write().await;
        let data = owners.entry(goal.owner_id.clone()).or_default();
        if data.goals.contains_key(&goal.year) {
            return Err(AppError::Conflict(format!("a goal for {} already exists", goal.year)));
        }
        data.goals.insert(goal.year, goal.clone());
        Ok(goal)
    }

    async fn update_goal(&self, owner: &str, year: i32, patch: &GoalPatch) -> Result<Option<GoalRecord>, AppError> {
        let mut owners = self.owners.write().await;
        let Some(goal) = owners.get_mut(owner).and_then(|d| d.goals.get_mut(&year)) else {
            return Ok(None);
        };
        if let Some(n) = patch.target_books {
            goal.target_books = n;
        }
        if let Some(n) = patch.target_pages {
            goal.target_pages = Some(n);
        }
        if let Some(s) = patch.status {
            goal.status = s;
        }
        goal.updated_at = Some(Utc::now());
        Ok(Some(goal.clone()))
    }

    async fn snapshot(&self, owner: &str) -> Result<LibrarySnapshot, AppError> {
        let owners = self.owners.read().await;
        Ok(owners
            .get(owner)
            .map(|d| LibrarySnapshot {
                books: d.books.values().cloned().collect(),
                shelves: d.shelves.values().cloned().collect(),
                reviews: d.reviews.values().cloned().collect(),
            })
            .unwrap_or_default())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(owner: &str, title: &str) -> Book {
        Book {
            id: Uuid::new_v4(),
            title: title.into(),
            author: "Clarice Lispector".into(),
            year: 1977,
            genre: Genre::Fiction,
            page_count: 88,
            isbn: None,
            synopsis: None,
            cover: None,
            owner_id: owner.into(),
            created_at: Utc::now(),
        }
    }

    fn review(owner: &str, book_id: Uuid) -> Review {
        Review {
            id: Uuid::new_v4(),
            book_id,
            owner_id: owner.into(),
            rating: 4,
            text: None,
            visibility: Visibility::Private,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn placement(status: ShelfStatus) -> ShelfPlacement {
        ShelfPlacement {
            status,
            started_at: None,
            finished_at: None,
            current_page: None,
        }
    }

    #[tokio::test]
    async fn owners_never_see_each_other() {
        let store = MemoryStore::new();
        let b = store.insert_book(book("ana", "A Hora da Estrela")).await.unwrap();
        assert!(store.get_book("bruno", b.id).await.unwrap().is_none());
        assert!(store.list_books("bruno", &BookFilter::default()).await.unwrap().is_empty());
        assert!(store.delete_book("bruno", b.id).await.unwrap().is_none());
        assert!(store.get_book("ana", b.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn list_is_sorted_and_paged() {
        let store = MemoryStore::new();
        for t in ["C", "A", "B"] {
            store.insert_book(book("ana", t)).await.unwrap();
        }
        let filter = BookFilter { page: 2, limit: 2, ..Default::default() };
        let page = store.list_books("ana", &filter).await.unwrap();
        assert_eq!(page.iter().map(|b| b.title.as_str()).collect::<Vec<_>>(), ["C"]);
    }

    #[tokio::test]
    async fn shelf_is_one_entry_per_book() {
        let store = MemoryStore::new();
        let b = store.insert_book(book("ana", "A")).await.unwrap();
        let first = store.put_shelf("ana", b.id, &placement(ShelfStatus::ToRead)).await.unwrap();
        let second = store.put_shelf("ana", b.id, &placement(ShelfStatus::Reading)).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.added_at, second.added_at);
        let all = store.list_shelf("ana", None).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status, ShelfStatus::Reading);
        assert!(store.list_shelf("ana", Some(ShelfStatus::ToRead)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn second_review_conflicts() {
        let store = MemoryStore::new();
        let b = store.insert_book(book("ana", "A")).await.unwrap();
        store.insert_review(review("ana", b.id)).await.unwrap();
        let err = store.insert_review(review("ana", b.id)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        // Another owner may review the same book id.
        store.insert_review(review("bruno", b.id)).await.unwrap();
    }

    #[tokio::test]
    async fn deleting_a_book_cascades() {
        let store = MemoryStore::new();
        let b = store.insert_book(book("ana", "A")).await.unwrap();
        store.put_shelf("ana", b.id, &placement(ShelfStatus::Read)).await.unwrap();
        store.insert_review(review("ana", b.id)).await.unwrap();
        store.delete_book("ana", b.id).await.unwrap();
        assert!(store.get_shelf("ana", b.id).await.unwrap().is_none());
        assert!(store.get_review("ana", b.id).await.unwrap().is_none());
        let snap = store.snapshot("ana").await.unwrap();
        assert!(snap.books.is_empty() && snap.shelves.is_empty() && snap.reviews.is_empty());
    }

    #[tokio::test]
    async fn progress_keeps_status() {
        let store = MemoryStore::new();
        let b = store.insert_book(book("ana", "A")).await.unwrap();
        store.put_shelf("ana", b.id, &placement(ShelfStatus::ToRead)).await.unwrap();
        let e = store.set_progress("ana", b.id, 40).await.unwrap().unwrap();
        assert_eq!(e.current_page, Some(40));
        assert_eq!(e.status, ShelfStatus::ToRead);
        assert!(store.set_progress("ana", Uuid::new_v4(), 1).await.unwrap().is_none());
    }
}
