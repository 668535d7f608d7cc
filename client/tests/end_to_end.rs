//! Client against a live server on an ephemeral port, backed by the
//! in-memory store.

use booknest::cover::{CoverUpload, LocalCoverStore};
use booknest::model::{
    BookFilter, BookPatch, Genre, GoalPatch, GoalStatus, NewBook, NewReview, RatingBounds, ReviewPatch, ShelfMove,
    ShelfStatus, StatisticsQuery, Visibility,
};
use booknest::{app, AppState, MemoryStore};
use booknest_client::bindings::{Bindings, QueryState};
use booknest_client::{ApiClient, ClientError, Lookup, QueryCache, QueryKey, Services};
use chrono::Datelike;
use std::sync::Arc;

struct Server {
    base_url: String,
    _covers: tempfile::TempDir,
}

async fn spawn_server() -> Server {
    let covers = tempfile::tempdir().unwrap();
    let state = AppState {
        store: Arc::new(MemoryStore::new()),
        covers: Arc::new(LocalCoverStore::new(covers.path())),
        rating: RatingBounds::default(),
        cover_max_bytes: 64 * 1024,
    };
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app(state)).await.unwrap();
    });
    Server {
        base_url: format!("http://{}", addr),
        _covers: covers,
    }
}

fn services(server: &Server, owner: &str) -> Services {
    Services::new(ApiClient::new(&server.base_url, owner).unwrap())
}

fn dune() -> NewBook {
    NewBook {
        title: "Dune".into(),
        author: "Frank Herbert".into(),
        year: 1965,
        genre: Genre::ScienceFiction,
        page_count: 412,
        isbn: None,
        synopsis: Some("Spice.".into()),
    }
}

#[tokio::test]
async fn book_lifecycle_with_cover() {
    let server = spawn_server().await;
    let s = services(&server, "reader-1");
    let cover = CoverUpload {
        content_type: "image/png".into(),
        bytes: vec![0x89, b'P', b'N', b'G', 1, 2, 3],
    };

    let book = s.books.create(&dune(), Some(&cover)).await.unwrap();
    assert!(book.cover.is_some());
    assert_eq!(s.books.get(book.id).await.unwrap().title, "Dune");

    let patch = BookPatch {
        page_count: Some(500),
        ..BookPatch::default()
    };
    let updated = s.books.update(book.id, &patch, None).await.unwrap();
    assert_eq!(updated.page_count, 500);
    assert_eq!(updated.cover, book.cover);

    let listed = s.books.list(&BookFilter::default()).await.unwrap();
    assert_eq!(listed.len(), 1);

    s.books.delete(book.id).await.unwrap();
    let err = s.books.get(book.id).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn validation_failures_carry_field_messages() {
    let server = spawn_server().await;
    let s = services(&server, "reader-1");
    let mut bad = dune();
    bad.page_count = 0;
    let err = s.books.create(&bad, None).await.unwrap_err();
    assert_eq!(err.status(), Some(422));
    let fields = err.field_errors().unwrap();
    assert!(fields.contains("page_count"));
}

#[tokio::test]
async fn missing_resources_are_lookups_not_errors() {
    let server = spawn_server().await;
    let s = services(&server, "reader-1");
    let book = s.books.create(&dune(), None).await.unwrap();

    assert_eq!(s.goals.get_by_year(2024).await.unwrap(), Lookup::NotFound);
    assert_eq!(s.shelf.get_by_book(book.id).await.unwrap(), Lookup::NotFound);
    assert_eq!(s.reviews.get_by_book(book.id).await.unwrap(), Lookup::NotFound);

    let mv = ShelfMove {
        status: ShelfStatus::Reading,
        started_at: None,
        finished_at: None,
        current_page: Some(10),
    };
    s.shelf.move_to_shelf(book.id, &mv).await.unwrap();
    let entry = s.shelf.get_by_book(book.id).await.unwrap().found().unwrap();
    assert_eq!(entry.status, ShelfStatus::Reading);
    assert!(entry.started_at.is_some());

    let progressed = s.shelf.update_progress(book.id, 120).await.unwrap();
    assert_eq!(progressed.current_page, Some(120));
    let reading = s.shelf.list_by_status(Some(ShelfStatus::Reading)).await.unwrap();
    assert_eq!(reading.len(), 1);

    s.shelf.remove(book.id).await.unwrap();
    assert!(!s.shelf.get_by_book(book.id).await.unwrap().is_found());
}

#[tokio::test]
async fn owners_do_not_see_each_other() {
    let server = spawn_server().await;
    let alice = services(&server, "alice");
    let bob = services(&server, "bob");
    let book = alice.books.create(&dune(), None).await.unwrap();
    assert!(bob.books.get(book.id).await.unwrap_err().is_not_found());
    assert!(bob.books.list(&BookFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn review_mutation_invalidates_review_and_statistics() {
    let server = spawn_server().await;
    let s = services(&server, "reader-1");
    let book = s.books.create(&dune(), None).await.unwrap();

    let cache = Arc::new(QueryCache::new());
    let bindings = Bindings::new(s.clone(), cache.clone());
    let review = bindings.review(book.id);
    let stats = bindings.statistics(StatisticsQuery::all_time());
    let shelf = bindings.shelf(book.id);

    assert_eq!(review.load().await, QueryState::Ready(Lookup::NotFound));
    assert!(matches!(stats.load().await, QueryState::Ready(_)));
    assert!(matches!(shelf.load().await, QueryState::Ready(Lookup::NotFound)));
    assert!(cache.contains(&QueryKey::statistics().with("all_time")));

    let new = NewReview {
        rating: 5,
        text: Some("Loved it".into()),
        visibility: Visibility::Public,
    };
    let created = review.create(&new).await.unwrap();
    assert!(!review.creating.is_pending());
    assert!(!cache.contains(&QueryKey::statistics().with("all_time")));
    assert!(cache.contains(&QueryKey::shelf().with(book.id)));
    assert_eq!(review.state(), QueryState::Ready(Lookup::Found(created)));

    let err = review.create(&new).await.unwrap_err();
    assert_eq!(err.status(), Some(409));

    let patch = ReviewPatch {
        rating: Some(4),
        ..ReviewPatch::default()
    };
    assert_eq!(review.update(&patch).await.unwrap().rating, 4);
    review.delete().await.unwrap();
    assert_eq!(review.state(), QueryState::Ready(Lookup::NotFound));
}

#[tokio::test]
async fn finishing_a_book_moves_the_goal() {
    let server = spawn_server().await;
    let s = services(&server, "reader-1");
    let book = s.books.create(&dune(), None).await.unwrap();
    let year = chrono::Utc::now().year();

    let bindings = Bindings::new(s.clone(), Arc::new(QueryCache::new()));
    let goal = bindings.goal(year);
    assert_eq!(goal.load().await, QueryState::Ready(Lookup::NotFound));
    let created = goal.create(1, None).await.unwrap();
    assert_eq!(created.books_read, 0);
    assert_eq!(created.status, GoalStatus::Active);

    let shelf = bindings.shelf(book.id);
    shelf
        .move_to(&ShelfMove {
            status: ShelfStatus::Read,
            started_at: None,
            finished_at: None,
            current_page: None,
        })
        .await
        .unwrap();

    let state = goal.load().await;
    let progress = state.data().and_then(|g| g.as_ref().found()).unwrap();
    assert_eq!(progress.books_read, 1);
    assert_eq!(progress.percentage, 100.0);
    assert_eq!(progress.status, GoalStatus::Completed);

    let archived = goal
        .update(&GoalPatch {
            status: Some(GoalStatus::Archived),
            ..GoalPatch::default()
        })
        .await
        .unwrap();
    assert_eq!(archived.status, GoalStatus::Archived);
    assert_eq!(s.goals.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn unreachable_server_is_an_http_error() {
    let client = ApiClient::new("http://127.0.0.1:9", "reader-1").unwrap();
    let err = Services::new(client).books.list(&BookFilter::default()).await.unwrap_err();
    assert!(matches!(err, ClientError::Http(_)));
}
