mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn moving_to_reading_then_read_stamps_dates() {
    let app = TestApp::new();
    let id = app.book("ana", "Grande Sertão: Veredas", 600).await;

    let (status, body) = app
        .post(&format!("/api/v1/shelf/book/{}", id), "ana", json!({ "status": "reading" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let started = body["data"]["started_at"].as_str().unwrap().to_string();
    assert!(body["data"]["finished_at"].is_null());

    let (status, body) = app
        .post(&format!("/api/v1/shelf/book/{}", id), "ana", json!({ "status": "read" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "read");
    assert_eq!(body["data"]["started_at"], started.as_str());
    assert!(body["data"]["finished_at"].is_string());

    let (_, list) = app.get("/api/v1/shelf?status=read", "ana").await;
    assert_eq!(list["meta"]["count"], 1);
    let (_, list) = app.get("/api/v1/shelf?status=to_read", "ana").await;
    assert_eq!(list["meta"]["count"], 0);
}

#[tokio::test]
async fn finish_cannot_precede_the_stored_start() {
    let app = TestApp::new();
    let id = app.book("ana", "Vidas Secas", 176).await;
    let uri = format!("/api/v1/shelf/book/{}", id);

    let (status, _) = app
        .post(&uri, "ana", json!({ "status": "reading", "started_at": "2024-05-10T00:00:00Z" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = app
        .post(&uri, "ana", json!({ "status": "read", "finished_at": "2024-05-01T00:00:00Z" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"]["details"]["finished_at"].is_array());

    let (_, body) = app.get(&uri, "ana").await;
    assert_eq!(body["data"]["status"], "reading");

    let other = app.book("ana", "Angústia", 240).await;
    let (status, body) = app
        .post(
            &format!("/api/v1/shelf/book/{}", other),
            "ana",
            json!({ "status": "read", "started_at": "2999-01-01T00:00:00Z" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"]["details"]["finished_at"].is_array());
}

#[tokio::test]
async fn portuguese_status_names_are_accepted() {
    let app = TestApp::new();
    let id = app.book("ana", "Macunaíma", 200).await;
    let (status, body) = app
        .post("/api/v1/shelf", "ana", json!({ "book_id": id, "status": "Quero Ler" }))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["status"], "to_read");
}

#[tokio::test]
async fn progress_is_bounded_and_keeps_status() {
    let app = TestApp::new();
    let id = app.book("ana", "Quincas Borba", 120).await;
    let progress = format!("/api/v1/shelf/book/{}/progress", id);

    let (status, _) = app.json(Method::PATCH, &progress, "ana", Some(json!({ "current_page": 10 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.post(&format!("/api/v1/shelf/book/{}", id), "ana", json!({ "status": "to_read" }))
        .await;
    let (status, body) = app.json(Method::PATCH, &progress, "ana", Some(json!({ "current_page": 60 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["current_page"], 60);
    assert_eq!(body["data"]["status"], "to_read");

    let (status, body) = app.json(Method::PATCH, &progress, "ana", Some(json!({ "current_page": 121 }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"]["details"]["current_page"].is_array());

    let (status, _) = app.json(Method::PATCH, &progress, "ana", Some(json!({ "current_page": -1 }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn shelf_lookup_and_removal() {
    let app = TestApp::new();
    let id = app.book("ana", "Senhora", 180).await;
    let uri = format!("/api/v1/shelf/book/{}", id);
    let (status, _) = app.get(&uri, "ana").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    app.post(&uri, "ana", json!({ "status": "reading" })).await;
    let (status, _) = app.get(&uri, "ana").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.json(Method::DELETE, &uri, "ana", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.json(Method::DELETE, &uri, "ana", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn one_review_per_book() {
    let app = TestApp::new();
    let id = app.book("ana", "A Moreninha", 150).await;
    let uri = format!("/api/v1/review/book/{}", id);

    let (status, _) = app.get(&uri, "ana").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.post(&uri, "ana", json!({ "rating": 4, "text": "Leve." })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["visibility"], "private");

    let (status, body) = app.post(&uri, "ana", json!({ "rating": 5 })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "conflict");

    let (status, body) = app.json(Method::PUT, &uri, "ana", Some(json!({ "rating": 5 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["rating"], 5);
    assert_eq!(body["data"]["text"], "Leve.");

    let (status, _) = app.post(&uri, "ana", json!({ "rating": 6 })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app.json(Method::DELETE, &uri, "ana", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn review_needs_an_existing_book() {
    let app = TestApp::new();
    let uri = format!("/api/v1/review/book/{}", uuid::Uuid::new_v4());
    let (status, _) = app.post(&uri, "ana", json!({ "rating": 3 })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_book_removes_its_shelf_entry_and_review() {
    let app = TestApp::new();
    let id = app.book("ana", "Lucíola", 160).await;
    app.post(&format!("/api/v1/shelf/book/{}", id), "ana", json!({ "status": "read" })).await;
    app.post(&format!("/api/v1/review/book/{}", id), "ana", json!({ "rating": 3 })).await;
    app.json(Method::DELETE, &format!("/api/v1/book/{}", id), "ana", None).await;

    let (status, _) = app.get(&format!("/api/v1/shelf/book/{}", id), "ana").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get(&format!("/api/v1/review/book/{}", id), "ana").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn goal_lookup_tracks_progress() {
    let app = TestApp::new();
    let year: i32 = chrono::Utc::now().format("%Y").to_string().parse().unwrap();

    let (status, _) = app.get(&format!("/api/v1/goal/{}", year), "ana").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .post("/api/v1/goal", "ana", json!({ "year": year, "target_books": 2 }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["books_read"], 0);
    assert_eq!(body["data"]["status"], "active");

    let (status, _) = app
        .post("/api/v1/goal", "ana", json!({ "year": year, "target_books": 5 }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    for title in ["Til", "Ubirajara"] {
        let id = app.book("ana", title, 100).await;
        app.post(&format!("/api/v1/shelf/book/{}", id), "ana", json!({ "status": "read" })).await;
    }
    let (status, body) = app.get(&format!("/api/v1/goal/{}", year), "ana").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["books_read"], 2);
    assert_eq!(body["data"]["pages_read"], 200);
    assert_eq!(body["data"]["percentage"], 100.0);
    assert_eq!(body["data"]["status"], "completed");

    let (status, body) = app
        .json(Method::PUT, &format!("/api/v1/goal/{}", year), "ana", Some(json!({ "status": "archived" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "archived");

    let (_, list) = app.get("/api/v1/goal", "ana").await;
    assert_eq!(list["meta"]["count"], 1);
    let (_, list) = app.get("/api/v1/goal?include_archived=0", "ana").await;
    assert_eq!(list["meta"]["count"], 0);
    let (_, list) = app.get("/api/v1/goal?include_archived=true", "ana").await;
    assert_eq!(list["meta"]["count"], 1);
    let (status, body) = app.get("/api/v1/goal?include_archived=maybe", "ana").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"]["details"]["include_archived"].is_array());
}

#[tokio::test]
async fn goal_year_is_range_checked() {
    let app = TestApp::new();
    let (status, body) = app
        .post("/api/v1/goal", "ana", json!({ "year": 1800, "target_books": 0 }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"]["details"]["year"].is_array());
    assert!(body["error"]["details"]["target_books"].is_array());

    let (status, _) = app.get("/api/v1/goal/next-year", "ana").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn statistics_follow_the_shelf() {
    let app = TestApp::new();
    let a = app.book("ana", "Claro Enigma", 100).await;
    let b = app.book("ana", "Sentimento do Mundo", 50).await;
    app.post(
        &format!("/api/v1/shelf/book/{}", a),
        "ana",
        json!({ "status": "read", "started_at": "2023-03-01T00:00:00Z", "finished_at": "2023-03-11T00:00:00Z" }),
    )
    .await;
    app.post(
        &format!("/api/v1/shelf/book/{}", b),
        "ana",
        json!({ "status": "read", "finished_at": "2023-07-01T12:00:00Z" }),
    )
    .await;

    let (status, body) = app.get("/api/v1/statistics?periodo=Anual&ano_referencia=2023", "ana").await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let s = &body["data"];
    assert_eq!(s["period"], "yearly");
    assert_eq!(s["total_books_read"], 2);
    assert_eq!(s["total_pages_read"], 150);
    assert_eq!(s["top_genres"][0]["genre"], "Classic");
    assert_eq!(s["monthly_distribution"].as_array().unwrap().len(), 12);
    assert_eq!(s["monthly_distribution"][2]["books"], 1);
    assert_eq!(s["average_reading_days"], 10.0);

    let (_, body) = app.get("/api/v1/statistics?period=monthly&year=2023&month=7", "ana").await;
    assert_eq!(body["data"]["total_pages_read"], 50);

    let (status, body) = app.get("/api/v1/statistics?period=monthly&year=2023", "ana").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"]["details"]["month"].is_array());
}
