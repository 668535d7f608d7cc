#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use booknest::cover::LocalCoverStore;
use booknest::model::RatingBounds;
use booknest::{app, AppState, MemoryStore, OWNER_ID_HEADER};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const COVER_LIMIT: usize = 64 * 1024;

pub struct TestApp {
    pub router: Router,
    _covers: tempfile::TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let covers = tempfile::tempdir().unwrap();
        let state = AppState {
            store: Arc::new(MemoryStore::new()),
            covers: Arc::new(LocalCoverStore::new(covers.path())),
            rating: RatingBounds::default(),
            cover_max_bytes: COVER_LIMIT,
        };
        TestApp {
            router: app(state),
            _covers: covers,
        }
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn json(&self, method: Method, uri: &str, owner: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(OWNER_ID_HEADER, owner);
        let req = match body {
            Some(b) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(req).await
    }

    pub async fn get(&self, uri: &str, owner: &str) -> (StatusCode, Value) {
        self.json(Method::GET, uri, owner, None).await
    }

    pub async fn post(&self, uri: &str, owner: &str, body: Value) -> (StatusCode, Value) {
        self.json(Method::POST, uri, owner, Some(body)).await
    }

    /// Creates a book and returns its id.
    pub async fn book(&self, owner: &str, title: &str, pages: i32) -> String {
        let (status, body) = self
            .post(
                "/api/v1/book",
                owner,
                serde_json::json!({
                    "title": title,
                    "author": "Machado de Assis",
                    "year": 1899,
                    "genre": "Classic",
                    "page_count": pages
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["data"]["id"].as_str().unwrap().to_string()
    }
}

pub fn multipart(boundary: &str, fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut out = Vec::new();
    for (name, value) in fields {
        out.extend_from_slice(
            format!("--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n", boundary, name, value).as_bytes(),
        );
    }
    if let Some((content_type, bytes)) = file {
        out.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"cover\"; filename=\"cover\"\r\nContent-Type: {}\r\n\r\n",
                boundary, content_type
            )
            .as_bytes(),
        );
        out.extend_from_slice(bytes);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    out
}
