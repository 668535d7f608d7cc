//! Thin wrapper over `reqwest::Client` that speaks the BookNest envelope.

use crate::error::{ClientError, Result};
use booknest::extractors::OWNER_ID_HEADER;
use booknest::response::ApiResponse;
use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const API_PREFIX: &str = "/api/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Outcome of a read that may legitimately find nothing.
#[derive(Clone, Debug, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(v) => Some(v),
            Lookup::NotFound => None,
        }
    }

    pub fn as_ref(&self) -> Lookup<&T> {
        match self {
            Lookup::Found(v) => Lookup::Found(v),
            Lookup::NotFound => Lookup::NotFound,
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(v: Option<T>) -> Self {
        v.map_or(Lookup::NotFound, Lookup::Found)
    }
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    owner: String,
}

impl ApiClient {
    pub fn new(base_url: &str, owner: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;
        Ok(Self::with_client(http, base_url, owner))
    }

    pub fn with_client(http: reqwest::Client, base_url: &str, owner: impl Into<String>) -> Self {
        ApiClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            owner: owner.into(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::debug!(%method, path, owner = %self.owner, "api request");
        self.http
            .request(method, self.url(path))
            .header(OWNER_ID_HEADER, &self.owner)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let resp = self.request(Method::GET, path).query(query).send().await?;
        read_envelope(resp).await
    }

    /// GET where a 404 is an answer rather than a failure.
    pub async fn lookup<T: DeserializeOwned>(&self, path: &str) -> Result<Lookup<T>> {
        match self.get(path, &[]).await {
            Ok(v) => Ok(Lookup::Found(v)),
            Err(e) if e.is_not_found() => Ok(Lookup::NotFound),
            Err(e) => Err(e),
        }
    }

    pub async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let resp = self.request(method, path).json(body).send().await?;
        read_envelope(resp).await
    }

    pub async fn send_multipart<T: DeserializeOwned>(&self, method: Method, path: &str, form: Form) -> Result<T> {
        let resp = self.request(method, path).multipart(form).send().await?;
        read_envelope(resp).await
    }

    /// DELETE expecting `204 No Content`.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let resp = self.request(Method::DELETE, path).send().await?;
        if resp.status().is_success() {
            return Ok(());
        }
        Err(api_error(resp.status(), &resp.bytes().await?))
    }
}

fn api_error(status: StatusCode, body: &[u8]) -> ClientError {
    match serde_json::from_slice::<ApiResponse<serde_json::Value>>(body) {
        Ok(ApiResponse::Error { error }) => ClientError::Api {
            status: status.as_u16(),
            code: error.code,
            message: error.message,
            details: error.details,
        },
        _ => ClientError::Api {
            status: status.as_u16(),
            code: "http_error".to_string(),
            message: String::from_utf8_lossy(body).into_owned(),
            details: None,
        },
    }
}

async fn read_envelope<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let status = resp.status();
    let body = resp.bytes().await?;
    if !status.is_success() {
        tracing::debug!(status = status.as_u16(), "api error response");
        return Err(api_error(status, &body));
    }
    let envelope: ApiResponse<T> = serde_json::from_slice(&body)?;
    envelope.into_result().map_err(|error| ClientError::Api {
        status: status.as_u16(),
        code: error.code,
        message: error.message,
        details: error.details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_becomes_api_error() {
        let body = br#"{"error":{"code":"validation_error","message":"invalid input","details":{"title":["title is required"]}}}"#;
        let err = api_error(StatusCode::UNPROCESSABLE_ENTITY, body);
        assert_eq!(err.status(), Some(422));
        let fields = err.field_errors().unwrap();
        assert_eq!(fields.field("title"), ["title is required".to_string()]);
    }

    #[test]
    fn plain_text_error_is_kept() {
        let err = api_error(StatusCode::BAD_GATEWAY, b"upstream down");
        match err {
            ClientError::Api { status, code, message, .. } => {
                assert_eq!(status, 502);
                assert_eq!(code, "http_error");
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn base_url_is_normalized() {
        let client = ApiClient::new("http://localhost:8080/", "reader").unwrap();
        assert_eq!(client.url("/book"), "http://localhost:8080/api/v1/book");
    }

    #[test]
    fn lookup_from_option() {
        assert_eq!(Lookup::from(Some(3)), Lookup::Found(3));
        assert!(!Lookup::<i32>::from(None).is_found());
    }
}
