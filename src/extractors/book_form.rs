//! Book create/update body: multipart form (with an optional `cover` file)
//! or a plain JSON object.

use super::JsonObject;
use crate::cover::CoverUpload;
use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Multipart, Request},
    http::{header::CONTENT_TYPE, StatusCode},
};
use serde_json::{Map, Value};

pub const COVER_FIELD: &str = "cover";

#[derive(Debug, Default)]
pub struct BookForm {
    /// Text fields as strings (multipart) or as sent (JSON).
    pub fields: Map<String, Value>,
    pub cover: Option<CoverUpload>,
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(format!("invalid multipart body: {}", e.body_text()))
    }
}

#[async_trait]
impl<S> FromRequest<S> for BookForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if !is_multipart {
            let JsonObject(fields) = JsonObject::from_request(req, state).await?;
            return Ok(BookForm { fields, cover: None });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        let mut form = BookForm::default();
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            if name == COVER_FIELD {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                // A file input left empty still sends the part.
                if !bytes.is_empty() {
                    form.cover = Some(CoverUpload {
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            } else {
                let text = field.text().await.map_err(multipart_error)?;
                form.fields.insert(name, Value::String(text));
            }
        }
        Ok(form)
    }
}
