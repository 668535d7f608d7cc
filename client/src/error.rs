use booknest::validation::ValidationErrors;
use serde_json::Value;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-2xx answer carrying the server's error envelope.
    #[error("{code} ({status}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
        details: Option<Value>,
    },
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("cached value for {0} has a different type")]
    CacheType(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Field messages of a 422 response, in the shape forms display.
    pub fn field_errors(&self) -> Option<ValidationErrors> {
        match self {
            ClientError::Api {
                details: Some(details), ..
            } => serde_json::from_value(details.clone()).ok(),
            _ => None,
        }
    }
}
