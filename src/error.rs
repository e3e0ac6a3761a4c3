use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub type NotifyResult<T> = Result<T, NotifyError>;

/// Failures a trigger handler hands back to whoever invoked it.
///
/// A missing record or token is not in here: that outcome is a
/// [`Dispatch::Skipped`](crate::triggers::Dispatch) and never an error.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("directory store error: {0}")]
    Store(String),

    #[error("notification transport error: {0}")]
    Transport(String),

    #[error("push rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("invalid event: {0}")]
    InvalidEvent(String),
}

impl From<surrealdb::Error> for NotifyError {
    fn from(err: surrealdb::Error) -> Self {
        NotifyError::Store(err.to_string())
    }
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        NotifyError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for NotifyError {
    fn from(err: serde_json::Error) -> Self {
        NotifyError::InvalidEvent(err.to_string())
    }
}

impl ResponseError for NotifyError {
    fn status_code(&self) -> StatusCode {
        match self {
            NotifyError::InvalidEvent(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": self.to_string(),
        }))
    }
}
