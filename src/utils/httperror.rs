//! HTTP error handling and automated response generation
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::services::store::errors::StoreError;

/// An HTTP status code with a short summary, optionally with further detail.
pub struct HttpError {
    /// The numeric HTTP status code to respond with.
    status: StatusCode,
    /// A short summary of the error.
    error: String,
    /// Further detail to include in the response.
    message: Option<String>,
}

impl HttpError {
    /// Construct a new HTTP error with a given status code, summary and message.
    pub fn new(status: StatusCode, error: &str, message: Option<String>) -> Self {
        Self {
            status,
            error: error.to_owned(),
            message,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body = match self.message {
            Some(message) => json!({"error": self.error, "message": message}),
            None => json!({"error": self.error}),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<StoreError> for HttpError {
    fn from(err: StoreError) -> Self {
        tracing::error!(error = %err, "Error raised from dream store in handler");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Database error", None)
    }
}
