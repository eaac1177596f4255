//! HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Too many requests, slow down")]
    TooManyRequests,
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = match &self {
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            HttpError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
        };

        let body = ErrorBody {
            message: self.to_string(),
        };

        (status, axum::Json(body)).into_response()
    }
}
