// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for the proxy

use actix_web::{error::ResponseError, http::header, http::StatusCode, HttpResponse};
use thiserror::Error;

/// Application-specific error types
/// DOCUMENTATION: Every failure the request path can produce
/// All variants render as HTTP 500 with the message as plain text
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    #[error("Upstream fetch failed: {0}")]
    FetchFailed(String),

    #[error("Failed to decode upstream response: {0}")]
    DecodeError(String),

    #[error("Cache error: {0}")]
    CacheError(String),
}

/// Convert ProxyError to HTTP response
/// DOCUMENTATION: Clients only ever see a 500 with the error message as body
impl ResponseError for ProxyError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header((header::CONTENT_TYPE, "text/plain; charset=utf-8"))
            .body(self.to_string())
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
