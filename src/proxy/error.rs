//! Error types and response handling for the proxy server.

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::Response;
use thiserror::Error;

/// Body returned for every failed outbound exchange.
pub const UPSTREAM_FAILURE_BODY: &str = r#"{"error":"Failed to fetch from Quran API"}"#;

/// Errors that can occur during proxy operations.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// DNS, connect, timeout, or body read failure talking to upstream
    #[error("Failed to fetch from Quran API ({url}): {source}")]
    Upstream {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Path outside the forwarded prefix
    #[error("No route for '{path}'")]
    NotFound { path: String },

    /// Invalid request format or parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to build upstream client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ProxyError {
    /// Map error variant to appropriate HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            ProxyError::NotFound { .. } => StatusCode::NOT_FOUND,
            ProxyError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::Client(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error type string for JSON responses
    pub fn error_type(&self) -> &'static str {
        match self {
            ProxyError::Upstream { .. } => "upstream_error",
            ProxyError::NotFound { .. } => "not_found",
            ProxyError::InvalidRequest(_) => "invalid_request",
            ProxyError::Client(_) => "internal_error",
        }
    }
}

/// Builder for standardized error responses
pub struct ErrorResponse;

impl ErrorResponse {
    /// Create a JSON error response from a ProxyError.
    ///
    /// Upstream failures always use [`UPSTREAM_FAILURE_BODY`]; local errors
    /// carry a typed envelope with the request id.
    pub fn from_error(err: &ProxyError, request_id: &str) -> Response {
        let body = match err {
            ProxyError::Upstream { .. } => UPSTREAM_FAILURE_BODY.to_string(),
            _ => serde_json::json!({
                "error": {
                    "type": err.error_type(),
                    "message": err.to_string(),
                    "request_id": request_id
                }
            })
            .to_string(),
        };

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = err.status_code();
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    }
}
