use thiserror::Error;

/// Errors surfaced by [`ApiClient`](super::ApiClient) calls.
///
/// `Display` is the message a page shows next to its retry affordance.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request did not settle within the client timeout.
    #[error("timeout of {millis}ms exceeded")]
    Timeout { millis: u128 },

    /// DNS, connect, or transport failure.
    #[error("Network Error")]
    Network {
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-2xx status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The body was not the JSON we expected.
    #[error("Malformed response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ApiError {
    /// Build a status error, pulling a message out of the body when present.
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let message = extract_message(body)
            .unwrap_or_else(|| format!("Request failed with status code {}", status));
        ApiError::Status { status, message }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Looks for `error`, `message`, or `error.message` in a JSON body.
fn extract_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    let candidates = [
        value.get("error").and_then(|e| e.as_str()),
        value.get("message").and_then(|m| m.as_str()),
        value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str()),
    ];
    let found = candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|m| !m.is_empty())
        .map(str::to_string);
    found
}
