//! Request forwarding to the remote content service.
//!
//! An inbound request is reduced to a [`ProxyEvent`] (the same shape a
//! serverless runtime hands to a function), the configured prefix is
//! stripped, and a single outbound request is issued. The upstream body is
//! relayed as opaque bytes.

use std::collections::BTreeMap;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, Method};
use serde::Deserialize;

use crate::config::ProxyConfig;
use crate::proxy::error::{ProxyError, UPSTREAM_FAILURE_BODY};

/// Inbound request as seen by the forwarder.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyEvent {
    pub path: String,
    #[serde(default)]
    pub http_method: Option<String>,
    #[serde(default)]
    pub raw_query: Option<String>,
    #[serde(default)]
    pub query_string_parameters: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
}

/// Outbound reply: status, headers and an untouched body.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyReply {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Bytes,
}

impl ProxyReply {
    fn relayed(status_code: u16, body: Bytes) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
        Self {
            status_code,
            headers,
            body,
        }
    }

    /// The fixed 502 reply for any outbound failure.
    pub fn upstream_failure() -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            status_code: StatusCode::BAD_GATEWAY.as_u16(),
            headers,
            body: Bytes::from_static(UPSTREAM_FAILURE_BODY.as_bytes()),
        }
    }

    /// Serverless-style JSON envelope (`statusCode`, `headers`, `body`).
    pub fn to_event_json(&self) -> serde_json::Value {
        serde_json::json!({
            "statusCode": self.status_code,
            "headers": self.headers,
            "body": String::from_utf8_lossy(&self.body),
        })
    }
}

impl IntoResponse for ProxyReply {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_GATEWAY);
        for (name, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                response.headers_mut().insert(name, value);
            }
        }
        response
    }
}

/// Sub-path left after removing `prefix` and one optional slash.
///
/// Paths that do not start with the prefix are returned unchanged.
pub fn sub_path<'a>(path: &'a str, prefix: &str) -> &'a str {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.strip_prefix('/').unwrap_or(rest),
        None => path,
    }
}

/// Query string without the leading `?`.
///
/// A non-empty raw query wins; otherwise the parsed parameters are
/// form-encoded.
pub fn rebuild_query(
    raw_query: Option<&str>,
    params: Option<&BTreeMap<String, String>>,
) -> String {
    if let Some(raw) = raw_query.filter(|q| !q.is_empty()) {
        return raw.to_string();
    }
    match params {
        Some(params) => url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter())
            .finish(),
        None => String::new(),
    }
}

/// `base + sub_path`, plus `?query` only when the query is non-empty.
pub fn upstream_url(base: &str, sub_path: &str, query: &str) -> String {
    if query.is_empty() {
        format!("{}{}", base, sub_path)
    } else {
        format!("{}{}?{}", base, sub_path, query)
    }
}

/// Stateless relay. Safe to share across concurrent requests.
pub struct Forwarder {
    client: Client,
    prefix: String,
    upstream_base: String,
    forward_method: bool,
}

impl Forwarder {
    pub fn new(config: &ProxyConfig) -> Result<Self, ProxyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
            .build()
            .map_err(ProxyError::Client)?;

        Ok(Self {
            client,
            prefix: config.prefix.trim_end_matches('/').to_string(),
            upstream_base: config.upstream_base_url.clone(),
            forward_method: config.forward_method,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn forwards_method(&self) -> bool {
        self.forward_method
    }

    /// True when `path` is the prefix itself or lies below it.
    pub fn matches(&self, path: &str) -> bool {
        path.strip_prefix(self.prefix.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }

    pub fn target_url(&self, event: &ProxyEvent) -> String {
        let sub = sub_path(&event.path, &self.prefix);
        let query = rebuild_query(
            event.raw_query.as_deref(),
            event.query_string_parameters.as_ref(),
        );
        upstream_url(&self.upstream_base, sub, &query)
    }

    fn outbound_method(&self, event: &ProxyEvent) -> Method {
        if !self.forward_method {
            return Method::GET;
        }
        event
            .http_method
            .as_deref()
            .and_then(|m| Method::from_bytes(m.to_ascii_uppercase().as_bytes()).ok())
            .unwrap_or(Method::GET)
    }

    /// Relay one event. Never fails: outbound errors become the 502 reply.
    pub async fn forward(&self, event: &ProxyEvent) -> ProxyReply {
        let url = self.target_url(event);
        let method = self.outbound_method(event);

        match self.try_forward(method.clone(), &url, event).await {
            Ok(reply) => {
                tracing::info!(
                    method = %method,
                    url = %url,
                    status = reply.status_code,
                    bytes = reply.body.len(),
                    "Forwarded"
                );
                reply
            }
            Err(err) => {
                tracing::warn!(method = %method, url = %url, error = ?err, "Upstream request failed");
                ProxyReply::upstream_failure()
            }
        }
    }

    async fn try_forward(
        &self,
        method: Method,
        url: &str,
        event: &ProxyEvent,
    ) -> Result<ProxyReply, ProxyError> {
        let mut builder = self.client.request(method.clone(), url);
        if method != Method::GET {
            if let Some(body) = &event.body {
                builder = builder.body(body.clone());
            }
        }

        let upstream_resp = builder.send().await.map_err(|e| ProxyError::Upstream {
            url: url.to_string(),
            source: e,
        })?;

        let status = upstream_resp.status().as_u16();
        let body = upstream_resp
            .bytes()
            .await
            .map_err(|e| ProxyError::Upstream {
                url: url.to_string(),
                source: e,
            })?;

        Ok(ProxyReply::relayed(status, body))
    }
}
