use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tracing::Instrument;
use uuid::Uuid;

use crate::proxy::error::{ErrorResponse, ProxyError};
use crate::proxy::forward::{Forwarder, ProxyEvent};
use crate::proxy::health::health_handler;

/// Cap on inbound bodies when the method is forwarded.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Routes:
/// - `GET /health`
/// - everything at or below the forwarder prefix, any method
/// - anything else is a JSON 404
pub fn build_router(forwarder: Arc<Forwarder>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .fallback(proxy_handler)
        .with_state(forwarder)
}

async fn proxy_handler(State(forwarder): State<Arc<Forwarder>>, req: Request<Body>) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let path = req.uri().path().to_string();

    if !forwarder.matches(&path) {
        tracing::debug!(request_id = %request_id, path = %path, "No route");
        return ErrorResponse::from_error(&ProxyError::NotFound { path }, &request_id);
    }

    let span = tracing::info_span!("proxy", request_id = %request_id);
    async move {
        let method = req.method().to_string();
        let raw_query = req.uri().query().map(str::to_string);

        let body = if forwarder.forwards_method() {
            match axum::body::to_bytes(req.into_body(), MAX_BODY_BYTES).await {
                Ok(bytes) if bytes.is_empty() => None,
                Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
                Err(e) => {
                    let err = ProxyError::InvalidRequest(format!("Failed to read request body: {}", e));
                    return ErrorResponse::from_error(&err, &request_id);
                }
            }
        } else {
            None
        };

        let event = ProxyEvent {
            path,
            http_method: Some(method),
            raw_query,
            query_string_parameters: None,
            body,
        };

        forwarder.forward(&event).await.into_response()
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProxyConfig;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn router() -> Router {
        build_router(Arc::new(Forwarder::new(&ProxyConfig::default()).unwrap()))
    }

    #[tokio::test]
    async fn health_reports_service_name() {
        let resp = router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "ayahhub");
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let resp = router()
            .oneshot(Request::get("/elsewhere").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
