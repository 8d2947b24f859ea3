use crate::tracing::{scope_request_id, RequestId};
use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Caller-supplied id if it is non-empty and a valid header value.
fn inbound_request_id(headers: &HeaderMap) -> Option<RequestId> {
    headers
        .get(REQUEST_ID_HEADER)?
        .to_str()
        .ok()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(RequestId::new)
}

/// Tags the request with an id, runs the rest of the stack inside its
/// task-local scope, and echoes it on the response.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = inbound_request_id(request.headers()).unwrap_or_default();
    let echoed = HeaderValue::from_str(request_id.as_str()).ok();

    request.extensions_mut().insert(request_id.clone());
    let mut response = scope_request_id(request_id, next.run(request)).await;

    if let Some(value) = echoed {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        extract::Extension,
        http::StatusCode,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    async fn echo_ids(Extension(request_id): Extension<RequestId>) -> String {
        let scoped = crate::tracing::current_request_id();
        format!(
            "{}|{}",
            request_id,
            scoped.as_ref().map(RequestId::as_str).unwrap_or("none")
        )
    }

    async fn send(request: axum::http::Request<Body>) -> (StatusCode, Option<String>, String) {
        let response = Router::new()
            .route("/", get(echo_ids))
            .layer(axum::middleware::from_fn(request_id_middleware))
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let header = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, header, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn generated_id_reaches_handler_scope_and_response() {
        let request = axum::http::Request::get("/").body(Body::empty()).unwrap();
        let (status, header, body) = send(request).await;

        assert_eq!(status, StatusCode::OK);
        let header = header.expect("x-request-id header");
        assert_eq!(body, format!("{header}|{header}"));
    }

    #[tokio::test]
    async fn caller_id_is_kept() {
        let request = axum::http::Request::get("/")
            .header(REQUEST_ID_HEADER, "caller-supplied")
            .body(Body::empty())
            .unwrap();
        let (_, header, body) = send(request).await;

        assert_eq!(header.as_deref(), Some("caller-supplied"));
        assert_eq!(body, "caller-supplied|caller-supplied");
    }

    #[tokio::test]
    async fn blank_caller_id_is_replaced() {
        let request = axum::http::Request::get("/")
            .header(REQUEST_ID_HEADER, "   ")
            .body(Body::empty())
            .unwrap();
        let (_, header, _) = send(request).await;

        let header = header.expect("x-request-id header");
        assert!(!header.trim().is_empty());
    }
}
