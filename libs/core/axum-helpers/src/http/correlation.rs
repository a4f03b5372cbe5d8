use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// Request/response header carrying the correlation id
pub const X_CORRELATION_ID: HeaderName = HeaderName::from_static("x-correlation-id");

/// Correlation id of the current request, available from request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationId(pub String);

/// Ensures every request carries an `x-correlation-id`.
///
/// A client-supplied id is kept, otherwise a UUID v4 is generated. The id is
/// written back onto the request headers (so the trace span can record it),
/// stored in extensions as [`CorrelationId`] and echoed on the response.
pub async fn correlation_id(mut request: Request, next: Next) -> Response {
    let value = request
        .headers()
        .get(&X_CORRELATION_ID)
        .filter(|v| !v.is_empty())
        .cloned()
        .unwrap_or_else(|| {
            HeaderValue::from_str(&Uuid::new_v4().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"))
        });

    request.headers_mut().insert(X_CORRELATION_ID, value.clone());
    request
        .extensions_mut()
        .insert(CorrelationId(value.to_str().unwrap_or_default().to_string()));

    let mut response = next.run(request).await;
    response.headers_mut().insert(X_CORRELATION_ID, value);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Extension, Router, body::Body, middleware, routing::get};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route(
                "/",
                get(|Extension(CorrelationId(id)): Extension<CorrelationId>| async move { id }),
            )
            .layer(middleware::from_fn(correlation_id))
    }

    #[tokio::test]
    async fn test_existing_id_is_echoed() {
        let response = app()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/")
                    .header("x-correlation-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()["x-correlation-id"], "abc-123");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"abc-123");
    }

    #[tokio::test]
    async fn test_missing_id_is_generated() {
        let response = app()
            .oneshot(axum::http::Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let id = response.headers()["x-correlation-id"].to_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok());
    }
}
