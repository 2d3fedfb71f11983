//! Request identification.
//!
//! # Responsibilities
//! - Ensure every inbound request carries an `x-request-id`
//! - Preserve an id supplied by the caller
//!
//! # Design Decisions
//! - The id is attached as early as possible so every log line and the
//!   forwarded backend call share it

use axum::body::Body;
use axum::http::{HeaderValue, Request};
use tower::{Layer, Service};
use uuid::Uuid;

/// Header carrying the request id across services.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Read the request id from headers.
pub fn request_id(request: &Request<Body>) -> &str {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Layer that inserts a UUID `x-request-id` when absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

/// Service wrapper applied by [`RequestIdLayer`].
#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for RequestIdService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        if !request.headers().contains_key(X_REQUEST_ID) {
            let id = Uuid::new_v4().to_string();
            if let Ok(value) = HeaderValue::from_str(&id) {
                request.headers_mut().insert(X_REQUEST_ID, value);
            }
        }
        self.inner.call(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use tower::ServiceExt;

    async fn echo_id(request: Request<Body>) -> Result<String, Infallible> {
        Ok(request
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string())
    }

    #[tokio::test]
    async fn generates_id_when_absent() {
        let service = RequestIdLayer.layer(tower::service_fn(echo_id));
        let id = service
            .oneshot(Request::builder().body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[tokio::test]
    async fn preserves_caller_id() {
        let service = RequestIdLayer.layer(tower::service_fn(echo_id));
        let id = service
            .oneshot(
                Request::builder()
                    .header(X_REQUEST_ID, "caller-supplied")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(id, "caller-supplied");
    }
}
