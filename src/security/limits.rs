//! Request size limits.
//!
//! Bodies larger than `security.max_body_size` are refused with
//! 413 Payload Too Large, before the form is parsed.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

/// Replace axum's default body limit with the configured one.
pub fn apply(router: Router, max_body_size: usize) -> Router {
    router
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_size))
}
