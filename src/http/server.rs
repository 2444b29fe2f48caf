//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the homepage and not-found handlers
//! - Wire up middleware (request ID, tracing, timeout, limits, security headers, metrics)
//! - Serve on a listener until shutdown is signalled

use std::net::SocketAddr;
use std::time::Duration;

use axum::{body::Body, http::Request, middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::Span;

use crate::config::AppConfig;
use crate::http::handlers;
use crate::http::request::{RequestIdExt, UuidRequestId};
use crate::lead::LeadService;
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::security;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: LeadService,
    /// Set when the captcha widget should be rendered.
    pub recaptcha_site_key: Option<String>,
    pub trust_proxy_headers: bool,
}

impl AppState {
    pub fn new(config: &AppConfig, service: LeadService) -> Self {
        let recaptcha_site_key = service
            .captcha_enabled()
            .then(|| config.recaptcha.site_key.clone());
        Self {
            service,
            recaptcha_site_key,
            trust_proxy_headers: config.security.trust_proxy_headers,
        }
    }
}

/// HTTP server for the landing page.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a new HTTP server around a ready lead service.
    pub fn new(config: AppConfig, service: LeadService) -> Self {
        let state = AppState::new(&config, service);
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/", get(handlers::show_form).post(handlers::submit_form))
            .fallback(handlers::not_found)
            .with_state(state)
            .layer(middleware::from_fn(metrics::track_requests));

        if config.security.enable_headers {
            router = security::headers::apply(router);
        }

        security::limits::apply(router, config.security.max_body_size)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// Run the server until `shutdown_rx` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            request_timeout_secs = self.config.timeouts.request_secs,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request.headers().request_id(),
    )
}
