//! Startup orchestration.
//!
//! # Responsibilities
//! - Open (and migrate) the configured lead store
//! - Build the captcha client when enabled
//! - Assemble the lead service and HTTP server
//!
//! Binding the listener is left to the caller so tests can use ephemeral ports.

use std::sync::Arc;

use thiserror::Error;

use crate::config::AppConfig;
use crate::http::HttpServer;
use crate::integrations::{CaptchaError, RecaptchaClient};
use crate::lead::LeadService;
use crate::storage::{self, StorageError};

/// Fatal startup failures.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to open lead store: {0}")]
    Storage(#[from] StorageError),

    #[error("failed to build captcha client: {0}")]
    Captcha(#[from] CaptchaError),
}

/// Build a ready-to-run server from a validated configuration.
pub async fn build_server(config: AppConfig) -> Result<HttpServer, StartupError> {
    let store = storage::open(&config.storage).await?;
    let mut service = LeadService::new(store);

    if config.recaptcha.enabled {
        let client = RecaptchaClient::new(&config.recaptcha)?;
        service = service.with_captcha(Arc::new(client));
        tracing::info!(verify_url = %config.recaptcha.verify_url, "Captcha verification enabled");
    }

    Ok(HttpServer::new(config, service))
}
