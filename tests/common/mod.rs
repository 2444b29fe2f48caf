//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::post, Form, Json, Router};
use axum::http::StatusCode;
use tokio::net::TcpListener;

use lendpage::config::AppConfig;
use lendpage::http::HttpServer;
use lendpage::lead::{Lead, LeadService, NewLead};
use lendpage::lifecycle::Shutdown;
use lendpage::storage::{LeadStore, StorageError};

/// A server running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the landing page on 127.0.0.1 with the given service.
pub async fn spawn_server(config: AppConfig, service: LeadService) -> TestServer {
    spawn(HttpServer::new(config, service)).await
}

/// Serve an already assembled server on 127.0.0.1.
pub async fn spawn(server: HttpServer) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        server.run(listener, rx).await.unwrap();
    });

    TestServer { addr, shutdown }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

pub fn valid_form() -> Vec<(&'static str, &'static str)> {
    vec![
        ("name", "Ivan"),
        ("email", "ivan@example.com"),
        ("message", "Hello"),
    ]
}

/// Store whose writes always fail with the error produced by `make_error`.
pub struct FailingStore {
    make_error: fn() -> StorageError,
}

impl FailingStore {
    pub fn transient() -> Self {
        Self {
            make_error: || StorageError::Unavailable("pool timed out".into()),
        }
    }

    pub fn permanent() -> Self {
        Self {
            make_error: || StorageError::Backend("no such table: leads".into()),
        }
    }
}

#[async_trait]
impl LeadStore for FailingStore {
    async fn create(&self, _lead: NewLead) -> Result<Lead, StorageError> {
        Err((self.make_error)())
    }

    async fn list(&self) -> Result<Vec<Lead>, StorageError> {
        Ok(Vec::new())
    }
}

pub fn failing_service(store: FailingStore) -> LeadService {
    LeadService::new(Arc::new(store))
}

/// Start a fake `siteverify` endpoint.
///
/// Token `pass` verifies, `down` answers 500, anything else is refused.
pub async fn start_mock_recaptcha() -> SocketAddr {
    async fn verify(
        Form(params): Form<HashMap<String, String>>,
    ) -> (StatusCode, Json<serde_json::Value>) {
        match params.get("response").map(String::as_str) {
            Some("pass") => (
                StatusCode::OK,
                Json(serde_json::json!({"success": true, "hostname": "localhost"})),
            ),
            Some("down") => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({})),
            ),
            _ => (
                StatusCode::OK,
                Json(serde_json::json!({
                    "success": false,
                    "error-codes": ["invalid-input-response"]
                })),
            ),
        }
    }

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/siteverify", post(verify));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}
