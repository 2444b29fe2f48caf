//! Google reCAPTCHA verification.
//!
//! # Protocol
//! ```text
//! POST {verify_url}
//!     secret=<shared key>&response=<widget token>[&remoteip=<client ip>]
//! ← {"success": bool, "challenge_ts": "...", "hostname": "...", "error-codes": [...]}
//! ```
//!
//! The client address is only forwarded when it is publicly routable.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::RecaptchaConfig;

/// Errors from captcha verification.
#[derive(Debug, Error)]
pub enum CaptchaError {
    /// The token was checked and refused.
    #[error("captcha rejected: {}", .0.join(", "))]
    Rejected(Vec<String>),

    /// The verification service could not be consulted.
    #[error("captcha service unavailable: {0}")]
    Unavailable(String),
}

impl CaptchaError {
    pub fn is_transient(&self) -> bool {
        matches!(self, CaptchaError::Unavailable(_))
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CaptchaError::Rejected(_) => "rejected",
            CaptchaError::Unavailable(_) => "unavailable",
        }
    }
}

/// Verifies a captcha response token.
#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    async fn verify(&self, token: &str, remote_ip: Option<IpAddr>) -> Result<(), CaptchaError>;
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    success: bool,
    #[serde(default)]
    hostname: Option<String>,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// HTTP client for the reCAPTCHA `siteverify` endpoint.
#[derive(Clone)]
pub struct RecaptchaClient {
    client: reqwest::Client,
    secret: String,
    verify_url: Url,
}

impl RecaptchaClient {
    pub fn new(config: &RecaptchaConfig) -> Result<Self, CaptchaError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CaptchaError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            secret: config.secret.clone(),
            verify_url: config.verify_url.clone(),
        })
    }
}

#[async_trait]
impl CaptchaVerifier for RecaptchaClient {
    async fn verify(&self, token: &str, remote_ip: Option<IpAddr>) -> Result<(), CaptchaError> {
        if token.trim().is_empty() {
            return Err(CaptchaError::Rejected(vec!["missing-input-response".into()]));
        }

        let mut params = vec![("secret", self.secret.clone()), ("response", token.to_string())];
        if let Some(ip) = remote_ip.filter(is_public) {
            params.push(("remoteip", ip.to_string()));
        }

        let response = self
            .client
            .post(self.verify_url.clone())
            .form(&params)
            .send()
            .await
            .map_err(|e| CaptchaError::Unavailable(format!("error sending request: {e}")))?;

        if !response.status().is_success() {
            return Err(CaptchaError::Unavailable(format!(
                "verify endpoint returned {}",
                response.status()
            )));
        }

        let result: VerifyResponse = response
            .json()
            .await
            .map_err(|e| CaptchaError::Unavailable(format!("error decoding response: {e}")))?;

        if result.success {
            tracing::debug!(hostname = ?result.hostname, "Captcha verified");
            Ok(())
        } else {
            Err(CaptchaError::Rejected(result.error_codes))
        }
    }
}

/// Whether an address is worth forwarding to the verification service.
fn is_public(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_loopback() || v4.is_private() || v4.is_link_local() || v4.is_unspecified())
        }
        IpAddr::V6(v6) => !(v6.is_loopback() || v6.is_unspecified()),
    }
}
