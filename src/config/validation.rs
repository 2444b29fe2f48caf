//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, pool sizes > 0)
//! - Check that addresses and URLs are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{AppConfig, StorageBackend};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: {value:?} is not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("storage.database_url must be a sqlite: URL, got {0:?}")]
    UnsupportedDatabaseUrl(String),

    #[error("recaptcha.{0} is required when recaptcha is enabled")]
    MissingRecaptchaKey(&'static str),
}

/// Validate a configuration, collecting every problem.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(
        "listener.bind_address",
        &config.listener.bind_address,
        &mut errors,
    );

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "timeouts.request_secs",
        });
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::Zero {
            field: "security.max_body_size",
        });
    }

    if config.storage.backend == StorageBackend::Sqlite {
        if !config.storage.database_url.starts_with("sqlite:") {
            errors.push(ValidationError::UnsupportedDatabaseUrl(
                config.storage.database_url.clone(),
            ));
        }
        if config.storage.max_connections == 0 {
            errors.push(ValidationError::Zero {
                field: "storage.max_connections",
            });
        }
    }

    if config.recaptcha.enabled {
        if config.recaptcha.secret.trim().is_empty() {
            errors.push(ValidationError::MissingRecaptchaKey("secret"));
        }
        if config.recaptcha.site_key.trim().is_empty() {
            errors.push(ValidationError::MissingRecaptchaKey("site_key"));
        }
        if config.recaptcha.timeout_secs == 0 {
            errors.push(ValidationError::Zero {
                field: "recaptcha.timeout_secs",
            });
        }
    }

    if config.observability.metrics_enabled {
        check_address(
            "observability.metrics_address",
            &config.observability.metrics_address,
            &mut errors,
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
