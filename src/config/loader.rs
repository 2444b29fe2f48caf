//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{AppConfig, LogFormat, StorageBackend};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {value:?}")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: file (if any), then process environment, then validation.
pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_file(path)?,
        None => AppConfig::default(),
    };
    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Parse a TOML file without validating it.
pub fn load_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse(&content)
}

/// Parse TOML text without validating it.
pub fn parse(content: &str) -> Result<AppConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Apply overrides from environment-style variables.
///
/// `lookup` abstracts the environment so callers (and tests) can supply their own.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup("LENDPAGE_BIND_ADDRESS") {
        config.listener.bind_address = value;
    }
    if let Some(value) = lookup("LENDPAGE_STORAGE_BACKEND") {
        config.storage.backend = match value.to_ascii_lowercase().as_str() {
            "memory" => StorageBackend::Memory,
            "sqlite" => StorageBackend::Sqlite,
            _ => {
                return Err(ConfigError::Env {
                    var: "LENDPAGE_STORAGE_BACKEND",
                    value,
                })
            }
        };
    }
    if let Some(value) = lookup("LENDPAGE_DATABASE_URL") {
        config.storage.database_url = value;
    }
    if let Some(value) = lookup("LENDPAGE_LOG_LEVEL") {
        config.observability.log_level = value;
    }
    if let Some(value) = lookup("LENDPAGE_LOG_FORMAT") {
        config.observability.log_format = match value.to_ascii_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            _ => {
                return Err(ConfigError::Env {
                    var: "LENDPAGE_LOG_FORMAT",
                    value,
                })
            }
        };
    }
    if let Some(value) = lookup("RECAPTCHA_SITE_KEY") {
        config.recaptcha.site_key = value;
    }
    if let Some(value) = lookup("RECAPTCHA_SECRET") {
        config.recaptcha.secret = value;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8000");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert!(!config.recaptcha.enabled);
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = parse(
            r#"
            [storage]
            backend = "sqlite"
            database_url = "sqlite:///var/lib/lendpage/leads.db"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.storage.database_url, "sqlite:///var/lib/lendpage/leads.db");
        assert_eq!(config.storage.max_connections, 5);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn unknown_backend_is_a_parse_error() {
        let err = parse("[storage]\nbackend = \"postgres\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn env_overrides_win_over_file() {
        let vars: HashMap<&str, &str> = [
            ("LENDPAGE_BIND_ADDRESS", "127.0.0.1:9000"),
            ("LENDPAGE_STORAGE_BACKEND", "SQLite"),
            ("LENDPAGE_DATABASE_URL", "sqlite://override.db"),
            ("RECAPTCHA_SECRET", "shh"),
        ]
        .into_iter()
        .collect();

        let mut config = parse("[listener]\nbind_address = \"0.0.0.0:1\"\n").unwrap();
        apply_env_overrides(&mut config, |var| vars.get(var).map(|v| v.to_string())).unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.storage.database_url, "sqlite://override.db");
        assert_eq!(config.recaptcha.secret, "shh");
    }

    #[test]
    fn bad_env_value_is_reported() {
        let mut config = AppConfig::default();
        let err = apply_env_overrides(&mut config, |var| {
            (var == "LENDPAGE_LOG_FORMAT").then(|| "xml".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: "LENDPAGE_LOG_FORMAT", .. }));
    }

    #[test]
    fn load_file_reads_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[timeouts]\nrequest_secs = 7").unwrap();

        let config = load_file(file.path()).unwrap();
        assert_eq!(config.timeouts.request_secs, 7);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
