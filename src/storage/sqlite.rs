//! SQLite lead store backed by an sqlx connection pool.
//!
//! # Schema
//! ```text
//! leads(id TEXT PK, name TEXT ≤ 50 chars, email TEXT, message TEXT, created_at TEXT RFC 3339, UTC, microseconds)
//! ```
//!
//! # Error Classification
//! - Pool timeout / closed pool / I/O / SQLITE_BUSY / SQLITE_LOCKED → `Unavailable`
//! - UNIQUE / CHECK / NOT NULL / FOREIGN KEY violations → `Constraint`
//! - Everything else (including undecodable rows) → `Backend`

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::error::ErrorKind;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::lead::{Lead, NewLead};
use crate::storage::{LeadStore, StorageError};

const CREATE_LEADS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS leads (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL CHECK (length(name) <= 50),
        email TEXT NOT NULL,
        message TEXT NOT NULL,
        created_at TEXT NOT NULL
    )";

const CREATE_CREATED_AT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS leads_created_at ON leads (created_at)";

// Primary result codes; extended codes carry them in the low byte.
const SQLITE_BUSY: i64 = 5;
const SQLITE_LOCKED: i64 = 6;

/// Durable lead store.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open a pool to the configured database, creating the file if missing.
    pub async fn connect(config: &StorageConfig) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(&config.database_url)
            .map_err(StorageError::from)?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(options)
            .await?;

        tracing::info!(
            database_url = %config.database_url,
            max_connections = config.max_connections,
            "Connected to SQLite lead store"
        );

        Ok(Self { pool })
    }

    /// Create the schema if it does not exist yet.
    pub async fn migrate(&self) -> Result<(), StorageError> {
        sqlx::query(CREATE_LEADS_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_CREATED_AT_INDEX).execute(&self.pool).await?;
        tracing::info!("Lead schema is up to date");
        Ok(())
    }

    /// Close the pool, waiting for checked-out connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl LeadStore for SqliteStore {
    async fn create(&self, lead: NewLead) -> Result<Lead, StorageError> {
        let lead = lead.into_lead();

        sqlx::query(
            "INSERT INTO leads (id, name, email, message, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(lead.id.to_string())
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(&lead.message)
        .bind(lead.created_at.to_rfc3339_opts(SecondsFormat::Micros, true))
        .execute(&self.pool)
        .await?;

        tracing::debug!(lead_id = %lead.id, "Lead stored in SQLite");
        Ok(lead)
    }

    async fn list(&self) -> Result<Vec<Lead>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, name, email, message, created_at FROM leads ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(lead_from_row).collect()
    }
}

fn lead_from_row(row: &SqliteRow) -> Result<Lead, StorageError> {
    let id: String = row.try_get("id")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(Lead {
        id: Uuid::parse_str(&id)
            .map_err(|e| StorageError::Backend(format!("invalid lead id {id:?}: {e}")))?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        message: row.try_get("message")?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| StorageError::Backend(format!("invalid created_at {created_at:?}: {e}")))?
            .with_timezone(&Utc),
    })
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_) => StorageError::Unavailable(err.to_string()),
            sqlx::Error::Database(db) => match db.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => StorageError::Constraint(db.message().to_string()),
                _ => {
                    let primary_code = db
                        .code()
                        .and_then(|code| code.parse::<i64>().ok())
                        .map(|code| code & 0xff);
                    match primary_code {
                        Some(SQLITE_BUSY) | Some(SQLITE_LOCKED) => {
                            StorageError::Unavailable(db.message().to_string())
                        }
                        _ => StorageError::Backend(db.message().to_string()),
                    }
                }
            },
            _ => StorageError::Backend(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageBackend;

    fn config_in(dir: &tempfile::TempDir) -> StorageConfig {
        StorageConfig {
            backend: StorageBackend::Sqlite,
            database_url: format!("sqlite://{}", dir.path().join("leads.db").display()),
            ..StorageConfig::default()
        }
    }

    fn new_lead(name: &str) -> NewLead {
        NewLead {
            name: name.into(),
            email: "visitor@example.com".into(),
            message: "Здравствуйте!".into(),
        }
    }

    #[tokio::test]
    async fn create_and_list_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::connect(&config_in(&dir)).await.unwrap();
        store.migrate().await.unwrap();

        let created = store.create(new_lead("Стас")).await.unwrap();
        let leads = store.list().await.unwrap();

        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].id, created.id);
        assert_eq!(leads[0].name, "Стас");
        assert_eq!(leads[0].message, "Здравствуйте!");
        assert_eq!(leads[0].created_at.timestamp_micros(), created.created_at.timestamp_micros());
    }

    #[tokio::test]
    async fn migrate_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::connect(&config_in(&dir)).await.unwrap();
        store.migrate().await.unwrap();
        store.create(new_lead("kept")).await.unwrap();
        store.migrate().await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn overlong_name_is_a_constraint_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::connect(&config_in(&dir)).await.unwrap();
        store.migrate().await.unwrap();

        let err = store.create(new_lead(&"x".repeat(51))).await.unwrap_err();
        assert!(matches!(err, StorageError::Constraint(_)), "got {err:?}");
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn missing_table_is_a_backend_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::connect(&config_in(&dir)).await.unwrap();

        let err = store.create(new_lead("nobody")).await.unwrap_err();
        assert!(matches!(err, StorageError::Backend(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn closed_pool_is_transient() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::connect(&config_in(&dir)).await.unwrap();
        store.migrate().await.unwrap();
        store.close().await;

        let err = store.create(new_lead("late")).await.unwrap_err();
        assert!(err.is_transient(), "got {err:?}");
    }
}
