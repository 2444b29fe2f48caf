//! Lead record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A captured visitor submission as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    /// Identifier assigned on creation.
    pub id: Uuid,
    /// Visitor nickname, at most 50 characters.
    pub name: String,
    /// Address-shaped contact email.
    pub email: String,
    /// Free-text message body.
    pub message: String,
    /// Creation time (UTC).
    pub created_at: DateTime<Utc>,
}

/// Cleaned form fields, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLead {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl NewLead {
    /// Assign an id and creation timestamp.
    pub fn into_lead(self) -> Lead {
        Lead {
            id: Uuid::new_v4(),
            name: self.name,
            email: self.email,
            message: self.message,
            created_at: Utc::now(),
        }
    }
}
