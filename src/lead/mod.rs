//! Lead capture subsystem.
//!
//! # Data Flow
//! ```text
//! POST / (urlencoded body)
//!     → form.rs (ContactSubmission → trimmed, validated NewLead | FieldErrors)
//!     → service.rs (optional captcha check, persistence via LeadStore)
//!     → model.rs (Lead record with id + timestamp)
//! ```
//!
//! # Design Decisions
//! - Validation is pure and collects every field error, not just the first
//! - Persistence goes through an injected `LeadStore`, never a global
//! - Storage failures keep their class (transient / permanent) up to the caller

pub mod form;
pub mod model;
pub mod service;

pub use form::{ContactSubmission, Field, FieldError, FieldErrors};
pub use model::{Lead, NewLead};
pub use service::{LeadService, SubmitError};
