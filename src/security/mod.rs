//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → limits.rs (reject oversized bodies with 413)
//!     → handlers
//! Outgoing response:
//!     → headers.rs (frame, sniffing and referrer policies)
//! ```

pub mod headers;
pub mod limits;
