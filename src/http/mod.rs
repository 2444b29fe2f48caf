//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, client IP)
//!     → handlers.rs (GET/POST / → LeadService, fallback → 404)
//!     → response.rs (failure → status + non-field message)
//!     → render.rs (homepage HTML)
//!     → Send to client
//! ```

pub mod handlers;
pub mod render;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdExt, UuidRequestId, X_REQUEST_ID};
pub use response::NOT_FOUND_BODY;
pub use server::{AppState, HttpServer};
