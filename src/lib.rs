//! Landing page with a contact / lead-capture form.

pub mod config;
pub mod http;
pub mod integrations;
pub mod lead;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod storage;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lead::{Lead, LeadService};
pub use lifecycle::Shutdown;
pub use storage::LeadStore;
