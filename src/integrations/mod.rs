//! Third-party service integrations.

pub mod recaptcha;

pub use recaptcha::{CaptchaError, CaptchaVerifier, RecaptchaClient};
