//! Mapping of submission failures to HTTP responses.
//!
//! | failure | status | non-field message |
//! |---|---|---|
//! | field validation | 200 | none (errors shown per field) |
//! | captcha rejected | 200 | "confirm you are not a robot" |
//! | captcha unavailable | 503 | "temporarily unavailable" |
//! | transient storage | 503 | "temporarily unavailable" |
//! | permanent storage | 500 | "could not save" |

use axum::http::StatusCode;

use crate::integrations::CaptchaError;
use crate::lead::SubmitError;

pub const NOT_FOUND_BODY: &str = "Страница не найдена";
pub const MSG_CAPTCHA_REJECTED: &str = "Подтвердите, что вы не робот.";
pub const MSG_TEMPORARILY_UNAVAILABLE: &str = "Сервис временно недоступен. Попробуйте позже.";
pub const MSG_SAVE_FAILED: &str = "Не удалось сохранить сообщение.";

/// Status code and optional non-field message for a failed submission.
pub fn failure(err: &SubmitError) -> (StatusCode, Option<&'static str>) {
    match err {
        SubmitError::Invalid(_) => (StatusCode::OK, None),
        SubmitError::Captcha(CaptchaError::Rejected(_)) => {
            (StatusCode::OK, Some(MSG_CAPTCHA_REJECTED))
        }
        SubmitError::Captcha(CaptchaError::Unavailable(_)) => {
            (StatusCode::SERVICE_UNAVAILABLE, Some(MSG_TEMPORARILY_UNAVAILABLE))
        }
        SubmitError::Storage(e) if e.is_transient() => {
            (StatusCode::SERVICE_UNAVAILABLE, Some(MSG_TEMPORARILY_UNAVAILABLE))
        }
        SubmitError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, Some(MSG_SAVE_FAILED)),
    }
}
