//! Lead submission service.

use std::net::IpAddr;
use std::sync::Arc;

use thiserror::Error;

use crate::integrations::{CaptchaError, CaptchaVerifier};
use crate::lead::form::{ContactSubmission, FieldErrors};
use crate::lead::model::Lead;
use crate::observability::metrics;
use crate::storage::{LeadStore, StorageError};

/// Why a submission did not produce a lead.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// One or more fields failed validation.
    #[error("invalid fields: {}", .0.fields().join(", "))]
    Invalid(FieldErrors),

    #[error(transparent)]
    Captcha(#[from] CaptchaError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SubmitError {
    /// Outcome label used for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            SubmitError::Invalid(_) => "invalid",
            SubmitError::Captcha(CaptchaError::Rejected(_)) => "captcha_rejected",
            SubmitError::Captcha(CaptchaError::Unavailable(_)) => "captcha_unavailable",
            SubmitError::Storage(e) if e.is_transient() => "storage_transient",
            SubmitError::Storage(_) => "storage_permanent",
        }
    }
}

/// Validates submissions and persists them through the injected store.
#[derive(Clone)]
pub struct LeadService {
    store: Arc<dyn LeadStore>,
    captcha: Option<Arc<dyn CaptchaVerifier>>,
}

impl LeadService {
    pub fn new(store: Arc<dyn LeadStore>) -> Self {
        Self {
            store,
            captcha: None,
        }
    }

    /// Require a captcha token on every submission.
    pub fn with_captcha(mut self, verifier: Arc<dyn CaptchaVerifier>) -> Self {
        self.captcha = Some(verifier);
        self
    }

    pub fn captcha_enabled(&self) -> bool {
        self.captcha.is_some()
    }

    /// Validate, verify and persist one submission.
    ///
    /// Captcha is only consulted once the fields are valid.
    pub async fn submit(
        &self,
        submission: &ContactSubmission,
        client_ip: Option<IpAddr>,
    ) -> Result<Lead, SubmitError> {
        let result = self.try_submit(submission, client_ip).await;
        match &result {
            Ok(_) => metrics::record_submission("created"),
            Err(e) => metrics::record_submission(e.outcome()),
        }
        result
    }

    async fn try_submit(
        &self,
        submission: &ContactSubmission,
        client_ip: Option<IpAddr>,
    ) -> Result<Lead, SubmitError> {
        let new_lead = submission.validate().map_err(SubmitError::Invalid)?;

        if let Some(verifier) = &self.captcha {
            verifier.verify(&submission.captcha_token, client_ip).await?;
        }

        Ok(self.store.create(new_lead).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lead::form::Field;
    use crate::lead::model::NewLead;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;

    struct BrokenStore(fn() -> StorageError);

    #[async_trait]
    impl LeadStore for BrokenStore {
        async fn create(&self, _lead: NewLead) -> Result<Lead, StorageError> {
            Err((self.0)())
        }

        async fn list(&self) -> Result<Vec<Lead>, StorageError> {
            Ok(Vec::new())
        }
    }

    struct FixedCaptcha(fn() -> Result<(), CaptchaError>);

    #[async_trait]
    impl CaptchaVerifier for FixedCaptcha {
        async fn verify(&self, _token: &str, _ip: Option<IpAddr>) -> Result<(), CaptchaError> {
            (self.0)()
        }
    }

    fn valid() -> ContactSubmission {
        ContactSubmission {
            name: "Стас".into(),
            email: "stas@example.com".into(),
            message: "Хочу заказать сайт".into(),
            captcha_token: "token".into(),
        }
    }

    #[tokio::test]
    async fn valid_submission_is_persisted() {
        let store = MemoryStore::new();
        let service = LeadService::new(Arc::new(store.clone()));

        let lead = service.submit(&valid(), None).await.unwrap();

        assert_eq!(lead.name, "Стас");
        assert_eq!(store.list().await.unwrap(), vec![lead]);
    }

    #[tokio::test]
    async fn invalid_submission_is_not_persisted() {
        let store = MemoryStore::new();
        let service = LeadService::new(Arc::new(store.clone()));
        let submission = ContactSubmission {
            email: "not-an-email".into(),
            ..valid()
        };

        let err = service.submit(&submission, None).await.unwrap_err();

        match err {
            SubmitError::Invalid(errors) => assert!(errors.has(Field::Email)),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn storage_errors_keep_their_class() {
        let transient = LeadService::new(Arc::new(BrokenStore(|| {
            StorageError::Unavailable("database is locked".into())
        })));
        let err = transient.submit(&valid(), None).await.unwrap_err();
        assert_eq!(err.outcome(), "storage_transient");

        let permanent = LeadService::new(Arc::new(BrokenStore(|| {
            StorageError::Constraint("CHECK constraint failed".into())
        })));
        let err = permanent.submit(&valid(), None).await.unwrap_err();
        assert_eq!(err.outcome(), "storage_permanent");
    }

    #[tokio::test]
    async fn rejected_captcha_blocks_persistence() {
        let store = MemoryStore::new();
        let service = LeadService::new(Arc::new(store.clone())).with_captcha(Arc::new(FixedCaptcha(
            || Err(CaptchaError::Rejected(vec!["invalid-input-response".into()])),
        )));

        let err = service.submit(&valid(), None).await.unwrap_err();

        assert_eq!(err.outcome(), "captcha_rejected");
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn captcha_is_skipped_for_invalid_fields() {
        let service = LeadService::new(Arc::new(MemoryStore::new()))
            .with_captcha(Arc::new(FixedCaptcha(|| panic!("captcha must not be consulted"))));
        let submission = ContactSubmission {
            message: String::new(),
            ..valid()
        };

        let err = service.submit(&submission, None).await.unwrap_err();
        assert_eq!(err.outcome(), "invalid");
    }
}
