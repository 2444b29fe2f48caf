//! Contact form validation.
//!
//! # Responsibilities
//! - Map decoded form pairs onto the submission (missing fields become empty,
//!   the last of a repeated key wins)
//! - Trim, check presence, length and shape of each field
//! - Report field-scoped errors with localized messages
//!
//! # Rules
//! - `name`: required, at most 50 characters (Unicode scalar values)
//! - `email`: required, address-shaped (dot-atom or quoted local part,
//!   hostname / `localhost` / bracketed IP literal domain), at most 320 characters
//! - `message`: required, unbounded
//! - No field may contain NUL characters

use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::lead::model::NewLead;

/// Maximum length of the `name` field, in characters.
pub const NAME_MAX_CHARS: usize = 50;

/// Maximum length of an email address, in characters.
pub const EMAIL_MAX_CHARS: usize = 320;

static EMAIL_USER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r##"(?i)^(?:[-!#$%&'*+/=?^_`{}|~0-9a-z]+(?:\.[-!#$%&'*+/=?^_`{}|~0-9a-z]+)*|"(?:[\x01-\x08\x0b\x0c\x0e-\x1f!#-\[\]-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])*")$"##,
    )
    .expect("email user regex is valid")
});

static EMAIL_DOMAIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z0-9][a-z0-9-]{0,61}[a-z0-9]$")
        .expect("email domain regex is valid")
});

const EMAIL_DOMAIN_ALLOWLIST: &[&str] = &["localhost"];

/// A form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Name,
    Email,
    Message,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Name, Field::Email, Field::Message];

    /// Name of the field in the form body.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Message => "message",
        }
    }

    /// Label shown next to the input.
    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "Ваш ник",
            Field::Email => "Наш email",
            Field::Message => "Ваш текст сообщения",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validation failure attributed to one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    Required,
    NullCharacters,
    MaxLength { limit: usize, actual: usize },
    InvalidEmail,
}

impl FieldError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            FieldError::Required => "required",
            FieldError::NullCharacters => "null_characters",
            FieldError::MaxLength { .. } => "max_length",
            FieldError::InvalidEmail => "invalid_email",
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::Required => f.write_str("Обязательное поле."),
            FieldError::NullCharacters => f.write_str("Null-символы не допускаются."),
            FieldError::MaxLength { limit, actual } => write!(
                f,
                "Убедитесь, что это значение содержит не более {} символов (сейчас {}).",
                limit, actual
            ),
            FieldError::InvalidEmail => f.write_str("Введите правильный адрес электронной почты."),
        }
    }
}

/// Field-scoped errors collected during validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, Vec<FieldError>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: Field, error: FieldError) {
        self.0.entry(field).or_default().push(error);
    }

    /// Errors for one field (empty if the field is valid).
    pub fn get(&self, field: Field) -> &[FieldError] {
        self.0.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, field: Field) -> bool {
        !self.get(field).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Names of the fields that failed, in form order.
    pub fn fields(&self) -> Vec<&'static str> {
        self.0.keys().map(Field::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &[FieldError])> {
        self.0.iter().map(|(f, errs)| (*f, errs.as_slice()))
    }

    /// `field:code` labels for logs, in form order.
    pub fn codes(&self) -> Vec<String> {
        self.iter()
            .flat_map(|(field, errs)| errs.iter().map(move |e| format!("{field}:{}", e.code())))
            .collect()
    }
}

/// Raw contact form body.
#[derive(Debug, Clone, Default)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
    /// reCAPTCHA widget response token (`g-recaptcha-response`).
    pub captcha_token: String,
}

impl ContactSubmission {
    /// Build from decoded form pairs. A repeated key keeps its last value;
    /// unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut submission = Self::default();
        for (key, value) in pairs {
            match key.as_ref() {
                "name" => submission.name = value.into(),
                "email" => submission.email = value.into(),
                "message" => submission.message = value.into(),
                "g-recaptcha-response" => submission.captcha_token = value.into(),
                _ => {}
            }
        }
        submission
    }

    /// Raw value of a field as submitted.
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Message => &self.message,
        }
    }

    /// Validate every field, returning the cleaned lead or all field errors.
    pub fn validate(&self) -> Result<NewLead, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = clean_text(Field::Name, &self.name, &mut errors, |value, errors| {
            let actual = value.chars().count();
            if actual > NAME_MAX_CHARS {
                errors.add(
                    Field::Name,
                    FieldError::MaxLength {
                        limit: NAME_MAX_CHARS,
                        actual,
                    },
                );
            }
        });

        let email = clean_text(Field::Email, &self.email, &mut errors, |value, errors| {
            if !is_valid_email(value) {
                errors.add(Field::Email, FieldError::InvalidEmail);
            }
        });

        let message = clean_text(Field::Message, &self.message, &mut errors, |_, _| {});

        if errors.is_empty() {
            Ok(NewLead {
                name,
                email,
                message,
            })
        } else {
            Err(errors)
        }
    }
}

/// Trim, check presence and NUL characters, then run the field-specific check.
fn clean_text<F>(field: Field, raw: &str, errors: &mut FieldErrors, check: F) -> String
where
    F: FnOnce(&str, &mut FieldErrors),
{
    let value = raw.trim();
    if value.is_empty() {
        errors.add(field, FieldError::Required);
        return String::new();
    }
    if value.contains('\0') {
        errors.add(field, FieldError::NullCharacters);
    }
    check(value, errors);
    value.to_string()
}

/// Check that a string is shaped like an email address.
pub fn is_valid_email(value: &str) -> bool {
    if value.is_empty() || value.chars().count() > EMAIL_MAX_CHARS {
        return false;
    }
    let Some((user, domain)) = value.rsplit_once('@') else {
        return false;
    };
    if user.is_empty() || domain.is_empty() {
        return false;
    }
    if !EMAIL_USER_RE.is_match(user) {
        return false;
    }
    is_valid_email_domain(domain)
}

fn is_valid_email_domain(domain: &str) -> bool {
    if EMAIL_DOMAIN_ALLOWLIST
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(domain))
    {
        return true;
    }
    if EMAIL_DOMAIN_RE.is_match(domain) {
        return true;
    }
    domain
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .map(|literal| literal.parse::<IpAddr>().is_ok())
        .unwrap_or(false)
}
