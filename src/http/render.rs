//! Homepage template.
//!
//! All dynamic content is HTML-escaped by maud.

use maud::{html, Markup, DOCTYPE};

use crate::lead::form::{EMAIL_MAX_CHARS, NAME_MAX_CHARS};
use crate::lead::{ContactSubmission, Field, FieldError, FieldErrors};

pub const PAGE_TITLE: &str = "Свяжитесь с нами";
pub const SUCCESS_MESSAGE: &str = "Спасибо! Ваше сообщение отправлено.";

const RECAPTCHA_SCRIPT: &str = "https://www.google.com/recaptcha/api.js";

/// Everything the homepage needs to render the contact form.
#[derive(Debug, Default)]
pub struct FormView<'a> {
    /// Values to echo back into the inputs.
    pub values: Option<&'a ContactSubmission>,
    pub field_errors: Option<&'a FieldErrors>,
    pub non_field_errors: Vec<&'static str>,
    /// Show the "message sent" notice.
    pub success: bool,
    /// Render the captcha widget with this site key.
    pub recaptcha_site_key: Option<&'a str>,
}

impl<'a> FormView<'a> {
    pub fn blank(recaptcha_site_key: Option<&'a str>) -> Self {
        Self {
            recaptcha_site_key,
            ..Self::default()
        }
    }

    pub fn sent(recaptcha_site_key: Option<&'a str>) -> Self {
        Self {
            success: true,
            recaptcha_site_key,
            ..Self::default()
        }
    }

    /// Re-render the submitted values with errors.
    pub fn rejected(
        values: &'a ContactSubmission,
        field_errors: Option<&'a FieldErrors>,
        non_field_error: Option<&'static str>,
        recaptcha_site_key: Option<&'a str>,
    ) -> Self {
        Self {
            values: Some(values),
            field_errors,
            non_field_errors: non_field_error.into_iter().collect(),
            success: false,
            recaptcha_site_key,
        }
    }
}

/// Render the landing page.
pub fn homepage(view: &FormView<'_>) -> Markup {
    html! {
        (DOCTYPE)
        html lang="ru" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (PAGE_TITLE) }
                @if view.recaptcha_site_key.is_some() {
                    script src=(RECAPTCHA_SCRIPT) async defer {}
                }
            }
            body {
                main {
                    h1 { (PAGE_TITLE) }
                    @if view.success {
                        p class="success" { (SUCCESS_MESSAGE) }
                    }
                    form method="post" action="/" {
                        @if !view.non_field_errors.is_empty() {
                            ul class="errorlist nonfield" {
                                @for message in &view.non_field_errors {
                                    li { (message) }
                                }
                            }
                        }
                        @for field in Field::ALL {
                            (field_row(view, field))
                        }
                        @if let Some(site_key) = view.recaptcha_site_key {
                            div class="g-recaptcha" data-sitekey=(site_key) {}
                        }
                        button type="submit" { "Отправить" }
                    }
                }
            }
        }
    }
}

fn field_row(view: &FormView<'_>, field: Field) -> Markup {
    let name = field.as_str();
    let id = format!("id_{name}");
    let error_id = format!("id_{name}_error");
    let value = view.values.map(|v| v.value(field)).unwrap_or("");
    let errors: &[FieldError] = view.field_errors.map(|e| e.get(field)).unwrap_or(&[]);

    html! {
        p {
            @if !errors.is_empty() {
                ul class="errorlist" id=(error_id) {
                    @for error in errors {
                        li { (error.to_string()) }
                    }
                }
            }
            label for=(id) { (field.label()) ":" }
            @match field {
                Field::Name => {
                    input type="text" name=(name) id=(id) maxlength=(NAME_MAX_CHARS) value=(value) required;
                }
                Field::Email => {
                    input type="email" name=(name) id=(id) maxlength=(EMAIL_MAX_CHARS) value=(value) required;
                }
                Field::Message => {
                    textarea name=(name) id=(id) cols="40" rows="10" required { (value) }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_form_has_no_errors_or_values() {
        let page = homepage(&FormView::blank(None)).into_string();
        assert!(page.contains("Ваш ник"));
        assert!(page.contains("Наш email"));
        assert!(page.contains("Ваш текст сообщения"));
        assert!(page.contains(r#"name="name""#));
        assert!(!page.contains("errorlist"));
        assert!(!page.contains("g-recaptcha"));
        assert!(!page.contains(SUCCESS_MESSAGE));
    }

    #[test]
    fn rejected_form_echoes_escaped_values_and_errors() {
        let submission = ContactSubmission {
            name: "<b>Стас</b>".into(),
            email: "not-an-email".into(),
            message: String::new(),
            captcha_token: String::new(),
        };
        let errors = submission.validate().unwrap_err();

        let page = homepage(&FormView::rejected(&submission, Some(&errors), None, None)).into_string();

        assert!(page.contains("&lt;b&gt;Стас&lt;/b&gt;"));
        assert!(!page.contains("<b>Стас</b>"));
        assert!(page.contains(r#"id="id_email_error""#));
        assert!(page.contains("Введите правильный адрес электронной почты."));
        assert!(page.contains(r#"id="id_message_error""#));
        assert!(!page.contains(r#"id="id_name_error""#));
    }

    #[test]
    fn non_field_error_and_widget() {
        let submission = ContactSubmission::default();
        let page = homepage(&FormView::rejected(
            &submission,
            None,
            Some("Не удалось сохранить сообщение."),
            Some("site-key-123"),
        ))
        .into_string();

        assert!(page.contains("errorlist nonfield"));
        assert!(page.contains("Не удалось сохранить сообщение."));
        assert!(page.contains(r#"data-sitekey="site-key-123""#));
        assert!(page.contains(RECAPTCHA_SCRIPT));
    }
}
