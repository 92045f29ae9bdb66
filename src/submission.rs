use std::collections::BTreeMap;

use log::{info, warn};
use thiserror::Error as ThisError;

use crate::cookies::CookieJar;
use crate::gateway::GatewayClient;
use crate::types::{ApiErrorBody, Credentials, Recipient, SmsRequest, SubmitForm};

pub const API_KEY: &str = "api_key";
pub const API_SECRET: &str = "api_secret";

/// Message fields, in the order their errors are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Receivers,
    Sender,
    Message,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::Receivers => "Receivers-field",
            Field::Sender => "From-field",
            Field::Message => "Message-field",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum ValidationError {
    #[error("{} missing value", .0.label())]
    MissingField(Field),

    #[error("{} contains non-digit characters (only commas and digits allowed)", .0.label())]
    InvalidFormat(Field),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    by_field: BTreeMap<Field, Vec<ValidationError>>,
}

impl ValidationErrors {
    pub fn add(&mut self, field: Field, error: ValidationError) {
        self.by_field.entry(field).or_default().push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.by_field.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.by_field.values().flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    NotSubmitted,
    ValidationFailed(ValidationErrors),
    SendFailed(ApiErrorBody),
    SendSucceeded,
}

/// Checks every message field and collects all violations.
pub fn validate(form: &SubmitForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if form.receivers.is_empty() {
        errors.add(Field::Receivers, ValidationError::MissingField(Field::Receivers));
    } else {
        let digits: String = form.receivers.chars().filter(|c| *c != ',').collect();
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            errors.add(Field::Receivers, ValidationError::InvalidFormat(Field::Receivers));
        }
    }

    if form.sender.is_empty() {
        errors.add(Field::Sender, ValidationError::MissingField(Field::Sender));
    }

    if form.message.is_empty() {
        errors.add(Field::Message, ValidationError::MissingField(Field::Message));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Splits a comma-separated receiver list into recipients, trimming each
/// entry and skipping blank ones.
pub fn parse_receivers(receivers: &str) -> Vec<Recipient> {
    receivers
        .split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(|r| Recipient {
            msisdn: r.to_string(),
        })
        .collect()
}

/// Per-request state: the submitted form and the browser's cookies.
#[derive(Debug)]
pub struct RequestContext {
    pub is_post: bool,
    pub form: SubmitForm,
    pub cookies: CookieJar,
    cookies_cleared: bool,
}

impl RequestContext {
    pub fn new(is_post: bool, form: SubmitForm, cookies: CookieJar) -> Self {
        Self {
            is_post,
            form,
            cookies,
            cookies_cleared: false,
        }
    }

    /// Runs the whole submission flow and reports what happened.
    pub async fn handle_submission(
        &mut self,
        gateway: &GatewayClient,
        fallback: &Credentials,
    ) -> Outcome {
        if !self.is_post {
            return Outcome::NotSubmitted;
        }

        self.handle_api_credentials();

        if self.cookies_cleared && !self.has_message_values() {
            return Outcome::NotSubmitted;
        }

        if let Err(errors) = validate(&self.form) {
            warn!(
                "Rejected submission: {}",
                errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
            );
            return Outcome::ValidationFailed(errors);
        }

        let sms = SmsRequest {
            sender: self.form.sender.clone(),
            recipients: parse_receivers(&self.form.receivers),
            message: self.form.message.clone(),
        };

        match gateway.send_sms(&self.api_credentials(fallback), &sms).await {
            Ok(()) => {
                info!("SMS sent to {} recipient(s)", sms.recipients.len());
                Outcome::SendSucceeded
            }
            Err(err) => {
                warn!("SMS not sent: {}", err);
                Outcome::SendFailed(err.into_api_error())
            }
        }
    }

    fn handle_api_credentials(&mut self) {
        if self.form.api_clear_cookie == "1" {
            self.cookies.expire(API_KEY);
            self.cookies.expire(API_SECRET);
            self.cookies_cleared = true;
            return;
        }

        if !self.form.api_key.is_empty() {
            self.cookies.store(API_KEY, &self.form.api_key);
        }
        if !self.form.api_secret.is_empty() {
            self.cookies.store(API_SECRET, &self.form.api_secret);
        }
    }

    fn has_message_values(&self) -> bool {
        [&self.form.receivers, &self.form.sender, &self.form.message]
            .iter()
            .any(|v| !v.is_empty())
    }

    /// Value to use for a credential field (`api_key` or `api_secret`).
    ///
    /// A fresh non-empty submission that differs from the stored cookie wins,
    /// then the stored cookie, then whatever was submitted. Text fields render
    /// empty right after a reset; the cookies the browser sent still count for
    /// the send in that same request.
    pub fn credential_value(&self, key: &str, text_field: bool) -> String {
        if text_field && self.cookies_cleared {
            return String::new();
        }

        let submitted = match key {
            API_KEY => self.form.api_key.as_str(),
            API_SECRET => self.form.api_secret.as_str(),
            _ => "",
        };
        let stored = self.cookies.get(key).filter(|v| !v.is_empty());

        if !submitted.is_empty() && Some(submitted) != stored {
            return submitted.to_string();
        }

        stored.unwrap_or(submitted).to_string()
    }

    /// Credentials from the browser, or the configured fallback when the
    /// browser supplies neither a key nor a secret.
    pub fn api_credentials(&self, fallback: &Credentials) -> Credentials {
        let stored = Credentials {
            key: self.credential_value(API_KEY, false),
            secret: self.credential_value(API_SECRET, false),
        };

        if stored.is_empty() {
            fallback.clone()
        } else {
            stored
        }
    }
}
