//! Contact form validation
//!
//! Submissions are checked field by field and then acknowledged; nothing
//! is stored or sent anywhere.

use crate::utils::error::{Result, ShowreelError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9\s\-+()]+$").unwrap());

const MIN_NAME_CHARS: usize = 2;
const MIN_MESSAGE_CHARS: usize = 10;
const MIN_PHONE_DIGITS: usize = 10;

/// Contact form payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub project_type: Option<String>,
}

/// A single failed field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Field failures in form order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    fn push(&mut self, field: &'static str, message: &'static str) {
        self.0.push(FieldError { field, message });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The error shown to the user
    pub fn first(&self) -> Option<&FieldError> {
        self.0.first()
    }

    /// Message for a given field, if it failed
    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.0.iter().find(|e| e.field == field).map(|e| e.message)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.first() {
            Some(e) => write!(f, "{}: {}", e.field, e.message),
            None => f.write_str("no errors"),
        }
    }
}

pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Digits with separators, at least ten digits
pub fn validate_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone) && phone.chars().filter(char::is_ascii_digit).count() >= MIN_PHONE_DIGITS
}

impl ContactForm {
    /// Collect every field failure
    pub fn errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();

        if self.name.trim().chars().count() < MIN_NAME_CHARS {
            errors.push("name", "Name must be at least 2 characters");
        }

        if !validate_email(&self.email) {
            errors.push("email", "Please enter a valid email address");
        }

        if let Some(phone) = self.phone.as_deref().filter(|p| !p.is_empty()) {
            if !validate_phone(phone) {
                errors.push("phone", "Please enter a valid phone number");
            }
        }

        if self.message.trim().chars().count() < MIN_MESSAGE_CHARS {
            errors.push("message", "Message must be at least 10 characters");
        }

        errors
    }

    /// Validate, failing with every field error
    pub fn validate(&self) -> Result<()> {
        let errors = self.errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ShowreelError::Validation(errors))
        }
    }
}
