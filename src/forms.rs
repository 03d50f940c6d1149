//! Server-side form validation.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::accounts::normalize_email;
use crate::db::models::NewContactMessage;

lazy_static::lazy_static! {
    /// Valid slug pattern: lowercase letters, numbers, and hyphens
    static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();

    /// One `@`, no whitespace, a dot somewhere in the domain.
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[^@\s]+@[^@\s.]+(?:\.[^@\s.]+)+$").unwrap();
}

/// Path segments owned by fixed routes; a page with one of these slugs would be unreachable.
pub const RESERVED_SLUGS: &[&str] = &[
    "about-us", "blog", "mission", "contact", "subscribe", "api", "health",
];

const MAX_EMAIL_LEN: usize = 254;
const MAX_NAME_LEN: usize = 100;
const MAX_SUBJECT_LEN: usize = 200;
const MAX_SLUG_LEN: usize = 50;

pub fn is_valid_slug(slug: &str) -> bool {
    slug.len() <= MAX_SLUG_LEN && SLUG_REGEX.is_match(slug)
}

pub fn is_valid_email(email: &str) -> bool {
    email.len() <= MAX_EMAIL_LEN && EMAIL_REGEX.is_match(email)
}

/// Slug check for newly created pages: well-formed and not shadowed by a fixed route.
pub fn validate_page_slug(slug: &str) -> Result<(), String> {
    if !is_valid_slug(slug) {
        return Err("Slug must contain only lowercase letters, numbers, and hyphens".to_string());
    }
    if RESERVED_SLUGS.contains(&slug) {
        return Err(format!("Slug '{}' is reserved by a built-in page", slug));
    }
    Ok(())
}

/// Field name -> error message.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

fn required(errors: &mut FieldErrors, field: &'static str, value: &str, max: Option<usize>) {
    if value.is_empty() {
        errors.add(field, "This field is required.");
    } else if let Some(max) = max {
        let len = value.chars().count();
        if len > max {
            errors.add(
                field,
                format!("Ensure this value has at most {} characters (it has {}).", max, len),
            );
        }
    }
}

/// Submitted contact form. Missing fields deserialize as empty strings so that
/// validation, not extraction, reports them.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

impl ContactForm {
    pub fn validate(&self) -> Result<NewContactMessage, FieldErrors> {
        let mut errors = FieldErrors::default();

        let name = self.name.trim();
        let email = self.email.trim();
        let subject = self.subject.trim();
        let message = self.message.trim();

        required(&mut errors, "name", name, Some(MAX_NAME_LEN));
        required(&mut errors, "email", email, None);
        if !email.is_empty() && !is_valid_email(email) {
            errors.add("email", "Enter a valid email address.");
        }
        required(&mut errors, "subject", subject, Some(MAX_SUBJECT_LEN));
        required(&mut errors, "message", message, None);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewContactMessage {
            name: name.to_string(),
            email: normalize_email(email),
            subject: subject.to_string(),
            message: message.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SubscribeForm {
    #[serde(default)]
    pub email: Option<String>,
}

impl SubscribeForm {
    /// The normalized address, or `None` when it is missing or malformed.
    pub fn valid_email(&self) -> Option<String> {
        let email = self.email.as_deref()?.trim();
        is_valid_email(email).then(|| normalize_email(email))
    }
}
