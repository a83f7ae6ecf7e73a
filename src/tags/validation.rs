//! Named validation rules for the create-tag form.
//!
//! Rules are plain data (predicate + message) and are applied in order; the
//! first failing rule produces the field's single error message.

use serde::Serialize;
use std::fmt;

pub const MIN_TITLE_LENGTH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Title,
    Slug,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Title => write!(f, "title"),
            Field::Slug => write!(f, "slug"),
        }
    }
}

/// A user-visible error attached to a single form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ValidationRule {
    pub name: &'static str,
    pub field: Field,
    pub message: &'static str,
    pub check: fn(&str) -> bool,
}

impl ValidationRule {
    pub fn apply(&self, value: &str) -> Result<(), FieldError> {
        if (self.check)(value) {
            Ok(())
        } else {
            Err(FieldError::new(self.field, self.message))
        }
    }
}

/// Length as JavaScript's `String.length` reports it, in UTF-16 code units.
fn has_min_length(title: &str) -> bool {
    title.encode_utf16().count() >= MIN_TITLE_LENGTH
}

pub const TITLE_RULES: &[ValidationRule] = &[ValidationRule {
    name: "min_length",
    field: Field::Title,
    message: "Minimum 3 characters",
    check: has_min_length,
}];

/// Run `TITLE_RULES` in order and return the first failure.
pub fn validate_title(title: &str) -> Result<(), FieldError> {
    TITLE_RULES.iter().try_for_each(|rule| rule.apply(title))
}
