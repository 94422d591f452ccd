//! Declarative rule tables
//!
//! A resource describes its body as a static slice of [`FieldRule`]s. One
//! generic routine, [`RuleSet::validate`], interprets the table for both
//! create and update and produces the normalised document to store.

use mongodb::bson::{Bson, Document};
use serde_json::Value;

use super::{filters, validators};
use crate::core::error::{ApiError, ApiResult, FieldValidationError};

/// Which write a body is validated for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Required fields must be present
    Create,
    /// Every field is optional, but at least one must be present
    Update,
}

/// Expected type and constraint of a field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Text,
    Number { min: Option<f64>, max: Option<f64> },
    Integer { min: Option<i64> },
    Boolean,
    Email,
    OneOf(&'static [&'static str]),
    /// Embedded identifier of another record
    Reference,
}

/// Rule for one body field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRule {
    /// Key in the request body and the stored document
    pub field: &'static str,
    /// Human label used in error messages
    pub label: &'static str,
    pub kind: FieldKind,
    /// Required on create
    pub required: bool,
}

impl FieldRule {
    const fn new(field: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            field,
            label,
            kind,
            required: true,
        }
    }

    pub const fn text(field: &'static str, label: &'static str) -> Self {
        Self::new(field, label, FieldKind::Text)
    }

    pub const fn number(field: &'static str, label: &'static str) -> Self {
        Self::new(field, label, FieldKind::Number { min: None, max: None })
    }

    pub const fn bounded_number(
        field: &'static str,
        label: &'static str,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Self {
        Self::new(field, label, FieldKind::Number { min, max })
    }

    pub const fn integer(field: &'static str, label: &'static str, min: Option<i64>) -> Self {
        Self::new(field, label, FieldKind::Integer { min })
    }

    pub const fn boolean(field: &'static str, label: &'static str) -> Self {
        Self::new(field, label, FieldKind::Boolean)
    }

    pub const fn email(field: &'static str, label: &'static str) -> Self {
        Self::new(field, label, FieldKind::Email)
    }

    pub const fn one_of(
        field: &'static str,
        label: &'static str,
        allowed: &'static [&'static str],
    ) -> Self {
        Self::new(field, label, FieldKind::OneOf(allowed))
    }

    pub const fn reference(field: &'static str, label: &'static str) -> Self {
        Self::new(field, label, FieldKind::Reference)
    }

    /// Not required on create
    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Type-check and normalise a present value
    pub fn check(&self, value: &Value) -> Result<Bson, String> {
        let label = self.label;
        match self.kind {
            FieldKind::Text => filters::to_text(value)
                .map(Bson::String)
                .ok_or_else(|| format!("{} must be a string", label)),

            FieldKind::Number { min, max } => {
                let number =
                    filters::to_number(value).ok_or_else(|| format!("{} must be a number", label))?;
                if validators::within(number, min, max) {
                    Ok(Bson::Double(number))
                } else {
                    Err(bounds_message(label, min, max))
                }
            }

            FieldKind::Integer { min } => {
                let message = match min {
                    Some(_) => format!("{} must be a positive integer", label),
                    None => format!("{} must be an integer", label),
                };
                match filters::to_integer(value) {
                    Some(n) if min.is_none_or(|m| n >= m) => Ok(Bson::Int64(n)),
                    _ => Err(message),
                }
            }

            FieldKind::Boolean => filters::to_boolean(value)
                .map(Bson::Boolean)
                .ok_or_else(|| format!("{} must be a boolean (true or false)", label)),

            FieldKind::Email => match value.as_str() {
                Some(s) if validators::is_email(s) => Ok(Bson::String(s.to_string())),
                _ => Err("Must be a valid email".to_string()),
            },

            FieldKind::OneOf(allowed) => match value.as_str() {
                Some(s) if validators::one_of(s, allowed) => Ok(Bson::String(s.to_string())),
                _ => Err(format!("{} must be one of: {}", label, allowed.join(", "))),
            },

            FieldKind::Reference => filters::to_object_id(value)
                .map(Bson::ObjectId)
                .ok_or_else(|| format!("{} must be a valid identifier", label)),
        }
    }
}

fn bounds_message(label: &str, min: Option<f64>, max: Option<f64>) -> String {
    match (min, max) {
        (Some(lo), Some(hi)) => format!("{} must be between {} and {}", label, lo, hi),
        (Some(lo), None) => format!("{} must be at least {}", label, lo),
        (None, Some(hi)) => format!("{} must be at most {}", label, hi),
        (None, None) => format!("{} must be a number", label),
    }
}

/// Static rule table of one resource
#[derive(Debug, Clone, Copy)]
pub struct RuleSet {
    rules: &'static [FieldRule],
}

impl RuleSet {
    pub const fn new(rules: &'static [FieldRule]) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &'static [FieldRule] {
        self.rules
    }

    pub fn get(&self, field: &str) -> Option<&'static FieldRule> {
        self.rules.iter().find(|rule| rule.field == field)
    }

    /// Field names required on create, in table order
    pub fn required_fields(&self) -> impl Iterator<Item = &'static str> {
        self.rules
            .iter()
            .filter(|rule| rule.required)
            .map(|rule| rule.field)
    }

    /// Validate a request body and build the document to write
    ///
    /// Errors are collected for every field, one per field, in table order.
    /// Fields the table does not know are dropped.
    pub fn validate(&self, body: &Value, operation: Operation) -> ApiResult<Document> {
        let Some(object) = body.as_object() else {
            return Err(ApiError::InvalidJson {
                message: "expected a JSON object".to_string(),
            });
        };

        if operation == Operation::Update
            && !self.rules.iter().any(|rule| object.contains_key(rule.field))
        {
            return Err(ApiError::EmptyUpdate);
        }

        let mut document = Document::new();
        let mut errors = Vec::new();

        for rule in self.rules {
            let value = object.get(rule.field);

            if operation == Operation::Create && rule.required && validators::is_blank(value) {
                errors.push(FieldValidationError::new(
                    rule.field,
                    format!("{} is required", rule.label),
                ));
                continue;
            }

            let Some(value) = value else { continue };
            if operation == Operation::Create && value.is_null() {
                continue;
            }

            match rule.check(value) {
                Ok(normalised) => {
                    document.insert(rule.field, normalised);
                }
                Err(message) => errors.push(FieldValidationError::new(rule.field, message)),
            }
        }

        if errors.is_empty() {
            Ok(document)
        } else {
            Err(ApiError::Validation(errors))
        }
    }
}
