//! Input validation: reusable value rules and per-entity schemas.
//!
//! A schema takes an untyped JSON object and produces either a narrowed, typed
//! value or a [`ValidationErrors`] listing every offending field. Errors are
//! accumulated across all fields so a form can show them all at once.

pub mod rules;
pub mod schemas;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

pub use schemas::*;

/// Field name -> human readable messages. Ordered so responses are stable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.fields
    }

    /// Messages for one field; empty when the field is valid.
    pub fn field(&self, name: &str) -> &[String] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for messages in self.fields.values() {
            for m in messages {
                if !first {
                    f.write_str("; ")?;
                }
                f.write_str(m)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Reads fields out of an untyped object, applying a rule per field and
/// collecting failures.
pub struct Fields<'a> {
    input: &'a Map<String, Value>,
    errors: ValidationErrors,
}

impl<'a> Fields<'a> {
    pub fn new(input: &'a Map<String, Value>) -> Self {
        Fields {
            input,
            errors: ValidationErrors::new(),
        }
    }

    /// Null and blank strings count as absent.
    fn present(&self, name: &str) -> Option<&'a Value> {
        match self.input.get(name) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.trim().is_empty() => None,
            Some(v) => Some(v),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.present(name).is_some()
    }

    pub fn required<T>(&mut self, name: &str, rule: impl FnOnce(&Value) -> Result<T, String>) -> Option<T> {
        match self.present(name) {
            None => {
                self.errors.add(name, format!("{} is required", name));
                None
            }
            Some(v) => self.apply(name, v, rule),
        }
    }

    pub fn optional<T>(&mut self, name: &str, rule: impl FnOnce(&Value) -> Result<T, String>) -> Option<T> {
        let v = self.present(name)?;
        self.apply(name, v, rule)
    }

    fn apply<T>(&mut self, name: &str, v: &Value, rule: impl FnOnce(&Value) -> Result<T, String>) -> Option<T> {
        match rule(v) {
            Ok(t) => Some(t),
            Err(message) => {
                self.errors.add(name, format!("{} {}", name, message));
                None
            }
        }
    }

    /// Record a failure not tied to a single rule (e.g. cross-field checks).
    pub fn reject(&mut self, name: &str, message: impl Into<String>) {
        self.errors.add(name, message);
    }

    pub fn into_errors(self) -> ValidationErrors {
        self.errors
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}
