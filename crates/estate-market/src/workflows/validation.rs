use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use super::error::WorkflowError;

/// Field name to message map reported for malformed payloads.
///
/// Keys use the camelCase wire names; nested list entries read
/// `characteristics[0].name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message; the first failure per field wins.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn into_result(self) -> Result<(), WorkflowError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(WorkflowError::Validation(self))
        }
    }

    fn collect(&mut self, prefix: Option<&str>, errors: &ValidationErrors) {
        for (field, kind) in errors.errors() {
            let name = camel_case(field);
            let path = match prefix {
                Some(prefix) => format!("{prefix}.{name}"),
                None => name,
            };
            match kind {
                ValidationErrorsKind::Field(failures) => {
                    if let Some(first) = failures.first() {
                        self.add(&path, message_for(&path, first));
                    }
                }
                ValidationErrorsKind::Struct(inner) => self.collect(Some(&path), inner),
                ValidationErrorsKind::List(items) => {
                    for (index, inner) in items {
                        self.collect(Some(&format!("{path}[{index}]")), inner);
                    }
                }
            }
        }
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        fields.collect(None, &errors);
        fields
    }
}

impl From<ValidationErrors> for WorkflowError {
    fn from(errors: ValidationErrors) -> Self {
        WorkflowError::Validation(errors.into())
    }
}

/// Runs the derived field rules of a request payload.
pub fn validate_request<T: Validate>(request: &T) -> Result<(), WorkflowError> {
    request.validate().map_err(WorkflowError::from)
}

/// Same as [`validate_request`], keeping the failures open for extra checks.
pub fn field_errors<T: Validate>(request: &T) -> FieldErrors {
    match request.validate() {
        Ok(()) => FieldErrors::new(),
        Err(errors) => errors.into(),
    }
}

fn message_for(path: &str, error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    match error.code.as_ref() {
        "blank" => format!("{path} is required"),
        "email" => format!("{path} must be a well-formed email address"),
        code => format!("{path} failed the {code} check"),
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Rejects values that are empty once surrounding whitespace is removed.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank"))
    } else {
        Ok(())
    }
}

pub(crate) fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}
