//! JSON type checks for write bodies.
//!
//! A value of the wrong JSON type is reported against its field like any
//! other validation failure instead of rejecting the whole body. Text fields
//! are trimmed in place first, so a whitespace-only value counts as blank.

use std::str::FromStr;

use serde_json::{Map, Number, Value};

use crate::types::Price;
use crate::validation::{FieldErrors, NON_FIELD_ERRORS};

/// The JSON shape a body field must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Boolean,
    /// An integer primary key.
    Id,
    /// A number, or a string holding one.
    Decimal,
}

impl FieldKind {
    /// `null` is accepted for every kind; required checks happen later.
    fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (FieldKind::Text, Value::String(_)) => true,
            (FieldKind::Boolean, Value::Bool(_)) => true,
            (FieldKind::Id, Value::Number(n)) => n.is_i64(),
            (FieldKind::Decimal, Value::Number(n)) => decimal_number(n),
            (FieldKind::Decimal, Value::String(s)) => decimal_text(s),
            _ => false,
        }
    }

    fn message(self, value: &Value) -> String {
        match self {
            FieldKind::Text => "Not a valid string.".to_string(),
            FieldKind::Boolean => "Must be a valid boolean.".to_string(),
            FieldKind::Id => format!(
                "Incorrect type. Expected pk value, received {}.",
                json_type(value)
            ),
            FieldKind::Decimal => "A valid number is required.".to_string(),
        }
    }
}

/// Write bodies list the fields they read and the JSON kind of each.
pub trait FieldTypes {
    const FIELDS: &'static [(&'static str, FieldKind)];
}

/// Trim the text fields of `body` and collect a message for every declared
/// field whose value has the wrong type. Undeclared keys are left alone.
pub fn check_body<T: FieldTypes>(body: &mut Value) -> FieldErrors {
    match body {
        Value::Object(object) => check_fields(object, T::FIELDS),
        other => FieldErrors::single(
            NON_FIELD_ERRORS,
            format!(
                "Invalid data. Expected a dictionary, but got {}.",
                json_type(other)
            ),
        ),
    }
}

fn check_fields(object: &mut Map<String, Value>, fields: &[(&str, FieldKind)]) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for &(name, kind) in fields {
        let Some(value) = object.get_mut(name) else {
            continue;
        };
        if kind == FieldKind::Text {
            if let Value::String(text) = value {
                *text = text.trim().to_string();
            }
        }
        if !kind.accepts(value) {
            errors.add(name, kind.message(value));
        }
    }
    errors
}

// Same acceptance as rust_decimal's deserializer.
fn decimal_number(n: &Number) -> bool {
    if n.is_i64() || n.is_u64() {
        return true;
    }
    n.as_f64()
        .is_some_and(|f| Price::from_str(&f.to_string()).is_ok())
}

fn decimal_text(s: &str) -> bool {
    Price::from_str(s).is_ok() || Price::from_scientific(s).is_ok()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "int",
        Value::Number(_) => "float",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
