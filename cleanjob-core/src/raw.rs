//! Typed access to untrusted input.
//!
//! Raw input is a loosely-typed `serde_json::Value` tree. The helpers here
//! read one field at a time, push a [`ValidationError`] into a [`Collector`]
//! when the field is missing or malformed, and return `None` in that case so
//! callers can keep checking sibling fields instead of bailing out.

use serde_json::{Map, Value};

use crate::error::{Constraint, ValidationError, ValidationErrors};

/// Dotted location of a field inside the raw input, e.g.
/// `source.timeout_seconds` or `steps[2].operation`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(String);

impl FieldPath {
    /// The path of the input document itself.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Path of a named field below this one.
    pub fn child(&self, key: &str) -> Self {
        if self.0.is_empty() {
            Self(key.to_string())
        } else {
            Self(format!("{}.{key}", self.0))
        }
    }

    /// Path of a sequence element below this one.
    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}[{index}]", self.0))
    }

    /// Check if this is the path of the whole document.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Dotted form, empty for the root.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            write!(f, "(root)")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Accumulates errors across a whole validation pass.
#[derive(Debug, Default)]
pub(crate) struct Collector {
    errors: Vec<ValidationError>,
}

impl Collector {
    pub(crate) fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.errors.len()
    }

    /// Turn the pass into its final result. A value is only returned when
    /// nothing at all was reported.
    pub(crate) fn finish<T>(self, value: Option<T>) -> Result<T, ValidationErrors> {
        match value {
            Some(value) if self.errors.is_empty() => Ok(value),
            _ => Err(ValidationErrors::new(self.errors)),
        }
    }
}

/// Short name for the JSON shape of `value`, used in type mismatch reports.
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

/// Render a raw value for an error message. Strings are quoted.
pub(crate) fn render(value: &Value) -> String {
    value.to_string()
}

fn mismatch(path: FieldPath, expected: &'static str, found: &Value) -> ValidationError {
    ValidationError::TypeMismatch {
        path,
        expected,
        found: kind_of(found),
    }
}

pub(crate) fn as_object<'a>(
    value: &'a Value,
    path: &FieldPath,
    errors: &mut Collector,
) -> Option<&'a Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        other => {
            errors.push(mismatch(path.clone(), "mapping", other));
            None
        }
    }
}

/// A key that must be present. Explicit `null` counts as present and is
/// left for the typed readers to reject.
pub(crate) fn required<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    path: &FieldPath,
    errors: &mut Collector,
) -> Option<&'a Value> {
    let value = map.get(key);
    if value.is_none() {
        errors.push(ValidationError::MissingField {
            path: path.child(key),
        });
    }
    value
}

/// A key that may be absent. `null` is treated the same as absence.
pub(crate) fn optional<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| !v.is_null())
}

pub(crate) fn required_str<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    path: &FieldPath,
    errors: &mut Collector,
) -> Option<&'a str> {
    match required(map, key, path, errors)? {
        Value::String(s) => Some(s.as_str()),
        other => {
            errors.push(mismatch(path.child(key), "string", other));
            None
        }
    }
}

/// An optional string. The outer `None` signals a reported error; the inner
/// one means the key was absent or null.
pub(crate) fn optional_str<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    path: &FieldPath,
    errors: &mut Collector,
) -> Option<Option<&'a str>> {
    match optional(map, key) {
        None => Some(None),
        Some(Value::String(s)) => Some(Some(s.as_str())),
        Some(other) => {
            errors.push(mismatch(path.child(key), "string", other));
            None
        }
    }
}

/// A required integer bounded to `min..=max`.
pub(crate) fn required_int_in(
    map: &Map<String, Value>,
    key: &str,
    path: &FieldPath,
    (min, max): (i64, i64),
    errors: &mut Collector,
) -> Option<i64> {
    let value = required(map, key, path, errors)?;
    let out_of_range = |errors: &mut Collector| {
        errors.push(ValidationError::ConstraintViolation {
            path: path.child(key),
            value: render(value),
            constraint: Constraint::Range { min, max },
        });
    };
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => match n.as_i64() {
            Some(i) if (min..=max).contains(&i) => Some(i),
            // u64 values above i64::MAX land here too
            _ => {
                out_of_range(errors);
                None
            }
        },
        other => {
            errors.push(mismatch(path.child(key), "integer", other));
            None
        }
    }
}

/// Look up `name` in a closed set, reporting a constraint violation with the
/// full allowed set when it is not a member.
pub(crate) fn one_of<T>(
    name: &str,
    parse: impl FnOnce(&str) -> Option<T>,
    allowed: &[&'static str],
    path: FieldPath,
    errors: &mut Collector,
) -> Option<T> {
    let parsed = parse(name);
    if parsed.is_none() {
        errors.push(ValidationError::ConstraintViolation {
            path,
            value: render(&Value::String(name.to_string())),
            constraint: Constraint::OneOf(allowed.to_vec()),
        });
    }
    parsed
}
