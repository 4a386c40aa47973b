//! Error types for cleaning job validation.
//!
//! Every failure is a structured [`ValidationError`] carrying the field path
//! it refers to, an [`ErrorKind`], and a human-readable message. Validation
//! never stops at the first problem: a failed parse returns a
//! [`ValidationErrors`] batch holding everything that was found.

use serde::Serialize;

use crate::raw::FieldPath;

/// Coarse classification of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A required key is absent from the input.
    MissingField,
    /// A present value has the wrong primitive shape.
    TypeMismatch,
    /// A value lies outside an allowed set, range or length.
    ConstraintViolation,
    /// The union tag names no known alternative.
    DiscriminatorMismatch,
    /// Individually valid fields combine into an invalid state.
    CrossFieldRuleViolation,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::MissingField => write!(f, "missing_field"),
            ErrorKind::TypeMismatch => write!(f, "type_mismatch"),
            ErrorKind::ConstraintViolation => write!(f, "constraint_violation"),
            ErrorKind::DiscriminatorMismatch => write!(f, "discriminator_mismatch"),
            ErrorKind::CrossFieldRuleViolation => write!(f, "cross_field_rule_violation"),
        }
    }
}

/// The rule a value failed in a [`ValidationError::ConstraintViolation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Value must be one of a closed set of names.
    OneOf(Vec<&'static str>),
    /// Integer must lie in `min..=max`.
    Range { min: i64, max: i64 },
    /// String must have at least this many characters.
    MinLength(usize),
    /// String must keep at least one character after normalization.
    NotBlank,
}

impl std::fmt::Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constraint::OneOf(allowed) => write!(f, "must be one of [{}]", allowed.join(", ")),
            Constraint::Range { min, max } => write!(f, "must be between {min} and {max}"),
            Constraint::MinLength(1) => write!(f, "must not be empty"),
            Constraint::MinLength(n) => write!(f, "must have at least {n} characters"),
            Constraint::NotBlank => write!(f, "must contain a non-whitespace character"),
        }
    }
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{path}: missing required field")]
    MissingField { path: FieldPath },

    #[error("{path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: FieldPath,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{path}: {constraint} (got {value})")]
    ConstraintViolation {
        path: FieldPath,
        value: String,
        constraint: Constraint,
    },

    #[error("{path}: unknown variant {got:?}, expected one of [{}]", .allowed.join(", "))]
    DiscriminatorMismatch {
        path: FieldPath,
        got: String,
        allowed: Vec<&'static str>,
    },

    #[error("{path}: {reason} ({})", render_observed(.observed))]
    CrossFieldRuleViolation {
        path: FieldPath,
        reason: String,
        observed: Vec<(FieldPath, String)>,
    },
}

fn render_observed(observed: &[(FieldPath, String)]) -> String {
    observed
        .iter()
        .map(|(path, value)| format!("{path} = {value}"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationError {
    /// The path of the field (or, for cross-field rules, the enclosing
    /// mapping) this error refers to.
    pub fn path(&self) -> &FieldPath {
        match self {
            ValidationError::MissingField { path }
            | ValidationError::TypeMismatch { path, .. }
            | ValidationError::ConstraintViolation { path, .. }
            | ValidationError::DiscriminatorMismatch { path, .. }
            | ValidationError::CrossFieldRuleViolation { path, .. } => path,
        }
    }

    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::MissingField { .. } => ErrorKind::MissingField,
            ValidationError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            ValidationError::ConstraintViolation { .. } => ErrorKind::ConstraintViolation,
            ValidationError::DiscriminatorMismatch { .. } => ErrorKind::DiscriminatorMismatch,
            ValidationError::CrossFieldRuleViolation { .. } => ErrorKind::CrossFieldRuleViolation,
        }
    }

    /// Every field path involved. Cross-field violations name each field
    /// of the rule; other kinds name just their own path.
    pub fn fields(&self) -> Vec<&FieldPath> {
        match self {
            ValidationError::CrossFieldRuleViolation { observed, .. } => {
                observed.iter().map(|(path, _)| path).collect()
            }
            other => vec![other.path()],
        }
    }
}

/// A non-empty batch of validation failures from one parse call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub(crate) fn new(errors: Vec<ValidationError>) -> Self {
        debug_assert!(!errors.is_empty(), "ValidationErrors must not be empty");
        Self(errors)
    }

    /// All errors, in the order they were found.
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    /// Number of errors in the batch (always at least one).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false` for batches returned by this crate.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the errors in discovery order.
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    /// Kinds of all contained errors, in order.
    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.0.iter().map(ValidationError::kind).collect()
    }

    /// Check if any error in the batch has the given kind.
    pub fn has_kind(&self, kind: ErrorKind) -> bool {
        self.0.iter().any(|e| e.kind() == kind)
    }

    /// Errors whose path equals `path` (given as its dotted string form).
    pub fn at(&self, path: &str) -> Vec<&ValidationError> {
        self.0.iter().filter(|e| e.path().as_str() == path).collect()
    }

    /// Consume the batch into its underlying errors.
    pub fn into_vec(self) -> Vec<ValidationError> {
        self.0
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let noun = if self.0.len() == 1 { "error" } else { "errors" };
        write!(f, "{} validation {noun}", self.0.len())?;
        for error in &self.0 {
            write!(f, "\n  - [{}] {error}", error.kind())?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
