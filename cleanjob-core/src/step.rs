//! Cleaning step descriptors.

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::error::{ValidationError, ValidationErrors};
use crate::raw::{self, Collector, FieldPath};

/// The closed set of supported cleaning operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningOperation {
    DropNulls,
    DropDuplicates,
    FillNulls,
    RenameColumns,
}

impl CleaningOperation {
    /// Every operation, in declaration order.
    pub const ALL: [CleaningOperation; 4] = [
        CleaningOperation::DropNulls,
        CleaningOperation::DropDuplicates,
        CleaningOperation::FillNulls,
        CleaningOperation::RenameColumns,
    ];

    /// Wire names, in the same order as [`CleaningOperation::ALL`].
    pub const NAMES: [&'static str; 4] =
        ["drop_nulls", "drop_duplicates", "fill_nulls", "rename_columns"];

    /// Wire name of this operation.
    pub fn as_str(self) -> &'static str {
        match self {
            CleaningOperation::DropNulls => "drop_nulls",
            CleaningOperation::DropDuplicates => "drop_duplicates",
            CleaningOperation::FillNulls => "fill_nulls",
            CleaningOperation::RenameColumns => "rename_columns",
        }
    }

    /// Parse a wire name. Matching is exact and case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name)
    }
}

impl std::fmt::Display for CleaningOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One cleaning operation plus its free-form parameters.
///
/// `params` is passed through untouched; interpreting it is the executor's job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleaningStep {
    operation: CleaningOperation,
    params: Map<String, Value>,
}

impl CleaningStep {
    /// Validate a single step descriptor.
    pub fn from_value(raw: &Value) -> Result<Self, ValidationErrors> {
        let mut errors = Collector::default();
        let step = Self::parse(raw, &FieldPath::root(), &mut errors);
        errors.finish(step)
    }

    pub(crate) fn parse(raw: &Value, path: &FieldPath, errors: &mut Collector) -> Option<Self> {
        let map = raw::as_object(raw, path, errors)?;

        let operation = raw::required_str(map, "operation", path, errors).and_then(|name| {
            raw::one_of(
                name,
                CleaningOperation::from_name,
                &CleaningOperation::NAMES,
                path.child("operation"),
                errors,
            )
        });

        let params = match raw::optional(map, "params") {
            None => Some(Map::new()),
            Some(Value::Object(params)) => Some(params.clone()),
            Some(other) => {
                errors.push(ValidationError::TypeMismatch {
                    path: path.child("params"),
                    expected: "mapping",
                    found: raw::kind_of(other),
                });
                None
            }
        };

        Some(Self {
            operation: operation?,
            params: params?,
        })
    }

    /// The operation to run.
    pub fn operation(&self) -> CleaningOperation {
        self.operation
    }

    /// Operation parameters, passed through as given.
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// Plain mapping in the input shape.
    pub fn to_raw(&self) -> Value {
        json!({
            "operation": self.operation.as_str(),
            "params": Value::Object(self.params.clone()),
        })
    }
}
