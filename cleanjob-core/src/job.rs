//! The cleaning job aggregate.
//!
//! [`CleaningJobConfig::parse`] is the entry point for untrusted input. It
//! validates every section, keeps going after failures, and either returns
//! a fully assembled job or every error it found.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{Constraint, ValidationError, ValidationErrors};
use crate::output::OutputConfig;
use crate::raw::{self, Collector, FieldPath};
use crate::source::SourceConfig;
use crate::step::CleaningStep;

/// A validated, immutable cleaning job description.
///
/// `Serialize` renders the job with the API token masked. Use
/// [`CleaningJobConfig::to_raw`] when the exact input shape is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct CleaningJobConfig {
    job_name: String,
    source: SourceConfig,
    steps: Vec<CleaningStep>,
    output: OutputConfig,
}

/// Normalize a job name: trim, lowercase, then turn each space into `_`.
///
/// Only the literal space character is replaced. Tabs and other interior
/// whitespace are kept as they are.
pub fn normalize_job_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

impl CleaningJobConfig {
    /// Validate a raw job document.
    pub fn parse(raw: &Value) -> Result<Self, ValidationErrors> {
        let mut errors = Collector::default();
        let job = Self::collect(raw, &mut errors);

        match errors.finish(job) {
            Ok(job) => {
                tracing::debug!(
                    job_name = %job.job_name,
                    source_type = job.source.source_type(),
                    steps = job.steps.len(),
                    format = %job.output.format(),
                    "cleaning job validated"
                );
                Ok(job)
            }
            Err(errors) => {
                tracing::debug!(errors = errors.len(), "cleaning job rejected");
                Err(errors)
            }
        }
    }

    fn collect(raw: &Value, errors: &mut Collector) -> Option<Self> {
        let root = FieldPath::root();
        let map = raw::as_object(raw, &root, errors)?;

        for key in map.keys() {
            if !matches!(key.as_str(), "job_name" | "source" | "steps" | "output") {
                tracing::debug!(key = %key, "ignoring unknown top-level key");
            }
        }

        let job_name = raw::required_str(map, "job_name", &root, errors)
            .and_then(|name| Self::validate_job_name(name, &root.child("job_name"), errors));

        let source_path = root.child("source");
        let source = raw::required(map, "source", &root, errors)
            .and_then(|value| SourceConfig::parse(value, &source_path, errors));

        let steps = raw::required(map, "steps", &root, errors)
            .and_then(|value| Self::parse_steps(value, &root.child("steps"), errors));

        let output_path = root.child("output");
        let output = raw::required(map, "output", &root, errors)
            .and_then(|value| OutputConfig::parse(value, &output_path, errors));

        Some(Self {
            job_name: job_name?,
            source: source?,
            steps: steps?,
            output: output?,
        })
    }

    fn validate_job_name(name: &str, path: &FieldPath, errors: &mut Collector) -> Option<String> {
        if name.is_empty() {
            errors.push(ValidationError::ConstraintViolation {
                path: path.clone(),
                value: "\"\"".to_string(),
                constraint: Constraint::MinLength(1),
            });
            return None;
        }

        let normalized = normalize_job_name(name);
        if normalized.is_empty() {
            errors.push(ValidationError::ConstraintViolation {
                path: path.clone(),
                value: raw::render(&json!(name)),
                constraint: Constraint::NotBlank,
            });
            return None;
        }
        Some(normalized)
    }

    fn parse_steps(
        value: &Value,
        path: &FieldPath,
        errors: &mut Collector,
    ) -> Option<Vec<CleaningStep>> {
        let Value::Array(items) = value else {
            errors.push(ValidationError::TypeMismatch {
                path: path.clone(),
                expected: "sequence",
                found: raw::kind_of(value),
            });
            return None;
        };

        // Parse every element before giving up so all step errors surface.
        let mut steps = Vec::with_capacity(items.len());
        let mut failed = false;
        for (index, item) in items.iter().enumerate() {
            match CleaningStep::parse(item, &path.index(index), errors) {
                Some(step) => steps.push(step),
                None => failed = true,
            }
        }
        (!failed).then_some(steps)
    }

    /// The normalized job name.
    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    /// The resolved data source.
    pub fn source(&self) -> &SourceConfig {
        &self.source
    }

    /// Steps in the order they were given.
    pub fn steps(&self) -> &[CleaningStep] {
        &self.steps
    }

    /// Where and how cleaned data is written.
    pub fn output(&self) -> &OutputConfig {
        &self.output
    }

    /// Serialize back to the nested-mapping input shape.
    ///
    /// The result contains the raw API token for URL sources, so that
    /// `CleaningJobConfig::parse(&job.to_raw())` reproduces `job` exactly.
    /// Do not log it; use the `Serialize` impl for display.
    pub fn to_raw(&self) -> Value {
        json!({
            "job_name": self.job_name,
            "source": self.source.to_raw(),
            "steps": self.steps.iter().map(CleaningStep::to_raw).collect::<Vec<_>>(),
            "output": self.output.to_raw(),
        })
    }
}

impl TryFrom<Value> for CleaningJobConfig {
    type Error = ValidationErrors;

    fn try_from(raw: Value) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl TryFrom<&Value> for CleaningJobConfig {
    type Error = ValidationErrors;

    fn try_from(raw: &Value) -> Result<Self, Self::Error> {
        Self::parse(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::output::{Compression, OutputFormat};
    use crate::secret::MASK;
    use crate::step::CleaningOperation;
    use pretty_assertions::assert_eq;

    fn full_config() -> Value {
        json!({
            "job_name": "  Clean Product Reviews  ",
            "source": {
                "source_type": "local",
                "path": "data/reviews.csv",
                "encoding": "utf-8",
            },
            "steps": [
                {"operation": "drop_nulls", "params": {}},
                {"operation": "rename_columns", "params": {"old": "rev", "new": "review"}},
            ],
            "output": {
                "format": "parquet",
                "directory": "output/",
                "compression": "snappy",
            },
        })
    }

    fn url_config() -> Value {
        json!({
            "job_name": "API Job",
            "source": {
                "source_type": "url",
                "url": "https://api.example.com/data",
                "timeout_seconds": 60,
                "api_token": "secret",
            },
            "steps": [{"operation": "drop_nulls"}],
            "output": {"format": "jsonl", "directory": "output/"},
        })
    }

    #[test]
    fn test_normalize_job_name() {
        assert_eq!(normalize_job_name("  Clean Product Reviews  "), "clean_product_reviews");
        assert_eq!(normalize_job_name("API Job"), "api_job");
        assert_eq!(normalize_job_name("a  b"), "a__b");
        assert_eq!(normalize_job_name("a\tb"), "a\tb");
        assert_eq!(normalize_job_name("\tTabbed Name\n"), "tabbed_name");
    }

    #[test]
    fn test_full_config_parses() {
        let job = CleaningJobConfig::parse(&full_config()).unwrap();
        assert_eq!(job.job_name(), "clean_product_reviews");
        assert_eq!(job.source().source_type(), "local");
        assert_eq!(job.steps().len(), 2);
        assert_eq!(job.steps()[0].operation(), CleaningOperation::DropNulls);
        assert_eq!(job.steps()[1].operation(), CleaningOperation::RenameColumns);
        assert_eq!(job.output().format(), OutputFormat::Parquet);
        assert_eq!(job.output().compression(), Some(Compression::Snappy));
    }

    #[test]
    fn test_url_source_job() {
        let job = CleaningJobConfig::parse(&url_config()).unwrap();
        assert_eq!(job.job_name(), "api_job");
        assert_eq!(job.source().source_type(), "url");
    }

    #[test]
    fn test_empty_job_name_rejected() {
        let mut raw = full_config();
        raw["job_name"] = json!("");
        let errors = CleaningJobConfig::parse(&raw).unwrap_err();
        assert_eq!(errors.kinds(), vec![ErrorKind::ConstraintViolation]);
        assert_eq!(errors.errors()[0].path().as_str(), "job_name");
    }

    #[test]
    fn test_whitespace_only_job_name_rejected() {
        let mut raw = full_config();
        raw["job_name"] = json!("   ");
        let errors = CleaningJobConfig::parse(&raw).unwrap_err();
        assert!(matches!(
            &errors.errors()[0],
            ValidationError::ConstraintViolation {
                constraint: Constraint::NotBlank,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_steps_allowed() {
        let mut raw = full_config();
        raw["steps"] = json!([]);
        let job = CleaningJobConfig::parse(&raw).unwrap();
        assert!(job.steps().is_empty());
    }

    #[test]
    fn test_missing_sections_all_reported() {
        let errors = CleaningJobConfig::parse(&json!({})).unwrap_err();
        let paths: Vec<&str> = errors.iter().map(|e| e.path().as_str()).collect();
        assert_eq!(paths, vec!["job_name", "source", "steps", "output"]);
        assert!(errors.iter().all(|e| e.kind() == ErrorKind::MissingField));
    }

    #[test]
    fn test_errors_from_every_section_collected() {
        let raw = json!({
            "job_name": 7,
            "source": {"source_type": "ftp", "path": "x"},
            "steps": [
                {"operation": "drop_nulls"},
                {"operation": "unsupported_op"},
                {"operation": "explode"},
            ],
            "output": {"format": "csv", "directory": "out/", "compression": "gzip"},
        });
        let errors = CleaningJobConfig::parse(&raw).unwrap_err();
        let found: Vec<(&str, ErrorKind)> = errors
            .iter()
            .map(|e| (e.path().as_str(), e.kind()))
            .collect();
        assert_eq!(
            found,
            vec![
                ("job_name", ErrorKind::TypeMismatch),
                ("source.source_type", ErrorKind::DiscriminatorMismatch),
                ("steps[1].operation", ErrorKind::ConstraintViolation),
                ("steps[2].operation", ErrorKind::ConstraintViolation),
                ("output", ErrorKind::CrossFieldRuleViolation),
            ]
        );
    }

    #[test]
    fn test_steps_must_be_sequence() {
        let mut raw = full_config();
        raw["steps"] = json!({"operation": "drop_nulls"});
        let errors = CleaningJobConfig::parse(&raw).unwrap_err();
        assert_eq!(errors.kinds(), vec![ErrorKind::TypeMismatch]);
        assert_eq!(errors.errors()[0].path().as_str(), "steps");
    }

    #[test]
    fn test_root_must_be_mapping() {
        let errors = CleaningJobConfig::parse(&json!(["job"])).unwrap_err();
        assert_eq!(errors.kinds(), vec![ErrorKind::TypeMismatch]);
        assert!(errors.errors()[0].path().is_root());
    }

    #[test]
    fn test_unknown_top_level_keys_ignored() {
        let mut raw = full_config();
        raw["owner"] = json!("data-team");
        assert!(CleaningJobConfig::parse(&raw).is_ok());
    }

    #[test]
    fn test_round_trip() {
        for raw in [full_config(), url_config()] {
            let job = CleaningJobConfig::parse(&raw).unwrap();
            let again = CleaningJobConfig::parse(&job.to_raw()).unwrap();
            assert_eq!(again, job);
        }
    }

    #[test]
    fn test_to_raw_shape() {
        let job = CleaningJobConfig::parse(&url_config()).unwrap();
        assert_eq!(
            job.to_raw(),
            json!({
                "job_name": "api_job",
                "source": {
                    "source_type": "url",
                    "url": "https://api.example.com/data",
                    "timeout_seconds": 60,
                    "api_token": "secret",
                },
                "steps": [{"operation": "drop_nulls", "params": {}}],
                "output": {"format": "jsonl", "directory": "output/"},
            })
        );
    }

    #[test]
    fn test_serialize_masks_token() {
        let job = CleaningJobConfig::parse(&url_config()).unwrap();
        let json = serde_json::to_string(&job).unwrap();
        assert!(json.contains("api_job"));
        assert!(json.contains(MASK));
        assert!(!json.contains("\"secret\""));
        assert!(!format!("{job:?}").contains("\"secret\""));
    }

    #[test]
    fn test_serialize_local_job_json() {
        let job = CleaningJobConfig::parse(&full_config()).unwrap();
        let json = serde_json::to_string(&job).unwrap();
        assert!(json.contains("clean_product_reviews"));
        assert!(json.contains("local"));
    }

    #[test]
    fn test_deserialize_runs_validation() {
        let job: CleaningJobConfig = serde_json::from_value(full_config()).unwrap();
        assert_eq!(job.job_name(), "clean_product_reviews");

        let mut bad = full_config();
        bad["output"]["compression"] = json!(null);
        let err = serde_json::from_value::<CleaningJobConfig>(bad).unwrap_err();
        assert!(err.to_string().contains("cross_field_rule_violation"));
    }

    #[test]
    fn test_try_from_value() {
        let job = CleaningJobConfig::try_from(full_config()).unwrap();
        assert_eq!(CleaningJobConfig::try_from(&job.to_raw()).unwrap(), job);
    }
}
