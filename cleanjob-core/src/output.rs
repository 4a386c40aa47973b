//! Output configuration and the format/compression rule.
//!
//! | format  | compression                  |
//! |---------|------------------------------|
//! | csv     | absent or null               |
//! | jsonl   | absent or null               |
//! | parquet | required, `snappy` or `gzip` |

use serde::Serialize;
use serde_json::{Value, json};

use crate::error::{ValidationError, ValidationErrors};
use crate::raw::{self, Collector, FieldPath};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Parquet,
    Jsonl,
}

impl OutputFormat {
    /// Every output format, in declaration order.
    pub const ALL: [OutputFormat; 3] = [
        OutputFormat::Csv,
        OutputFormat::Parquet,
        OutputFormat::Jsonl,
    ];
    /// Wire names, in the same order as [`OutputFormat::ALL`].
    pub const NAMES: [&'static str; 3] = ["csv", "parquet", "jsonl"];

    /// Wire name of this format.
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
            OutputFormat::Jsonl => "jsonl",
        }
    }

    /// Parse a wire name. Matching is exact and case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }

    /// Whether this format carries its own compression codec.
    pub fn requires_compression(self) -> bool {
        matches!(self, OutputFormat::Parquet)
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compression codecs accepted for parquet output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    Snappy,
    Gzip,
}

impl Compression {
    /// Every supported codec.
    pub const ALL: [Compression; 2] = [Compression::Snappy, Compression::Gzip];

    /// Wire name of this codec.
    pub fn as_str(self) -> &'static str {
        match self {
            Compression::Snappy => "snappy",
            Compression::Gzip => "gzip",
        }
    }

    /// Parse a wire name. Matching is exact and case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl std::fmt::Display for Compression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputConfig {
    format: OutputFormat,
    directory: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    compression: Option<Compression>,
}

impl OutputConfig {
    /// Validate a raw output mapping, including the format/compression rule.
    pub fn validate(raw: &Value) -> Result<Self, ValidationErrors> {
        let mut errors = Collector::default();
        let output = Self::parse(raw, &FieldPath::root(), &mut errors);
        errors.finish(output)
    }

    pub(crate) fn parse(raw: &Value, path: &FieldPath, errors: &mut Collector) -> Option<Self> {
        let map = raw::as_object(raw, path, errors)?;

        let format = raw::required_str(map, "format", path, errors).and_then(|name| {
            raw::one_of(
                name,
                OutputFormat::from_name,
                &OutputFormat::NAMES,
                path.child("format"),
                errors,
            )
        });
        let directory = raw::required_str(map, "directory", path, errors);
        let compression = raw::optional_str(map, "compression", path, errors);

        // The cross-field rule only runs once every field it reads is sound.
        let (Some(format), Some(directory), Some(compression)) = (format, directory, compression)
        else {
            return None;
        };

        let compression = match check_compression(format, compression) {
            Ok(compression) => compression,
            Err(reason) => {
                errors.push(ValidationError::CrossFieldRuleViolation {
                    path: path.clone(),
                    reason,
                    observed: vec![
                        (path.child("format"), raw::render(&json!(format.as_str()))),
                        (path.child("compression"), raw::render(&json!(compression))),
                    ],
                });
                return None;
            }
        };

        Some(Self {
            format,
            directory: directory.to_string(),
            compression,
        })
    }

    /// Output file format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Destination directory, as given.
    pub fn directory(&self) -> &str {
        &self.directory
    }

    /// Compression codec. Only set for parquet.
    pub fn compression(&self) -> Option<Compression> {
        self.compression
    }

    /// Plain mapping in the input shape. `compression` is omitted when unset.
    pub fn to_raw(&self) -> Value {
        let mut raw = json!({
            "format": self.format.as_str(),
            "directory": self.directory,
        });
        if let Some(compression) = self.compression {
            raw["compression"] = json!(compression.as_str());
        }
        raw
    }
}

fn check_compression(
    format: OutputFormat,
    compression: Option<&str>,
) -> Result<Option<Compression>, String> {
    match (format.requires_compression(), compression) {
        (true, Some(name)) => Compression::from_name(name).map(Some).ok_or_else(|| {
            format!("{format} output requires compression to be one of [snappy, gzip]")
        }),
        (true, None) => Err(format!(
            "{format} output requires compression to be one of [snappy, gzip]"
        )),
        (false, None) => Ok(None),
        (false, Some(_)) => Err(format!("{format} output must not set compression")),
    }
}
