//! Data source configuration: a local file or a remote URL.
//!
//! The `source_type` field picks the alternative. [`SourceConfig::resolve`]
//! is the one place that branches on it; everything downstream matches on
//! the typed enum instead.

use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::error::{Constraint, ValidationError, ValidationErrors};
use crate::raw::{self, Collector, FieldPath};
use crate::secret::SecretToken;

/// Known values of the `source_type` discriminator.
pub const SOURCE_TYPES: [&str; 2] = ["local", "url"];

/// Encoding used when a local source does not name one.
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Inclusive bounds for [`UrlSourceConfig::timeout_seconds`].
pub const TIMEOUT_RANGE: (i64, i64) = (1, 120);

/// Where the job reads its input from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source_type", rename_all = "lowercase")]
pub enum SourceConfig {
    Local(LocalSourceConfig),
    Url(UrlSourceConfig),
}

/// A file on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalSourceConfig {
    path: String,
    encoding: String,
}

/// A remote HTTP endpoint guarded by an API token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlSourceConfig {
    url: String,
    timeout_seconds: u32,
    api_token: SecretToken,
}

impl SourceConfig {
    /// Resolve a raw source mapping into the matching alternative.
    pub fn resolve(raw: &Value) -> Result<Self, ValidationErrors> {
        let mut errors = Collector::default();
        let source = Self::parse(raw, &FieldPath::root(), &mut errors);
        errors.finish(source)
    }

    pub(crate) fn parse(raw: &Value, path: &FieldPath, errors: &mut Collector) -> Option<Self> {
        let map = raw::as_object(raw, path, errors)?;
        let tag = raw::required_str(map, "source_type", path, errors)?;

        tracing::trace!(path = %path, source_type = tag, "resolving source");
        match tag {
            "local" => LocalSourceConfig::parse(map, path, errors).map(SourceConfig::Local),
            "url" => UrlSourceConfig::parse(map, path, errors).map(SourceConfig::Url),
            other => {
                errors.push(ValidationError::DiscriminatorMismatch {
                    path: path.child("source_type"),
                    got: other.to_string(),
                    allowed: SOURCE_TYPES.to_vec(),
                });
                None
            }
        }
    }

    /// The discriminator value for this alternative.
    pub fn source_type(&self) -> &'static str {
        match self {
            SourceConfig::Local(_) => "local",
            SourceConfig::Url(_) => "url",
        }
    }

    /// The local variant, if this is one.
    pub fn as_local(&self) -> Option<&LocalSourceConfig> {
        match self {
            SourceConfig::Local(local) => Some(local),
            SourceConfig::Url(_) => None,
        }
    }

    /// The url variant, if this is one.
    pub fn as_url(&self) -> Option<&UrlSourceConfig> {
        match self {
            SourceConfig::Url(url) => Some(url),
            SourceConfig::Local(_) => None,
        }
    }

    /// Plain mapping in the input shape. For URL sources this contains the
    /// raw API token.
    pub fn to_raw(&self) -> Value {
        match self {
            SourceConfig::Local(local) => json!({
                "source_type": "local",
                "path": local.path,
                "encoding": local.encoding,
            }),
            SourceConfig::Url(url) => json!({
                "source_type": "url",
                "url": url.url,
                "timeout_seconds": url.timeout_seconds,
                "api_token": url.api_token.expose_secret(),
            }),
        }
    }
}

impl LocalSourceConfig {
    fn parse(map: &Map<String, Value>, path: &FieldPath, errors: &mut Collector) -> Option<Self> {
        let file = raw::required_str(map, "path", path, errors).and_then(|file| {
            if file.is_empty() {
                errors.push(ValidationError::ConstraintViolation {
                    path: path.child("path"),
                    value: "\"\"".to_string(),
                    constraint: Constraint::MinLength(1),
                });
                None
            } else {
                Some(file)
            }
        });
        let encoding = raw::optional_str(map, "encoding", path, errors);

        let (Some(file), Some(encoding)) = (file, encoding) else {
            return None;
        };
        Some(Self {
            path: file.to_string(),
            encoding: encoding.unwrap_or(DEFAULT_ENCODING).to_string(),
        })
    }

    /// Path of the input file.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Text encoding of the input file.
    pub fn encoding(&self) -> &str {
        &self.encoding
    }
}

impl UrlSourceConfig {
    fn parse(map: &Map<String, Value>, path: &FieldPath, errors: &mut Collector) -> Option<Self> {
        let url = raw::required_str(map, "url", path, errors);
        let timeout = raw::required_int_in(map, "timeout_seconds", path, TIMEOUT_RANGE, errors)
            .and_then(|secs| u32::try_from(secs).ok());
        // Wrapped straight away so the raw string never outlives this call.
        let api_token = raw::required_str(map, "api_token", path, errors).map(SecretToken::new);

        Some(Self {
            url: url?.to_string(),
            timeout_seconds: timeout?,
            api_token: api_token?,
        })
    }

    /// Endpoint the data is fetched from.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Request timeout in whole seconds, within 1..=120.
    pub fn timeout_seconds(&self) -> u32 {
        self.timeout_seconds
    }

    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.timeout_seconds))
    }

    /// The API token, masked unless explicitly exposed.
    pub fn api_token(&self) -> &SecretToken {
        &self.api_token
    }
}
