//! Job document loading.
//!
//! Uses `figment` for layered input: job file -> environment overrides.
//! The file format is picked from the extension (`.toml`, `.json`,
//! `.yaml`/`.yml`). Environment variables such as
//! `CLEANJOB_SOURCE__API_TOKEN` override nested keys, which keeps secrets
//! out of job files.

use std::path::Path;

use anyhow::{Context, bail};
use figment::{
    Figment,
    providers::{Env, Format, Json, Toml, Yaml},
};
use serde_json::Value;

pub const DEFAULT_ENV_PREFIX: &str = "CLEANJOB_";

/// Supported job file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobFileFormat {
    Toml,
    Json,
    Yaml,
}

impl JobFileFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "toml" => Some(JobFileFormat::Toml),
            "json" => Some(JobFileFormat::Json),
            "yaml" | "yml" => Some(JobFileFormat::Yaml),
            _ => None,
        }
    }
}

/// Load a job document from `path`, merging environment overrides that
/// start with `env_prefix`. Returns the raw, unvalidated mapping.
pub fn load_job_document(path: &Path, env_prefix: &str) -> anyhow::Result<Value> {
    if !path.is_file() {
        bail!("job file not found: {}", path.display());
    }
    let Some(format) = JobFileFormat::from_path(path) else {
        bail!(
            "unsupported job file extension for {} (expected .toml, .json, .yaml or .yml)",
            path.display()
        );
    };

    let figment = match format {
        JobFileFormat::Toml => Figment::from(Toml::file(path)),
        JobFileFormat::Json => Figment::from(Json::file(path)),
        JobFileFormat::Yaml => Figment::from(Yaml::file(path)),
    };
    // CLEANJOB_OUTPUT__DIRECTORY -> output.directory
    let figment = figment.merge(Env::prefixed(env_prefix).split("__"));

    tracing::debug!(path = %path.display(), ?format, env_prefix, "loading job document");
    figment
        .extract::<Value>()
        .with_context(|| format!("failed to read job file {}", path.display()))
}
