//! Subcommand handlers.

use std::path::Path;

use anyhow::bail;
use cleanjob_core::{CleaningJobConfig, SourceConfig, ValidationErrors};
use serde_json::Value;

use crate::load;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ShowFormat {
    Json,
    Yaml,
    Toml,
}

/// Load and validate, turning a validation failure into a CLI error after
/// printing each problem on stderr.
fn load_job(file: &Path, env_prefix: &str) -> anyhow::Result<CleaningJobConfig> {
    let raw = load::load_job_document(file, env_prefix)?;
    match CleaningJobConfig::parse(&raw) {
        Ok(job) => Ok(job),
        Err(errors) => {
            eprintln!("{}", render_errors(file, &errors));
            bail!("{} is not a valid cleaning job", file.display());
        }
    }
}

pub(crate) fn render_errors(file: &Path, errors: &ValidationErrors) -> String {
    let mut out = format!("{}: {} problem(s) found", file.display(), errors.len());
    for error in errors {
        out.push_str(&format!(
            "\n  {:<28} {:<28} {}",
            error.path().to_string(),
            error.kind().to_string(),
            error
        ));
    }
    out
}

pub(crate) fn summary(job: &CleaningJobConfig) -> String {
    let source = match job.source() {
        SourceConfig::Local(local) => format!("local {} ({})", local.path(), local.encoding()),
        SourceConfig::Url(url) => format!("url {} (timeout {}s)", url.url(), url.timeout_seconds()),
    };
    let output = match job.output().compression() {
        Some(compression) => format!(
            "{} -> {} [{compression}]",
            job.output().format(),
            job.output().directory()
        ),
        None => format!("{} -> {}", job.output().format(), job.output().directory()),
    };
    format!(
        "job {}: source {source}, {} step(s), output {output}",
        job.job_name(),
        job.steps().len()
    )
}

pub fn validate(file: &Path, env_prefix: &str, quiet: bool) -> anyhow::Result<()> {
    let job = load_job(file, env_prefix)?;
    tracing::info!(job_name = job.job_name(), "job file is valid");
    if !quiet {
        println!("{}", summary(&job));
    }
    Ok(())
}

pub fn show(file: &Path, env_prefix: &str, format: ShowFormat) -> anyhow::Result<()> {
    let job = load_job(file, env_prefix)?;
    println!("{}", render(&job, format)?);
    Ok(())
}

/// Render the job through its masked `Serialize` impl.
pub(crate) fn render(job: &CleaningJobConfig, format: ShowFormat) -> anyhow::Result<String> {
    Ok(match format {
        ShowFormat::Json => serde_json::to_string_pretty(job)?,
        ShowFormat::Yaml => serde_yaml::to_string(job)?,
        ShowFormat::Toml => {
            if let Some(path) = first_null_param(job) {
                bail!(
                    "TOML cannot represent null values ({path} is null); \
                     use --output json or yaml"
                );
            }
            toml::to_string_pretty(job)?
        }
    })
}

/// Location of the first `null` inside any step's params, e.g. `steps[1].params.value`.
fn first_null_param(job: &CleaningJobConfig) -> Option<String> {
    fn find(value: &Value, path: String) -> Option<String> {
        match value {
            Value::Null => Some(path),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .find_map(|(i, item)| find(item, format!("{path}[{i}]"))),
            Value::Object(map) => map
                .iter()
                .find_map(|(key, item)| find(item, format!("{path}.{key}"))),
            _ => None,
        }
    }

    job.steps().iter().enumerate().find_map(|(i, step)| {
        step.params()
            .iter()
            .find_map(|(key, value)| find(value, format!("steps[{i}].params.{key}")))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cleanjob_core::MASK;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn url_job() -> CleaningJobConfig {
        CleaningJobConfig::parse(&json!({
            "job_name": "API Job",
            "source": {
                "source_type": "url",
                "url": "https://api.example.com/data",
                "timeout_seconds": 45,
                "api_token": "super-secret-token",
            },
            "steps": [
                {"operation": "drop_nulls"},
                {"operation": "rename_columns", "params": {"old": "rev", "new": "review"}},
            ],
            "output": {"format": "parquet", "directory": "out/", "compression": "gzip"},
        }))
        .unwrap()
    }

    #[test]
    fn test_summary() {
        assert_eq!(
            summary(&url_job()),
            "job api_job: source url https://api.example.com/data (timeout 45s), \
             2 step(s), output parquet -> out/ [gzip]"
        );
    }

    #[test]
    fn test_render_masks_token_in_every_format() {
        let job = url_job();
        for format in [ShowFormat::Json, ShowFormat::Yaml, ShowFormat::Toml] {
            let text = render(&job, format).unwrap();
            assert!(text.contains("api_job"), "{format:?}: {text}");
            assert!(text.contains(MASK), "{format:?}: {text}");
            assert!(!text.contains("super-secret-token"), "{format:?}: {text}");
        }
    }

    fn job_with_params(params: Value) -> CleaningJobConfig {
        CleaningJobConfig::parse(&json!({
            "job_name": "fill",
            "source": {"source_type": "local", "path": "data.csv"},
            "steps": [
                {"operation": "drop_nulls"},
                {"operation": "fill_nulls", "params": params},
            ],
            "output": {"format": "csv", "directory": "out/"},
        }))
        .unwrap()
    }

    #[test]
    fn test_render_toml_rejects_null_params() {
        let job = job_with_params(json!({"columns": ["a", null], "value": 0}));

        let err = render(&job, ShowFormat::Toml).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("TOML cannot represent null"), "{message}");
        assert!(message.contains("steps[1].params.columns[1]"), "{message}");

        // JSON and YAML keep the null.
        let text = render(&job, ShowFormat::Json).unwrap();
        assert!(text.contains("null"), "{text}");
        assert!(render(&job, ShowFormat::Yaml).is_ok());
    }

    #[test]
    fn test_render_toml_with_nested_params() {
        let job = job_with_params(json!({"value": 0, "columns": ["a", "b"], "by": {"a": "x"}}));
        let text = render(&job, ShowFormat::Toml).unwrap();
        assert!(text.contains("fill_nulls"), "{text}");
        assert!(text.contains("columns"), "{text}");
    }

    #[test]
    fn test_show_toml_fails_cleanly_on_null_params() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.json");
        let job = job_with_params(json!({"value": null}));
        std::fs::write(&path, job.to_raw().to_string()).unwrap();

        let err = show(&path, "CLEANJOB_TEST_NULL_", ShowFormat::Toml).unwrap_err();
        assert!(err.to_string().contains("steps[1].params.value"), "{err}");
        show(&path, "CLEANJOB_TEST_NULL_", ShowFormat::Json).unwrap();
    }

    #[test]
    fn test_render_errors_lists_paths() {
        let errors = CleaningJobConfig::parse(&json!({
            "job_name": "",
            "source": {"source_type": "ftp"},
            "steps": [],
            "output": {"format": "csv", "directory": "out/"},
        }))
        .unwrap_err();
        let text = render_errors(Path::new("job.toml"), &errors);
        assert!(text.starts_with("job.toml: 2 problem(s) found"));
        assert!(text.contains("job_name"));
        assert!(text.contains("source.source_type"));
        assert!(text.contains("discriminator_mismatch"));
    }

    #[test]
    fn test_validate_and_show_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.json");
        std::fs::write(&path, url_job().to_raw().to_string()).unwrap();

        validate(&path, "CLEANJOB_TEST_CMD_", true).unwrap();
        show(&path, "CLEANJOB_TEST_CMD_", ShowFormat::Yaml).unwrap();
    }

    #[test]
    fn test_validate_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.yaml");
        std::fs::write(
            &path,
            "job_name: x\nsource:\n  source_type: local\n  path: a.csv\nsteps: []\noutput:\n  format: parquet\n  directory: out/\n",
        )
        .unwrap();

        let err = validate(&path, "CLEANJOB_TEST_BAD_", true).unwrap_err();
        assert!(err.to_string().contains("is not a valid cleaning job"));
    }
}
