//! # cleanjob core
//!
//! Validation boundary for data-cleaning jobs. Turns an untrusted nested
//! mapping (usually parsed from a job file) into an immutable
//! [`CleaningJobConfig`], or reports every problem found as
//! [`ValidationErrors`].
//!
//! The crate performs no I/O: callers decode the input in whatever format
//! they like into a `serde_json::Value` and hand it to
//! [`CleaningJobConfig::parse`].

pub mod error;
pub mod job;
pub mod output;
pub mod raw;
pub mod secret;
pub mod source;
pub mod step;

pub use error::{Constraint, ErrorKind, ValidationError, ValidationErrors};
pub use job::{CleaningJobConfig, normalize_job_name};
pub use output::{Compression, OutputConfig, OutputFormat};
pub use raw::FieldPath;
pub use secret::{MASK, SecretToken};
pub use source::{LocalSourceConfig, SourceConfig, UrlSourceConfig};
pub use step::{CleaningOperation, CleaningStep};
