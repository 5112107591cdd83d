//! Error types for the recovery-point workflow.
//!
//! # Design
//! - One enum covers the whole workflow so callers can match on the failure kind.
//! - Remote faults keep the service diagnostic verbatim.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for recovery-point operations.
#[derive(Debug, Error)]
pub enum FailbackError {
    /// A required identifier or name was missing or empty.
    #[error("required field '{field}' is missing or empty")]
    Validation {
        /// Name of the offending field.
        field: &'static str,
    },
    /// A structured resource identifier lacked an expected segment.
    #[error("resource identifier '{id}' has no '{segment}' segment")]
    MalformedIdentifier {
        /// Identifier that failed decomposition.
        id: String,
        /// Segment label that could not be resolved.
        segment: &'static str,
    },
    /// Certificate material could not be read.
    #[error("failed to read certificate '{}'", .path.display())]
    Io {
        /// Path handed to the loader.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The remote control plane rejected or failed an operation.
    #[error("{operation} failed: {detail}")]
    RemoteOperation {
        /// Operation identifier.
        operation: &'static str,
        /// HTTP status when the failure came from a response.
        status: Option<u16>,
        /// Diagnostic payload reported by the service.
        detail: String,
    },
}

impl FailbackError {
    /// Shorthand for a remote failure that has no HTTP status attached.
    #[must_use]
    pub fn remote(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::RemoteOperation {
            operation,
            status: None,
            detail: detail.into(),
        }
    }

    /// Whether the failure was caused by caller input rather than the environment.
    #[must_use]
    pub const fn is_caller_error(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::MalformedIdentifier { .. })
    }
}

/// Convenience alias for recovery-point results.
pub type FailbackResult<T> = Result<T, FailbackError>;
