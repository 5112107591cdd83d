//! Collaborator traits implemented by transport, storage, and prompt adapters.

use std::path::Path;

use async_trait::async_trait;

use crate::defaults::JOB_SEGMENT;
use crate::error::{FailbackError, FailbackResult};
use crate::model::{ApplyRecoveryPointRequest, Job, ProtectedItemScope, SubmissionAck};

/// Path labels that precede a job name in a location reference.
const JOB_SEGMENTS: &[&str] = &["jobs", JOB_SEGMENT];

/// Remote control plane accepting state-changing replication requests.
#[async_trait]
pub trait ReplicationControlPlane: Send + Sync {
    /// Submit an apply-recovery-point request for the scoped protected item.
    async fn apply_recovery_point(
        &self,
        scope: &ProtectedItemScope,
        request: &ApplyRecoveryPointRequest,
    ) -> FailbackResult<SubmissionAck>;
}

/// Resolves submission acknowledgements into job snapshots.
#[async_trait]
pub trait JobTracker: Send + Sync {
    /// Derive the job identifier from a server-provided location reference.
    ///
    /// # Errors
    ///
    /// Returns [`FailbackError::RemoteOperation`] when the reference names no job.
    fn resolve_job_id(&self, location: &str) -> FailbackResult<String> {
        job_id_from_location(location)
    }

    /// Fetch the current snapshot of a job.
    async fn fetch(&self, job_id: &str) -> FailbackResult<Job>;
}

/// Supplies raw certificate bytes for a path.
pub trait CertificateMaterialLoader: Send + Sync {
    /// Read the certificate stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FailbackError::Io`] when the path is missing or unreadable.
    fn load(&self, path: &Path) -> FailbackResult<Vec<u8>>;
}

/// Decides whether a state-changing action may proceed.
pub trait ConfirmationGate: Send + Sync {
    /// Return `true` when `action` on `subject` should go ahead.
    fn should_proceed(&self, subject: &str, action: &str) -> bool;
}

/// Gate that approves every action, for unattended use.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysProceed;

impl ConfirmationGate for AlwaysProceed {
    fn should_proceed(&self, _subject: &str, _action: &str) -> bool {
        true
    }
}

/// Extract the job name from a location reference such as
/// `https://host/.../replicationJobs/{job}?api-version=...` or `jobs/{job}`.
///
/// # Errors
///
/// Returns [`FailbackError::RemoteOperation`] when no job segment is present.
pub fn job_id_from_location(location: &str) -> FailbackResult<String> {
    let path = location
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let segments: Vec<&str> = path.split('/').collect();
    segments
        .iter()
        .rposition(|segment| {
            JOB_SEGMENTS
                .iter()
                .any(|label| label.eq_ignore_ascii_case(segment))
        })
        .and_then(|index| segments.get(index + 1))
        .filter(|job| !job.is_empty())
        .map(|job| (*job).to_string())
        .ok_or_else(|| {
            FailbackError::remote(
                "resolve job location",
                format!("location '{location}' does not reference a job"),
            )
        })
}
