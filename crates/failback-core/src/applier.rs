//! Submission of apply-recovery-point requests and resolution of the resulting job.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{FailbackError, FailbackResult};
use crate::model::{
    ApplyRecoveryPointRequest, CertificateBlobs, Job, PayloadOptions, ProtectedItemScope,
};
use crate::provider::build_provider_input;
use crate::service::{JobTracker, ReplicationControlPlane};

/// Inputs for a single apply call.
#[derive(Debug, Clone)]
pub struct ApplyRecoveryPoint {
    /// Fabric, container, and item the request is scoped to.
    pub scope: ProtectedItemScope,
    /// Recovery point to apply.
    pub recovery_point_id: String,
    /// Replication provider of the protected item.
    pub provider: String,
    /// Base64 encoded key-encryption certificates, if any.
    pub certificates: CertificateBlobs,
}

/// Builds, submits, and tracks apply-recovery-point requests.
pub struct RecoveryPointApplier {
    control_plane: Arc<dyn ReplicationControlPlane>,
    jobs: Arc<dyn JobTracker>,
    options: PayloadOptions,
}

impl RecoveryPointApplier {
    /// Construct an applier over the given collaborators.
    #[must_use]
    pub fn new(
        control_plane: Arc<dyn ReplicationControlPlane>,
        jobs: Arc<dyn JobTracker>,
        options: PayloadOptions,
    ) -> Self {
        Self {
            control_plane,
            jobs,
            options,
        }
    }

    /// Submit the request and return the initial snapshot of the job it created.
    ///
    /// The call is not idempotent: applying the same recovery point twice starts two jobs.
    ///
    /// # Errors
    ///
    /// Returns [`FailbackError::Validation`] for empty identifiers and
    /// [`FailbackError::RemoteOperation`] when submission or job resolution fails.
    pub async fn apply(&self, input: ApplyRecoveryPoint) -> FailbackResult<Job> {
        let ApplyRecoveryPoint {
            scope,
            recovery_point_id,
            provider,
            certificates,
        } = input;

        require("fabric", &scope.fabric)?;
        require("protection_container", &scope.protection_container)?;
        require("protected_item", &scope.protected_item)?;
        require("recovery_point_id", &recovery_point_id)?;
        require("replication_provider", &provider)?;

        let request = ApplyRecoveryPointRequest {
            recovery_point_id,
            provider_specific_details: build_provider_input(&provider, certificates, &self.options),
        };

        info!(
            fabric = %scope.fabric,
            container = %scope.protection_container,
            item = %scope.protected_item,
            recovery_point = %request.recovery_point_id,
            instance_type = request.provider_specific_details.instance_type().unwrap_or("default"),
            "submitting apply recovery point request"
        );

        let ack = self
            .control_plane
            .apply_recovery_point(&scope, &request)
            .await
            .inspect_err(|err| warn!(error = %err, "apply recovery point submission failed"))?;

        let job_id = self.jobs.resolve_job_id(&ack.location)?;
        debug!(location = %ack.location, job = %job_id, "resolved submission to job");

        self.jobs
            .fetch(&job_id)
            .await
            .inspect_err(|err| warn!(error = %err, job = %job_id, "job lookup failed"))
    }
}

pub(crate) fn require(field: &'static str, value: &str) -> FailbackResult<()> {
    if value.trim().is_empty() {
        return Err(FailbackError::Validation { field });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{HyperVReplicaAzureInput, ProviderSpecificInput, SubmissionAck};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records submissions and answers with a fixed location.
    #[derive(Default)]
    pub(crate) struct RecordingPlane {
        pub(crate) calls: Mutex<Vec<(ProtectedItemScope, ApplyRecoveryPointRequest)>>,
        pub(crate) location: String,
        pub(crate) fail_with: Option<String>,
    }

    impl RecordingPlane {
        pub(crate) fn accepting(location: &str) -> Self {
            Self {
                location: location.to_string(),
                ..Self::default()
            }
        }

        pub(crate) fn submissions(&self) -> Vec<(ProtectedItemScope, ApplyRecoveryPointRequest)> {
            self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl ReplicationControlPlane for RecordingPlane {
        async fn apply_recovery_point(
            &self,
            scope: &ProtectedItemScope,
            request: &ApplyRecoveryPointRequest,
        ) -> FailbackResult<SubmissionAck> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push((scope.clone(), request.clone()));
            }
            if let Some(detail) = &self.fail_with {
                return Err(FailbackError::RemoteOperation {
                    operation: "apply recovery point",
                    status: Some(409),
                    detail: detail.clone(),
                });
            }
            Ok(SubmissionAck {
                location: self.location.clone(),
            })
        }
    }

    /// Returns a job named after the requested id and records lookups.
    #[derive(Default)]
    pub(crate) struct StubJobs {
        pub(crate) fetched: Mutex<Vec<String>>,
    }

    impl StubJobs {
        pub(crate) fn fetched(&self) -> Vec<String> {
            self.fetched.lock().map(|ids| ids.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl JobTracker for StubJobs {
        async fn fetch(&self, job_id: &str) -> FailbackResult<Job> {
            if let Ok(mut ids) = self.fetched.lock() {
                ids.push(job_id.to_string());
            }
            Ok(Job {
                id: format!("/replicationJobs/{job_id}"),
                name: job_id.to_string(),
                state: "InProgress".to_string(),
                ..Job::default()
            })
        }
    }

    fn scope() -> ProtectedItemScope {
        ProtectedItemScope {
            fabric: "F1".into(),
            protection_container: "C1".into(),
            protected_item: "vm-01".into(),
        }
    }

    fn input(provider: &str) -> ApplyRecoveryPoint {
        ApplyRecoveryPoint {
            scope: scope(),
            recovery_point_id: "rp-123".into(),
            provider: provider.into(),
            certificates: CertificateBlobs {
                primary: Some("AQI=".into()),
                secondary: None,
            },
        }
    }

    #[tokio::test]
    async fn apply_submits_once_and_returns_job() -> anyhow::Result<()> {
        let plane = Arc::new(RecordingPlane::accepting("jobs/job-77"));
        let jobs = Arc::new(StubJobs::default());
        let applier =
            RecoveryPointApplier::new(plane.clone(), jobs.clone(), PayloadOptions::default());

        let job = applier.apply(input("HyperVReplicaAzure")).await?;

        assert_eq!(job.name, "job-77");
        assert_eq!(jobs.fetched(), vec!["job-77".to_string()]);
        let submissions = plane.submissions();
        assert_eq!(submissions.len(), 1);
        let (submitted_scope, request) = &submissions[0];
        assert_eq!(submitted_scope, &scope());
        assert_eq!(request.recovery_point_id, "rp-123");
        assert_eq!(
            request.provider_specific_details,
            ProviderSpecificInput::HyperVReplicaAzure(HyperVReplicaAzureInput {
                primary_kek_certificate_pfx: Some("AQI=".into()),
                secondary_kek_certificate_pfx: None,
                vault_location: "dummy".into(),
            })
        );
        Ok(())
    }

    #[tokio::test]
    async fn unknown_provider_submits_default_payload() -> anyhow::Result<()> {
        let plane = Arc::new(RecordingPlane::accepting("jobs/job-1"));
        let applier = RecoveryPointApplier::new(
            plane.clone(),
            Arc::new(StubJobs::default()),
            PayloadOptions::default(),
        );

        applier.apply(input("A2A")).await?;

        let submissions = plane.submissions();
        assert_eq!(
            submissions[0].1.provider_specific_details,
            ProviderSpecificInput::Default
        );
        Ok(())
    }

    #[tokio::test]
    async fn remote_failure_skips_job_lookup() {
        let plane = Arc::new(RecordingPlane {
            fail_with: Some("Another operation is in progress.".into()),
            ..RecordingPlane::default()
        });
        let jobs = Arc::new(StubJobs::default());
        let applier = RecoveryPointApplier::new(plane, jobs.clone(), PayloadOptions::default());

        let err = applier
            .apply(input("HyperVReplicaAzure"))
            .await
            .expect_err("submission should fail");

        match err {
            FailbackError::RemoteOperation { detail, status, .. } => {
                assert_eq!(detail, "Another operation is in progress.");
                assert_eq!(status, Some(409));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(jobs.fetched().is_empty());
    }

    #[tokio::test]
    async fn unresolvable_location_is_remote_error() {
        let plane = Arc::new(RecordingPlane::accepting("operations/abc"));
        let jobs = Arc::new(StubJobs::default());
        let applier = RecoveryPointApplier::new(plane, jobs.clone(), PayloadOptions::default());

        let err = applier.apply(input("A2A")).await.expect_err("should fail");
        assert!(matches!(err, FailbackError::RemoteOperation { .. }));
        assert!(jobs.fetched().is_empty());
    }

    #[tokio::test]
    async fn empty_identifiers_fail_before_submission() {
        let plane = Arc::new(RecordingPlane::accepting("jobs/job-1"));
        let applier = RecoveryPointApplier::new(
            plane.clone(),
            Arc::new(StubJobs::default()),
            PayloadOptions::default(),
        );
        let mut request = input("HyperVReplicaAzure");
        request.recovery_point_id = " ".into();

        let err = applier.apply(request).await.expect_err("should fail");
        assert!(matches!(
            err,
            FailbackError::Validation {
                field: "recovery_point_id"
            }
        ));
        assert!(plane.submissions().is_empty());
    }
}
