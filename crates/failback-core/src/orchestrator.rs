//! Entry point tying validation, confirmation, certificate loading, and submission together.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose};
use tracing::{debug, info};

use crate::applier::{ApplyRecoveryPoint, RecoveryPointApplier, require};
use crate::defaults::APPLY_RECOVERY_POINT_ACTION;
use crate::error::FailbackResult;
use crate::model::{
    CertificateBlobs, Job, PayloadOptions, ProtectedItemScope, RecoveryPoint,
    ReplicationProtectedItem,
};
use crate::resource_id::ContainerPath;
use crate::service::{
    CertificateMaterialLoader, ConfirmationGate, JobTracker, ReplicationControlPlane,
};

/// Caller-facing description of a recovery to perform.
#[derive(Debug, Clone)]
pub struct RecoveryRequest {
    /// Recovery point to apply.
    pub recovery_point: RecoveryPoint,
    /// Protected item the recovery point belongs to.
    pub protected_item: ReplicationProtectedItem,
    /// Path to the primary key-encryption certificate.
    pub primary_kek_certificate: Option<PathBuf>,
    /// Path to the secondary key-encryption certificate.
    pub secondary_kek_certificate: Option<PathBuf>,
}

/// Dependencies required to run the workflow.
pub struct OrchestratorDeps {
    /// Control plane accepting submissions.
    pub control_plane: Arc<dyn ReplicationControlPlane>,
    /// Job resolution and lookup.
    pub jobs: Arc<dyn JobTracker>,
    /// Certificate byte supplier.
    pub certificates: Arc<dyn CertificateMaterialLoader>,
    /// Confirmation predicate consulted before any state change.
    pub confirmation: Arc<dyn ConfirmationGate>,
    /// Values injected into provider payloads.
    pub options: PayloadOptions,
}

/// Runs the apply-recovery-point workflow for one request at a time.
pub struct Orchestrator {
    applier: RecoveryPointApplier,
    certificates: Arc<dyn CertificateMaterialLoader>,
    confirmation: Arc<dyn ConfirmationGate>,
}

impl Orchestrator {
    /// Wire the orchestrator from its dependencies.
    #[must_use]
    pub fn new(deps: OrchestratorDeps) -> Self {
        let OrchestratorDeps {
            control_plane,
            jobs,
            certificates,
            confirmation,
            options,
        } = deps;
        Self {
            applier: RecoveryPointApplier::new(control_plane, jobs, options),
            certificates,
            confirmation,
        }
    }

    /// Apply the recovery point and return the job created for it.
    ///
    /// Returns `Ok(None)` without contacting the control plane when the confirmation
    /// gate declines.
    ///
    /// # Errors
    ///
    /// Propagates validation, identifier, certificate, and remote failures unchanged.
    pub async fn apply_recovery_point(
        &self,
        request: RecoveryRequest,
    ) -> FailbackResult<Option<Job>> {
        let RecoveryRequest {
            recovery_point,
            protected_item,
            primary_kek_certificate,
            secondary_kek_certificate,
        } = request;

        require("recovery_point_id", &recovery_point.id)?;
        require("protected_item_id", &protected_item.id)?;
        require("protected_item_name", &protected_item.name)?;
        require("replication_provider", &protected_item.replication_provider)?;

        let path = ContainerPath::parse(&protected_item.id)?;

        if !self
            .confirmation
            .should_proceed(protected_item.display_name(), APPLY_RECOVERY_POINT_ACTION)
        {
            info!(item = %protected_item.name, "apply recovery point declined");
            return Ok(None);
        }

        let certificates = CertificateBlobs {
            primary: self.encode_certificate(primary_kek_certificate.as_deref())?,
            secondary: self.encode_certificate(secondary_kek_certificate.as_deref())?,
        };

        let job = self
            .applier
            .apply(ApplyRecoveryPoint {
                scope: ProtectedItemScope {
                    fabric: path.fabric,
                    protection_container: path.protection_container,
                    protected_item: protected_item.name,
                },
                recovery_point_id: recovery_point.id,
                provider: protected_item.replication_provider,
                certificates,
            })
            .await?;
        Ok(Some(job))
    }

    fn encode_certificate(&self, path: Option<&Path>) -> FailbackResult<Option<String>> {
        let Some(path) = path else {
            return Ok(None);
        };
        let bytes = self.certificates.load(path)?;
        debug!(path = %path.display(), "loaded key-encryption certificate");
        Ok(Some(general_purpose::STANDARD.encode(bytes)))
    }
}
