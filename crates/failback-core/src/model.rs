//! Domain types shared by the applier, the orchestrator, and adapters.

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::defaults::HYPER_V_REPLICA_AZURE;

/// Point-in-time replication state captured for a protected item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryPoint {
    /// Opaque recovery point identifier.
    pub id: String,
    /// Identifier of the protected item owning this recovery point, when known.
    #[serde(default)]
    pub protected_item_id: Option<String>,
}

impl RecoveryPoint {
    /// Reference a recovery point by identifier only.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            protected_item_id: None,
        }
    }
}

/// Snapshot of the replicated workload being recovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationProtectedItem {
    /// Structured resource path carrying fabric and container segments.
    pub id: String,
    /// Resource name used to scope remote calls.
    pub name: String,
    /// Replication provider discriminator (e.g. `HyperVReplicaAzure`).
    pub replication_provider: String,
    /// Human-readable name shown to the operator.
    #[serde(default)]
    pub friendly_name: String,
}

impl ReplicationProtectedItem {
    /// Name used when asking the operator to confirm an action on this item.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.friendly_name.trim().is_empty() {
            &self.name
        } else {
            &self.friendly_name
        }
    }
}

/// Fabric, container, and item names that scope a protected item on the control plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedItemScope {
    /// Replication fabric name.
    pub fabric: String,
    /// Protection container name.
    pub protection_container: String,
    /// Protected item name.
    pub protected_item: String,
}

/// Base64 encoded key-encryption certificates supplied for an apply request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateBlobs {
    /// Primary key-encryption certificate (PFX, base64).
    pub primary: Option<String>,
    /// Secondary key-encryption certificate (PFX, base64).
    pub secondary: Option<String>,
}

/// Caller-tunable values injected into provider payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadOptions {
    /// Location tag written into provider payloads that carry one.
    pub vault_location: String,
}

impl Default for PayloadOptions {
    fn default() -> Self {
        Self {
            vault_location: crate::defaults::DEFAULT_VAULT_LOCATION.to_string(),
        }
    }
}

/// Hyper-V to Azure specific apply input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HyperVReplicaAzureInput {
    /// Primary key-encryption certificate.
    pub primary_kek_certificate_pfx: Option<String>,
    /// Secondary key-encryption certificate.
    pub secondary_kek_certificate_pfx: Option<String>,
    /// Location tag expected by the provider.
    pub vault_location: String,
}

/// Provider-specific portion of an apply request.
///
/// Serialises as an `instanceType` tagged object, or `{}` for the default variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProviderSpecificInput {
    /// Hyper-V sites replicating to Azure.
    HyperVReplicaAzure(HyperVReplicaAzureInput),
    /// Providers without specialised apply behaviour.
    #[default]
    Default,
}

impl ProviderSpecificInput {
    /// Provider tag written as `instanceType`, when the variant has one.
    #[must_use]
    pub const fn instance_type(&self) -> Option<&'static str> {
        match self {
            Self::HyperVReplicaAzure(_) => Some(HYPER_V_REPLICA_AZURE),
            Self::Default => None,
        }
    }
}

impl Serialize for ProviderSpecificInput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::HyperVReplicaAzure(input) => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("instanceType", HYPER_V_REPLICA_AZURE)?;
                if let Some(primary) = &input.primary_kek_certificate_pfx {
                    map.serialize_entry("primaryKekCertificatePfx", primary)?;
                }
                if let Some(secondary) = &input.secondary_kek_certificate_pfx {
                    map.serialize_entry("secondaryKekCertificatePfx", secondary)?;
                }
                map.serialize_entry("vaultLocation", &input.vault_location)?;
                map.end()
            }
            Self::Default => serializer.serialize_map(Some(0))?.end(),
        }
    }
}

/// Envelope submitted to the control plane to apply a recovery point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRecoveryPointRequest {
    /// Recovery point that should become the active one.
    pub recovery_point_id: String,
    /// Payload selected by the item's replication provider.
    pub provider_specific_details: ProviderSpecificInput,
}

/// Acknowledgement returned by the control plane when a submission is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionAck {
    /// Reference that resolves to the job tracking the operation.
    pub location: String,
}

/// States after which a job no longer changes.
const TERMINAL_JOB_STATES: &[&str] = &[
    "Succeeded",
    "Failed",
    "Cancelled",
    "Skipped",
    "CompletedWithInformation",
];

/// Snapshot of the server-side job tracking a recovery operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Full resource identifier of the job.
    pub id: String,
    /// Job identifier as resolved from the submission's location reference
    /// (`jobs/job-77` yields `job-77`); pass this to [`crate::JobTracker::fetch`].
    pub name: String,
    /// Current state reported by the service (e.g. `InProgress`).
    pub state: String,
    /// Finer-grained state description.
    pub state_description: Option<String>,
    /// Correlation identifier for service-side diagnostics.
    pub activity_id: Option<String>,
    /// Workflow label (e.g. `ApplyRecoveryPoint`).
    pub scenario_name: Option<String>,
    /// Entity the job acts upon.
    pub target_object_id: Option<String>,
    /// Display name of the target entity.
    pub target_object_name: Option<String>,
    /// Replication provider of the target entity.
    pub target_instance_type: Option<String>,
    /// When the job started.
    pub start_time: Option<DateTime<Utc>>,
    /// When the job finished.
    pub end_time: Option<DateTime<Utc>>,
    /// Actions the service accepts for the job in its current state.
    #[serde(default)]
    pub allowed_actions: Vec<String>,
    /// Error messages reported by the service.
    #[serde(default)]
    pub errors: Vec<String>,
}

impl Job {
    /// Whether the job has reached a state it will not leave.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        TERMINAL_JOB_STATES
            .iter()
            .any(|state| state.eq_ignore_ascii_case(&self.state))
    }
}
