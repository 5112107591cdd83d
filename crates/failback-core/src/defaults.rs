//! Well-known labels and default values shared by the workflow.

/// Path label preceding the fabric name in a protected item identifier.
pub const FABRIC_SEGMENT: &str = "replicationFabrics";
/// Path label preceding the protection container name.
pub const PROTECTION_CONTAINER_SEGMENT: &str = "replicationProtectionContainers";
/// Path label preceding the protected item name.
pub const PROTECTED_ITEM_SEGMENT: &str = "replicationProtectedItems";
/// Path label preceding a job name under the vault.
pub const JOB_SEGMENT: &str = "replicationJobs";
/// Provider tag for Hyper-V sites replicating to Azure.
pub const HYPER_V_REPLICA_AZURE: &str = "HyperVReplicaAzure";
/// Location value historically sent in the Hyper-V to Azure payload.
pub const DEFAULT_VAULT_LOCATION: &str = "dummy";
/// Action label shown when asking the caller to confirm.
pub const APPLY_RECOVERY_POINT_ACTION: &str = "Apply recovery point";
