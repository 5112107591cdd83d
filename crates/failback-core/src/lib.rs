#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::redundant_pub_crate)]

//! Recovery-point application workflow for replicated workloads.
//!
//! Layout: `model.rs` (domain types and payloads), `resource_id.rs` (identifier
//! decomposition), `provider.rs` (provider payload registry), `service.rs`
//! (collaborator traits), `applier.rs` (submission + job resolution),
//! `orchestrator.rs` (confirmation, certificate loading, delegation).

pub mod applier;
pub mod defaults;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod provider;
pub mod resource_id;
pub mod service;

pub use applier::{ApplyRecoveryPoint, RecoveryPointApplier};
pub use error::{FailbackError, FailbackResult};
pub use model::{
    ApplyRecoveryPointRequest, CertificateBlobs, HyperVReplicaAzureInput, Job, PayloadOptions,
    ProtectedItemScope, ProviderSpecificInput, RecoveryPoint, ReplicationProtectedItem,
    SubmissionAck,
};
pub use orchestrator::{Orchestrator, OrchestratorDeps, RecoveryRequest};
pub use provider::build_provider_input;
pub use resource_id::ContainerPath;
pub use service::{
    AlwaysProceed, CertificateMaterialLoader, ConfirmationGate, JobTracker,
    ReplicationControlPlane, job_id_from_location,
};
