//! Provider-specific payload construction.
//!
//! # Design
//! - A flat table maps provider tags to pure builder functions.
//! - Tags compare case-insensitively; unknown providers get [`ProviderSpecificInput::Default`].

use crate::defaults::HYPER_V_REPLICA_AZURE;
use crate::model::{
    CertificateBlobs, HyperVReplicaAzureInput, PayloadOptions, ProviderSpecificInput,
};

/// Builder turning certificate blobs and options into a provider payload.
pub type PayloadBuilder = fn(CertificateBlobs, &PayloadOptions) -> ProviderSpecificInput;

const BUILDERS: &[(&str, PayloadBuilder)] = &[(HYPER_V_REPLICA_AZURE, hyper_v_replica_azure)];

/// Build the provider-specific portion of an apply request.
#[must_use]
pub fn build_provider_input(
    provider: &str,
    certificates: CertificateBlobs,
    options: &PayloadOptions,
) -> ProviderSpecificInput {
    lookup(provider).map_or(ProviderSpecificInput::Default, |builder| {
        builder(certificates, options)
    })
}

fn lookup(provider: &str) -> Option<PayloadBuilder> {
    BUILDERS
        .iter()
        .find(|(tag, _)| tag.eq_ignore_ascii_case(provider))
        .map(|(_, builder)| *builder)
}

fn hyper_v_replica_azure(
    certificates: CertificateBlobs,
    options: &PayloadOptions,
) -> ProviderSpecificInput {
    ProviderSpecificInput::HyperVReplicaAzure(HyperVReplicaAzureInput {
        primary_kek_certificate_pfx: certificates.primary,
        secondary_kek_certificate_pfx: certificates.secondary,
        vault_location: options.vault_location.clone(),
    })
}
