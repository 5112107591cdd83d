//! Decomposition of structured resource identifiers.
//!
//! Identifiers look like
//! `/subscriptions/{sub}/resourceGroups/{rg}/providers/{ns}/vaults/{vault}/replicationFabrics/{fabric}/replicationProtectionContainers/{container}/replicationProtectedItems/{item}`.
//! Segment labels are matched case-insensitively; the value is the segment that follows.

use crate::defaults::{FABRIC_SEGMENT, PROTECTION_CONTAINER_SEGMENT};
use crate::error::{FailbackError, FailbackResult};

/// Return the segment following `label` in `id`.
///
/// # Errors
///
/// Returns [`FailbackError::MalformedIdentifier`] when the label is absent or has no
/// non-empty value after it.
pub fn segment_value<'a>(id: &'a str, label: &'static str) -> FailbackResult<&'a str> {
    let mut segments = id.split('/');
    while let Some(segment) = segments.next() {
        if segment.eq_ignore_ascii_case(label) {
            return match segments.next() {
                Some(value) if !value.is_empty() => Ok(value),
                _ => Err(malformed(id, label)),
            };
        }
    }
    Err(malformed(id, label))
}

/// Fabric and protection container names extracted from a protected item identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerPath {
    /// Replication fabric name.
    pub fabric: String,
    /// Protection container name.
    pub protection_container: String,
}

impl ContainerPath {
    /// Extract the fabric and container segments from `id`.
    ///
    /// # Errors
    ///
    /// Returns [`FailbackError::MalformedIdentifier`] when either segment is missing.
    pub fn parse(id: &str) -> FailbackResult<Self> {
        let fabric = segment_value(id, FABRIC_SEGMENT)?;
        let protection_container = segment_value(id, PROTECTION_CONTAINER_SEGMENT)?;
        Ok(Self {
            fabric: fabric.to_string(),
            protection_container: protection_container.to_string(),
        })
    }
}

fn malformed(id: &str, segment: &'static str) -> FailbackError {
    FailbackError::MalformedIdentifier {
        id: id.to_string(),
        segment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITEM_ID: &str = "/subscriptions/0000/resourceGroups/rg1/providers/Microsoft.RecoveryServices/vaults/v1/replicationFabrics/Fabric1/replicationProtectionContainers/Container1/replicationProtectedItems/vm-01";

    #[test]
    fn parses_fabric_and_container() -> anyhow::Result<()> {
        let path = ContainerPath::parse(ITEM_ID)?;
        assert_eq!(path.fabric, "Fabric1");
        assert_eq!(path.protection_container, "Container1");
        Ok(())
    }

    #[test]
    fn labels_match_case_insensitively() -> anyhow::Result<()> {
        let id = "/vaults/v1/REPLICATIONFABRICS/F1/replicationprotectioncontainers/C1";
        let path = ContainerPath::parse(id)?;
        assert_eq!(path.fabric, "F1");
        assert_eq!(path.protection_container, "C1");
        Ok(())
    }

    #[test]
    fn missing_fabric_segment_is_malformed() {
        let id = "/resourceGroups/rg1/replicationProtectionContainers/Container1";
        match ContainerPath::parse(id) {
            Err(FailbackError::MalformedIdentifier { segment, .. }) => {
                assert_eq!(segment, FABRIC_SEGMENT);
            }
            other => panic!("expected malformed identifier, got {other:?}"),
        }
    }

    #[test]
    fn trailing_label_without_value_is_malformed() {
        let id = "/replicationFabrics/Fabric1/replicationProtectionContainers/";
        assert!(matches!(
            ContainerPath::parse(id),
            Err(FailbackError::MalformedIdentifier {
                segment: PROTECTION_CONTAINER_SEGMENT,
                ..
            })
        ));
        assert!(segment_value("/replicationFabrics", FABRIC_SEGMENT).is_err());
    }
}
