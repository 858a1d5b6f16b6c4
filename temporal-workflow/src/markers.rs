//! Serialization helpers for marker details.
//!
//! Version markers store a change id and the version the workflow code chose
//! for it; the payload travels in the details field of a RecordMarker
//! decision and its MarkerRecorded history event.

use serde::{Deserialize, Serialize};
use temporal_core::{TemporalError, TemporalResult};

/// Marker name used for version markers
pub const VERSION_MARKER_NAME: &str = "Version";

/// Data structure for version marker details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionDetails {
    pub change_id: String,
    pub version: i32,
}

/// Encode version details for storage in a history marker
pub fn encode_version_details(change_id: &str, version: i32) -> TemporalResult<Vec<u8>> {
    let details = VersionDetails {
        change_id: change_id.to_string(),
        version,
    };
    serde_json::to_vec(&details).map_err(|e| TemporalError::Serialization(e.to_string()))
}

/// Decode version details from a history marker
pub fn decode_version_details(data: &[u8]) -> TemporalResult<(String, i32)> {
    let details: VersionDetails =
        serde_json::from_slice(data).map_err(|e| TemporalError::Serialization(e.to_string()))?;
    Ok((details.change_id, details.version))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_version() {
        let change_id = "add-retry-step";
        let version = 3i32;
        let encoded = encode_version_details(change_id, version).unwrap();
        let (decoded_id, decoded_version) = decode_version_details(&encoded).unwrap();
        assert_eq!(change_id, decoded_id);
        assert_eq!(version, decoded_version);
    }

    #[test]
    fn test_decode_invalid_data() {
        let invalid_data = b"not valid json";
        assert!(decode_version_details(invalid_data).is_err());
    }
}
