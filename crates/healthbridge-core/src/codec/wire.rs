//! Wire string: base64 of the UTF-8 JSON array of records.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use super::record::SampleRecord;
use crate::error::BridgeError;

/// Encode a batch of records as a single copy-pasteable string.
pub fn encode_wire(records: &[SampleRecord]) -> Result<String, BridgeError> {
    let json = serde_json::to_vec(records)
        .map_err(|e| BridgeError::invalid(format!("cannot serialize records: {e}")))?;
    Ok(STANDARD.encode(json))
}

/// Decode a wire string into records.
///
/// Surrounding whitespace (a pasted trailing newline) is ignored. Malformed
/// base64 or JSON fails before any record is looked at.
pub fn decode_wire(wire: &str) -> Result<Vec<SampleRecord>, BridgeError> {
    let bytes = STANDARD
        .decode(wire.trim())
        .map_err(|e| BridgeError::invalid(format!("not a base64 string: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| BridgeError::invalid(format!("not a JSON array of samples: {e}")))
}
