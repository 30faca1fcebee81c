//! # Core Entities
//!
//! ## Clusters
//!
//! - **Identity**: `NodeId`, `ClientId`
//! - **Rounds**: `RoundNumber`, `ViewNumber`, `Timestamp`
//! - **Requests**: `Request`, `SequenceNumber`

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::errors::DecodeError;

/// A 32-byte digest (SHA3-256 throughout the stamping pipeline).
pub type Hash = [u8; 32];

/// Monotonic round counter, assigned by the tree root.
pub type RoundNumber = u64;

/// View counter carried alongside the round number.
pub type ViewNumber = u64;

/// Client-assigned sequence number, echoed back in the response.
pub type SequenceNumber = u64;

/// Width in bytes of an encoded [`Timestamp`].
pub const TIMESTAMP_WIRE_LEN: usize = 8;

/// Identity of a node in the aggregation tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// Identity of a connected client, as known to the node it talks to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClientId(pub String);

impl ClientId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wall-clock reading in Unix seconds, set once per round by the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Current UTC time, truncated to whole seconds.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default();
        Self(secs)
    }

    pub fn as_secs(&self) -> i64 {
        self.0
    }

    /// Encode as 8 little-endian bytes (announcement payload format).
    pub fn encode_le(&self) -> [u8; TIMESTAMP_WIRE_LEN] {
        self.0.to_le_bytes()
    }

    /// Decode an announcement payload.
    ///
    /// The payload must be exactly [`TIMESTAMP_WIRE_LEN`] bytes; anything else
    /// is a [`DecodeError`] rather than a silently zeroed clock.
    pub fn decode_le(bytes: &[u8]) -> Result<Self, DecodeError> {
        let raw: [u8; TIMESTAMP_WIRE_LEN] =
            bytes
                .try_into()
                .map_err(|_| DecodeError::TimestampLength {
                    expected: TIMESTAMP_WIRE_LEN,
                    actual: bytes.len(),
                })?;
        Ok(Self(i64::from_le_bytes(raw)))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// A client request waiting to be stamped.
///
/// Immutable once created. The payload is opaque to the protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Bytes to be committed to (typically a document digest).
    pub payload: Vec<u8>,
    /// Client that submitted the request and receives the response.
    pub client_id: ClientId,
    /// Client-assigned sequence number.
    pub seq_no: SequenceNumber,
}

impl Request {
    pub fn new(client_id: ClientId, seq_no: SequenceNumber, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
            client_id,
            seq_no,
        }
    }
}

/// Short hex prefix of a digest, for log lines.
pub fn short_hex(hash: &Hash) -> String {
    hex::encode(&hash[..4])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_le_layout() {
        let ts = Timestamp(0x0102_0304_0506_0708);
        assert_eq!(ts.encode_le(), [8, 7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_timestamp_decode_encoded() {
        let ts = Timestamp(1_700_000_000);
        let decoded = Timestamp::decode_le(&ts.encode_le()).unwrap();
        assert_eq!(decoded, ts);
    }

    #[test]
    fn test_timestamp_decode_short_payload() {
        let err = Timestamp::decode_le(&[1, 2, 3]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TimestampLength {
                expected: 8,
                actual: 3
            }
        );
    }

    #[test]
    fn test_timestamp_decode_long_payload() {
        assert!(Timestamp::decode_le(&[0u8; 9]).is_err());
    }

    #[test]
    fn test_timestamp_now_is_recent() {
        // 2023-11-14 as a floor
        assert!(Timestamp::now().as_secs() > 1_700_000_000);
    }

    #[test]
    fn test_request_serde() {
        let req = Request::new(ClientId::new("alice"), 7, b"doc".to_vec());
        let bytes = bincode::serialize(&req).unwrap();
        let back: Request = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, req);
    }

    #[test]
    fn test_node_id_display() {
        assert_eq!(NodeId(3).to_string(), "node-3");
    }
}
