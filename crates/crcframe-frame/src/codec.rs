use bytes::{BufMut, Bytes, BytesMut};

use crate::error::Result;
use crate::header::{FrameHeader, HEADER_SIZE, MAX_PAYLOAD_LEN};

/// Default receive limit: the largest payload the wire format can carry.
pub const DEFAULT_MAX_PAYLOAD: usize = MAX_PAYLOAD_LEN;

/// A decoded message: the application tag and its payload.
///
/// Length and checksum are wire metadata only and are not kept once the
/// payload has been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Application-defined tag, opaque to the framing layer.
    pub code: u16,
    /// The message payload.
    pub payload: Bytes,
}

impl Message {
    /// Create a new message.
    pub fn new(code: u16, payload: impl Into<Bytes>) -> Self {
        Self {
            code,
            payload: payload.into(),
        }
    }

    /// The total wire size of this message (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }

    /// Encode this message into its wire form.
    pub fn encode(&self) -> Result<Bytes> {
        encode(self.code, &self.payload)
    }
}

/// Encode a message into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────────────┬──────────┬──────────────┬──────────────────────┐
/// │ Length (2B LE) │ Code     │ CRC-32       │ Payload              │
/// │                │ (2B LE)  │ (4B LE)      │ (Length bytes)       │
/// └────────────────┴──────────┴──────────────┴──────────────────────┘
/// ```
///
/// Payloads longer than 65535 bytes fail with
/// [`FrameError::PayloadTooLarge`](crate::FrameError::PayloadTooLarge).
pub fn encode(code: u16, payload: &[u8]) -> Result<Bytes> {
    let mut dst = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    encode_into(code, payload, &mut dst)?;
    Ok(dst.freeze())
}

/// Append the wire form of a message to `dst`.
///
/// Several calls on the same buffer produce a pipelined byte sequence. On
/// error `dst` is left untouched.
pub fn encode_into(code: u16, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    let header = FrameHeader::for_payload(code, payload)?;
    dst.reserve(HEADER_SIZE + payload.len());
    header.write_to(dst);
    dst.put_slice(payload);
    Ok(())
}

/// Configuration for frame readers and writers.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 65535 (the wire maximum).
    ///
    /// Readers reject headers declaring more than this before allocating;
    /// writers reject larger payloads before writing anything.
    pub max_payload_size: usize,
    /// Read timeout applied to a `WireStream`.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout applied to a `WireStream`.
    pub write_timeout: Option<std::time::Duration>,
}

impl FrameConfig {
    /// The payload limit actually enforceable on the wire.
    pub fn effective_max_payload(&self) -> usize {
        self.max_payload_size.min(MAX_PAYLOAD_LEN)
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FrameError;

    #[test]
    fn encode_hi_matches_wire_bytes() {
        let wire = encode(2020, b"Hi").unwrap();
        assert_eq!(
            wire.as_ref(),
            &[0x02, 0x00, 0xE4, 0x07, 0x0E, 0x0E, 0x17, 0x4D, 0x48, 0x69]
        );
    }

    #[test]
    fn encode_length_is_header_plus_payload() {
        let payload = b"hello, crcframe!";
        let wire = encode(1, payload).unwrap();
        assert_eq!(wire.len(), HEADER_SIZE + payload.len());
        assert_eq!(&wire[HEADER_SIZE..], payload);
    }

    #[test]
    fn empty_payload_is_header_only() {
        let wire = encode(0, b"").unwrap();
        assert_eq!(wire.as_ref(), &[0u8; HEADER_SIZE]);
    }

    #[test]
    fn encode_is_deterministic() {
        assert_eq!(encode(7, b"same").unwrap(), encode(7, b"same").unwrap());
    }

    #[test]
    fn oversized_payload_produces_nothing() {
        let mut dst = BytesMut::from(&b"prefix"[..]);
        let payload = vec![0u8; MAX_PAYLOAD_LEN + 1];

        let err = encode_into(3, &payload, &mut dst).unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { .. }));
        assert_eq!(dst.as_ref(), b"prefix");

        assert!(encode(3, &payload).is_err());
    }

    #[test]
    fn pipelined_encode_is_concatenation() {
        let mut dst = BytesMut::new();
        encode_into(1, b"first", &mut dst).unwrap();
        encode_into(2, b"second", &mut dst).unwrap();

        let mut expected = encode(1, b"first").unwrap().to_vec();
        expected.extend_from_slice(&encode(2, b"second").unwrap());
        assert_eq!(dst.as_ref(), expected.as_slice());
    }

    #[test]
    fn message_wire_size_and_encode() {
        let message = Message::new(1, Bytes::from_static(b"test"));
        assert_eq!(message.wire_size(), HEADER_SIZE + 4);
        assert_eq!(message.encode().unwrap().len(), message.wire_size());
    }

    #[test]
    fn effective_max_is_clamped_to_wire() {
        let config = FrameConfig {
            max_payload_size: 1 << 20,
            ..FrameConfig::default()
        };
        assert_eq!(config.effective_max_payload(), MAX_PAYLOAD_LEN);
        assert_eq!(FrameConfig::default().effective_max_payload(), 65_535);
    }
}
