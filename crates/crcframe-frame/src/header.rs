use bytes::{Buf, BufMut};

use crate::error::{FrameError, Result};

/// Frame header: length (2) + code (2) + checksum (4) = 8 bytes.
pub const HEADER_SIZE: usize = 8;

/// Largest payload the 16-bit length field can describe.
pub const MAX_PAYLOAD_LEN: usize = u16::MAX as usize;

/// CRC-32/IEEE of `payload`.
pub fn checksum(payload: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(payload);
    hasher.finalize()
}

/// The fixed 8-byte header preceding every payload on the wire.
///
/// ```text
/// ┌────────────────┬──────────┬──────────────┬──────────────────────┐
/// │ Length (2B LE) │ Code     │ CRC-32       │ Payload              │
/// │                │ (2B LE)  │ (4B LE)      │ (Length bytes)       │
/// └────────────────┴──────────┴──────────────┴──────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Number of payload bytes following the header.
    pub payload_length: u16,
    /// Application-defined tag, opaque to the framing layer.
    pub code: u16,
    /// CRC-32/IEEE over the payload bytes.
    pub checksum: u32,
}

impl FrameHeader {
    /// Build the header describing `payload`.
    ///
    /// Fails with [`FrameError::PayloadTooLarge`] when the payload does not
    /// fit in the length field.
    pub fn for_payload(code: u16, payload: &[u8]) -> Result<Self> {
        let payload_length =
            u16::try_from(payload.len()).map_err(|_| FrameError::PayloadTooLarge {
                size: payload.len(),
                max: MAX_PAYLOAD_LEN,
            })?;
        Ok(Self {
            payload_length,
            code,
            checksum: checksum(payload),
        })
    }

    /// Parse a header from its wire bytes. Every bit pattern is a valid header.
    pub fn parse(bytes: &[u8; HEADER_SIZE]) -> Self {
        let mut buf = &bytes[..];
        Self {
            payload_length: buf.get_u16_le(),
            code: buf.get_u16_le(),
            checksum: buf.get_u32_le(),
        }
    }

    /// Append the wire form of this header to `dst`.
    pub fn write_to<B: BufMut>(&self, dst: &mut B) {
        dst.put_u16_le(self.payload_length);
        dst.put_u16_le(self.code);
        dst.put_u32_le(self.checksum);
    }

    /// Wire form of this header.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        let mut dst = &mut out[..];
        self.write_to(&mut dst);
        out
    }

    pub fn payload_len(&self) -> usize {
        usize::from(self.payload_length)
    }

    /// Total wire size of the frame this header announces.
    pub fn frame_len(&self) -> usize {
        HEADER_SIZE + self.payload_len()
    }

    /// Check `payload` against the declared checksum.
    pub fn verify(&self, payload: &[u8]) -> Result<()> {
        let actual = checksum(payload);
        if actual != self.checksum {
            return Err(FrameError::ChecksumMismatch {
                expected: self.checksum,
                actual,
            });
        }
        Ok(())
    }
}
