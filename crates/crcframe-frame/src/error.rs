use crcframe_transport::TransportError;

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload does not fit in the 16-bit length field, or exceeds the
    /// writer's configured maximum. Nothing was produced or written.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A received header declares more payload than the receiver accepts.
    #[error("declared payload length {declared} exceeds receive limit {max}")]
    LengthLimitExceeded { declared: usize, max: usize },

    /// The received payload does not hash to the header's checksum.
    #[error("checksum mismatch (header {expected:#010x}, payload {actual:#010x})")]
    ChecksumMismatch { expected: u32, actual: u32 },

    /// The stream failed or closed before a complete frame was received.
    #[error("frame stream error: {0}")]
    Stream(#[from] TransportError),

    /// The stream was closed cleanly at a frame boundary.
    #[error("connection closed")]
    ConnectionClosed,

    /// A previous decode failed; the byte alignment of this stream is lost.
    #[error("decoder poisoned by an earlier framing error")]
    Poisoned,
}

impl FrameError {
    /// True when the receiver can no longer trust frame boundaries on this
    /// stream and must close it.
    pub fn is_desync(&self) -> bool {
        matches!(
            self,
            FrameError::ChecksumMismatch { .. }
                | FrameError::LengthLimitExceeded { .. }
                | FrameError::Poisoned
        )
    }

    /// True when the stream itself is gone (closed, reset, timed out).
    pub fn is_closed(&self) -> bool {
        matches!(self, FrameError::Stream(_) | FrameError::ConnectionClosed)
    }
}

impl From<std::io::Error> for FrameError {
    fn from(err: std::io::Error) -> Self {
        FrameError::Stream(TransportError::Io(err))
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
