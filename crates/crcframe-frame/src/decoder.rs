//! Incremental frame decoder for non-blocking readers.
//!
//! Bytes arrive in whatever chunks the transport hands over. The decoder
//! keeps track of where it is inside the current frame:
//! - `AwaitingHeader`: fewer than `HEADER_SIZE` bytes buffered
//! - `AwaitingPayload`: header parsed, waiting for `payload_length` bytes
//!
//! Each complete frame is verified and consumed on its own, leaving any
//! following bytes buffered as the start of the next frame.

use bytes::{Buf, BytesMut};
use tracing::{debug, trace};

use crate::codec::{Message, DEFAULT_MAX_PAYLOAD};
use crate::error::{FrameError, Result};
use crate::header::{FrameHeader, HEADER_SIZE};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Where the decoder is inside the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeState {
    /// Waiting for a complete header.
    AwaitingHeader,
    /// Header parsed, waiting for the declared payload bytes.
    AwaitingPayload(FrameHeader),
    /// A framing error occurred; boundaries on this stream are lost.
    Failed,
}

/// Push-style decoder that turns arbitrarily chunked bytes into messages.
#[derive(Debug)]
pub struct FrameDecoder {
    state: DecodeState,
    max_payload_size: usize,
    buf: BytesMut,
}

impl FrameDecoder {
    /// Create a decoder with the default receive limit.
    pub fn new() -> Self {
        Self::with_max_payload(DEFAULT_MAX_PAYLOAD)
    }

    /// Create a decoder rejecting headers that declare more than
    /// `max_payload_size` bytes.
    pub fn with_max_payload(max_payload_size: usize) -> Self {
        Self {
            state: DecodeState::AwaitingHeader,
            max_payload_size,
            buf: BytesMut::new(),
        }
    }

    /// Decode at most one message from `src`.
    ///
    /// Returns `Ok(None)` when `src` does not yet hold the rest of the current
    /// frame. On success exactly one frame's bytes are consumed from `src`.
    /// After any error the decoder stays failed and returns
    /// [`FrameError::Poisoned`].
    pub fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Message>> {
        match self.step(src) {
            Ok(message) => Ok(message),
            Err(err) => {
                self.state = DecodeState::Failed;
                Err(err)
            }
        }
    }

    fn step(&mut self, src: &mut BytesMut) -> Result<Option<Message>> {
        if let DecodeState::AwaitingHeader = self.state {
            let Some(header_bytes) = src.get(..HEADER_SIZE) else {
                return Ok(None);
            };
            let mut raw = [0u8; HEADER_SIZE];
            raw.copy_from_slice(header_bytes);
            let header = FrameHeader::parse(&raw);

            if header.payload_len() > self.max_payload_size {
                debug!(
                    declared = header.payload_len(),
                    max = self.max_payload_size,
                    "rejecting frame over receive limit"
                );
                return Err(FrameError::LengthLimitExceeded {
                    declared: header.payload_len(),
                    max: self.max_payload_size,
                });
            }

            src.advance(HEADER_SIZE);
            src.reserve(header.payload_len().saturating_sub(src.len()));
            self.state = DecodeState::AwaitingPayload(header);
        }

        let header = match self.state {
            DecodeState::AwaitingPayload(header) => header,
            DecodeState::Failed => return Err(FrameError::Poisoned),
            DecodeState::AwaitingHeader => return Ok(None),
        };

        if src.len() < header.payload_len() {
            return Ok(None);
        }

        let payload = src.split_to(header.payload_len()).freeze();
        if let Err(err) = header.verify(&payload) {
            debug!(code = header.code, error = %err, "frame failed integrity check");
            return Err(err);
        }

        self.state = DecodeState::AwaitingHeader;
        trace!(code = header.code, len = payload.len(), "decoded frame");
        Ok(Some(Message {
            code: header.code,
            payload,
        }))
    }

    /// Append freshly received bytes to the decoder's own buffer.
    ///
    /// Once poisoned the decoder drops its buffer and discards new input.
    pub fn feed(&mut self, data: &[u8]) {
        if self.is_poisoned() {
            self.buf = BytesMut::new();
            return;
        }
        if self.buf.capacity() == 0 {
            self.buf.reserve(INITIAL_BUFFER_CAPACITY.max(data.len()));
        }
        self.buf.extend_from_slice(data);
    }

    /// Take the next complete message out of the bytes given to [`feed`].
    ///
    /// [`feed`]: FrameDecoder::feed
    pub fn next_message(&mut self) -> Result<Option<Message>> {
        let mut buf = std::mem::take(&mut self.buf);
        let result = self.decode(&mut buf);
        self.buf = buf;
        result
    }

    /// Current position inside the frame being assembled.
    pub fn state(&self) -> DecodeState {
        self.state
    }

    /// True once a framing error has been returned.
    pub fn is_poisoned(&self) -> bool {
        self.state == DecodeState::Failed
    }

    /// Bytes held in the internal buffer and not yet returned as messages.
    pub fn buffered_len(&self) -> usize {
        self.buf.len()
    }

    /// Receive limit in bytes.
    pub fn max_payload_size(&self) -> usize {
        self.max_payload_size
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}
