use std::io::Read;

use crcframe_transport::{ReadExact, WireStream};
use tracing::{debug, trace};

use crate::codec::{FrameConfig, Message, DEFAULT_MAX_PAYLOAD};
use crate::error::{FrameError, Result};
use crate::header::{FrameHeader, HEADER_SIZE};

/// Read exactly one message from a blocking stream.
///
/// Blocks until the full header and then the full payload have arrived, and
/// verifies the payload checksum. Never reads past the end of the frame, so
/// calling it again decodes the next pipelined message.
///
/// A stream that closes before the first header byte yields
/// [`FrameError::ConnectionClosed`]; closing anywhere later yields
/// [`FrameError::Stream`].
pub fn decode<R: Read + ?Sized>(stream: &mut R) -> Result<Message> {
    decode_with_limit(stream, DEFAULT_MAX_PAYLOAD)
}

/// Like [`decode`], rejecting headers that declare more than
/// `max_payload_size` bytes before the payload is read.
pub fn decode_with_limit<R: Read + ?Sized>(
    stream: &mut R,
    max_payload_size: usize,
) -> Result<Message> {
    // Header phase.
    let mut raw = [0u8; HEADER_SIZE];
    stream.read_exactly(&mut raw).map_err(|err| {
        if err.is_clean_eof() {
            FrameError::ConnectionClosed
        } else {
            FrameError::Stream(err)
        }
    })?;
    let header = FrameHeader::parse(&raw);

    if header.payload_len() > max_payload_size {
        debug!(
            declared = header.payload_len(),
            max = max_payload_size,
            "rejecting frame over receive limit"
        );
        return Err(FrameError::LengthLimitExceeded {
            declared: header.payload_len(),
            max: max_payload_size,
        });
    }

    // Payload phase. EOF here is a truncated frame, never an empty one.
    let mut payload = vec![0u8; header.payload_len()];
    stream.read_exactly(&mut payload).map_err(FrameError::Stream)?;

    // Integrity phase.
    if let Err(err) = header.verify(&payload) {
        debug!(code = header.code, error = %err, "frame failed integrity check");
        return Err(err);
    }

    trace!(code = header.code, len = payload.len(), "decoded frame");
    Ok(Message::new(header.code, payload))
}

/// Reads complete messages from any `Read` stream.
///
/// Handles partial reads internally; callers always get complete, verified
/// messages. Holds no buffer of its own: the stream's read cursor is the only
/// state carried between calls.
pub struct FrameReader<T> {
    inner: T,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self { inner, config }
    }

    /// Read the next complete message (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when the stream ends at a
    /// frame boundary.
    pub fn read_message(&mut self) -> Result<Message> {
        decode_with_limit(&mut self.inner, self.config.max_payload_size)
    }

    /// Iterate over incoming messages until the stream ends or fails.
    ///
    /// A clean close at a frame boundary ends the iteration; any other error
    /// is yielded once, after which the iterator is exhausted.
    pub fn messages(&mut self) -> Messages<'_, T> {
        Messages {
            reader: self,
            done: false,
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum payload size for subsequent frame decoding.
    pub fn set_max_payload_size(&mut self, max_payload_size: usize) {
        self.config.max_payload_size = max_payload_size;
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl FrameReader<WireStream> {
    /// Create a frame reader for `WireStream` and apply read timeout from config.
    pub fn with_config_wire(inner: WireStream, config: FrameConfig) -> Result<Self> {
        inner.set_read_timeout(config.read_timeout)?;
        Ok(Self::with_config(inner, config))
    }
}

/// Iterator returned by [`FrameReader::messages`].
pub struct Messages<'a, T> {
    reader: &'a mut FrameReader<T>,
    done: bool,
}

impl<T: Read> Iterator for Messages<'_, T> {
    type Item = Result<Message>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read_message() {
            Ok(message) => Some(Ok(message)),
            Err(FrameError::ConnectionClosed) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl<T: Read> std::iter::FusedIterator for Messages<'_, T> {}
