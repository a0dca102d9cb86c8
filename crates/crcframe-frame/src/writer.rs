use std::io::Write;

use bytes::BytesMut;
use crcframe_transport::{WireStream, WriteAll};

use crate::codec::{encode_into, FrameConfig, Message};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes complete frames to any `Write` stream.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Write a complete message (blocking).
    pub fn write_message(&mut self, message: &Message) -> Result<()> {
        self.send(message.code, message.payload.as_ref())
    }

    /// Encode and send a payload with the given code.
    ///
    /// Oversized payloads are rejected before anything reaches the stream.
    pub fn send(&mut self, code: u16, payload: &[u8]) -> Result<()> {
        self.check_size(payload)?;

        self.buf.clear();
        encode_into(code, payload, &mut self.buf)?;
        self.inner.write_fully(&self.buf)?;
        Ok(())
    }

    /// Encode several messages back to back and send them in one write.
    ///
    /// Every payload is checked first; if any is too large nothing is sent.
    pub fn send_batch(&mut self, messages: &[(u16, &[u8])]) -> Result<()> {
        for (_, payload) in messages {
            self.check_size(payload)?;
        }

        self.buf.clear();
        for (code, payload) in messages {
            encode_into(*code, payload, &mut self.buf)?;
        }
        self.inner.write_fully(&self.buf)?;
        Ok(())
    }

    fn check_size(&self, payload: &[u8]) -> Result<()> {
        let max = self.config.effective_max_payload();
        if payload.len() > max {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len(),
                max,
            });
        }
        Ok(())
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum payload size for subsequent frame encoding.
    pub fn set_max_payload_size(&mut self, max_payload_size: usize) {
        self.config.max_payload_size = max_payload_size;
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl FrameWriter<WireStream> {
    /// Create a frame writer for `WireStream` and apply write timeout from config.
    pub fn with_config_wire(inner: WireStream, config: FrameConfig) -> Result<Self> {
        inner.set_write_timeout(config.write_timeout)?;
        Ok(Self::with_config(inner, config))
    }
}
