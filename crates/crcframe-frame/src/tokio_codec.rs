//! Tokio integration: a `tokio_util` codec and async one-shot helpers.

use bytes::BytesMut;
use crcframe_transport::async_io::{read_exactly, write_fully};
use crcframe_transport::TransportError;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, trace};

use crate::codec::{encode, encode_into, FrameConfig, Message};
use crate::decoder::{DecodeState, FrameDecoder};
use crate::error::{FrameError, Result};
use crate::header::{FrameHeader, HEADER_SIZE};

/// Codec for `FramedRead` / `FramedWrite` / `Framed`.
#[derive(Debug)]
pub struct FrameCodec {
    decoder: FrameDecoder,
    max_encode_payload: usize,
}

impl FrameCodec {
    pub fn new() -> Self {
        Self::with_config(&FrameConfig::default())
    }

    /// Apply the payload limit from `config` to both directions.
    pub fn with_config(config: &FrameConfig) -> Self {
        Self {
            decoder: FrameDecoder::with_max_payload(config.max_payload_size),
            max_encode_payload: config.effective_max_payload(),
        }
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FrameCodec {
    type Item = Message;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Message>> {
        self.decoder.decode(src)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Message>> {
        if let Some(message) = self.decoder.decode(src)? {
            return Ok(Some(message));
        }
        match self.decoder.state() {
            DecodeState::AwaitingHeader if src.is_empty() => Ok(None),
            DecodeState::AwaitingHeader => Err(FrameError::Stream(TransportError::UnexpectedEof {
                expected: HEADER_SIZE,
                received: src.len(),
            })),
            DecodeState::AwaitingPayload(header) => {
                Err(FrameError::Stream(TransportError::UnexpectedEof {
                    expected: header.payload_len(),
                    received: src.len(),
                }))
            }
            DecodeState::Failed => Err(FrameError::Poisoned),
        }
    }
}

impl Encoder<Message> for FrameCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<()> {
        if item.payload.len() > self.max_encode_payload {
            return Err(FrameError::PayloadTooLarge {
                size: item.payload.len(),
                max: self.max_encode_payload,
            });
        }
        encode_into(item.code, &item.payload, dst)
    }
}

/// Read exactly one message from an async stream.
///
/// Same phases and errors as the blocking [`decode_with_limit`]; the task is
/// suspended instead of the thread.
///
/// [`decode_with_limit`]: crate::reader::decode_with_limit
pub async fn decode_async<R>(reader: &mut R, max_payload_size: usize) -> Result<Message>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut raw = [0u8; HEADER_SIZE];
    read_exactly(reader, &mut raw).await.map_err(|err| {
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

    let mut payload = vec![0u8; header.payload_len()];
    read_exactly(reader, &mut payload)
        .await
        .map_err(FrameError::Stream)?;

    if let Err(err) = header.verify(&payload) {
        debug!(code = header.code, error = %err, "frame failed integrity check");
        return Err(err);
    }

    trace!(code = header.code, len = payload.len(), "decoded frame");
    Ok(Message::new(header.code, payload))
}

/// Encode `message` and write it to an async stream.
pub async fn write_message_async<W>(writer: &mut W, message: &Message) -> Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let wire = encode(message.code, &message.payload)?;
    write_fully(writer, &wire).await?;
    Ok(())
}
