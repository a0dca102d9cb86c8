//! Length-prefixed, CRC-32 checked message framing over byte streams.
//!
//! Every message is framed with an 8-byte little-endian header:
//! - 2-byte payload length
//! - 2-byte message code, opaque to this layer
//! - 4-byte CRC-32/IEEE of the payload
//!
//! Frames follow each other with no delimiter; boundaries come only from the
//! length field. Decoding verifies the checksum before a message is handed
//! out, and a mismatch means the stream can no longer be trusted.

pub mod codec;
pub mod decoder;
pub mod error;
pub mod header;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub mod tokio_codec;

pub use codec::{encode, encode_into, FrameConfig, Message, DEFAULT_MAX_PAYLOAD};
pub use decoder::{DecodeState, FrameDecoder};
pub use error::{FrameError, Result};
pub use header::{checksum, FrameHeader, HEADER_SIZE, MAX_PAYLOAD_LEN};
pub use reader::{decode, decode_with_limit, FrameReader, Messages};
pub use writer::FrameWriter;

#[cfg(feature = "async")]
pub use tokio_codec::{decode_async, write_message_async, FrameCodec};
