//! CRC-32 checked, length-prefixed message framing over byte streams.
//!
//! A sender turns `(code, payload)` into one self-delimiting frame; a receiver
//! reads frames back one at a time from any blocking byte stream, verifying
//! each payload against its checksum before handing it out.
//!
//! # Crate Structure
//!
//! - [`transport`]: read-exactly / write-all adapters and the `WireStream`
//!   wrapper for TCP and Unix streams
//! - [`frame`]: header layout, encoder, blocking reader/writer, incremental
//!   decoder, and the tokio codec (behind the `async` feature)
//!
//! ```
//! use std::io::Cursor;
//! use crcframe::frame::{decode, encode};
//!
//! let wire = encode(2020, b"Hi").unwrap();
//! assert_eq!(wire.len(), 10);
//!
//! let message = decode(&mut Cursor::new(wire.to_vec())).unwrap();
//! assert_eq!(message.code, 2020);
//! assert_eq!(message.payload.as_ref(), b"Hi");
//! ```

/// Re-export transport types.
pub mod transport {
    pub use crcframe_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use crcframe_frame::*;
}
