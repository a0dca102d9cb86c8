//! Byte stream adapters for crcframe.
//!
//! The framing layer never talks to a socket directly. It only needs two
//! operations from whatever stream the caller hands it:
//! - read exactly `n` bytes, or fail
//! - write all bytes, or fail
//!
//! [`ReadExact`] and [`WriteAll`] provide those over any `std::io` stream,
//! looping over partial reads and writes. This crate is the only place where
//! transport fragmentation is handled. [`WireStream`] wraps an already
//! established TCP or Unix stream so read/write timeouts can be applied.

pub mod error;
pub mod stream;
pub mod traits;

#[cfg(feature = "async")]
pub mod async_io;

pub use error::{Result, TransportError};
pub use stream::WireStream;
pub use traits::{ReadExact, WriteAll};
