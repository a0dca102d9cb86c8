use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use tracing::debug;

use crate::error::Result;

/// An already established byte stream: implements Read + Write.
///
/// Connection setup and teardown happen elsewhere. This wrapper only gives
/// the framing layer one concrete type to apply timeouts to and to clone
/// into independent read and write halves.
pub struct WireStream {
    inner: WireStreamInner,
}

enum WireStreamInner {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(std::os::unix::net::UnixStream),
}

impl Read for WireStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            WireStreamInner::Tcp(stream) => stream.read(buf),
            #[cfg(unix)]
            WireStreamInner::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for WireStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            WireStreamInner::Tcp(stream) => stream.write(buf),
            #[cfg(unix)]
            WireStreamInner::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            WireStreamInner::Tcp(stream) => stream.flush(),
            #[cfg(unix)]
            WireStreamInner::Unix(stream) => stream.flush(),
        }
    }
}

impl From<TcpStream> for WireStream {
    fn from(stream: TcpStream) -> Self {
        debug!(peer = ?stream.peer_addr().ok(), "wrapping tcp stream");
        Self {
            inner: WireStreamInner::Tcp(stream),
        }
    }
}

#[cfg(unix)]
impl From<std::os::unix::net::UnixStream> for WireStream {
    fn from(stream: std::os::unix::net::UnixStream) -> Self {
        debug!("wrapping unix stream");
        Self {
            inner: WireStreamInner::Unix(stream),
        }
    }
}

impl WireStream {
    /// Set read timeout on the underlying stream.
    ///
    /// A read that times out surfaces as `TransportError::Io` with kind
    /// `WouldBlock` or `TimedOut` depending on the platform.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        debug!(?timeout, "setting read timeout");
        match &self.inner {
            WireStreamInner::Tcp(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
            #[cfg(unix)]
            WireStreamInner::Unix(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
        }
    }

    /// Set write timeout on the underlying stream.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        debug!(?timeout, "setting write timeout");
        match &self.inner {
            WireStreamInner::Tcp(stream) => stream.set_write_timeout(timeout).map_err(Into::into),
            #[cfg(unix)]
            WireStreamInner::Unix(stream) => stream.set_write_timeout(timeout).map_err(Into::into),
        }
    }

    /// Try to clone this stream (creates a new file descriptor).
    ///
    /// Used to hand the read half and the write half of one connection to
    /// different threads.
    pub fn try_clone(&self) -> Result<Self> {
        match &self.inner {
            WireStreamInner::Tcp(stream) => Ok(Self {
                inner: WireStreamInner::Tcp(stream.try_clone()?),
            }),
            #[cfg(unix)]
            WireStreamInner::Unix(stream) => Ok(Self {
                inner: WireStreamInner::Unix(stream.try_clone()?),
            }),
        }
    }

    /// Short transport name, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match &self.inner {
            WireStreamInner::Tcp(_) => "tcp",
            #[cfg(unix)]
            WireStreamInner::Unix(_) => "unix",
        }
    }
}

impl std::fmt::Debug for WireStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WireStream")
            .field("type", &self.kind())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use super::*;
    use crate::error::TransportError;
    use crate::traits::{ReadExact, WriteAll};

    fn tcp_pair() -> (WireStream, WireStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).unwrap();
        let (server, _) = listener.accept().unwrap();
        (WireStream::from(client), WireStream::from(server))
    }

    #[test]
    fn tcp_roundtrip() {
        let (mut left, mut right) = tcp_pair();
        assert_eq!(left.kind(), "tcp");

        left.write_fully(b"over tcp").unwrap();
        let mut buf = [0u8; 8];
        right.read_exactly(&mut buf).unwrap();
        assert_eq!(&buf, b"over tcp");
    }

    #[test]
    #[cfg(unix)]
    fn unix_roundtrip() {
        let (left, right) = std::os::unix::net::UnixStream::pair().unwrap();
        let mut left = WireStream::from(left);
        let mut right = WireStream::from(right);
        assert_eq!(right.kind(), "unix");

        left.write_fully(b"pair").unwrap();
        let mut buf = [0u8; 4];
        right.read_exactly(&mut buf).unwrap();
        assert_eq!(&buf, b"pair");
    }

    #[test]
    fn read_timeout_surfaces_as_timeout() {
        let (_left, mut right) = tcp_pair();
        right
            .set_read_timeout(Some(Duration::from_millis(20)))
            .unwrap();

        let mut buf = [0u8; 1];
        let err = right.read_exactly(&mut buf).unwrap_err();
        assert!(err.is_timeout(), "unexpected error: {err}");
    }

    #[test]
    fn closed_peer_is_unexpected_eof() {
        let (left, mut right) = tcp_pair();
        drop(left);

        let mut buf = [0u8; 4];
        let err = right.read_exactly(&mut buf).unwrap_err();
        assert!(matches!(err, TransportError::UnexpectedEof { received: 0, .. }));
    }

    #[test]
    fn cloned_halves_share_connection() {
        let (mut left, right) = tcp_pair();
        let mut reader = right.try_clone().unwrap();
        let mut writer = right;

        left.write_fully(b"ping").unwrap();
        let mut buf = [0u8; 4];
        reader.read_exactly(&mut buf).unwrap();
        assert_eq!(&buf, b"ping");

        writer.write_fully(b"pong").unwrap();
        left.read_exactly(&mut buf).unwrap();
        assert_eq!(&buf, b"pong");
    }

    #[test]
    fn debug_shows_type() {
        let (left, _right) = tcp_pair();
        assert_eq!(format!("{left:?}"), "WireStream { type: \"tcp\" }");
    }
}
