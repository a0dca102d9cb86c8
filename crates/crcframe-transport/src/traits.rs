use std::io::{ErrorKind, Read, Write};

use crate::error::{Result, TransportError};

/// Read exactly `buf.len()` bytes from a stream that may deliver fewer bytes
/// per call than requested.
///
/// Implemented for every [`Read`]. Partial reads are accumulated, interrupted
/// reads are retried, and a stream that ends early fails with
/// [`TransportError::UnexpectedEof`] carrying how many bytes did arrive.
/// Nothing beyond `buf.len()` is ever requested from the inner stream.
pub trait ReadExact {
    fn read_exactly(&mut self, buf: &mut [u8]) -> Result<()>;
}

impl<R: Read + ?Sized> ReadExact for R {
    fn read_exactly(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0usize;
        while filled < buf.len() {
            match self.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(TransportError::UnexpectedEof {
                        expected: buf.len(),
                        received: filled,
                    })
                }
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
        Ok(())
    }
}

/// Write every byte of `bytes` to a stream that may accept fewer bytes per
/// call than offered, then flush it.
///
/// Implemented for every [`Write`]. Interrupted writes are retried; a stream
/// that accepts zero bytes fails with [`TransportError::WriteZero`].
/// `WouldBlock` is returned as [`TransportError::Io`], which is how an expired
/// write timeout shows up on Unix sockets.
pub trait WriteAll {
    fn write_fully(&mut self, bytes: &[u8]) -> Result<()>;
}

impl<W: Write + ?Sized> WriteAll for W {
    fn write_fully(&mut self, bytes: &[u8]) -> Result<()> {
        let mut offset = 0usize;
        while offset < bytes.len() {
            match self.write(&bytes[offset..]) {
                Ok(0) => {
                    return Err(TransportError::WriteZero {
                        expected: bytes.len(),
                        written: offset,
                    })
                }
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }

        loop {
            match self.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn reads_exact_count_and_leaves_rest() {
        let mut cursor = Cursor::new(b"abcdefgh".to_vec());
        let mut buf = [0u8; 3];
        cursor.read_exactly(&mut buf).unwrap();

        assert_eq!(&buf, b"abc");
        assert_eq!(cursor.position(), 3);
    }

    #[test]
    fn accumulates_partial_reads() {
        let mut reader = ByteByByteReader {
            bytes: b"fragmented".to_vec(),
            pos: 0,
            calls: 0,
        };
        let mut buf = [0u8; 10];
        reader.read_exactly(&mut buf).unwrap();

        assert_eq!(&buf, b"fragmented");
        assert_eq!(reader.calls, 10);
    }

    #[test]
    fn zero_length_request_does_not_touch_stream() {
        let mut reader = ByteByByteReader {
            bytes: Vec::new(),
            pos: 0,
            calls: 0,
        };
        reader.read_exactly(&mut []).unwrap();
        assert_eq!(reader.calls, 0);
    }

    #[test]
    fn eof_before_any_byte() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        let mut buf = [0u8; 6];
        let err = cursor.read_exactly(&mut buf).unwrap_err();

        assert!(matches!(
            err,
            TransportError::UnexpectedEof {
                expected: 6,
                received: 0
            }
        ));
        assert!(err.is_clean_eof());
    }

    #[test]
    fn eof_mid_read_reports_received_count() {
        let mut cursor = Cursor::new(vec![1u8, 2, 3, 4]);
        let mut buf = [0u8; 6];
        let err = cursor.read_exactly(&mut buf).unwrap_err();

        assert!(matches!(
            err,
            TransportError::UnexpectedEof {
                expected: 6,
                received: 4
            }
        ));
    }

    #[test]
    fn interrupted_read_retries() {
        let mut reader = InterruptedOnce {
            interrupted: false,
            inner: Cursor::new(b"ok".to_vec()),
        };
        let mut buf = [0u8; 2];
        reader.read_exactly(&mut buf).unwrap();
        assert_eq!(&buf, b"ok");
    }

    #[test]
    fn would_block_read_propagates() {
        let mut reader = WouldBlockReader;
        let mut buf = [0u8; 2];
        let err = reader.read_exactly(&mut buf).unwrap_err();
        assert!(matches!(err, TransportError::Io(e) if e.kind() == ErrorKind::WouldBlock));
    }

    #[test]
    fn writes_across_short_writes_and_flushes() {
        let mut sink = ShortWriter {
            data: Vec::new(),
            max_per_call: 3,
            flushed: false,
        };
        sink.write_fully(b"0123456789").unwrap();

        assert_eq!(sink.data, b"0123456789");
        assert!(sink.flushed);
    }

    #[test]
    fn write_zero_is_an_error() {
        let mut sink = ZeroWriter;
        let err = sink.write_fully(b"x").unwrap_err();
        assert!(matches!(
            err,
            TransportError::WriteZero {
                expected: 1,
                written: 0
            }
        ));
    }

    #[test]
    fn write_retries_interrupted() {
        let mut sink = FlakyWriter {
            failures: vec![ErrorKind::Interrupted, ErrorKind::Interrupted],
            data: Vec::new(),
        };
        sink.write_fully(b"retry").unwrap();
        assert_eq!(sink.data, b"retry");
    }

    #[test]
    fn would_block_write_propagates() {
        let mut sink = FlakyWriter {
            failures: vec![ErrorKind::WouldBlock],
            data: Vec::new(),
        };
        let err = sink.write_fully(b"stuck").unwrap_err();
        assert!(err.is_timeout());
        assert!(sink.data.is_empty());
    }

    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
        calls: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.calls += 1;
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    struct InterruptedOnce {
        interrupted: bool,
        inner: Cursor<Vec<u8>>,
    }

    impl Read for InterruptedOnce {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.inner.read(buf)
        }
    }

    struct WouldBlockReader;

    impl Read for WouldBlockReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::WouldBlock))
        }
    }

    struct ShortWriter {
        data: Vec<u8>,
        max_per_call: usize,
        flushed: bool,
    }

    impl Write for ShortWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            let n = buf.len().min(self.max_per_call);
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed = true;
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct FlakyWriter {
        failures: Vec<ErrorKind>,
        data: Vec<u8>,
    }

    impl Write for FlakyWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if let Some(kind) = self.failures.pop() {
                return Err(std::io::Error::from(kind));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
