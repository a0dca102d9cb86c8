//! Async counterparts of [`ReadExact`](crate::ReadExact) and
//! [`WriteAll`](crate::WriteAll) for tokio streams.

use std::io::ErrorKind;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Result, TransportError};

/// Fill `buf` completely from `reader`, suspending until enough bytes arrive.
///
/// Same contract as the blocking adapter: early end of stream fails with
/// [`TransportError::UnexpectedEof`] and no byte past `buf.len()` is read.
pub async fn read_exactly<R>(reader: &mut R, buf: &mut [u8]) -> Result<()>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut filled = 0usize;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]).await {
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

/// Write all of `bytes` to `writer` and flush it.
pub async fn write_fully<W>(writer: &mut W, bytes: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut offset = 0usize;
    while offset < bytes.len() {
        match writer.write(&bytes[offset..]).await {
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
    writer.flush().await.map_err(TransportError::Io)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_across_chunks() {
        let mut reader = tokio_test_reader(&[b"ab", b"cd", b"ef"]);
        let mut buf = [0u8; 5];
        read_exactly(&mut reader, &mut buf).await.unwrap();
        assert_eq!(&buf, b"abcde");
    }

    #[tokio::test]
    async fn eof_reports_received_count() {
        let mut reader: &[u8] = b"abc";
        let mut buf = [0u8; 6];
        let err = read_exactly(&mut reader, &mut buf).await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::UnexpectedEof {
                expected: 6,
                received: 3
            }
        ));
    }

    #[tokio::test]
    async fn writes_through_duplex() {
        let (mut left, mut right) = tokio::io::duplex(4);
        let writer = tokio::spawn(async move {
            write_fully(&mut left, b"duplex pipe").await.unwrap();
        });

        let mut buf = [0u8; 11];
        read_exactly(&mut right, &mut buf).await.unwrap();
        writer.await.unwrap();
        assert_eq!(&buf, b"duplex pipe");
    }

    fn tokio_test_reader(chunks: &[&[u8]]) -> impl AsyncRead + Unpin {
        let (mut tx, rx) = tokio::io::duplex(64);
        let chunks: Vec<Vec<u8>> = chunks.iter().map(|c| c.to_vec()).collect();
        tokio::spawn(async move {
            for chunk in chunks {
                tx.write_all(&chunk).await.unwrap();
                tokio::task::yield_now().await;
            }
        });
        rx
    }
}
