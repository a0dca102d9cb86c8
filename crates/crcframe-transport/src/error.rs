/// Errors surfaced by the stream adapters.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The stream ended before the requested byte count was delivered.
    #[error("stream closed after {received} of {expected} bytes")]
    UnexpectedEof { expected: usize, received: usize },

    /// The stream stopped accepting bytes before the write completed.
    #[error("stream accepted {written} of {expected} bytes and then stopped")]
    WriteZero { expected: usize, written: usize },

    /// An I/O error occurred on the underlying stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// True when the peer closed the stream before any requested byte arrived.
    pub fn is_clean_eof(&self) -> bool {
        matches!(self, TransportError::UnexpectedEof { received: 0, .. })
    }

    /// True when the failure came from a read or write timeout on the stream.
    pub fn is_timeout(&self) -> bool {
        match self {
            TransportError::Io(err) => matches!(
                err.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            ),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
