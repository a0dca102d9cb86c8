use std::fmt;
use std::io;

use crcframe_frame::FrameError;
use crcframe_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Io(source) => io_error(context, source),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Stream(err) => transport_error(context, err),
        FrameError::PayloadTooLarge { .. }
        | FrameError::LengthLimitExceeded { .. }
        | FrameError::ChecksumMismatch { .. }
        | FrameError::Poisoned => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        FrameError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupted_input_is_data_invalid() {
        let err = frame_error(
            "decode failed",
            FrameError::ChecksumMismatch {
                expected: 1,
                actual: 2,
            },
        );
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.starts_with("decode failed: checksum mismatch"));
    }

    #[test]
    fn truncated_input_is_transport_error() {
        let err = frame_error(
            "decode failed",
            FrameError::Stream(TransportError::UnexpectedEof {
                expected: 8,
                received: 3,
            }),
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
    }

    #[test]
    fn io_errors_map_by_kind() {
        let timeout = frame_error("read", io::Error::from(io::ErrorKind::TimedOut).into());
        assert_eq!(timeout.code, TIMEOUT);

        let denied = io_error("open", io::Error::from(io::ErrorKind::PermissionDenied));
        assert_eq!(denied.code, PERMISSION_DENIED);
    }
}
