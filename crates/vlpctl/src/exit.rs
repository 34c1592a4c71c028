use std::fmt;
use std::io;

use vlpctl_frame::FrameError;
use vlpctl_session::{ErrorKind, SessionError};
use vlpctl_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
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
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::BrokenPipe => FAILURE,
        _ => TRANSPORT_ERROR,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::InvalidAddress(_)
        | TransportError::InvalidPort(_)
        | TransportError::InvalidTimeout => CliError::new(USAGE, format!("{context}: {err}")),
        TransportError::ConnectTimeout { .. } => CliError::new(TIMEOUT, format!("{context}: {err}")),
        TransportError::Connect { source, .. } | TransportError::Io(source) => {
            io_error(context, source)
        }
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::Timeout => CliError::new(TIMEOUT, format!("{context}: {err}")),
        FrameError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
        ref other if other.is_validation() => {
            CliError::new(USAGE, format!("{context}: {other}"))
        }
        FrameError::ChecksumMismatch { .. }
        | FrameError::InvalidHeader(_)
        | FrameError::MissingTerminator
        | FrameError::Malformed(_)
        | FrameError::NotAscii
        | FrameError::ResponseTooLong { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

pub fn session_error(context: &str, err: SessionError) -> CliError {
    if err.kind() == ErrorKind::Validation {
        return CliError::new(USAGE, format!("{context}: {err}"));
    }
    match err {
        SessionError::Transport(err) => transport_error(context, err),
        SessionError::Frame(err) => frame_error(context, err),
        SessionError::Acknowledgement { source, command } => {
            frame_error(&format!("{context}: no acknowledgement for {command}"), source)
        }
        SessionError::EmptyAcknowledgement(_) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}
