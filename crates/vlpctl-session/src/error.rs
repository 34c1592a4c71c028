use crate::channel::MAX_INTENSITY;

/// Coarse classification of session errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input, rejected before any I/O and without mutating state.
    Validation,
    /// Connect, write or acknowledgement failure. Fatal to the session.
    Connection,
}

/// Errors that can occur in session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] vlpctl_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] vlpctl_frame::FrameError),

    /// The requested channel count is not supported by the controller family.
    #[error(
        "invalid channel count {0} (expected {min}..={max})",
        min = crate::session::MIN_CHANNELS,
        max = crate::session::MAX_CHANNELS
    )]
    InvalidChannelCount(usize),

    /// The channel id is outside `1..=channel_count`.
    #[error("channel id {id} out of range (expected 1..={max})")]
    InvalidChannelId { id: usize, max: usize },

    /// The intensity is outside `0..=255`.
    #[error("intensity {0} out of range (expected 0..={max})", max = MAX_INTENSITY)]
    InvalidIntensity(u16),

    /// The controller did not answer a command.
    #[error("no acknowledgement for {command}: {source}")]
    Acknowledgement {
        command: String,
        source: vlpctl_frame::FrameError,
    },

    /// The controller answered a command with an empty line.
    #[error("empty acknowledgement for {0}")]
    EmptyAcknowledgement(String),
}

impl SessionError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Transport(err) if err.is_validation() => ErrorKind::Validation,
            SessionError::Frame(err) if err.is_validation() => ErrorKind::Validation,
            SessionError::InvalidChannelCount(_)
            | SessionError::InvalidChannelId { .. }
            | SessionError::InvalidIntensity(_) => ErrorKind::Validation,
            SessionError::Transport(_)
            | SessionError::Frame(_)
            | SessionError::Acknowledgement { .. }
            | SessionError::EmptyAcknowledgement(_) => ErrorKind::Connection,
        }
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
