/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The channel index does not fit the 2-digit index field.
    #[error("channel index {index} out of range (max {max})")]
    ChannelIndexOutOfRange { index: u8, max: u8 },

    /// The value does not fit the 3-digit value field.
    #[error("value {value} out of range (max {max})")]
    ValueOutOfRange { value: u16, max: u16 },

    /// The field code is not an uppercase ASCII letter.
    #[error("invalid field code 0x{0:02X}")]
    InvalidFieldCode(u8),

    /// The checksum modulus cannot produce a 2-hex-digit checksum.
    #[error("invalid checksum modulus {0} (expected 2..=256)")]
    InvalidChecksumModulus(u32),

    /// The frame does not start with the `@` header.
    #[error("invalid frame header 0x{0:02X} (expected '@')")]
    InvalidHeader(u8),

    /// A numeric field contains something other than the expected digits.
    #[error("malformed frame field: {0}")]
    Malformed(&'static str),

    /// The frame is not terminated by CR LF.
    #[error("missing CR LF frame terminator")]
    MissingTerminator,

    /// The trailing checksum does not match the frame contents.
    #[error("checksum mismatch (expected {expected:02X}, got {actual:02X})")]
    ChecksumMismatch { expected: u8, actual: u8 },

    /// A response line exceeded the configured maximum length.
    #[error("response too long ({len} bytes, max {max})")]
    ResponseTooLong { len: usize, max: usize },

    /// A response line contained non-ASCII bytes.
    #[error("response is not ASCII")]
    NotAscii,

    /// The controller made no progress within the configured read or write
    /// timeout.
    #[error("timed out waiting for the controller")]
    Timeout,

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed before a complete frame or response was transferred.
    #[error("connection closed")]
    ConnectionClosed,
}

impl FrameError {
    /// Returns true if the error was raised while validating a command, before
    /// anything reached the wire.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            FrameError::ChannelIndexOutOfRange { .. }
                | FrameError::ValueOutOfRange { .. }
                | FrameError::InvalidFieldCode(_)
                | FrameError::InvalidChecksumModulus(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
