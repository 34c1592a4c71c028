use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use vlpctl_transport::ControllerStream;

use crate::codec::{decode_response_line, FrameConfig};
use crate::error::{FrameError, Result};
use crate::writer::transport_to_frame_error;

const READ_CHUNK_SIZE: usize = 256;

/// Reads CR LF terminated response lines from any `Read` stream.
///
/// Handles partial reads internally; callers always get complete lines.
pub struct ResponseReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Read> ResponseReader<T> {
    /// Create a new response reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new response reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(config.max_response_len + 2),
            inner,
            config,
        }
    }

    /// Read the next complete response line (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached and
    /// `Err(FrameError::Timeout)` when the stream's read timeout elapses.
    pub fn read_line(&mut self) -> Result<String> {
        loop {
            if let Some(line) = decode_response_line(&mut self.buf, self.config.max_response_len)? {
                return Ok(line);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err)
                    if err.kind() == ErrorKind::WouldBlock || err.kind() == ErrorKind::TimedOut =>
                {
                    return Err(FrameError::Timeout)
                }
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current response reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl ResponseReader<ControllerStream> {
    /// Create a response reader for `ControllerStream` and apply read timeout from config.
    pub fn with_config_stream(inner: ControllerStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}
