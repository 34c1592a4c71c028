use std::time::Duration;

use vlpctl_frame::FrameConfig;
use vlpctl_transport::DEFAULT_PORT;

/// Default bound on the TCP handshake.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default bound on each blocking read or write after connecting.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for a controller session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Controller TCP port.
    pub port: u16,
    /// Timeout for the TCP handshake.
    pub connect_timeout: Duration,
    /// Framing configuration, including the checksum modulus and I/O timeouts.
    pub frame: FrameConfig,
    /// Require one non-empty response line per transmitted frame.
    ///
    /// Off by default: the controller is commanded without reading its replies.
    pub verify_acknowledgements: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            frame: FrameConfig {
                read_timeout: Some(DEFAULT_IO_TIMEOUT),
                write_timeout: Some(DEFAULT_IO_TIMEOUT),
                ..FrameConfig::default()
            },
            verify_acknowledgements: false,
        }
    }
}
