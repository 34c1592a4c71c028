use std::io::ErrorKind;
use std::net::TcpStream;
use std::time::Duration;

use tracing::{debug, info};

use crate::address::ControllerAddress;
use crate::error::{Result, TransportError};
use crate::stream::ControllerStream;

/// TCP transport to a VLP controller.
pub struct TcpTransport;

impl TcpTransport {
    /// Connect to a controller (blocking, bounded by `timeout`).
    ///
    /// A handshake that does not finish within `timeout` fails with
    /// [`TransportError::ConnectTimeout`]. No retry is attempted.
    pub fn connect(address: &ControllerAddress, timeout: Duration) -> Result<ControllerStream> {
        if timeout.is_zero() {
            return Err(TransportError::InvalidTimeout);
        }

        debug!(%address, ?timeout, "connecting to controller");
        let stream = TcpStream::connect_timeout(&address.socket_addr(), timeout).map_err(
            |source| match source.kind() {
                ErrorKind::TimedOut | ErrorKind::WouldBlock => TransportError::ConnectTimeout {
                    address: *address,
                    timeout,
                },
                _ => TransportError::Connect {
                    address: *address,
                    source,
                },
            },
        )?;
        // Frames are tiny and latency-sensitive.
        stream.set_nodelay(true)?;

        info!(%address, "connected to controller");
        Ok(ControllerStream::from_tcp(stream))
    }
}
