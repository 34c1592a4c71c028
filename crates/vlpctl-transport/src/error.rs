use std::time::Duration;

use crate::address::ControllerAddress;

/// Errors that can occur in controller transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The host is not a dotted-quad IPv4 address.
    #[error("invalid controller address: {0:?}")]
    InvalidAddress(String),

    /// Port 0 cannot be connected to.
    #[error("invalid controller port: {0}")]
    InvalidPort(u16),

    /// A connect timeout of zero can never succeed.
    #[error("connect timeout must be greater than zero")]
    InvalidTimeout,

    /// Failed to connect to the controller.
    #[error("failed to connect to {address}: {source}")]
    Connect {
        address: ControllerAddress,
        source: std::io::Error,
    },

    /// The TCP handshake did not complete in time.
    #[error("connection to {address} timed out after {timeout:?}")]
    ConnectTimeout {
        address: ControllerAddress,
        timeout: Duration,
    },

    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// Returns true for errors raised before any network activity.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TransportError::InvalidAddress(_)
                | TransportError::InvalidPort(_)
                | TransportError::InvalidTimeout
        )
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
