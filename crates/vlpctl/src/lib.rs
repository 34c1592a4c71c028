//! Client driver for network-attached VLP light controllers.
//!
//! vlpctl talks the controller's line-oriented TCP protocol: it connects with a
//! bounded timeout, frames commands with a checksum trailer, and keeps a local
//! copy of every channel's intensity and on/off state in step with the device.
//!
//! # Crate Structure
//!
//! - [`transport`]: Address validation and the blocking TCP stream
//! - [`frame`]: Command framing, checksums and response lines
//! - [`session`]: Controller sessions and per-channel state

/// Re-export transport types.
pub mod transport {
    pub use vlpctl_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use vlpctl_frame::*;
}

/// Re-export session types.
pub mod session {
    pub use vlpctl_session::*;
}

pub use vlpctl_session::{
    connect, connect_with_config, Channel, ChannelState, ErrorKind, Session, SessionConfig,
    SessionError,
};
pub use vlpctl_transport::validate_address_format;
