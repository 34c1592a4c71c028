//! Blocking TCP transport for VLP light controllers.
//!
//! This is the lowest layer of vlpctl. It provides:
//! - Controller address validation (IPv4 dotted quad + TCP port)
//! - A connected [`ControllerStream`] opened with a bounded connect timeout
//!
//! Everything else builds on top of the [`ControllerStream`] type provided here.

pub mod address;
pub mod error;
pub mod stream;
pub mod tcp;

pub use address::{validate_address_format, ControllerAddress, DEFAULT_HOST, DEFAULT_PORT};
pub use error::{Result, TransportError};
pub use stream::ControllerStream;
pub use tcp::TcpTransport;
