//! Controller sessions for VLP light controllers.
//!
//! This is the "just works" layer. Connect to a controller, then drive its
//! channels with 1-based channel ids:
//!
//! ```no_run
//! let mut session = vlpctl_session::connect(4, "192.168.11.20")?;
//! session.set_intensity(2, 128)?; // staged, channel 2 is still off
//! session.set_on(2)?; // transmits 128
//! session.set_off(2)?; // transmits 0, 128 is kept for the next set_on
//! session.close()?;
//! # Ok::<(), vlpctl_session::SessionError>(())
//! ```

pub mod channel;
pub mod config;
pub mod connector;
pub mod error;
pub mod session;
pub mod transition;

pub use channel::{validate_intensity, Channel, ChannelState, MAX_INTENSITY};
pub use config::{SessionConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_IO_TIMEOUT};
pub use connector::{connect, connect_with_config};
pub use error::{ErrorKind, Result, SessionError};
pub use session::{validate_channel_count, Session, MAX_CHANNELS, MIN_CHANNELS};
pub use transition::{transition, Operation, Transition};
