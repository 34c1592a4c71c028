//! On/off transition table for a single channel.
//!
//! | current | operation       | next | transmit         |
//! |---------|-----------------|------|------------------|
//! | Off     | SetIntensity(v) | Off  | nothing          |
//! | On      | SetIntensity(v) | On   | v                |
//! | any     | TurnOn          | On   | stored intensity |
//! | any     | TurnOff         | Off  | 0                |
//!
//! An intensity set while a channel is off is staged: it is stored locally and
//! reaches the device on the next `TurnOn`.

use crate::channel::ChannelState;

/// A mutation requested on a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SetIntensity(u8),
    TurnOn,
    TurnOff,
}

/// Outcome of applying an [`Operation`] to a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State after the operation.
    pub state: ChannelState,
    /// Stored intensity after the operation.
    pub intensity: u8,
    /// Intensity to command on the device, or `None` to send nothing.
    pub transmit: Option<u8>,
}

/// Look up the transition for `operation` on a channel in `state` holding
/// `intensity`.
pub fn transition(state: ChannelState, intensity: u8, operation: Operation) -> Transition {
    use ChannelState::{Off, On};

    match (state, operation) {
        (Off, Operation::SetIntensity(value)) => Transition {
            state: Off,
            intensity: value,
            transmit: None,
        },
        (On, Operation::SetIntensity(value)) => Transition {
            state: On,
            intensity: value,
            transmit: Some(value),
        },
        (_, Operation::TurnOn) => Transition {
            state: On,
            intensity,
            transmit: Some(intensity),
        },
        (_, Operation::TurnOff) => Transition {
            state: Off,
            intensity,
            transmit: Some(0),
        },
    }
}
