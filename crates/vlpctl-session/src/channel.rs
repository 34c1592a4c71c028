//! Local state of one controller output.

use std::fmt;

use crate::error::{Result, SessionError};
use crate::transition::{transition, Operation};

/// Highest intensity a channel accepts.
pub const MAX_INTENSITY: u16 = 255;

/// On/off state of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelState {
    On,
    #[default]
    Off,
}

impl ChannelState {
    pub fn is_on(self) -> bool {
        self == ChannelState::On
    }

    /// The opposite state.
    pub fn toggled(self) -> Self {
        match self {
            ChannelState::On => ChannelState::Off,
            ChannelState::Off => ChannelState::On,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChannelState::On => "on",
            ChannelState::Off => "off",
        }
    }
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check that `value` is a valid 8-bit intensity.
pub fn validate_intensity(value: u16) -> Result<u8> {
    u8::try_from(value).map_err(|_| SessionError::InvalidIntensity(value))
}

/// One controller output: a stored intensity and an on/off state.
///
/// A channel starts at intensity 0, switched off. The stored intensity is
/// kept while the channel is off so it can be applied on the next switch-on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Channel {
    intensity: u8,
    state: ChannelState,
}

impl Channel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new intensity. Values above 255 are rejected and leave the
    /// channel unchanged.
    pub fn set_intensity(&mut self, value: u16) -> Result<()> {
        self.intensity = validate_intensity(value)?;
        Ok(())
    }

    pub fn intensity(&self) -> u8 {
        self.intensity
    }

    pub fn turn_on(&mut self) {
        self.state = ChannelState::On;
    }

    pub fn turn_off(&mut self) {
        self.state = ChannelState::Off;
    }

    pub fn toggle(&mut self) {
        self.state = self.state.toggled();
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn is_on(&self) -> bool {
        self.state.is_on()
    }

    /// Run `operation` through the transition table and return the intensity
    /// the device must be sent, if any.
    pub fn apply(&mut self, operation: Operation) -> Option<u8> {
        let next = transition(self.state, self.intensity, operation);
        self.state = next.state;
        self.intensity = next.intensity;
        next.transmit
    }
}
