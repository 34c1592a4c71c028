//! Command field codes.
//!
//! The field code is the single letter between the channel index and the value
//! of a command body. Only uppercase ASCII letters are valid on the wire.

use std::fmt;

/// A one-letter command field code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldCode(u8);

/// Output intensity (`F`).
pub const INTENSITY: FieldCode = FieldCode(b'F');

impl FieldCode {
    /// Wrap a raw code byte. Validity is checked when a frame is encoded.
    pub const fn new(code: u8) -> Self {
        Self(code)
    }

    /// The raw code byte.
    pub const fn as_byte(self) -> u8 {
        self.0
    }

    /// Returns true if the code can appear in a frame.
    pub fn is_valid(self) -> bool {
        self.0.is_ascii_uppercase()
    }
}

impl fmt::Display for FieldCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", char::from(self.0))
    }
}

/// Returns a human-readable name for a field code.
pub fn field_name(code: FieldCode) -> &'static str {
    match code {
        INTENSITY => "INTENSITY",
        _ if code.is_valid() => "UNKNOWN",
        _ => "INVALID",
    }
}
