use std::fmt;

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{FrameError, Result};
use crate::field::{FieldCode, INTENSITY};

/// Frame header byte.
pub const HEADER: u8 = b'@';

/// Frame terminator: CR LF.
pub const TERMINATOR: [u8; 2] = *b"\r\n";

/// Checksum modulus of current VLP controllers.
///
/// Matches the vendor datasheet example: `@01F125` carries checksum `7F`.
pub const CHECKSUM_MODULUS: u32 = 256;

/// Checksum modulus used by an earlier revision of the protocol family.
pub const LEGACY_CHECKSUM_MODULUS: u32 = 255;

/// Total wire size of a command frame: header (1) + index (2) + field (1) +
/// value (3) + checksum (2) + terminator (2).
pub const FRAME_SIZE: usize = 11;

/// Largest channel index representable in the 2-digit index field.
pub const MAX_CHANNEL_INDEX: u8 = 99;

/// Largest value representable in the 3-digit value field.
pub const MAX_VALUE: u16 = 999;

/// Default maximum length of a device response line, terminator excluded.
pub const DEFAULT_MAX_RESPONSE_LEN: usize = 64;

const INDEX_DIGITS: u32 = 2;
const VALUE_DIGITS: u32 = 3;
const BODY_END: usize = 7;
const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// A single controller command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    /// 0-based channel index on the device.
    pub channel_index: u8,
    /// Which setting the command addresses.
    pub field: FieldCode,
    /// New value for the field.
    pub value: u16,
}

impl Command {
    pub fn new(channel_index: u8, field: FieldCode, value: u16) -> Self {
        Self {
            channel_index,
            field,
            value,
        }
    }

    /// Command setting the output intensity of a channel.
    pub fn intensity(channel_index: u8, value: u8) -> Self {
        Self::new(channel_index, INTENSITY, u16::from(value))
    }
}

impl fmt::Display for Command {
    /// Formats the command body, e.g. `03F255`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}{}{:03}",
            self.channel_index, self.field, self.value
        )
    }
}

/// Sum of all bytes modulo `modulus`.
///
/// `modulus` must be in `2..=256`; [`encode_command`] rejects anything else
/// before calling this.
pub fn checksum(bytes: &[u8], modulus: u32) -> u8 {
    let sum: u32 = bytes.iter().map(|&b| u32::from(b)).sum();
    (sum % modulus) as u8
}

fn check_modulus(modulus: u32) -> Result<()> {
    if (2..=256).contains(&modulus) {
        Ok(())
    } else {
        Err(FrameError::InvalidChecksumModulus(modulus))
    }
}

fn put_decimal(dst: &mut BytesMut, value: u16, digits: u32) {
    for exp in (0..digits).rev() {
        let digit = (value / 10u16.pow(exp)) % 10;
        dst.put_u8(b'0' + digit as u8);
    }
}

fn parse_decimal(digits: &[u8], what: &'static str) -> Result<u16> {
    digits.iter().try_fold(0u16, |acc, &b| {
        if b.is_ascii_digit() {
            Ok(acc * 10 + u16::from(b - b'0'))
        } else {
            Err(FrameError::Malformed(what))
        }
    })
}

fn hex_value(b: u8) -> Result<u8> {
    match b {
        b'0'..=b'9' => Ok(b - b'0'),
        b'A'..=b'F' => Ok(b - b'A' + 10),
        _ => Err(FrameError::Malformed("checksum")),
    }
}

/// Encode a command into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────┬─────────┬───────┬─────────┬──────────┬────────┐
/// │ Header │ Index   │ Field │ Value   │ Checksum │ CR LF  │
/// │ '@'    │ 2 dec   │ 1 A-Z │ 3 dec   │ 2 hex    │        │
/// └────────┴─────────┴───────┴─────────┴──────────┴────────┘
/// ```
///
/// The checksum covers header through value.
pub fn encode_command(command: &Command, modulus: u32, dst: &mut BytesMut) -> Result<()> {
    check_modulus(modulus)?;
    if command.channel_index > MAX_CHANNEL_INDEX {
        return Err(FrameError::ChannelIndexOutOfRange {
            index: command.channel_index,
            max: MAX_CHANNEL_INDEX,
        });
    }
    if command.value > MAX_VALUE {
        return Err(FrameError::ValueOutOfRange {
            value: command.value,
            max: MAX_VALUE,
        });
    }
    if !command.field.is_valid() {
        return Err(FrameError::InvalidFieldCode(command.field.as_byte()));
    }

    dst.reserve(FRAME_SIZE);
    let start = dst.len();
    dst.put_u8(HEADER);
    put_decimal(dst, u16::from(command.channel_index), INDEX_DIGITS);
    dst.put_u8(command.field.as_byte());
    put_decimal(dst, command.value, VALUE_DIGITS);

    let sum = checksum(&dst[start..], modulus);
    dst.put_u8(HEX_DIGITS[usize::from(sum >> 4)]);
    dst.put_u8(HEX_DIGITS[usize::from(sum & 0x0F)]);
    dst.put_slice(&TERMINATOR);
    Ok(())
}

/// Decode a command frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer. The checksum is
/// verified against `modulus`.
pub fn decode_command(src: &mut BytesMut, modulus: u32) -> Result<Option<Command>> {
    check_modulus(modulus)?;
    if src.is_empty() {
        return Ok(None);
    }
    if src[0] != HEADER {
        return Err(FrameError::InvalidHeader(src[0]));
    }
    if src.len() < FRAME_SIZE {
        return Ok(None); // Need more data
    }
    if src[BODY_END + 2..FRAME_SIZE] != TERMINATOR {
        return Err(FrameError::MissingTerminator);
    }

    let index = parse_decimal(&src[1..3], "channel index")?;
    let field = FieldCode::new(src[3]);
    if !field.is_valid() {
        return Err(FrameError::InvalidFieldCode(field.as_byte()));
    }
    let value = parse_decimal(&src[4..BODY_END], "value")?;
    let actual = (hex_value(src[BODY_END])? << 4) | hex_value(src[BODY_END + 1])?;
    let expected = checksum(&src[..BODY_END], modulus);
    if actual != expected {
        return Err(FrameError::ChecksumMismatch { expected, actual });
    }

    src.advance(FRAME_SIZE);
    Ok(Some(Command::new(index as u8, field, value)))
}

/// Decode one CR LF terminated response line from a buffer.
///
/// Returns `Ok(None)` if no complete line is buffered yet. The terminator is
/// consumed but not returned.
pub fn decode_response_line(src: &mut BytesMut, max_len: usize) -> Result<Option<String>> {
    let Some(pos) = src.windows(TERMINATOR.len()).position(|w| w == TERMINATOR) else {
        if src.len() > max_len + 1 {
            return Err(FrameError::ResponseTooLong {
                len: src.len(),
                max: max_len,
            });
        }
        return Ok(None);
    };
    if pos > max_len {
        return Err(FrameError::ResponseTooLong {
            len: pos,
            max: max_len,
        });
    }

    let line = src.split_to(pos);
    src.advance(TERMINATOR.len());
    if !line.is_ascii() {
        return Err(FrameError::NotAscii);
    }
    Ok(Some(String::from_utf8_lossy(&line).into_owned()))
}

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Checksum modulus. Default: [`CHECKSUM_MODULUS`].
    pub checksum_modulus: u32,
    /// Maximum response line length in bytes. Default: 64.
    pub max_response_len: usize,
    /// Read timeout for blocking operations.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<std::time::Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            checksum_modulus: CHECKSUM_MODULUS,
            max_response_len: DEFAULT_MAX_RESPONSE_LEN,
            read_timeout: None,
            write_timeout: None,
        }
    }
}
