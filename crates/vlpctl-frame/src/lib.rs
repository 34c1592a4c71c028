//! ASCII command framing for VLP light controllers.
//!
//! Every command is framed as a single line:
//! - A 1-byte header (`@`)
//! - A 2-digit channel index, a 1-letter field code and a 3-digit value
//! - A 2-digit uppercase hex checksum over header and body
//! - A CR LF terminator
//!
//! Encoding validates every field, so a malformed frame never reaches the wire.

pub mod codec;
pub mod error;
pub mod field;
pub mod reader;
pub mod writer;

pub use codec::{
    checksum, decode_command, decode_response_line, encode_command, Command, FrameConfig,
    CHECKSUM_MODULUS, DEFAULT_MAX_RESPONSE_LEN, FRAME_SIZE, HEADER, LEGACY_CHECKSUM_MODULUS,
    MAX_CHANNEL_INDEX, MAX_VALUE, TERMINATOR,
};
pub use error::{FrameError, Result};
pub use field::{FieldCode, INTENSITY};
pub use reader::ResponseReader;
pub use writer::FrameWriter;
