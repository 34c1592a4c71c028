use vlpctl_frame::{Command, FrameConfig, FrameWriter, LEGACY_CHECKSUM_MODULUS};
use vlpctl_session::{validate_intensity, SessionError, MAX_CHANNELS};

use crate::cmd::{ConnectArgs, FrameArgs};
use crate::exit::{frame_error, session_error, CliResult, SUCCESS};
use crate::output::{print_frame, FrameOutput, OutputFormat};

pub fn run(args: FrameArgs, connect: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    let out = encode(&args, connect.legacy_checksum)?;
    print_frame(&out, format);
    Ok(SUCCESS)
}

fn encode(args: &FrameArgs, legacy_checksum: bool) -> CliResult<FrameOutput> {
    if args.channel == 0 || args.channel > MAX_CHANNELS {
        return Err(session_error(
            "invalid frame",
            SessionError::InvalidChannelId {
                id: args.channel,
                max: MAX_CHANNELS,
            },
        ));
    }
    let value = validate_intensity(args.value).map_err(|err| session_error("invalid frame", err))?;

    let mut config = FrameConfig::default();
    if legacy_checksum {
        config.checksum_modulus = LEGACY_CHECKSUM_MODULUS;
    }
    let modulus = config.checksum_modulus;

    // Channel ids are bounded by MAX_CHANNELS, so the index fits in a u8.
    let index = (args.channel - 1) as u8;
    let command = Command::intensity(index, value);
    let mut writer = FrameWriter::with_config(Vec::new(), config);
    writer
        .send(&command)
        .map_err(|err| frame_error("encode failed", err))?;

    let wire = writer.into_inner();
    let checksum = String::from_utf8_lossy(&wire[7..9]).into_owned();
    Ok(FrameOutput {
        channel: args.channel,
        index,
        body: command.to_string(),
        checksum,
        checksum_modulus: modulus,
        wire,
    })
}
