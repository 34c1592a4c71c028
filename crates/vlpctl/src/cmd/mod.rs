use std::time::Duration;

use clap::{Args, Subcommand};
use vlpctl_frame::LEGACY_CHECKSUM_MODULUS;
use vlpctl_session::{connect_with_config, Session, SessionConfig};
use vlpctl_transport::{DEFAULT_HOST, DEFAULT_PORT};

use crate::exit::{session_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod frame;
pub mod hold;
pub mod off;
pub mod set;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Set a channel's intensity and switch it on.
    Set(SetArgs),
    /// Switch a channel off.
    Off(OffArgs),
    /// Switch channels on until interrupted, then switch them off.
    Hold(HoldArgs),
    /// Print the frame for a command without connecting.
    Frame(FrameArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, connect: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Set(args) => set::run(args, connect, format),
        Command::Off(args) => off::run(args, connect, format),
        Command::Hold(args) => hold::run(args, connect, format),
        Command::Frame(args) => frame::run(args, connect, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug, Clone)]
pub struct ConnectArgs {
    /// Controller IPv4 address.
    #[arg(long, env = "VLPCTL_HOST", default_value = DEFAULT_HOST, global = true)]
    pub host: String,
    /// Controller TCP port.
    #[arg(long, env = "VLPCTL_PORT", default_value_t = DEFAULT_PORT, global = true)]
    pub port: u16,
    /// Number of channels on the controller (1-4).
    #[arg(long, short = 'n', env = "VLPCTL_CHANNELS", default_value_t = 4, global = true)]
    pub channels: usize,
    /// Connect and I/O timeout (e.g. 5s, 500ms).
    #[arg(long, value_name = "DURATION", default_value = "5s", global = true)]
    pub timeout: String,
    /// Require a response line from the controller for every command.
    #[arg(long, global = true)]
    pub verify_ack: bool,
    /// Use the modulus-255 checksum of older controllers.
    #[arg(long, global = true)]
    pub legacy_checksum: bool,
}

impl ConnectArgs {
    pub fn session_config(&self) -> CliResult<SessionConfig> {
        let timeout = parse_duration(&self.timeout)?;
        let mut config = SessionConfig {
            port: self.port,
            connect_timeout: timeout,
            verify_acknowledgements: self.verify_ack,
            ..SessionConfig::default()
        };
        config.frame.read_timeout = Some(timeout);
        config.frame.write_timeout = Some(timeout);
        if self.legacy_checksum {
            config.frame.checksum_modulus = LEGACY_CHECKSUM_MODULUS;
        }
        Ok(config)
    }

    pub fn open(&self) -> CliResult<Session> {
        let config = self.session_config()?;
        connect_with_config(self.channels, &self.host, &config)
            .map_err(|err| session_error("connect failed", err))
    }
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Channel id (1-based).
    pub channel: usize,
    /// Intensity (0-255).
    pub value: u16,
}

#[derive(Args, Debug)]
pub struct OffArgs {
    /// Channel id (1-based).
    pub channel: usize,
}

#[derive(Args, Debug)]
pub struct HoldArgs {
    /// Channel settings as CHANNEL=INTENSITY (repeatable).
    #[arg(long = "set", value_name = "CHANNEL=INTENSITY", value_parser = parse_assignment, required = true)]
    pub settings: Vec<(usize, u16)>,
    /// Release after this long instead of waiting for Ctrl-C (e.g. 30s, 500ms).
    #[arg(long = "for", value_name = "DURATION")]
    pub hold_for: Option<String>,
}

#[derive(Args, Debug)]
pub struct FrameArgs {
    /// Channel id (1-based).
    pub channel: usize,
    /// Intensity (0-255).
    pub value: u16,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

fn parse_assignment(input: &str) -> Result<(usize, u16), String> {
    let (channel, value) = input
        .split_once('=')
        .ok_or_else(|| format!("expected CHANNEL=INTENSITY, got {input:?}"))?;
    let channel = channel
        .trim()
        .parse()
        .map_err(|_| format!("invalid channel id: {channel:?}"))?;
    let value = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid intensity: {value:?}"))?;
    Ok((channel, value))
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
