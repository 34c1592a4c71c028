use tracing::debug;
use vlpctl_frame::{FrameWriter, ResponseReader};
use vlpctl_transport::{ControllerAddress, TcpTransport};

use crate::config::SessionConfig;
use crate::error::Result;
use crate::session::{validate_channel_count, Session};

/// Connect to a controller on the default port.
pub fn connect(channel_count: usize, host: &str) -> Result<Session> {
    connect_with_config(channel_count, host, &SessionConfig::default())
}

/// Connect with explicit configuration.
///
/// Channel count, host and port are validated before any network activity.
/// The TCP handshake is bounded by `config.connect_timeout` and never retried.
/// If initializing the channels fails, the socket is closed before the error
/// is returned.
pub fn connect_with_config(
    channel_count: usize,
    host: &str,
    config: &SessionConfig,
) -> Result<Session> {
    validate_channel_count(channel_count)?;
    let address = ControllerAddress::parse(host, config.port)?;

    let stream = TcpTransport::connect(&address, config.connect_timeout)?;
    let reader = if config.verify_acknowledgements {
        let reader_stream = stream.try_clone()?;
        Some(ResponseReader::with_config_stream(
            reader_stream,
            config.frame.clone(),
        )?)
    } else {
        None
    };
    let writer = FrameWriter::with_config_stream(stream, config.frame.clone())?;

    debug!(%address, channel_count, "initializing controller session");
    Session::from_framed(writer, reader, channel_count, config.clone(), Some(address))
}
