use std::fmt;
use std::io::{Read, Write};

use tracing::{debug, info, trace, warn};
use vlpctl_frame::{Command, FrameWriter, ResponseReader};
use vlpctl_transport::{ControllerAddress, ControllerStream};

use crate::channel::{validate_intensity, Channel};
use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::transition::Operation;

/// Smallest supported channel count.
pub const MIN_CHANNELS: usize = 1;

/// Largest supported channel count.
pub const MAX_CHANNELS: usize = 4;

/// Check that a controller with `count` channels is supported.
pub fn validate_channel_count(count: usize) -> Result<()> {
    if (MIN_CHANNELS..=MAX_CHANNELS).contains(&count) {
        Ok(())
    } else {
        Err(SessionError::InvalidChannelCount(count))
    }
}

/// A session with one VLP controller.
///
/// Channels are addressed with 1-based ids on the public surface and 0-based
/// indices on the wire. The session exclusively owns its stream; dropping the
/// session or calling [`Session::close`] releases it.
pub struct Session<T = ControllerStream> {
    channels: Vec<Channel>,
    writer: FrameWriter<T>,
    reader: Option<ResponseReader<T>>,
    address: Option<ControllerAddress>,
    config: SessionConfig,
}

impl<T: Read + Write> Session<T> {
    /// Start a session over an already-connected stream.
    ///
    /// `responses` is the read half used to check acknowledgements; pass `None`
    /// to command the device without reading replies. Every channel is forced to
    /// intensity 0 before this returns.
    pub fn from_parts(
        stream: T,
        responses: Option<T>,
        channel_count: usize,
        config: SessionConfig,
    ) -> Result<Self> {
        let writer = FrameWriter::with_config(stream, config.frame.clone());
        let reader = responses.map(|r| ResponseReader::with_config(r, config.frame.clone()));
        Self::from_framed(writer, reader, channel_count, config, None)
    }

    pub(crate) fn from_framed(
        writer: FrameWriter<T>,
        reader: Option<ResponseReader<T>>,
        channel_count: usize,
        config: SessionConfig,
        address: Option<ControllerAddress>,
    ) -> Result<Self> {
        validate_channel_count(channel_count)?;

        let mut session = Self {
            channels: vec![Channel::new(); channel_count],
            writer,
            reader,
            address,
            config,
        };

        if let Err(err) = session.initialize() {
            warn!(address = ?session.address, error = %err, "controller initialization failed; releasing connection");
            return Err(err);
        }
        Ok(session)
    }

    fn initialize(&mut self) -> Result<()> {
        debug!(
            channels = self.channels.len(),
            "forcing all channels to intensity 0"
        );
        for index in 0..self.channels.len() {
            self.transmit(index, 0)?;
        }
        Ok(())
    }

    /// Store a new intensity for a channel.
    ///
    /// The intensity is transmitted only if the channel is on. While the
    /// channel is off it is staged and applied by the next [`set_on`](Self::set_on).
    pub fn set_intensity(&mut self, channel_id: usize, value: u16) -> Result<()> {
        let index = self.index_of(channel_id)?;
        let value = validate_intensity(value)?;
        self.drive(index, Operation::SetIntensity(value))
    }

    /// Switch a channel on and transmit its stored intensity.
    pub fn set_on(&mut self, channel_id: usize) -> Result<()> {
        let index = self.index_of(channel_id)?;
        self.drive(index, Operation::TurnOn)
    }

    /// Switch a channel off and transmit intensity 0.
    ///
    /// The stored intensity is kept for the next [`set_on`](Self::set_on).
    pub fn set_off(&mut self, channel_id: usize) -> Result<()> {
        let index = self.index_of(channel_id)?;
        self.drive(index, Operation::TurnOff)
    }

    fn drive(&mut self, index: usize, operation: Operation) -> Result<()> {
        match self.channels[index].apply(operation) {
            Some(value) => self.transmit(index, value),
            None => {
                debug!(
                    channel_id = index + 1,
                    intensity = self.channels[index].intensity(),
                    "intensity staged while channel is off"
                );
                Ok(())
            }
        }
    }

    fn transmit(&mut self, index: usize, value: u8) -> Result<()> {
        // index < MAX_CHANNELS, always fits the 2-digit field
        let command = Command::intensity(index as u8, value);
        self.writer.send(&command)?;
        trace!(
            frame = %String::from_utf8_lossy(self.writer.last_frame()).trim_end(),
            "frame sent"
        );
        debug!(channel_id = index + 1, intensity = value, "intensity commanded");

        if let Some(reader) = self.reader.as_mut() {
            let line = reader
                .read_line()
                .map_err(|source| SessionError::Acknowledgement {
                    command: command.to_string(),
                    source,
                })?;
            if line.trim().is_empty() {
                return Err(SessionError::EmptyAcknowledgement(command.to_string()));
            }
            debug!(response = %line, "command acknowledged");
        }
        Ok(())
    }

    fn index_of(&self, channel_id: usize) -> Result<usize> {
        if (1..=self.channels.len()).contains(&channel_id) {
            Ok(channel_id - 1)
        } else {
            Err(SessionError::InvalidChannelId {
                id: channel_id,
                max: self.channels.len(),
            })
        }
    }

    /// Local state of a channel.
    pub fn channel(&self, channel_id: usize) -> Result<&Channel> {
        let index = self.index_of(channel_id)?;
        Ok(&self.channels[index])
    }

    /// All channels, in wire order (`channels()[0]` is channel id 1).
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Controller address, if the session was opened with [`connect`](crate::connect).
    pub fn address(&self) -> Option<&ControllerAddress> {
        self.address.as_ref()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Whether every frame waits for a controller response.
    pub fn verifies_acknowledgements(&self) -> bool {
        self.reader.is_some()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        self.writer.get_ref()
    }

    /// Consume the session and return the underlying stream.
    pub fn into_inner(self) -> T {
        self.writer.into_inner()
    }
}

impl Session<ControllerStream> {
    /// Shut down the connection and release the socket.
    pub fn close(self) -> Result<()> {
        let Self {
            writer,
            reader,
            address,
            ..
        } = self;
        drop(reader);
        let stream = writer.into_inner();
        stream.shutdown()?;
        info!(?address, "controller session closed");
        Ok(())
    }
}

impl<T> fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("address", &self.address)
            .field("channels", &self.channels)
            .field("verify_acknowledgements", &self.reader.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, ErrorKind as IoErrorKind};

    use bytes::BytesMut;
    use vlpctl_frame::{decode_command, FrameError, CHECKSUM_MODULUS, LEGACY_CHECKSUM_MODULUS};

    use super::*;
    use crate::channel::ChannelState;
    use crate::error::ErrorKind;

    type MemorySession = Session<Cursor<Vec<u8>>>;

    fn session(channels: usize) -> MemorySession {
        Session::from_parts(
            Cursor::new(Vec::new()),
            None,
            channels,
            SessionConfig::default(),
        )
        .unwrap()
    }

    fn sent(session: &MemorySession) -> Vec<Command> {
        let mut wire = BytesMut::from(session.get_ref().get_ref().as_slice());
        let mut commands = Vec::new();
        while let Some(command) = decode_command(&mut wire, CHECKSUM_MODULUS).unwrap() {
            commands.push(command);
        }
        assert!(wire.is_empty(), "trailing partial frame on the wire");
        commands
    }

    #[test]
    fn construction_forces_every_channel_to_zero() {
        for count in MIN_CHANNELS..=MAX_CHANNELS {
            let session = session(count);
            let expected: Vec<Command> = (0..count as u8)
                .map(|index| Command::intensity(index, 0))
                .collect();
            assert_eq!(sent(&session), expected);
            assert_eq!(session.channel_count(), count);
            for channel in session.channels() {
                assert_eq!(channel.intensity(), 0);
                assert_eq!(channel.state(), ChannelState::Off);
            }
        }
    }

    #[test]
    fn construction_rejects_bad_channel_count_without_io() {
        for count in [0, 5, 100] {
            let err = Session::from_parts(
                Cursor::new(Vec::<u8>::new()),
                None,
                count,
                SessionConfig::default(),
            )
            .unwrap_err();
            assert!(matches!(err, SessionError::InvalidChannelCount(c) if c == count));
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
    }

    #[test]
    fn set_intensity_while_off_is_not_transmitted() {
        let mut session = session(4);
        session.set_intensity(1, 255).unwrap();

        assert_eq!(sent(&session).len(), 4);
        assert_eq!(session.channel(1).unwrap().intensity(), 255);
        assert_eq!(session.channels()[0].intensity(), 255);
        assert!(!session.channel(1).unwrap().is_on());
    }

    #[test]
    fn set_intensity_while_on_is_transmitted() {
        let mut session = session(4);
        session.set_on(4).unwrap();
        session.set_intensity(4, 255).unwrap();

        let commands = sent(&session);
        assert_eq!(commands[4..], [Command::intensity(3, 0), Command::intensity(3, 255)]);
        let wire = session.get_ref().get_ref();
        assert_eq!(&wire[wire.len() - 11..], b"@03F25585\r\n");
    }

    #[test]
    fn set_on_transmits_staged_intensity() {
        let mut session = session(4);
        session.set_intensity(2, 128).unwrap();
        session.set_on(2).unwrap();

        assert_eq!(sent(&session)[4..], [Command::intensity(1, 128)]);
        assert!(session.channel(2).unwrap().is_on());
    }

    #[test]
    fn set_off_transmits_zero_and_preserves_intensity() {
        let mut session = session(4);
        session.set_on(3).unwrap();
        session.set_intensity(3, 180).unwrap();
        session.set_off(3).unwrap();

        assert_eq!(
            sent(&session)[4..],
            [
                Command::intensity(2, 0),
                Command::intensity(2, 180),
                Command::intensity(2, 0)
            ]
        );
        let channel = session.channel(3).unwrap();
        assert_eq!(channel.state(), ChannelState::Off);
        assert_eq!(channel.intensity(), 180);

        session.set_on(3).unwrap();
        assert_eq!(sent(&session).last(), Some(&Command::intensity(2, 180)));
    }

    #[test]
    fn spec_sheet_checksum_on_the_wire() {
        let mut session = session(4);
        session.set_on(2).unwrap();
        session.set_intensity(2, 125).unwrap();

        let wire = session.into_inner().into_inner();
        assert_eq!(&wire[wire.len() - 11..], b"@01F1257F\r\n");
    }

    #[test]
    fn legacy_modulus_is_configurable() {
        let mut config = SessionConfig::default();
        config.frame.checksum_modulus = LEGACY_CHECKSUM_MODULUS;
        let mut session = Session::from_parts(Cursor::new(Vec::new()), None, 2, config).unwrap();
        session.set_intensity(2, 125).unwrap();
        session.set_on(2).unwrap();

        let wire = session.into_inner().into_inner();
        assert_eq!(&wire[wire.len() - 11..], b"@01F12580\r\n");
    }

    #[test]
    fn channel_ids_are_one_based_and_bounded() {
        for count in MIN_CHANNELS..=MAX_CHANNELS {
            let mut session = session(count);
            for id in 1..=count {
                session.set_intensity(id, 10).unwrap();
                session.set_on(id).unwrap();
                session.set_off(id).unwrap();
            }
            for id in [0, count + 1] {
                for result in [
                    session.set_intensity(id, 10),
                    session.set_on(id),
                    session.set_off(id),
                ] {
                    let err = result.unwrap_err();
                    assert!(
                        matches!(err, SessionError::InvalidChannelId { id: i, max } if i == id && max == count)
                    );
                    assert_eq!(err.kind(), ErrorKind::Validation);
                }
                assert!(session.channel(id).is_err());
            }
            assert_eq!(sent(&session).len(), count + 2 * count);
        }
    }

    #[test]
    fn out_of_range_intensity_changes_nothing() {
        let mut session = session(2);
        session.set_on(1).unwrap();
        session.set_intensity(1, 40).unwrap();
        let before = sent(&session).len();

        let err = session.set_intensity(1, 256).unwrap_err();
        assert!(matches!(err, SessionError::InvalidIntensity(256)));
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(session.channel(1).unwrap().intensity(), 40);
        assert_eq!(sent(&session).len(), before);
    }

    #[test]
    fn invalid_channel_checked_before_intensity() {
        let mut session = session(2);
        let err = session.set_intensity(3, 999).unwrap_err();
        assert!(matches!(err, SessionError::InvalidChannelId { id: 3, max: 2 }));
    }

    #[test]
    fn acknowledgements_are_read_when_enabled() {
        let acks = Cursor::new(b"OK\r\nOK\r\nOK\r\n".to_vec());
        let mut session =
            Session::from_parts(Cursor::new(Vec::new()), Some(acks), 2, SessionConfig::default())
                .unwrap();
        assert!(session.verifies_acknowledgements());

        session.set_on(1).unwrap();
        let err = session.set_off(1).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Acknowledgement {
                ref command,
                source: FrameError::ConnectionClosed
            } if command == "00F000"
        ));
        assert_eq!(err.kind(), ErrorKind::Connection);
    }

    #[test]
    fn empty_acknowledgement_fails_construction() {
        let acks = Cursor::new(b"OK\r\n\r\n".to_vec());
        let err =
            Session::from_parts(Cursor::new(Vec::new()), Some(acks), 2, SessionConfig::default())
                .unwrap_err();
        assert!(matches!(err, SessionError::EmptyAcknowledgement(ref c) if c == "01F000"));
    }

    #[test]
    fn write_failure_is_connection_error() {
        let stream = FailingStream {
            writes_left: 4,
            failure: IoErrorKind::BrokenPipe,
        };
        let mut session =
            Session::from_parts(stream, None, 4, SessionConfig::default()).unwrap();

        session.set_intensity(1, 50).unwrap();
        let err = session.set_on(1).unwrap_err();
        assert!(matches!(err, SessionError::Frame(FrameError::Io(_))));
        assert_eq!(err.kind(), ErrorKind::Connection);
    }

    #[test]
    fn write_timeout_is_connection_error() {
        let stream = FailingStream {
            writes_left: 1,
            failure: IoErrorKind::WouldBlock,
        };
        let mut session =
            Session::from_parts(stream, None, 1, SessionConfig::default()).unwrap();

        let err = session.set_on(1).unwrap_err();
        assert!(matches!(err, SessionError::Frame(FrameError::Timeout)));
        assert_eq!(err.kind(), ErrorKind::Connection);
    }

    #[test]
    fn write_failure_during_initialization_fails_construction() {
        let stream = FailingStream {
            writes_left: 2,
            failure: IoErrorKind::BrokenPipe,
        };
        let err = Session::from_parts(stream, None, 4, SessionConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connection);
    }

    #[test]
    fn debug_output_lists_channels() {
        let session = session(1);
        let debug = format!("{session:?}");
        assert!(debug.contains("Session"));
        assert!(debug.contains("intensity: 0"));
    }

    struct FailingStream {
        writes_left: usize,
        failure: IoErrorKind,
    }

    impl Read for FailingStream {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Ok(0)
        }
    }

    impl Write for FailingStream {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.writes_left == 0 {
                return Err(std::io::Error::from(self.failure));
            }
            self.writes_left -= 1;
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
