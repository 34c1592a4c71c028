use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use vlpctl_transport::ControllerStream;

use crate::codec::{encode_command, Command, FrameConfig, FRAME_SIZE};
use crate::error::{FrameError, Result};

/// Writes complete command frames to any `Write` stream.
///
/// Each command is encoded into an internal buffer and handed to the stream as
/// one frame. Only `Interrupted` is retried; a write that cannot make progress
/// within the stream's write timeout fails with [`FrameError::Timeout`].
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(FRAME_SIZE),
            config,
        }
    }

    /// Encode and send one command (blocking).
    ///
    /// Validation failures are reported before anything is written.
    pub fn send(&mut self, command: &Command) -> Result<()> {
        self.buf.clear();
        encode_command(command, self.config.checksum_modulus, &mut self.buf)?;

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(write_error(err)),
            }
        }

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(write_error(err)),
            }
        }
    }

    /// The bytes of the most recently encoded frame.
    pub fn last_frame(&self) -> &[u8] {
        &self.buf
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl FrameWriter<ControllerStream> {
    /// Create a frame writer for `ControllerStream` and apply write timeout from config.
    pub fn with_config_stream(inner: ControllerStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_write_timeout(config.write_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}

// Blocking sockets report an expired write timeout as WouldBlock on Unix and
// TimedOut on Windows.
fn write_error(err: std::io::Error) -> FrameError {
    match err.kind() {
        ErrorKind::WouldBlock | ErrorKind::TimedOut => FrameError::Timeout,
        _ => FrameError::Io(err),
    }
}

pub(crate) fn transport_to_frame_error(err: vlpctl_transport::TransportError) -> FrameError {
    match err {
        vlpctl_transport::TransportError::Io(io)
        | vlpctl_transport::TransportError::Connect { source: io, .. } => FrameError::Io(io),
        other => FrameError::Io(std::io::Error::other(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use bytes::BytesMut;

    use super::*;
    use crate::codec::{decode_command, CHECKSUM_MODULUS, LEGACY_CHECKSUM_MODULUS};
    use crate::field::FieldCode;

    fn written(writer: FrameWriter<Cursor<Vec<u8>>>) -> Vec<u8> {
        writer.into_inner().into_inner()
    }

    #[test]
    fn write_single_frame() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));

        writer.send(&Command::intensity(3, 255)).unwrap();

        assert_eq!(written(writer), b"@03F25585\r\n");
    }

    #[test]
    fn write_multiple_frames() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));

        writer.send(&Command::intensity(0, 0)).unwrap();
        writer.send(&Command::intensity(1, 125)).unwrap();
        writer.send(&Command::intensity(2, 128)).unwrap();

        let mut wire = BytesMut::from(written(writer).as_slice());
        let f1 = decode_command(&mut wire, CHECKSUM_MODULUS).unwrap().unwrap();
        let f2 = decode_command(&mut wire, CHECKSUM_MODULUS).unwrap().unwrap();
        let f3 = decode_command(&mut wire, CHECKSUM_MODULUS).unwrap().unwrap();

        assert_eq!((f1.channel_index, f1.value), (0, 0));
        assert_eq!((f2.channel_index, f2.value), (1, 125));
        assert_eq!((f3.channel_index, f3.value), (2, 128));
        assert!(wire.is_empty());
    }

    #[test]
    fn uses_configured_modulus() {
        let cfg = FrameConfig {
            checksum_modulus: LEGACY_CHECKSUM_MODULUS,
            ..FrameConfig::default()
        };
        let mut writer = FrameWriter::with_config(Cursor::new(Vec::<u8>::new()), cfg);

        writer.send(&Command::intensity(1, 125)).unwrap();

        assert_eq!(writer.last_frame(), b"@01F12580\r\n");
        assert_eq!(writer.config().checksum_modulus, 255);
    }

    #[test]
    fn invalid_command_writes_nothing() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));

        let err = writer
            .send(&Command::new(0, FieldCode::new(b'?'), 1))
            .unwrap_err();

        assert!(matches!(err, FrameError::InvalidFieldCode(b'?')));
        assert!(written(writer).is_empty());
    }

    #[test]
    fn flush_propagates() {
        let sink = FlushTrackingWriter::default();
        let flag = Arc::clone(&sink.flushed);
        let mut writer = FrameWriter::new(sink);

        writer.send(&Command::intensity(0, 1)).unwrap();

        assert!(flag.load(Ordering::SeqCst));
        assert_eq!(writer.get_ref().data.len(), FRAME_SIZE);
    }

    #[test]
    fn handles_interrupted_write_and_flush() {
        let writer_impl = InterruptedWriteThenFlush {
            wrote_once: false,
            flush_interrupted: false,
            data: Vec::new(),
        };

        let mut writer = FrameWriter::new(writer_impl);
        writer.send(&Command::intensity(0, 5)).unwrap();

        let inner = writer.into_inner();
        assert_eq!(inner.data, b"@00F0057B\r\n");
    }

    #[test]
    fn would_block_write_is_timeout() {
        let mut writer = FrameWriter::new(StalledWriter { flush_only: false });
        let err = writer.send(&Command::intensity(0, 0)).unwrap_err();
        assert!(matches!(err, FrameError::Timeout));
    }

    #[test]
    fn would_block_flush_is_timeout() {
        let mut writer = FrameWriter::new(StalledWriter { flush_only: true });
        let err = writer.send(&Command::intensity(0, 0)).unwrap_err();
        assert!(matches!(err, FrameError::Timeout));
    }

    #[test]
    fn stalled_peer_times_out_instead_of_spinning() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let address = vlpctl_transport::ControllerAddress::parse("127.0.0.1", port).unwrap();
        let stream = vlpctl_transport::TcpTransport::connect(
            &address,
            std::time::Duration::from_secs(5),
        )
        .unwrap();
        // Accepted but never read, so the send buffers eventually fill.
        let _accepted = listener.accept().unwrap();

        let cfg = FrameConfig {
            write_timeout: Some(std::time::Duration::from_millis(100)),
            ..FrameConfig::default()
        };
        let mut writer = FrameWriter::with_config_stream(stream, cfg).unwrap();

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(60);
        let err = loop {
            match writer.send(&Command::intensity(0, 255)) {
                Ok(()) => assert!(
                    std::time::Instant::now() < deadline,
                    "writes never stalled"
                ),
                Err(err) => break err,
            }
        };
        assert!(matches!(err, FrameError::Timeout), "unexpected error: {err}");
    }

    #[test]
    fn handles_short_writes() {
        let mut writer = FrameWriter::new(OneByteWriter { data: Vec::new() });
        writer.send(&Command::intensity(3, 255)).unwrap();
        assert_eq!(writer.get_mut().data, b"@03F25585\r\n");
    }

    #[test]
    fn connection_closed_when_write_returns_zero() {
        let mut writer = FrameWriter::new(ZeroWriter);
        let err = writer.send(&Command::intensity(0, 0)).unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn io_error_is_fatal() {
        let mut writer = FrameWriter::new(BrokenPipeWriter);
        let err = writer.send(&Command::intensity(0, 0)).unwrap_err();
        assert!(matches!(err, FrameError::Io(ref e) if e.kind() == ErrorKind::BrokenPipe));
    }

    #[test]
    fn applies_write_timeout_for_controller_stream() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let address = vlpctl_transport::ControllerAddress::parse("127.0.0.1", port).unwrap();
        let stream = vlpctl_transport::TcpTransport::connect(
            &address,
            std::time::Duration::from_secs(5),
        )
        .unwrap();
        let _accepted = listener.accept().unwrap();

        let cfg = FrameConfig {
            write_timeout: Some(std::time::Duration::from_millis(10)),
            ..FrameConfig::default()
        };

        let writer = FrameWriter::with_config_stream(stream, cfg);
        assert!(writer.is_ok());
    }

    #[derive(Default)]
    struct FlushTrackingWriter {
        flushed: Arc<AtomicBool>,
        data: Vec<u8>,
    }

    impl Write for FlushTrackingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct InterruptedWriteThenFlush {
        wrote_once: bool,
        flush_interrupted: bool,
        data: Vec<u8>,
    }

    impl Write for InterruptedWriteThenFlush {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.wrote_once {
                self.wrote_once = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            if !self.flush_interrupted {
                self.flush_interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            Ok(())
        }
    }

    struct OneByteWriter {
        data: Vec<u8>,
    }

    impl Write for OneByteWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.data.push(buf[0]);
            Ok(1)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct StalledWriter {
        flush_only: bool,
    }

    impl Write for StalledWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.flush_only {
                return Ok(buf.len());
            }
            Err(std::io::Error::from(ErrorKind::WouldBlock))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::from(ErrorKind::WouldBlock))
        }
    }

    struct BrokenPipeWriter;

    impl Write for BrokenPipeWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
