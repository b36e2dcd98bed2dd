//! Line-oriented access to a byte transport.
//!
//! The framer consumes whole lines, never raw bytes, so the transport sits
//! behind the [`LineSource`] trait. [`LineReader`] implements it over any
//! `AsyncRead` stream: the real serial port, a capture file replayed for
//! tests, or the mock port in `serial_mock`.

use crate::error::P1Error;
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::timeout;

/// One received line, bytes unmodified, terminator included.
pub type Line = Vec<u8>;

/// Trait for sources that yield one text line at a time.
#[async_trait]
pub trait LineSource: Send {
    /// Reads the next line, blocking up to the configured timeout.
    ///
    /// Returns `Ok(None)` at end of stream. A line cut short by end of
    /// stream is returned without its terminator; the following call
    /// reports end of stream.
    async fn read_line(&mut self) -> Result<Option<Line>, P1Error>;
}

/// Adapts an `AsyncRead` byte stream into a [`LineSource`].
///
/// No buffering or retry logic lives here; bytes are consumed one at a
/// time until a `\n` terminator is seen.
pub struct LineReader<P> {
    port: P,
    timeout: Duration,
}

impl<P: AsyncRead + Unpin + Send> LineReader<P> {
    pub fn new(port: P, timeout: Duration) -> Self {
        LineReader { port, timeout }
    }

    /// Returns the underlying transport, releasing the reader.
    pub fn into_inner(self) -> P {
        self.port
    }
}

#[async_trait]
impl<P: AsyncRead + Unpin + Send> LineSource for LineReader<P> {
    async fn read_line(&mut self) -> Result<Option<Line>, P1Error> {
        let window = self.timeout;
        let port = &mut self.port;

        let read_one = async {
            let mut line = Vec::with_capacity(64);
            let mut byte = [0u8; 1];
            loop {
                let n = port
                    .read(&mut byte)
                    .await
                    .map_err(|e| P1Error::SerialPort(e.to_string()))?;
                if n == 0 {
                    return Ok(if line.is_empty() { None } else { Some(line) });
                }
                line.push(byte[0]);
                if byte[0] == b'\n' {
                    return Ok(Some(line));
                }
            }
        };

        match timeout(window, read_one).await {
            Ok(result) => result,
            Err(_) => Err(P1Error::Timeout(window)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::p1::serial_mock::MockSerialPort;

    #[tokio::test]
    async fn test_read_line_splits_on_lf() {
        let port = MockSerialPort::new();
        port.queue_rx_data(b"/foo\r\nbar\r\n");

        let mut reader = LineReader::new(port, Duration::from_secs(1));
        assert_eq!(reader.read_line().await.unwrap(), Some(b"/foo\r\n".to_vec()));
        assert_eq!(reader.read_line().await.unwrap(), Some(b"bar\r\n".to_vec()));
        assert_eq!(reader.read_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_line_partial_at_eof() {
        let port = MockSerialPort::new();
        port.queue_rx_data(b"truncated");

        let mut reader = LineReader::new(port, Duration::from_secs(1));
        assert_eq!(
            reader.read_line().await.unwrap(),
            Some(b"truncated".to_vec())
        );
        assert_eq!(reader.read_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_line_timeout() {
        let port = MockSerialPort::new();
        port.set_pending_when_empty(true);

        let mut reader = LineReader::new(port, Duration::from_millis(20));
        let result = reader.read_line().await;
        assert!(matches!(result, Err(P1Error::Timeout(_))));
    }

    #[tokio::test]
    async fn test_read_line_io_error() {
        let port = MockSerialPort::new();
        port.set_next_error(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "gone",
        ));

        let mut reader = LineReader::new(port, Duration::from_secs(1));
        let result = reader.read_line().await;
        assert!(matches!(result, Err(P1Error::SerialPort(_))));
    }
}
