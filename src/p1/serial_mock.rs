//! Mock serial port implementation for testing
//!
//! This module provides a mock serial port that can be used to test the P1
//! line reading and telegram framing without requiring actual hardware.

use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};

/// Mock serial port that replays queued bytes as incoming data.
///
/// Once the queue is drained, reads report end-of-stream (simulating a
/// dropped connection) unless `set_pending_when_empty` has been called, in
/// which case reads block forever so timeout handling can be exercised.
#[derive(Clone)]
pub struct MockSerialPort {
    /// Data to be read from the port (incoming)
    pub rx_buffer: Arc<Mutex<VecDeque<u8>>>,
    /// Simulated error returned by the next read
    pub next_error: Arc<Mutex<Option<io::Error>>>,
    /// When true, an empty queue blocks instead of signalling end-of-stream
    pending_when_empty: Arc<Mutex<bool>>,
}

impl Default for MockSerialPort {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSerialPort {
    pub fn new() -> Self {
        MockSerialPort {
            rx_buffer: Arc::new(Mutex::new(VecDeque::new())),
            next_error: Arc::new(Mutex::new(None)),
            pending_when_empty: Arc::new(Mutex::new(false)),
        }
    }

    /// Queue data to be read from the port
    pub fn queue_rx_data(&self, data: &[u8]) {
        let mut rx = self.rx_buffer.lock().unwrap();
        rx.extend(data);
    }

    /// Queue a sequence of complete lines, terminators included
    pub fn queue_lines(&self, lines: &[&[u8]]) {
        for line in lines {
            self.queue_rx_data(line);
        }
    }

    /// Clear the receive buffer
    pub fn clear(&self) {
        self.rx_buffer.lock().unwrap().clear();
    }

    /// Set an error to be returned on the next read
    pub fn set_next_error(&self, error: io::Error) {
        *self.next_error.lock().unwrap() = Some(error);
    }

    /// Make reads on an empty queue block instead of reporting end-of-stream
    pub fn set_pending_when_empty(&self, pending: bool) {
        *self.pending_when_empty.lock().unwrap() = pending;
    }
}

impl AsyncRead for MockSerialPort {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        // Check for simulated error
        if let Some(error) = self.next_error.lock().unwrap().take() {
            return Poll::Ready(Err(error));
        }

        let mut rx = self.rx_buffer.lock().unwrap();
        let available = rx.len().min(buf.remaining());

        if available == 0 && *self.pending_when_empty.lock().unwrap() {
            // Never wakes on its own; callers race this against a timeout.
            return Poll::Pending;
        }

        if available > 0 {
            let data: Vec<u8> = rx.drain(..available).collect();
            buf.put_slice(&data);
        }

        Poll::Ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[test]
    fn test_mock_serial_port_creation() {
        let port = MockSerialPort::new();
        assert_eq!(port.rx_buffer.lock().unwrap().len(), 0);
    }

    #[test]
    fn test_queue_and_clear() {
        let port = MockSerialPort::new();
        port.queue_rx_data(&[0x2F, 0x0D, 0x0A]);
        assert_eq!(port.rx_buffer.lock().unwrap().len(), 3);
        port.clear();
        assert_eq!(port.rx_buffer.lock().unwrap().len(), 0);
    }

    #[test]
    fn test_queue_lines() {
        let port = MockSerialPort::new();
        port.queue_lines(&[b"/foo\r\n", b"!B587\r\n"]);
        assert_eq!(port.rx_buffer.lock().unwrap().len(), 13);
    }

    #[tokio::test]
    async fn test_read_drains_queue_then_eof() {
        let mut port = MockSerialPort::new();
        port.queue_rx_data(b"abc");

        let mut buf = [0u8; 8];
        let n = port.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"abc");

        let n = port.read(&mut buf).await.unwrap();
        assert_eq!(n, 0);
    }

    #[tokio::test]
    async fn test_error_injection() {
        let mut port = MockSerialPort::new();
        port.set_next_error(io::Error::new(io::ErrorKind::BrokenPipe, "Test error"));

        let mut buf = [0u8; 8];
        assert!(port.read(&mut buf).await.is_err());
    }
}
