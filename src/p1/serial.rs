//! # P1 Serial Communication
//!
//! This module provides the serial transport for the P1 port: opening the
//! device, reading telegrams line by line, and decoding them. The P1 port
//! is read-only from the host's point of view; the meter pushes one
//! telegram per second.

use crate::constants::{DEFAULT_BAUD_RATE, DEFAULT_DEVICE, DEFAULT_READ_TIMEOUT};
use crate::error::P1Error;
use crate::p1::decoder::{decode, DecoderConfig, Telegram};
use crate::p1::framer::{read_telegram, RawTelegram};
use crate::p1::line_source::LineReader;
use std::time::Duration;
use tokio_serial::SerialPortBuilderExt;

/// Configuration for the serial connection.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    pub device: String,
    pub baudrate: u32,
    pub flow_control: tokio_serial::FlowControl,
    pub timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig {
            device: DEFAULT_DEVICE.to_string(),
            baudrate: DEFAULT_BAUD_RATE,
            flow_control: tokio_serial::FlowControl::Software,
            timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// Represents a handle to the P1 serial connection, encapsulating the
/// tokio_serial::SerialStream. The handle owns the one in-progress
/// accumulation buffer, so it is not meant for concurrent callers;
/// dropping it closes the port on every exit path.
pub struct P1DeviceHandle {
    reader: LineReader<tokio_serial::SerialStream>,
    decoder: DecoderConfig,
}

impl P1DeviceHandle {
    /// Establishes a connection to the P1 port using the provided device
    /// path and the default P1 settings (115200 baud, software flow
    /// control, 1 s read timeout).
    pub async fn connect(device: &str) -> Result<P1DeviceHandle, P1Error> {
        Self::connect_with_config(SerialConfig {
            device: device.to_string(),
            ..SerialConfig::default()
        })
        .await
    }

    /// Establishes a connection with custom config, failing fast on an
    /// unreachable device.
    pub async fn connect_with_config(config: SerialConfig) -> Result<P1DeviceHandle, P1Error> {
        let port = tokio_serial::new(&config.device, config.baudrate)
            .data_bits(tokio_serial::DataBits::Eight)
            .stop_bits(tokio_serial::StopBits::One)
            .parity(tokio_serial::Parity::None)
            .flow_control(config.flow_control)
            .timeout(config.timeout)
            .open_native_async()
            .map_err(|e| P1Error::SerialPort(e.to_string()))?;

        Ok(P1DeviceHandle {
            reader: LineReader::new(port, config.timeout),
            decoder: DecoderConfig::default(),
        })
    }

    /// Replaces the decoder policy used by [`read`](Self::read).
    pub fn with_decoder_config(mut self, decoder: DecoderConfig) -> Self {
        self.decoder = decoder;
        self
    }

    /// Reads the next checksum-validated raw telegram.
    pub async fn read_raw(&mut self) -> Result<RawTelegram, P1Error> {
        match read_telegram(&mut self.reader).await? {
            Some(raw) => Ok(raw),
            // A serial port reporting end-of-stream means the connection
            // dropped mid-session.
            None => Err(P1Error::IncompleteTelegram),
        }
    }

    /// Reads and decodes the next telegram.
    pub async fn read(&mut self) -> Result<Telegram, P1Error> {
        let raw = self.read_raw().await?;
        decode(&raw, &self.decoder)
    }

    /// Closes the serial port connection.
    pub async fn disconnect(self) -> Result<(), P1Error> {
        // SerialStream has no close method; dropping the handle closes it
        Ok(())
    }
}
