//! # P1 Error Handling
//!
//! This module defines the P1Error enum, which represents the different error
//! types that can occur in the p1-rs crate.

use std::time::Duration;
use thiserror::Error;

/// Represents the different error types that can occur while reading a P1 port.
#[derive(Debug, Error)]
pub enum P1Error {
    /// Indicates an error related to the serial port communication.
    #[error("Serial port error: {0}")]
    SerialPort(String),

    /// Indicates that no complete line arrived within the configured window.
    /// Transient; the caller may retry from the next telegram boundary.
    #[error("No line received within {0:?}")]
    Timeout(Duration),

    /// Indicates that the stream ended while a telegram was still open.
    #[error("Stream ended mid-telegram")]
    IncompleteTelegram,

    /// Indicates a checksum mismatch; the telegram is discarded.
    #[error("Invalid checksum: declared {declared:04X}, calculated {calculated:04X}")]
    ChecksumMismatch { declared: u16, calculated: u16 },

    /// Indicates a telegram terminator or body line that cannot be parsed.
    #[error("Telegram format error: {0}")]
    TelegramFormat(String),

    /// Indicates an I/O error outside the serial transport (e.g. capture replay).
    #[error("I/O error: {0}")]
    Io(String),
}
