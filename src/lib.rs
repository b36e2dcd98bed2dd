//! # p1-rs - A Rust Crate for Reading DSMR P1 Smart-Meter Telegrams
//!
//! The p1-rs crate reads the continuous ASCII stream emitted by a utility
//! smart meter's P1 serial port, reassembles it into discrete telegrams,
//! validates each telegram's CRC-16 checksum, and decodes the body into an
//! ordered mapping of OBIS-style identifiers to string values.
//!
//! ## Features
//!
//! - Connect to the P1 port over a serial connection (115200 8N1 with
//!   software flow control by default)
//! - Frame telegrams between the `/` identification line and the `!XXXX`
//!   checksum terminator, byte-exact
//! - Validate telegram integrity with CRC-16/ARC
//! - Decode field lines, including list-valued identifiers, embedded
//!   units, and bare identifiers
//! - Replay stored captures for testing and diagnostics
//! - Support for logging and typed error handling
//!
//! ## Usage
//!
//! ```rust,no_run
//! use p1_rs::{connect, P1Error};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), P1Error> {
//!     let mut handle = connect("/dev/ttyUSB0").await?;
//!     let telegram = handle.read().await?;
//!     if let Some(reading) = telegram.get("1-0:1.8.1") {
//!         println!("consumed (tariff 1): {reading}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod constants;
pub mod error;
pub mod logging;
pub mod p1;

pub use crate::error::P1Error;
pub use crate::logging::{init_logger, log_info};

// Core P1 types
pub use p1::checksum::crc16;
pub use p1::decoder::{
    decode, DecoderConfig, FieldValue, MalformedLinePolicy, Telegram, TelegramEntry,
};
pub use p1::framer::{read_telegram, RawTelegram};
pub use p1::line_source::{Line, LineReader, LineSource};
pub use p1::serial::{P1DeviceHandle, SerialConfig};

use std::path::Path;
use std::time::Duration;

/// Connect to the P1 port via serial device with default settings.
///
/// # Arguments
/// * `device` - Serial device path (e.g., "/dev/ttyUSB0")
///
/// # Returns
/// * `Ok(P1DeviceHandle)` - Connected handle for reading telegrams
/// * `Err(P1Error)` - Connection failed
pub async fn connect(device: &str) -> Result<P1DeviceHandle, P1Error> {
    P1DeviceHandle::connect(device).await
}

/// Connect to the P1 port with custom serial settings.
pub async fn connect_with_config(config: SerialConfig) -> Result<P1DeviceHandle, P1Error> {
    P1DeviceHandle::connect_with_config(config).await
}

/// Decode every telegram in a stored capture of raw P1 output.
///
/// The capture holds lines exactly as transmitted, terminators included.
/// A capture ending mid-telegram is an [`P1Error::IncompleteTelegram`].
pub async fn read_capture(
    path: impl AsRef<Path>,
    config: &DecoderConfig,
) -> Result<Vec<Telegram>, P1Error> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| P1Error::Io(e.to_string()))?;
    let mut reader = LineReader::new(file, Duration::from_secs(5));

    let mut telegrams = Vec::new();
    while let Some(raw) = read_telegram(&mut reader).await? {
        telegrams.push(decode(&raw, config)?);
    }
    Ok(telegrams)
}
