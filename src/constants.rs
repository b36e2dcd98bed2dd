//! P1 Protocol Constants
//!
//! This module defines constants used in the DSMR P1 telegram protocol,
//! based on the Dutch Smart Meter Requirements (P1 companion standard).

use std::time::Duration;

/// First byte of the identification line that opens a telegram
pub const TELEGRAM_START: u8 = b'/';

/// First byte of the terminator line that closes a telegram
pub const TELEGRAM_END: u8 = b'!';

/// Number of hex digits carrying the declared checksum after `!`
pub const CHECKSUM_HEX_DIGITS: usize = 4;

/// CRC-16/ARC polynomial (reflected)
pub const CHECKSUM_POLY: u16 = 0xA001;

/// Default serial device of the P1 port
pub const DEFAULT_DEVICE: &str = "/dev/ttyUSB0";

/// P1 ports transmit at a fixed 115200 baud (DSMR 4 and later)
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default per-line read timeout; a meter emits a telegram every second
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);
