//! The p1 module contains the components responsible for the core P1
//! pipeline: line-at-a-time transport access, telegram framing with
//! checksum validation, and body decoding.

pub mod checksum;
pub mod decoder;
pub mod framer;
pub mod line_source;
pub mod serial;
pub mod serial_mock;

pub use checksum::crc16;
pub use decoder::{decode, DecoderConfig, FieldValue, MalformedLinePolicy, Telegram, TelegramEntry};
pub use framer::{read_telegram, RawTelegram};
pub use line_source::{Line, LineReader, LineSource};
pub use serial::{P1DeviceHandle, SerialConfig};
