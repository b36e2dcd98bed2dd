//! Telegram framing state machine.
//!
//! Turns a sequence of lines into zero-or-one checksum-validated raw
//! telegram. A telegram opens at the first line whose first byte is `/`,
//! accumulates every line verbatim, and closes at a line whose first byte
//! is `!` followed by exactly four hex digits declaring the CRC-16/ARC of
//! everything from the opening `/` through the `!` itself.

use crate::constants::{CHECKSUM_HEX_DIGITS, TELEGRAM_END, TELEGRAM_START};
use crate::error::P1Error;
use crate::logging::log_debug;
use crate::p1::checksum::crc16;
use crate::p1::line_source::LineSource;
use bytes::{BufMut, Bytes, BytesMut};

/// A checksum-validated raw telegram: the identification line plus the body
/// lines, bytes exactly as received, without the terminator line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTelegram {
    bytes: Bytes,
}

impl RawTelegram {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        RawTelegram {
            bytes: bytes.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Reads lines from `source` until one complete validated telegram arrives.
///
/// Lines seen before the opening `/` are discarded; a second `/` before the
/// terminator restarts accumulation from that point, which protects against
/// attaching mid-stream. Returns `Ok(None)` when the stream ends before a
/// telegram opens; a stream ending with a telegram open is an
/// [`P1Error::IncompleteTelegram`]. No retries happen here; after any error
/// the next call resynchronizes at the next `/`.
pub async fn read_telegram<S>(source: &mut S) -> Result<Option<RawTelegram>, P1Error>
where
    S: LineSource + ?Sized,
{
    let mut buf = BytesMut::new();
    let mut open = false;

    loop {
        let line = match source.read_line().await? {
            Some(line) => line,
            None if open => return Err(P1Error::IncompleteTelegram),
            None => return Ok(None),
        };

        match line.first() {
            Some(&TELEGRAM_START) => {
                if open {
                    log_debug("Start marker inside open telegram; restarting accumulation");
                }
                buf.clear();
                buf.extend_from_slice(&line);
                open = true;
            }
            Some(&TELEGRAM_END) if open => {
                let declared = parse_declared_checksum(&line)?;

                // The `!` byte is checksum input; the digits and their
                // terminator are not.
                buf.put_u8(TELEGRAM_END);
                let calculated = crc16(&buf);
                buf.truncate(buf.len() - 1);

                if calculated != declared {
                    return Err(P1Error::ChecksumMismatch {
                        declared,
                        calculated,
                    });
                }
                return Ok(Some(RawTelegram::new(buf.freeze())));
            }
            _ => {
                if open {
                    buf.extend_from_slice(&line);
                }
            }
        }
    }
}

/// Splits a terminator line into the `!` byte plus exactly four hex digits.
fn parse_declared_checksum(line: &[u8]) -> Result<u16, P1Error> {
    let digits = trim_line_ending(&line[1..]);
    if digits.len() != CHECKSUM_HEX_DIGITS || !digits.iter().all(u8::is_ascii_hexdigit) {
        return Err(P1Error::TelegramFormat(format!(
            "Malformed terminator line: {:?}",
            String::from_utf8_lossy(line)
        )));
    }
    let digits = std::str::from_utf8(digits)
        .map_err(|_| P1Error::TelegramFormat("Terminator digits are not ASCII".into()))?;
    u16::from_str_radix(digits, 16)
        .map_err(|_| P1Error::TelegramFormat("Terminator digits are not hex".into()))
}

fn trim_line_ending(bytes: &[u8]) -> &[u8] {
    let mut end = bytes.len();
    while end > 0 && (bytes[end - 1] == b'\n' || bytes[end - 1] == b'\r') {
        end -= 1;
    }
    &bytes[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_declared_checksum() {
        assert_eq!(parse_declared_checksum(b"!B587\r\n").unwrap(), 0xB587);
        assert_eq!(parse_declared_checksum(b"!b587\r\n").unwrap(), 0xB587);
        assert_eq!(parse_declared_checksum(b"!0000\r\n").unwrap(), 0x0000);
    }

    #[test]
    fn test_parse_declared_checksum_rejects_short() {
        assert!(matches!(
            parse_declared_checksum(b"!B58\r\n"),
            Err(P1Error::TelegramFormat(_))
        ));
    }

    #[test]
    fn test_parse_declared_checksum_rejects_non_hex() {
        assert!(matches!(
            parse_declared_checksum(b"!ZZZZ\r\n"),
            Err(P1Error::TelegramFormat(_))
        ));
    }
}
