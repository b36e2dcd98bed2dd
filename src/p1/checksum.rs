//! Telegram checksum arithmetic.
//!
//! P1 telegrams carry a CRC-16/ARC checksum (reflected, polynomial 0xA001,
//! init 0, no final XOR) over the bytes from the opening `/` through the
//! terminating `!` inclusive. The function here is pure so it can be tested
//! independently of the framing state machine.

use crate::constants::CHECKSUM_POLY;

/// Computes the CRC-16/ARC checksum over `data`.
pub fn crc16(data: &[u8]) -> u16 {
    let mut acc: u16 = 0;
    for &byte in data {
        acc ^= u16::from(byte);
        for _ in 0..8 {
            if acc & 1 != 0 {
                acc = (acc >> 1) ^ CHECKSUM_POLY;
            } else {
                acc >>= 1;
            }
        }
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc16_empty() {
        assert_eq!(crc16(&[]), 0x0000);
    }

    #[test]
    fn test_crc16_check_value() {
        // Standard CRC-16/ARC check input
        assert_eq!(crc16(b"123456789"), 0xBB3D);
    }

    #[test]
    fn test_crc16_telegram_vector() {
        assert_eq!(crc16(b"/foo\r\nbar\r\nbaz\r\n!"), 0xB587);
    }

    #[test]
    fn test_crc16_single_bit_sensitivity() {
        let base = crc16(b"/foo\r\nbar\r\nbaz\r\n!");
        let mut corrupted = b"/foo\r\nbar\r\nbaz\r\n!".to_vec();
        corrupted[7] ^= 0x01;
        assert_ne!(crc16(&corrupted), base);
    }
}
