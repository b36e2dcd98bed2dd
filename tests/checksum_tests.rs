//! Unit tests for the telegram checksum, including the detection property
//! for corrupted telegram bytes.

use p1_rs::crc16;
use proptest::prelude::*;

/// Tests the standard CRC-16/ARC check value.
#[test]
fn test_crc16_check_value() {
    assert_eq!(crc16(b"123456789"), 0xBB3D);
}

/// Tests the checksum of a minimal framed telegram, `!` byte included.
#[test]
fn test_crc16_minimal_telegram() {
    assert_eq!(crc16(b"/foo\r\nbar\r\nbaz\r\n!"), 0xB587);
}

#[test]
fn test_crc16_empty_input() {
    assert_eq!(crc16(&[]), 0x0000);
}

#[test]
fn test_crc16_case_of_input_matters() {
    assert_ne!(crc16(b"/foo\r\n!"), crc16(b"/FOO\r\n!"));
}

/// Corrupting any single byte of the checksum range must change the
/// checksum; CRC-16/ARC detects every burst of eight bits or fewer.
#[test]
fn test_every_byte_of_sample_is_covered() {
    let sample = b"/foo\r\nbar\r\nbaz\r\n!";
    let expected = crc16(sample);
    for i in 0..sample.len() {
        let mut corrupted = sample.to_vec();
        corrupted[i] ^= 0xFF;
        assert_ne!(
            crc16(&corrupted),
            expected,
            "corruption at byte {i} went undetected"
        );
    }
}

proptest! {
    #[test]
    fn corrupting_any_single_byte_changes_the_checksum(
        data in proptest::collection::vec(any::<u8>(), 1..256),
        idx in any::<proptest::sample::Index>(),
        delta in 1u8..=255,
    ) {
        let i = idx.index(data.len());
        let mut corrupted = data.clone();
        corrupted[i] ^= delta;
        prop_assert_ne!(crc16(&corrupted), crc16(&data));
    }
}
