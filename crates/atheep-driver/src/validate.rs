// SPDX-License-Identifier: AGPL-3.0-only

//! Validation and normalization of a deserialized image
//!
//! Gates, in order: magic, endianness reconciliation, version, checksum.
//! The first failing gate rejects the whole image.

use crate::acquire::WordBuffer;
use crate::checksum::checksum;
use crate::error::{EepromError, Result};
use crate::model::{CalibrationRecord, InitBlock};
use atheep_chip::eeprom::{
    CAL_START_WORD, CAL_WORDS, CHECKSUM_OK, EEP_NO_BACK_VER, EEP_VER, MAGIC,
};

/// Whether this host stores multi-byte values big-endian
pub const HOST_IS_BIG_ENDIAN: bool = cfg!(target_endian = "big");

/// Check the init block's magic word
///
/// # Errors
///
/// Returns [`EepromError::FormatMismatch`] if the magic is wrong.
pub fn check_magic(init: &InitBlock) -> Result<()> {
    if init.magic != MAGIC {
        tracing::error!("Invalid EEPROM magic {:#06x}", init.magic);
        return Err(EepromError::FormatMismatch {
            found: init.magic,
            expected: MAGIC,
        });
    }
    Ok(())
}

/// Bring the record's multi-byte fields into host order
///
/// Returns whether the record was swapped.
pub fn reconcile_endianness(record: &mut CalibrationRecord, host_is_big_endian: bool) -> bool {
    let image_is_big_endian = record.base.is_big_endian();
    if image_is_big_endian == host_is_big_endian {
        return false;
    }

    tracing::warn!(
        "EEPROM image is {}-endian, host is {}-endian; swapping record fields",
        if image_is_big_endian { "big" } else { "little" },
        if host_is_big_endian { "big" } else { "little" },
    );
    record.swap_multibyte_fields();
    true
}

/// Check the major version and minimum revision
///
/// # Errors
///
/// Returns [`EepromError::VersionUnsupported`] outside the supported range.
pub fn check_version(record: &CalibrationRecord) -> Result<()> {
    let major = record.base.major_version();
    let revision = record.base.revision();

    if major != EEP_VER || revision < EEP_NO_BACK_VER {
        tracing::error!(
            "Bad EEPROM version {:#06x} (major {major:#x}, revision {revision})",
            record.base.version
        );
        return Err(EepromError::VersionUnsupported {
            version: record.base.version,
            major,
            revision,
            expected_major: EEP_VER,
            min_revision: EEP_NO_BACK_VER,
        });
    }
    Ok(())
}

/// Number of words the checksum covers for a declared byte length
///
/// Lengths past the calibration region are clamped, not rejected.
pub fn effective_checksum_words(declared_len: u16) -> usize {
    let words = usize::from(declared_len) / 2;
    if words > CAL_WORDS {
        tracing::warn!(
            "EEPROM length {declared_len} overruns the {} byte record, clamping",
            CAL_WORDS * 2
        );
        CAL_WORDS
    } else {
        words
    }
}

/// Verify the checksum over the raw calibration words
///
/// # Errors
///
/// Returns [`EepromError::ChecksumMismatch`] if the fold is not `0xffff`,
/// or [`EepromError::ImageSize`] if `raw` is too short to hold the region.
pub fn check_checksum(raw: &WordBuffer, record: &CalibrationRecord) -> Result<()> {
    let words = effective_checksum_words(record.base.length);
    let region = raw
        .words()
        .get(CAL_START_WORD..CAL_START_WORD + words)
        .ok_or(EepromError::ImageSize {
            len: raw.len(),
            expected: CAL_START_WORD + words,
        })?;

    let computed = checksum(region);
    if computed != CHECKSUM_OK {
        tracing::error!("Bad EEPROM checksum {computed:#06x} over {words} words");
        return Err(EepromError::ChecksumMismatch { computed, words });
    }

    tracing::debug!("EEPROM checksum ok over {words} words");
    Ok(())
}

/// Run every gate, normalizing `record` in place
///
/// # Errors
///
/// Returns the error of the first failing gate.
pub fn validate(init: &InitBlock, record: &mut CalibrationRecord, raw: &WordBuffer) -> Result<()> {
    check_magic(init)?;
    reconcile_endianness(record, HOST_IS_BIG_ENDIAN);
    check_version(record)?;
    check_checksum(raw, record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::fixup;
    use crate::decode::deserialize;
    use atheep_chip::eeprom::{base, misc, IMAGE_WORDS};

    const LENGTH_WORD: usize = CAL_START_WORD + base::LENGTH / 2;
    const CHECKSUM_WORD: usize = CAL_START_WORD + base::CHECKSUM / 2;
    const VERSION_WORD: usize = CAL_START_WORD + base::VERSION / 2;
    const MISC_WORD: usize = CAL_START_WORD + base::EEP_MISC / 2;

    fn set_misc(words: &mut [u16], value: u8) {
        let mut bytes = words[MISC_WORD].to_ne_bytes();
        bytes[base::EEP_MISC % 2] = value;
        words[MISC_WORD] = u16::from_ne_bytes(bytes);
    }

    fn seal(words: &mut [u16]) {
        let region = &words[CAL_START_WORD..];
        words[CHECKSUM_WORD] = fixup(region, CHECKSUM_WORD - CAL_START_WORD);
    }

    /// Host-order image that passes every gate
    fn good_image() -> Vec<u16> {
        let mut words: Vec<u16> = (0..IMAGE_WORDS).map(|i| (i as u16) << 3).collect();
        words[0] = MAGIC;
        words[LENGTH_WORD] = 726;
        words[VERSION_WORD] = 0xE001;
        set_misc(&mut words, if HOST_IS_BIG_ENDIAN { misc::BIG_ENDIAN } else { 0 });
        seal(&mut words);
        words
    }

    fn run(words: Vec<u16>) -> Result<CalibrationRecord> {
        let raw = WordBuffer::from_words(words);
        let (init, mut record) = deserialize(&raw)?;
        validate(&init, &mut record, &raw)?;
        Ok(record)
    }

    #[test]
    fn good_image_passes() {
        let record = run(good_image()).unwrap();
        assert_eq!(record.base.version, 0xE001);
        assert_eq!(record.base.length, 726);
    }

    #[test]
    fn bad_magic_is_format_mismatch() {
        let mut words = good_image();
        words[0] = 0x1234;
        match run(words) {
            Err(EepromError::FormatMismatch { found, expected }) => {
                assert_eq!(found, 0x1234);
                assert_eq!(expected, 0xA55A);
            }
            other => panic!("expected FormatMismatch, got {other:?}"),
        }
    }

    #[test]
    fn magic_gate_ignores_rest_of_buffer() {
        let mut words = vec![0xFFFF; IMAGE_WORDS];
        words[0] = 0x1234;
        assert!(matches!(run(words), Err(EepromError::FormatMismatch { .. })));
    }

    #[test]
    fn wrong_major_is_rejected() {
        let mut words = good_image();
        words[VERSION_WORD] = 0x1000;
        seal(&mut words);
        let err = run(words).unwrap_err();
        assert!(matches!(
            err,
            EepromError::VersionUnsupported {
                major: 1,
                revision: 0,
                expected_major: 0xE,
                ..
            }
        ));
        let msg = err.to_string();
        assert!(msg.contains("0x1000"), "{msg}");
    }

    #[test]
    fn revision_below_minimum_is_rejected() {
        let mut words = good_image();
        words[VERSION_WORD] = 0xE000;
        seal(&mut words);
        assert!(matches!(run(words), Err(EepromError::VersionUnsupported { .. })));
    }

    #[test]
    fn minimum_revision_passes() {
        let mut words = good_image();
        words[VERSION_WORD] = 0xE000 | EEP_NO_BACK_VER;
        seal(&mut words);
        assert!(run(words).is_ok());
    }

    #[test]
    fn corrupt_word_fails_checksum() {
        let mut words = good_image();
        words[CAL_START_WORD + 100] ^= 0x0040;
        match run(words) {
            Err(EepromError::ChecksumMismatch { computed, words }) => {
                assert_eq!(computed, 0xFFFF ^ 0x0040);
                assert_eq!(words, CAL_WORDS);
            }
            other => panic!("expected ChecksumMismatch, got {other:?}"),
        }
    }

    #[test]
    fn overlong_length_is_clamped() {
        assert_eq!(effective_checksum_words(726), CAL_WORDS);
        assert_eq!(effective_checksum_words(0xFFFF), CAL_WORDS);
        assert_eq!(effective_checksum_words(100), 50);

        let mut words = good_image();
        words[LENGTH_WORD] = 0x1000;
        seal(&mut words);
        let record = run(words).unwrap();
        assert_eq!(record.base.length, 0x1000);
    }

    #[test]
    fn short_length_checks_prefix_only() {
        let mut words = good_image();
        words[LENGTH_WORD] = 64;
        let prefix = &words[CAL_START_WORD..CAL_START_WORD + 32];
        words[CHECKSUM_WORD] = fixup(prefix, CHECKSUM_WORD - CAL_START_WORD);
        // Past the covered prefix, contents do not matter.
        words[IMAGE_WORDS - 1] ^= 0x1111;
        assert!(run(words).is_ok());
    }

    #[test]
    fn foreign_endian_record_is_normalized() {
        let mut words = good_image();
        words[LENGTH_WORD] = 726u16.swap_bytes();
        words[VERSION_WORD] = 0xE003u16.swap_bytes();
        set_misc(&mut words, if HOST_IS_BIG_ENDIAN { 0 } else { misc::BIG_ENDIAN });
        seal(&mut words);

        let record = run(words).unwrap();
        assert_eq!(record.base.length, 726);
        assert_eq!(record.base.version, 0xE003);
    }

    #[test]
    fn reconcile_is_noop_when_orders_agree() {
        let raw = WordBuffer::from_words(good_image());
        let (_, mut record) = deserialize(&raw).unwrap();
        let before = record.clone();
        assert!(!reconcile_endianness(&mut record, HOST_IS_BIG_ENDIAN));
        assert_eq!(record, before);
        assert!(reconcile_endianness(&mut record, !HOST_IS_BIG_ENDIAN));
        assert_ne!(record, before);
    }
}
