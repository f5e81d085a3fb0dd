// SPDX-License-Identifier: AGPL-3.0-only

//! Calibration region checksum
//!
//! Every word of the region, the stored checksum word included, is folded
//! with XOR. An intact region folds to [`CHECKSUM_OK`].

use atheep_chip::eeprom::CHECKSUM_OK;

/// XOR-fold `words`
pub fn checksum(words: &[u16]) -> u16 {
    words.iter().fold(0, |sum, &w| sum ^ w)
}

/// Whether `words` fold to the sentinel
pub fn is_valid(words: &[u16]) -> bool {
    checksum(words) == CHECKSUM_OK
}

/// Value to store in the checksum slot `slot` so the region folds to the sentinel
///
/// Used when building or patching images.
pub fn fixup(words: &[u16], slot: usize) -> u16 {
    let others = words
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != slot)
        .fold(0, |sum, (_, &w)| sum ^ w);
    others ^ CHECKSUM_OK
}
