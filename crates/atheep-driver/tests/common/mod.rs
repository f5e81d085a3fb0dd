// SPDX-License-Identifier: AGPL-3.0-only

//! Synthetic AR9287 images for integration tests

#![allow(dead_code)]

use atheep_chip::eeprom::{base, misc, CAL_START_WORD, IMAGE_WORDS, MAGIC};
use atheep_driver::checksum::fixup;
use atheep_driver::validate::HOST_IS_BIG_ENDIAN;
use atheep_driver::{BackendType, EepromBackend, EepromError, Result};

pub const LENGTH_WORD: usize = CAL_START_WORD + base::LENGTH / 2;
pub const CHECKSUM_WORD: usize = CAL_START_WORD + base::CHECKSUM / 2;
pub const VERSION_WORD: usize = CAL_START_WORD + base::VERSION / 2;
pub const REG_DMN_WORD: usize = CAL_START_WORD + base::REG_DMN / 2;

/// Builder for a host-order image
pub struct ImageBuilder {
    words: Vec<u16>,
}

impl ImageBuilder {
    pub fn new() -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let mut words: Vec<u16> = (0..IMAGE_WORDS)
            .map(|i| (i as u16).wrapping_mul(0x0101) ^ 0x0F0F)
            .collect();
        words[0] = MAGIC;
        // empty register list
        words[3] = 0xFFFF;
        words[LENGTH_WORD] = 726;
        words[VERSION_WORD] = 0xE003;
        let builder = Self { words };
        builder.misc(if HOST_IS_BIG_ENDIAN { misc::BIG_ENDIAN } else { 0 })
    }

    pub fn word(mut self, index: usize, value: u16) -> Self {
        self.words[index] = value;
        self
    }

    pub fn byte(mut self, cal_byte: usize, value: u8) -> Self {
        let index = CAL_START_WORD + cal_byte / 2;
        let mut bytes = self.words[index].to_ne_bytes();
        bytes[cal_byte % 2] = value;
        self.words[index] = u16::from_ne_bytes(bytes);
        self
    }

    pub fn misc(self, value: u8) -> Self {
        self.byte(base::EEP_MISC, value)
    }

    /// Finish with a checksum word that makes the record fold to 0xffff
    pub fn build(mut self) -> Vec<u16> {
        let region = &self.words[CAL_START_WORD..];
        self.words[CHECKSUM_WORD] = fixup(region, CHECKSUM_WORD - CAL_START_WORD);
        self.words
    }

    /// Finish without fixing the checksum
    pub fn build_unsealed(self) -> Vec<u16> {
        self.words
    }
}

/// Every word byte-reversed, as a transport with the other word order delivers it
pub fn byte_reversed(words: &[u16]) -> Vec<u16> {
    words.iter().map(|w| w.swap_bytes()).collect()
}

/// Backend that serves `words` but fails from offset `fail_at` on
#[derive(Debug)]
pub struct FailingBackend {
    pub words: Vec<u16>,
    pub fail_at: u32,
    pub reads: u32,
}

impl FailingBackend {
    pub fn new(words: Vec<u16>, fail_at: u32) -> Self {
        Self {
            words,
            fail_at,
            reads: 0,
        }
    }
}

impl EepromBackend for FailingBackend {
    fn read_word(&mut self, offset: u32) -> Result<u16> {
        self.reads += 1;
        if offset >= self.fail_at {
            return Err(EepromError::read_failed(offset, "bus timeout"));
        }
        Ok(self.words[offset as usize])
    }

    fn write_word(&mut self, offset: u32, _word: u16) -> Result<()> {
        Err(EepromError::write_failed(offset, "read-only"))
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Memory
    }
}
