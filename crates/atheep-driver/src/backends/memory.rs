// SPDX-License-Identifier: AGPL-3.0-only

//! In-memory EEPROM backend
//!
//! Serves words from a buffer. Used to replay dump files through the same
//! pipeline as live hardware, and as the no-hardware backend in tests.

use crate::error::{EepromError, Result};
use crate::transport::{BackendType, EepromBackend};
use std::path::Path;

/// EEPROM image held in memory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryBackend {
    words: Vec<u16>,
}

impl MemoryBackend {
    /// Create a backend over `words`
    pub fn new(words: Vec<u16>) -> Self {
        Self { words }
    }

    /// Parse a dump of little-endian 16-bit words
    ///
    /// # Errors
    ///
    /// Returns error if the dump has an odd number of bytes.
    pub fn from_dump_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() % 2 != 0 {
            return Err(EepromError::invalid_dump(format!(
                "{} bytes is not a whole number of words",
                bytes.len()
            )));
        }

        let words = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Ok(Self { words })
    }

    /// Load a dump file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is not word sized.
    pub fn from_dump_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(EepromError::device_not_found(path));
        }

        let bytes = std::fs::read(path)?;
        let backend = Self::from_dump_bytes(&bytes)?;
        tracing::debug!("Loaded {} words from {}", backend.words.len(), path.display());
        Ok(backend)
    }

    /// Image contents
    pub fn words(&self) -> &[u16] {
        &self.words
    }

    fn index(&self, offset: u32) -> Option<usize> {
        usize::try_from(offset).ok().filter(|&i| i < self.words.len())
    }
}

impl EepromBackend for MemoryBackend {
    fn read_word(&mut self, offset: u32) -> Result<u16> {
        self.index(offset)
            .map(|i| self.words[i])
            .ok_or_else(|| {
                EepromError::read_failed(
                    offset,
                    format!("beyond end of {}-word image", self.words.len()),
                )
            })
    }

    fn write_word(&mut self, offset: u32, word: u16) -> Result<()> {
        let Some(i) = self.index(offset) else {
            return Err(EepromError::write_failed(
                offset,
                format!("beyond end of {}-word image", self.words.len()),
            ));
        };
        self.words[i] = word;
        Ok(())
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Memory
    }
}

/// Write `words` as a little-endian dump file
///
/// # Errors
///
/// Returns error if the file cannot be written.
pub fn save_dump(path: impl AsRef<Path>, words: &[u16]) -> Result<()> {
    let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
    std::fs::write(path.as_ref(), bytes)?;
    tracing::info!("Saved {} words to {}", words.len(), path.as_ref().display());
    Ok(())
}
