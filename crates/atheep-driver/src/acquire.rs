// SPDX-License-Identifier: AGPL-3.0-only

//! Image acquisition
//!
//! Reads the whole image word by word, in offset order, through the session.

use crate::error::Result;
use crate::transport::{EepromBackend, EepromSession};

/// Raw EEPROM image as read through the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordBuffer {
    words: Vec<u16>,
}

impl WordBuffer {
    /// Wrap an already-read image
    pub fn from_words(words: Vec<u16>) -> Self {
        Self { words }
    }

    /// Number of words read
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the buffer holds no words
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The words, in offset order
    pub fn words(&self) -> &[u16] {
        &self.words
    }
}

impl AsRef<[u16]> for WordBuffer {
    fn as_ref(&self) -> &[u16] {
        &self.words
    }
}

/// Read words `[0, total_words)` into a buffer
///
/// Stops at the first failing offset; no partial buffer is returned.
///
/// # Errors
///
/// Propagates the transport failure of the first unreadable word.
pub fn acquire_image<B: EepromBackend>(
    session: &mut EepromSession<B>,
    total_words: usize,
) -> Result<WordBuffer> {
    tracing::debug!("Reading {total_words} EEPROM words");

    let mut words = Vec::with_capacity(total_words);
    for offset in 0..total_words {
        #[allow(clippy::cast_possible_truncation)]
        let word = session.read(offset as u32).map_err(|e| {
            tracing::error!("Unable to read EEPROM to buffer: {e}");
            e
        })?;
        words.push(word);
    }

    tracing::debug!("Read {} EEPROM words", words.len());
    Ok(WordBuffer { words })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryBackend;
    use crate::error::EepromError;

    #[test]
    fn reads_in_order() {
        let mut session = EepromSession::new(MemoryBackend::new((0..16).collect()));
        let buf = acquire_image(&mut session, 16).unwrap();
        assert_eq!(buf.len(), 16);
        assert_eq!(buf.words(), (0..16).collect::<Vec<u16>>().as_slice());
    }

    #[test]
    fn short_device_yields_nothing() {
        let mut session = EepromSession::new(MemoryBackend::new(vec![0; 10]));
        let err = acquire_image(&mut session, 11).unwrap_err();
        assert!(matches!(err, EepromError::IoFailure { offset: 10, .. }));
    }
}
