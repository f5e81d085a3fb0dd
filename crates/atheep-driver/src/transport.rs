// SPDX-License-Identifier: AGPL-3.0-only

//! Word transport
//!
//! A backend moves single 16-bit words. The session layered on top owns the
//! Swap State and byte-reverses words on their way in and out when the
//! backend's native word order disagrees with the host.

use crate::error::Result;
use crate::negotiate::Orientation;
use std::fmt::Debug;

/// Raw 16-bit word access to a chip's EEPROM
pub trait EepromBackend: Debug {
    /// Read the word at `offset`
    ///
    /// # Errors
    ///
    /// Returns [`crate::EepromError::IoFailure`] if the word cannot be read.
    fn read_word(&mut self, offset: u32) -> Result<u16>;

    /// Write `word` at `offset`
    ///
    /// # Errors
    ///
    /// Returns [`crate::EepromError::IoFailure`] if the word cannot be written.
    fn write_word(&mut self, offset: u32, word: u16) -> Result<()>;

    /// Get backend type for debugging
    fn backend_type(&self) -> BackendType;
}

impl<B: EepromBackend + ?Sized> EepromBackend for Box<B> {
    fn read_word(&mut self, offset: u32) -> Result<u16> {
        (**self).read_word(offset)
    }

    fn write_word(&mut self, offset: u32, word: u16) -> Result<()> {
        (**self).write_word(offset, word)
    }

    fn backend_type(&self) -> BackendType {
        (**self).backend_type()
    }
}

/// Backend type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// MAC register window over a mapped PCI BAR
    Pci,

    /// In-memory image (dump files, tests)
    Memory,
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pci => write!(f, "PCI"),
            Self::Memory => write!(f, "Memory"),
        }
    }
}

/// Whether transferred words must be byte-reversed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwapState(bool);

impl SwapState {
    /// Create a swap state
    pub const fn new(swap: bool) -> Self {
        Self(swap)
    }

    /// Whether words are reversed
    pub const fn is_swapped(self) -> bool {
        self.0
    }

    /// The opposite state
    #[must_use]
    pub const fn flipped(self) -> Self {
        Self(!self.0)
    }

    /// Apply to a word crossing the transport (either direction)
    pub const fn apply(self, word: u16) -> u16 {
        if self.0 {
            word.swap_bytes()
        } else {
            word
        }
    }
}

/// One acquisition session against one device
///
/// Owns the backend and the Swap State. Every word read or written goes
/// through [`EepromSession::read`] / [`EepromSession::write`].
#[derive(Debug)]
pub struct EepromSession<B: EepromBackend> {
    backend: B,
    swap: SwapState,
    orientation: Option<Orientation>,
}

impl<B: EepromBackend> EepromSession<B> {
    /// Open a session with native word order
    pub fn new(backend: B) -> Self {
        Self::with_swap(backend, SwapState::default())
    }

    /// Open a session with a pre-seeded swap state
    pub fn with_swap(backend: B, swap: SwapState) -> Self {
        tracing::debug!(
            "Opened {} EEPROM session (swap={})",
            backend.backend_type(),
            swap.is_swapped()
        );
        Self {
            backend,
            swap,
            orientation: None,
        }
    }

    /// Read a word, byte-reversed if the session is swapped
    ///
    /// # Errors
    ///
    /// Propagates the backend failure unchanged.
    pub fn read(&mut self, offset: u32) -> Result<u16> {
        let word = self.backend.read_word(offset)?;
        Ok(self.swap.apply(word))
    }

    /// Write a word, byte-reversed first if the session is swapped
    ///
    /// # Errors
    ///
    /// Propagates the backend failure unchanged.
    pub fn write(&mut self, offset: u32, word: u16) -> Result<()> {
        self.backend.write_word(offset, self.swap.apply(word))
    }

    /// Current swap state
    pub const fn swap_state(&self) -> SwapState {
        self.swap
    }

    /// Outcome of byte-order negotiation, if it ran
    pub const fn orientation(&self) -> Option<Orientation> {
        self.orientation
    }

    pub(crate) fn record_orientation(&mut self, orientation: Orientation) {
        if orientation == Orientation::Swapped {
            self.swap = self.swap.flipped();
        }
        self.orientation = Some(orientation);
    }

    /// Borrow the backend
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Close the session and return the backend
    pub fn into_backend(self) -> B {
        self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryBackend;

    #[test]
    fn swap_twice_is_identity() {
        for word in [0x0000, 0x00FF, 0xA55A, 0x1234, 0xFFFF] {
            let s = SwapState::new(true);
            assert_eq!(s.apply(s.apply(word)), word);
            assert_eq!(SwapState::new(false).apply(word), word);
        }
    }

    #[test]
    fn swapped_session_reverses_reads() {
        let mut session =
            EepromSession::with_swap(MemoryBackend::new(vec![0x1234, 0xA55A]), SwapState::new(true));
        assert_eq!(session.read(0).unwrap(), 0x3412);
        assert_eq!(session.read(1).unwrap(), 0x5AA5);
    }

    #[test]
    fn swapped_session_reverses_writes() {
        let mut session =
            EepromSession::with_swap(MemoryBackend::new(vec![0; 2]), SwapState::new(true));
        session.write(1, 0xBEEF).unwrap();
        assert_eq!(session.backend().words()[1], 0xEFBE);
        assert_eq!(session.read(1).unwrap(), 0xBEEF);
    }

    #[test]
    fn boxed_backend_is_a_backend() {
        let backend: Box<dyn EepromBackend> = Box::new(MemoryBackend::new(vec![7]));
        let mut session = EepromSession::new(backend);
        assert_eq!(session.read(0).unwrap(), 7);
        assert_eq!(session.backend().backend_type(), BackendType::Memory);
    }
}
