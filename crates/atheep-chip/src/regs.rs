// SPDX-License-Identifier: AGPL-3.0-only

//! MAC register map for EEPROM access (BAR0).
//!
//! The EEPROM is not memory mapped. Each 16-bit word is reached through a
//! window of 32-bit MAC registers, and completion is signalled through a
//! status/data register that must be polled.
//!
//! ```text
//! 0x2000 + (off << 2)  : EEPROM word window (read triggers a fetch, write stores)
//! 0x407c / 0x4084 / 0x40c8 : EEPROM status + data (per MAC generation)
//! 0x4020               : AR_SREV, MAC version / revision
//! ```

// ── Identification ───────────────────────────────────────────────────────────

/// Silicon revision register.
pub const AR_SREV: u32 = 0x4020;

// ── EEPROM window ────────────────────────────────────────────────────────────

/// Base of the EEPROM word window.
pub const EEPROM_OFFSET: u32 = 0x2000;
/// Shift applied to a word offset to get its window register.
pub const EEPROM_SHIFT: u32 = 2;

/// Window register for EEPROM word `offset`.
#[must_use]
pub const fn eeprom_word_register(offset: u32) -> u32 {
    EEPROM_OFFSET + (offset << EEPROM_SHIFT)
}

/// EEPROM status/data register on AR5416 .. AR9287.
pub const EEPROM_STATUS_DATA: u32 = 0x407C;
/// EEPROM status/data register on AR9300 and later.
pub const EEPROM_STATUS_DATA_AR9300: u32 = 0x4084;
/// EEPROM status/data register on AR9340.
pub const EEPROM_STATUS_DATA_AR9340: u32 = 0x40C8;

/// Status/data register bit definitions.
pub mod status {
    /// Fetched data word.
    pub const DATA_VAL: u32 = 0x0000_FFFF;
    /// Shift of [`DATA_VAL`].
    pub const DATA_VAL_S: u32 = 0;
    /// Access in progress.
    pub const BUSY: u32 = 0x0001_0000;
    /// Access rejected because a previous one is still running.
    pub const BUSY_ACCESS: u32 = 0x0002_0000;
    /// Access rejected by the protection map.
    pub const PROT_ACCESS: u32 = 0x0004_0000;
    /// Access to an absent EEPROM.
    pub const ABSENT_ACCESS: u32 = 0x0008_0000;

    /// Bits that must clear before read data is valid.
    pub const READ_WAIT_MASK: u32 = BUSY | PROT_ACCESS;
    /// Bits that must clear before a write is complete.
    pub const WRITE_WAIT_MASK: u32 = BUSY | BUSY_ACCESS | PROT_ACCESS | ABSENT_ACCESS;
}

// ── Timing ───────────────────────────────────────────────────────────────────

/// Upper bound for a register handshake, in microseconds.
pub const WAIT_TIMEOUT_US: u64 = 100_000;
/// Sleep between two handshake samples, in microseconds.
pub const TIME_QUANTUM_US: u64 = 10;
