// SPDX-License-Identifier: AGPL-3.0-only

//! Byte-order negotiation
//!
//! Guesses the transport's word order from the magic word before the bulk
//! read. A miss here is not fatal: the validator's magic check is the gate.

use crate::error::Result;
use crate::transport::{EepromBackend, EepromSession};
use atheep_chip::eeprom::{MAGIC, MAGIC_OFFSET};

/// What the magic-word check found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Magic read as-is; swap state untouched
    Native,
    /// Magic read byte-reversed; swap state flipped
    Swapped,
    /// Magic absent in either order; swap state untouched
    Unknown,
}

/// Classify a magic word read from the device
pub const fn classify(word: u16) -> Orientation {
    if word == MAGIC {
        Orientation::Native
    } else if word.swap_bytes() == MAGIC {
        Orientation::Swapped
    } else {
        Orientation::Unknown
    }
}

/// Read the magic word and flip the session's swap state if it reads reversed
///
/// Runs at most once per session; later calls return the recorded outcome
/// without touching the device.
///
/// # Errors
///
/// Returns error if the magic word cannot be read.
pub fn negotiate_byte_order<B: EepromBackend>(session: &mut EepromSession<B>) -> Result<Orientation> {
    if let Some(done) = session.orientation() {
        tracing::debug!("Byte order already negotiated: {done:?}");
        return Ok(done);
    }

    let magic = session.read(MAGIC_OFFSET)?;
    let orientation = classify(magic);

    match orientation {
        Orientation::Native => tracing::debug!("EEPROM magic {magic:#06x} in native order"),
        Orientation::Swapped => tracing::info!("EEPROM magic {magic:#06x} byte-reversed, swapping words"),
        Orientation::Unknown => {
            tracing::warn!("EEPROM magic {magic:#06x} not recognised, keeping word order");
        }
    }

    session.record_orientation(orientation);
    Ok(orientation)
}
