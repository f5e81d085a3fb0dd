// SPDX-License-Identifier: AGPL-3.0-only

//! The acquisition and validation pipeline
//!
//! negotiate -> acquire -> deserialize -> validate, each stage complete
//! before the next. Either a validated [`Eeprom`] comes out or an error does.

use crate::acquire::{acquire_image, WordBuffer};
use crate::decode::deserialize;
use crate::error::Result;
use crate::model::{CalibrationRecord, InitBlock};
use crate::negotiate::negotiate_byte_order;
use crate::transport::{EepromBackend, EepromSession};
use crate::validate::validate;
use atheep_chip::eeprom::IMAGE_WORDS;

/// A validated EEPROM image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eeprom {
    /// Register initialization block
    pub init: InitBlock,
    /// Calibration record, in host byte order
    pub record: CalibrationRecord,
    /// Words as read through the transport
    pub raw: WordBuffer,
}

/// Read and validate the whole image
///
/// # Errors
///
/// Returns the first transport, format, version or checksum failure.
pub fn read_eeprom<B: EepromBackend>(session: &mut EepromSession<B>) -> Result<Eeprom> {
    let orientation = negotiate_byte_order(session)?;
    tracing::debug!("Word order {orientation:?}");

    let raw = acquire_image(session, IMAGE_WORDS)?;
    let (init, mut record) = deserialize(&raw)?;
    validate(&init, &mut record, &raw)?;

    tracing::info!(
        "EEPROM ok: version {}.{}, {} bytes",
        record.base.major_version(),
        record.base.revision(),
        record.base.length
    );

    Ok(Eeprom { init, record, raw })
}
