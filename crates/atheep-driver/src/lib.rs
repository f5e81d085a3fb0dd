// SPDX-License-Identifier: AGPL-3.0-only

//! EEPROM acquisition and validation for Atheros AR9287 wireless chips.
//!
//! Reads the calibration EEPROM through a word transport, works out the
//! transport's byte order from the magic word, splits the image into its
//! init block and calibration record, and checks it before handing it out.
//!
//! # Pipeline
//!
//! ```text
//!   EepromBackend (PCI register window | dump file)
//!        │  read_word / write_word
//!   EepromSession (Swap State)
//!        │
//!   negotiate ─► acquire ─► deserialize ─► validate ─► Eeprom
//! ```
//!
//! # Quick start
//!
//! ```no_run
//! use atheep_driver::backends::MemoryBackend;
//! use atheep_driver::{read_eeprom, EepromSession};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = MemoryBackend::from_dump_file("ar9287.bin")?;
//! let mut session = EepromSession::new(backend);
//! let eeprom = read_eeprom(&mut session)?;
//!
//! println!("version {}.{}, MAC {:02x?}",
//!          eeprom.record.base.major_version(),
//!          eeprom.record.base.revision(),
//!          eeprom.record.base.mac_addr);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

pub mod acquire;
pub mod backends;
pub mod checksum;
pub mod decode;
pub mod discovery;
mod error;
pub mod model;
pub mod negotiate;
mod pipeline;
pub mod poll;
mod transport;
pub mod validate;

pub use acquire::{acquire_image, WordBuffer};
pub use backends::{open_backend, BackendSelection};
pub use decode::deserialize;
pub use discovery::{discover, DeviceInfo};
pub use error::{Access, EepromError, Result};
pub use model::{
    BaseHeader, CalPierData, CalibrationRecord, CtlData, CtlEdge, InitBlock, ModalHeader,
    RegInit, SpurChannel, TargetPowerHt, TargetPowerLegacy,
};
pub use negotiate::{negotiate_byte_order, Orientation};
pub use pipeline::{read_eeprom, Eeprom};
pub use poll::{wait_until, PollConfig, RegisterIo};
pub use transport::{BackendType, EepromBackend, EepromSession, SwapState};
pub use validate::validate;

/// Commonly used types.
pub mod prelude {
    pub use crate::{
        open_backend, read_eeprom, BackendSelection, CalibrationRecord, Eeprom, EepromBackend,
        EepromError, EepromSession, InitBlock, PollConfig, Result, SwapState,
    };
}
