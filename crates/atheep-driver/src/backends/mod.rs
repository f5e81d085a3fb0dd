// SPDX-License-Identifier: AGPL-3.0-only

//! EEPROM backend implementations
//!
//! Two backends available:
//! - **Register**: MAC EEPROM window over PCI BAR0 (real hardware)
//! - **Memory**: In-memory word image, loaded from a dump file or built in tests

pub mod memory;
pub mod mmap;
pub mod register;

pub use memory::{save_dump, MemoryBackend};
pub use mmap::MmapRegion;
pub use register::{PciBackend, RegisterEeprom};

use crate::error::Result;
use crate::poll::PollConfig;
use crate::transport::EepromBackend;
use std::path::PathBuf;

/// Backend selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendSelection {
    /// Live chip at a PCI address (e.g. `0000:02:00.0`)
    Pci {
        /// PCI bus address
        address: String,
        /// Register handshake timing
        poll: PollConfig,
    },

    /// Raw dump file of little-endian words
    Dump(PathBuf),
}

/// Open the selected backend
///
/// # Errors
///
/// Returns error if the device cannot be mapped or the dump cannot be loaded.
pub fn open_backend(selection: &BackendSelection) -> Result<Box<dyn EepromBackend>> {
    match selection {
        BackendSelection::Pci { address, poll } => {
            PciBackend::open(address, *poll).map(|b| Box::new(b) as Box<dyn EepromBackend>)
        }
        BackendSelection::Dump(path) => {
            tracing::info!("Using dump file {}", path.display());
            MemoryBackend::from_dump_file(path).map(|b| Box::new(b) as Box<dyn EepromBackend>)
        }
    }
}
