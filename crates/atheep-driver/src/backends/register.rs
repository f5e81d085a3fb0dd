// SPDX-License-Identifier: AGPL-3.0-only

//! Register-windowed EEPROM backend
//!
//! AR5416-family MACs expose the EEPROM through a window of 32-bit
//! registers. A read is a dummy load from the word's window register,
//! a handshake on the status register, then the data from its low half.

use super::mmap::MmapRegion;
use crate::error::{EepromError, Result};
use crate::poll::{wait_until, PollConfig, RegisterIo};
use crate::transport::{BackendType, EepromBackend};
use atheep_chip::regs::{self, status};
use atheep_chip::srev::ChipRevision;

/// EEPROM access through MAC registers
#[derive(Debug)]
pub struct RegisterEeprom<R: RegisterIo> {
    regs: R,
    status_register: u32,
    poll: PollConfig,
    chip: Option<ChipRevision>,
}

/// Register EEPROM backend over a mapped PCI BAR0
pub type PciBackend = RegisterEeprom<MmapRegion>;

impl<R: RegisterIo> RegisterEeprom<R> {
    /// Wrap register access, identifying the chip from `AR_SREV`
    ///
    /// # Errors
    ///
    /// Returns error if `AR_SREV` cannot be read.
    pub fn identify(regs: R, poll: PollConfig) -> Result<Self> {
        let chip = ChipRevision::from_register(regs.read32(regs::AR_SREV)?);
        tracing::info!("{chip}");

        Ok(Self {
            regs,
            status_register: chip.eeprom_status_register(),
            poll,
            chip: Some(chip),
        })
    }

    /// Wrap register access with an explicit status register
    pub fn with_status_register(regs: R, status_register: u32, poll: PollConfig) -> Self {
        Self {
            regs,
            status_register,
            poll,
            chip: None,
        }
    }

    /// Chip revision read at open time, if identified
    pub const fn chip(&self) -> Option<ChipRevision> {
        self.chip
    }

    /// EEPROM status/data register in use
    pub const fn status_register(&self) -> u32 {
        self.status_register
    }

    /// Borrow the underlying register access
    pub const fn regs(&self) -> &R {
        &self.regs
    }

    fn wait(&self, mask: u32) -> bool {
        wait_until(&self.regs, self.status_register, mask, 0, &self.poll)
    }
}

impl PciBackend {
    /// Map BAR0 of the chip at `pcie_address`
    ///
    /// # Errors
    ///
    /// Returns error if the device is absent, cannot be enabled, or BAR0
    /// cannot be mapped.
    pub fn open(pcie_address: &str, poll: PollConfig) -> Result<Self> {
        tracing::info!("Opening register EEPROM backend for {pcie_address}");

        ensure_device_enabled(pcie_address)?;

        let bar0 = MmapRegion::new(pcie_address, 0)?;
        Self::identify(bar0, poll)
    }
}

impl<R: RegisterIo + std::fmt::Debug> EepromBackend for RegisterEeprom<R> {
    fn read_word(&mut self, offset: u32) -> Result<u16> {
        // The load only triggers the fetch; its value is meaningless.
        let _ = self
            .regs
            .read32(regs::eeprom_word_register(offset))
            .map_err(|e| EepromError::read_failed(offset, e.to_string()))?;

        if !self.wait(status::READ_WAIT_MASK) {
            return Err(EepromError::read_failed(
                offset,
                format!(
                    "timeout after {}us waiting for EEPROM ready",
                    self.poll.timeout.as_micros()
                ),
            ));
        }

        let value = self
            .regs
            .read32(self.status_register)
            .map_err(|e| EepromError::read_failed(offset, e.to_string()))?;

        #[allow(clippy::cast_possible_truncation)]
        let word = ((value & status::DATA_VAL) >> status::DATA_VAL_S) as u16;
        tracing::trace!("EEPROM[{offset:#05x}] = {word:#06x}");
        Ok(word)
    }

    fn write_word(&mut self, offset: u32, word: u16) -> Result<()> {
        self.regs
            .write32(regs::eeprom_word_register(offset), u32::from(word))
            .map_err(|e| EepromError::write_failed(offset, e.to_string()))?;

        if !self.wait(status::WRITE_WAIT_MASK) {
            return Err(EepromError::write_failed(
                offset,
                format!(
                    "timeout after {}us waiting for EEPROM write",
                    self.poll.timeout.as_micros()
                ),
            ));
        }

        Ok(())
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Pci
    }
}

/// Ensure the PCI device is enabled so its BARs can be mapped
fn ensure_device_enabled(pcie_address: &str) -> Result<()> {
    let device_dir = std::path::PathBuf::from(format!("/sys/bus/pci/devices/{pcie_address}"));
    if !device_dir.exists() {
        return Err(EepromError::device_not_found(device_dir));
    }

    let enable_path = device_dir.join("enable");
    match std::fs::read_to_string(&enable_path) {
        Ok(content) if content.trim() == "1" => {
            tracing::debug!("Device {pcie_address} already enabled");
            Ok(())
        }
        Ok(_) => {
            if let Err(e) = std::fs::write(&enable_path, "1") {
                tracing::warn!("Could not enable device {pcie_address} (may need root): {e}");
                Err(EepromError::map_failed(format!(
                    "Device not enabled and cannot enable: {e}"
                )))
            } else {
                tracing::info!("Enabled device {pcie_address}");
                Ok(())
            }
        }
        Err(e) => Err(EepromError::map_failed(format!(
            "Cannot check device enable status: {e}"
        ))),
    }
}
