// SPDX-License-Identifier: AGPL-3.0-only

//! Runtime device discovery
//!
//! Scans PCIe sysfs for Atheros functions. Nothing is opened or mapped here.

use crate::error::{EepromError, Result};
use atheep_chip::pcie::{ChipFamily, ATHEROS_VENDOR_ID};
use std::path::Path;

/// Default sysfs directory holding one entry per PCI function
pub const SYSFS_PCI_DEVICES: &str = "/sys/bus/pci/devices";

/// Information about a discovered device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// PCIe bus address (0000:02:00.0, etc.)
    pub pcie_address: String,

    /// PCI device ID
    pub device_id: u16,

    /// Chip family guessed from the device ID
    pub family: ChipFamily,
}

/// Discover all Atheros devices on the system
///
/// # Errors
///
/// Returns error if sysfs cannot be read.
pub fn discover() -> Result<Vec<DeviceInfo>> {
    discover_in(Path::new(SYSFS_PCI_DEVICES))
}

/// Discover Atheros devices below an alternate sysfs root
///
/// Results are sorted by PCIe address.
///
/// # Errors
///
/// Returns [`EepromError::DeviceNotFound`] if `root` does not exist.
pub fn discover_in(root: &Path) -> Result<Vec<DeviceInfo>> {
    tracing::info!("Discovering Atheros devices...");

    let entries = std::fs::read_dir(root).map_err(|e| {
        tracing::debug!("Cannot read {}: {e}", root.display());
        EepromError::device_not_found(root)
    })?;

    let mut devices = Vec::new();

    for entry in entries.flatten() {
        let path = entry.path();

        let vendor = read_hex_sysfs(&path.join("vendor"));
        let device = read_hex_sysfs(&path.join("device"));

        if let (Some(ATHEROS_VENDOR_ID), Some(device_id)) = (vendor, device) {
            let pcie_address = entry.file_name().to_string_lossy().to_string();
            let family = ChipFamily::from_device_id(device_id);
            tracing::debug!("Found {family} at {pcie_address}");
            devices.push(DeviceInfo {
                pcie_address,
                device_id,
                family,
            });
        }
    }

    devices.sort_by(|a, b| a.pcie_address.cmp(&b.pcie_address));
    tracing::info!("Discovered {} Atheros device(s)", devices.len());

    Ok(devices)
}

/// Read a hexadecimal value from sysfs
fn read_hex_sysfs(path: &Path) -> Option<u16> {
    let content = std::fs::read_to_string(path).ok()?;
    let trimmed = content.trim().trim_start_matches("0x");

    u16::from_str_radix(trimmed, 16).ok()
}
