// SPDX-License-Identifier: AGPL-3.0-only

//! PCI identifiers for Atheros 802.11n MACs.

/// Atheros vendor ID (PCI-SIG assigned).
pub const ATHEROS_VENDOR_ID: u16 = 0x168C;

/// Device IDs for the AR5416 family.
pub mod device_id {
    /// AR5416 (PCI).
    pub const AR5416_PCI: u16 = 0x0023;
    /// AR5418 (PCIe).
    pub const AR5416_PCIE: u16 = 0x0024;
    /// AR9160 (PCI).
    pub const AR9160: u16 = 0x0027;
    /// AR9280 (PCI).
    pub const AR9280_PCI: u16 = 0x0029;
    /// AR9280 (PCIe).
    pub const AR9280_PCIE: u16 = 0x002A;
    /// AR9285 (PCIe).
    pub const AR9285: u16 = 0x002B;
    /// AR9287 (PCI).
    pub const AR9287_PCI: u16 = 0x002D;
    /// AR9287 (PCIe).
    pub const AR9287_PCIE: u16 = 0x002E;
    /// AR9300 (PCIe).
    pub const AR9300: u16 = 0x0030;
}

/// Chip family guessed from the PCI device ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChipFamily {
    /// AR5416 / AR5418 with external radio.
    Ar5416,
    /// AR9160.
    Ar9160,
    /// AR9280.
    Ar9280,
    /// AR9285.
    Ar9285,
    /// AR9287, the family whose EEPROM map this workspace decodes.
    Ar9287,
    /// AR9300 and later (different EEPROM map).
    Ar9300,
    /// Unknown device ID.
    Unknown(u16),
}

impl ChipFamily {
    /// Identify family from PCI device ID.
    #[must_use]
    pub const fn from_device_id(id: u16) -> Self {
        match id {
            device_id::AR5416_PCI | device_id::AR5416_PCIE => Self::Ar5416,
            device_id::AR9160 => Self::Ar9160,
            device_id::AR9280_PCI | device_id::AR9280_PCIE => Self::Ar9280,
            device_id::AR9285 => Self::Ar9285,
            device_id::AR9287_PCI | device_id::AR9287_PCIE => Self::Ar9287,
            device_id::AR9300 => Self::Ar9300,
            other => Self::Unknown(other),
        }
    }

    /// Whether the AR9287 EEPROM map applies.
    #[must_use]
    pub const fn uses_ar9287_map(&self) -> bool {
        matches!(self, Self::Ar9287)
    }
}

impl std::fmt::Display for ChipFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ar5416 => write!(f, "AR5416"),
            Self::Ar9160 => write!(f, "AR9160"),
            Self::Ar9280 => write!(f, "AR9280"),
            Self::Ar9285 => write!(f, "AR9285"),
            Self::Ar9287 => write!(f, "AR9287"),
            Self::Ar9300 => write!(f, "AR9300"),
            Self::Unknown(id) => write!(f, "unknown ({id:#06x})"),
        }
    }
}
