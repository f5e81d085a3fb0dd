// SPDX-License-Identifier: AGPL-3.0-only

//! `AR_SREV` decoding.
//!
//! Older MACs report an 8-bit `{version:4, revision:3}` code. Newer ones set
//! the low byte to `0xff` and carry an extended version in the upper bits.

/// Low byte of `AR_SREV`; `0xff` selects the extended layout.
pub const SREV_ID: u32 = 0x0000_00FF;
/// Legacy version field.
pub const SREV_VERSION: u32 = 0x0000_00F0;
/// Shift of [`SREV_VERSION`].
pub const SREV_VERSION_S: u32 = 4;
/// Legacy revision field.
pub const SREV_REVISION: u32 = 0x0000_0007;
/// Extended version field.
pub const SREV_VERSION2: u32 = 0xFFFC_0000;
/// Shift applied to [`SREV_VERSION2`] (historically the type shift).
pub const SREV_TYPE2_S: u32 = 12;
/// Extended revision field.
pub const SREV_REVISION2: u32 = 0x0000_0F00;
/// Shift of [`SREV_REVISION2`].
pub const SREV_REVISION2_S: u32 = 8;

/// MAC/BB version codes.
pub mod version {
    /// AR5416 (PCI).
    pub const AR5416_PCI: u32 = 0x00D;
    /// AR5418 (PCIe).
    pub const AR5416_PCIE: u32 = 0x00C;
    /// AR9160.
    pub const AR9160: u32 = 0x040;
    /// AR9280.
    pub const AR9280: u32 = 0x080;
    /// AR9285.
    pub const AR9285: u32 = 0x0C0;
    /// AR9287.
    pub const AR9287: u32 = 0x180;
    /// AR9300.
    pub const AR9300: u32 = 0x1C0;
    /// AR9330.
    pub const AR9330: u32 = 0x200;
    /// AR9485.
    pub const AR9485: u32 = 0x240;
    /// AR9462.
    pub const AR9462: u32 = 0x280;
    /// AR9565.
    pub const AR9565: u32 = 0x2C0;
    /// AR9340.
    pub const AR9340: u32 = 0x300;
    /// AR9550.
    pub const AR9550: u32 = 0x400;
}

const NAMES: &[(u32, &str)] = &[
    (version::AR5416_PCI, "5416"),
    (version::AR5416_PCIE, "5418"),
    (version::AR9160, "9160"),
    (version::AR9280, "9280"),
    (version::AR9285, "9285"),
    (version::AR9287, "9287"),
    (version::AR9300, "9300"),
    (version::AR9330, "9330"),
    (version::AR9485, "9485"),
    (version::AR9462, "9462"),
    (version::AR9565, "9565"),
    (version::AR9340, "9340"),
    (version::AR9550, "9550"),
];

/// Decoded silicon revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipRevision {
    /// MAC/BB version code (see [`version`]).
    pub mac_version: u32,
    /// MAC revision.
    pub mac_rev: u32,
    /// Raw register value.
    pub raw: u32,
}

impl ChipRevision {
    /// Decode an `AR_SREV` register value.
    #[must_use]
    pub const fn from_register(val: u32) -> Self {
        let (mac_version, mac_rev) = if val & SREV_ID == 0xFF {
            (
                (val & SREV_VERSION2) >> SREV_TYPE2_S,
                (val & SREV_REVISION2) >> SREV_REVISION2_S,
            )
        } else {
            ((val & SREV_VERSION) >> SREV_VERSION_S, val & SREV_REVISION)
        };

        Self {
            mac_version,
            mac_rev,
            raw: val,
        }
    }

    /// Marketing name without the `AR` prefix, or `"????"`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        NAMES
            .iter()
            .find(|(v, _)| *v == self.mac_version)
            .map_or("????", |(_, n)| n)
    }

    /// EEPROM status/data register for this MAC generation.
    #[must_use]
    pub const fn eeprom_status_register(&self) -> u32 {
        if self.mac_version == version::AR9340 {
            crate::regs::EEPROM_STATUS_DATA_AR9340
        } else if self.mac_version >= version::AR9300 {
            crate::regs::EEPROM_STATUS_DATA_AR9300
        } else {
            crate::regs::EEPROM_STATUS_DATA
        }
    }
}

impl std::fmt::Display for ChipRevision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Atheros AR{} MAC/BB Rev:{:x} (SREV: {:#010x})",
            self.name(),
            self.mac_rev,
            self.raw
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_layout() {
        // AR5416 PCI, revision 2
        let rev = ChipRevision::from_register(0x0000_00D2);
        assert_eq!(rev.mac_version, version::AR5416_PCI);
        assert_eq!(rev.mac_rev, 2);
        assert_eq!(rev.name(), "5416");
        assert_eq!(rev.eeprom_status_register(), crate::regs::EEPROM_STATUS_DATA);
    }

    #[test]
    fn extended_layout_ar9287() {
        let val = (version::AR9287 << SREV_TYPE2_S) | (0x2 << SREV_REVISION2_S) | 0xFF;
        let rev = ChipRevision::from_register(val);
        assert_eq!(rev.mac_version, version::AR9287);
        assert_eq!(rev.mac_rev, 2);
        assert_eq!(rev.name(), "9287");
        assert_eq!(rev.eeprom_status_register(), crate::regs::EEPROM_STATUS_DATA);
    }

    #[test]
    fn status_register_per_generation() {
        let ar9300 = ChipRevision::from_register((version::AR9300 << SREV_TYPE2_S) | 0xFF);
        let ar9340 = ChipRevision::from_register((version::AR9340 << SREV_TYPE2_S) | 0xFF);
        assert_eq!(ar9300.eeprom_status_register(), crate::regs::EEPROM_STATUS_DATA_AR9300);
        assert_eq!(ar9340.eeprom_status_register(), crate::regs::EEPROM_STATUS_DATA_AR9340);
    }

    #[test]
    fn unknown_name() {
        let rev = ChipRevision::from_register(0x0000_0010);
        assert_eq!(rev.name(), "????");
    }
}
