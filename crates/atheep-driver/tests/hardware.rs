// SPDX-License-Identifier: AGPL-3.0-only

//! Live hardware tests
//!
//! Need an AR9287 on the bus and root. Set `ATHEEP_PCI` to its address.

use atheep_driver::{discover, open_backend, read_eeprom, BackendSelection, EepromSession, PollConfig};

fn pci_address() -> String {
    std::env::var("ATHEEP_PCI").unwrap_or_else(|_| "0000:02:00.0".to_string())
}

#[test]
#[ignore] // Requires hardware
fn test_discover_lists_ar9287() {
    let devices = discover().expect("sysfs scan");
    for dev in &devices {
        println!("{} {:#06x} {}", dev.pcie_address, dev.device_id, dev.family);
    }
    assert!(devices.iter().any(|d| d.family.uses_ar9287_map()));
}

#[test]
#[ignore] // Requires hardware
fn test_read_live_eeprom() {
    let selection = BackendSelection::Pci {
        address: pci_address(),
        poll: PollConfig::default(),
    };
    let backend = open_backend(&selection).expect("PCI backend");
    let mut session = EepromSession::new(backend);

    let eeprom = read_eeprom(&mut session).expect("valid EEPROM");
    println!(
        "version {}.{}, MAC {:02x?}",
        eeprom.record.base.major_version(),
        eeprom.record.base.revision(),
        eeprom.record.base.mac_addr
    );
    assert_eq!(eeprom.record.base.major_version(), 0xE);
}
