// SPDX-License-Identifier: AGPL-3.0-only

//! Silicon model for Atheros AR5416-family wireless MACs.
//!
//! This crate has **no dependencies** and **no hardware access**. It is a
//! pure model of the silicon: MAC register addresses, the EEPROM access
//! handshake bits, SREV decoding, PCI identifiers, and the AR9287 EEPROM
//! image layout.
//!
//! # Crate organisation
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`pcie`] | Vendor/device IDs, chip family lookup |
//! | [`regs`] | MAC register map used for EEPROM access and identification |
//! | [`srev`] | `AR_SREV` decoding into MAC version / revision |
//! | [`eeprom`] | AR9287 EEPROM image layout, magic, versions, flag bits |

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod eeprom;
pub mod pcie;
pub mod regs;
pub mod srev;
