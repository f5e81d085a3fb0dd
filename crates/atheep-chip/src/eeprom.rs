// SPDX-License-Identifier: AGPL-3.0-only

//! AR9287 EEPROM image layout.
//!
//! The image is a flat run of 16-bit words:
//!
//! ```text
//! word  0x000 ┬ init block       magic, protection map, init ptr, {addr, value}*
//!             │                  (INIT_WORDS words)
//! word  0x080 ┼ calibration      base header, customer data, modal header,
//!             │                  cal piers, target powers, CTL tables
//!             │                  (CAL_WORDS words)
//! word  0x1eb ┴ end
//! ```
//!
//! Offsets below are **byte** offsets inside the calibration record, as the
//! record lands in host memory word by word. They follow the packed
//! `struct ar9287_eeprom` and `struct modal_eep_ar9287_header` of the Linux
//! ath9k driver (`drivers/net/wireless/ath/ath9k/eeprom.h`). The packed
//! record is 727 bytes; its trailing pad byte lies past the last word read,
//! so only [`CAL_BYTES`] are ever present. The spur channel words are the
//! only multi-byte fields on an odd offset.

// ── Image geometry ───────────────────────────────────────────────────────────

/// Words occupied by the register-initialization block.
pub const INIT_WORDS: usize = 0x80;
/// Bytes in the calibration record.
pub const CAL_BYTES: usize = 726;
/// Words occupied by the calibration record.
pub const CAL_WORDS: usize = CAL_BYTES / 2;
/// Total image size in words.
pub const IMAGE_WORDS: usize = INIT_WORDS + CAL_WORDS;
/// First word of the calibration record.
pub const CAL_START_WORD: usize = INIT_WORDS;

// ── Identity ─────────────────────────────────────────────────────────────────

/// Word offset of the magic value.
pub const MAGIC_OFFSET: u32 = 0;
/// Magic value at [`MAGIC_OFFSET`] when read in the right byte order.
pub const MAGIC: u16 = 0xA55A;
/// Expected major version (top nibble of the version word).
pub const EEP_VER: u16 = 0xE;
/// Oldest revision (low 12 bits) that is still understood.
pub const EEP_NO_BACK_VER: u16 = 0x1;
/// Revision that introduced the device type field.
pub const EEP_MINOR_VER_3: u16 = 0x3;
/// Mask of the revision inside the version word.
pub const EEP_REV_MASK: u16 = 0x0FFF;
/// Shift of the major version inside the version word.
pub const EEP_VER_SHIFT: u16 = 12;

/// The XOR of every word in a valid calibration record.
pub const CHECKSUM_OK: u16 = 0xFFFF;

// ── Init block ───────────────────────────────────────────────────────────────

/// Init block byte layout.
pub mod init {
    /// Magic word.
    pub const MAGIC: usize = 0;
    /// Per-region protection map, 2 bits per region.
    pub const PROT: usize = 2;
    /// Register initialization data pointer.
    pub const IPTR: usize = 4;
    /// First `{addr: u16, value: u32}` entry.
    pub const REGS: usize = 6;
    /// Size of one packed register entry.
    pub const REG_ENTRY_BYTES: usize = 6;
    /// Number of entries that fit in the block.
    pub const MAX_REGS: usize = (super::INIT_WORDS * 2 - REGS) / REG_ENTRY_BYTES;
    /// Address that terminates the register list.
    pub const REG_END: u16 = 0xFFFF;
    /// Regions described by the protection map.
    pub const PROT_REGIONS: usize = 8;
}

// ── Array dimensions ─────────────────────────────────────────────────────────

/// Transmit/receive chains.
pub const MAX_CHAINS: usize = 2;
/// Spur channels in the modal header.
pub const MODAL_SPURS: usize = 5;
/// 2 GHz calibration piers.
pub const NUM_2G_CAL_PIERS: usize = 3;
/// CCK target power entries.
pub const NUM_2G_CCK_TARGET_POWERS: usize = 3;
/// OFDM / HT20 target power entries.
pub const NUM_2G_20_TARGET_POWERS: usize = 3;
/// HT40 target power entries.
pub const NUM_2G_40_TARGET_POWERS: usize = 3;
/// CTL tables.
pub const NUM_CTLS: usize = 12;
/// Band edges per CTL chain.
pub const NUM_BAND_EDGES: usize = 4;
/// Customer data bytes.
pub const CUST_DATA_BYTES: usize = 32;
/// Power detector gains per pier.
pub const PD_GAINS: usize = 2;
/// Intercepts per power detector gain.
pub const PD_GAIN_ICEPTS: usize = 5;
/// Legacy (CCK/OFDM) rates in a target power entry.
pub const LEGACY_RATES: usize = 4;
/// HT rates in a target power entry.
pub const HT_RATES: usize = 8;

// ── Base header (64 bytes) ───────────────────────────────────────────────────

/// Base header byte offsets.
pub mod base {
    /// Declared record length in bytes.
    pub const LENGTH: usize = 0;
    /// Checksum adjust word.
    pub const CHECKSUM: usize = 2;
    /// `{major:4, revision:12}`.
    pub const VERSION: usize = 4;
    /// Operating capability flags.
    pub const OP_CAP_FLAGS: usize = 6;
    /// Miscellaneous flags (endianness, WoW).
    pub const EEP_MISC: usize = 7;
    /// Two regulatory domain codes.
    pub const REG_DMN: usize = 8;
    /// MAC address.
    pub const MAC_ADDR: usize = 12;
    /// Receive chain mask.
    pub const RX_MASK: usize = 18;
    /// Transmit chain mask.
    pub const TX_MASK: usize = 19;
    /// RF-silent configuration.
    pub const RF_SILENT: usize = 20;
    /// Bluetooth coexistence options.
    pub const BLUETOOTH_OPTIONS: usize = 22;
    /// Device capability flags.
    pub const DEVICE_CAP: usize = 24;
    /// Calibration binary build number.
    pub const BIN_BUILD_NUMBER: usize = 26;
    /// Device (bus) type.
    pub const DEVICE_TYPE: usize = 30;
    /// Open-loop power control flag.
    pub const OPEN_LOOP_PWR_CNTL: usize = 31;
    /// Power table offset (dB, signed).
    pub const PWR_TABLE_OFFSET: usize = 32;
    /// Temperature sensor slope (signed).
    pub const TEMP_SENS_SLOPE: usize = 33;
    /// Temperature sensor slope with PAL on (signed).
    pub const TEMP_SENS_SLOPE_PAL_ON: usize = 34;
    /// Reserved bytes.
    pub const FUTURE: usize = 35;
    /// Reserved byte count.
    pub const FUTURE_BYTES: usize = 29;
    /// Header size.
    pub const SIZE: usize = 64;
}

/// Customer data offset.
pub const CUST_DATA: usize = base::SIZE;

// ── Modal header (99 bytes) ──────────────────────────────────────────────────

/// Modal header byte offsets.
pub mod modal {
    /// Start of the modal header.
    pub const START: usize = super::CUST_DATA + super::CUST_DATA_BYTES;
    /// Per-chain antenna control words (u32 each).
    pub const ANT_CTRL_CHAIN: usize = START;
    /// Common antenna control word (u32).
    pub const ANT_CTRL_COMMON: usize = START + 8;
    /// Per-chain antenna gain (signed).
    pub const ANTENNA_GAIN_CH: usize = START + 12;
    /// Switch settling time.
    pub const SWITCH_SETTLING: usize = START + 14;
    /// Per-chain TX/RX attenuation.
    pub const TX_RX_ATTEN_CH: usize = START + 15;
    /// Per-chain RX/TX margin.
    pub const RX_TX_MARGIN_CH: usize = START + 17;
    /// ADC desired size (signed).
    pub const ADC_DESIRED_SIZE: usize = START + 19;
    /// TX end to XPA off.
    pub const TX_END_TO_XPA_OFF: usize = START + 20;
    /// TX end to RX on.
    pub const TX_END_TO_RX_ON: usize = START + 21;
    /// TX frame to XPA on.
    pub const TX_FRAME_TO_XPA_ON: usize = START + 22;
    /// CCA threshold.
    pub const THRESH62: usize = START + 23;
    /// Per-chain noise floor threshold (signed).
    pub const NOISE_FLOOR_THRESH_CH: usize = START + 24;
    /// XPD gain.
    pub const XPD_GAIN: usize = START + 26;
    /// External power detector.
    pub const XPD: usize = START + 27;
    /// Per-chain I coefficient (signed).
    pub const IQ_CAL_I_CH: usize = START + 28;
    /// Per-chain Q coefficient (signed).
    pub const IQ_CAL_Q_CH: usize = START + 30;
    /// PD gain overlap.
    pub const PD_GAIN_OVERLAP: usize = START + 32;
    /// XPA bias level.
    pub const XPA_BIAS_LVL: usize = START + 33;
    /// TX frame to data start.
    pub const TX_FRAME_TO_DATA_START: usize = START + 34;
    /// TX frame to PA on.
    pub const TX_FRAME_TO_PA_ON: usize = START + 35;
    /// HT40 power increment for PDADC.
    pub const HT40_POWER_INC_FOR_PDADC: usize = START + 36;
    /// Per-chain bypass switch attenuation.
    pub const BSW_ATTEN: usize = START + 37;
    /// Per-chain bypass switch margin.
    pub const BSW_MARGIN: usize = START + 39;
    /// HT40 switch settling.
    pub const SW_SETTLE_HT40: usize = START + 41;
    /// AR92x7 modal version.
    pub const VERSION: usize = START + 42;
    /// Driver bias 1.
    pub const DB1: usize = START + 43;
    /// Driver bias 2.
    pub const DB2: usize = START + 44;
    /// CCK output bias.
    pub const OB_CCK: usize = START + 45;
    /// PSK output bias.
    pub const OB_PSK: usize = START + 46;
    /// QAM output bias.
    pub const OB_QAM: usize = START + 47;
    /// PAL-off output bias.
    pub const OB_PAL_OFF: usize = START + 48;
    /// Reserved bytes.
    pub const FUTURE: usize = START + 49;
    /// Reserved byte count.
    pub const FUTURE_BYTES: usize = 30;
    /// Spur channels, `{chan: u16, range_low: u8, range_high: u8}` each.
    pub const SPUR_CHANS: usize = START + 79;
    /// Size of one spur entry.
    pub const SPUR_ENTRY_BYTES: usize = 4;
    /// Header size.
    pub const SIZE: usize = 99;
}

// ── Power calibration ────────────────────────────────────────────────────────

/// 2 GHz calibration pier frequencies.
pub const CAL_FREQ_PIER_2G: usize = modal::START + modal::SIZE;
/// Per-chain, per-pier calibration data.
pub const CAL_PIER_DATA_2G: usize = CAL_FREQ_PIER_2G + NUM_2G_CAL_PIERS;
/// Size of one pier's calibration data (open-loop layout).
pub const CAL_PIER_BYTES: usize = 4 * PD_GAINS * PD_GAIN_ICEPTS;
/// CCK target powers.
pub const CAL_TARGET_POWER_CCK: usize =
    CAL_PIER_DATA_2G + MAX_CHAINS * NUM_2G_CAL_PIERS * CAL_PIER_BYTES;
/// Size of a legacy target power entry.
pub const TARGET_POWER_LEG_BYTES: usize = 1 + LEGACY_RATES;
/// Size of an HT target power entry.
pub const TARGET_POWER_HT_BYTES: usize = 1 + HT_RATES;
/// OFDM target powers.
pub const CAL_TARGET_POWER_2G: usize =
    CAL_TARGET_POWER_CCK + NUM_2G_CCK_TARGET_POWERS * TARGET_POWER_LEG_BYTES;
/// HT20 target powers.
pub const CAL_TARGET_POWER_2G_HT20: usize =
    CAL_TARGET_POWER_2G + NUM_2G_20_TARGET_POWERS * TARGET_POWER_LEG_BYTES;
/// HT40 target powers.
pub const CAL_TARGET_POWER_2G_HT40: usize =
    CAL_TARGET_POWER_2G_HT20 + NUM_2G_20_TARGET_POWERS * TARGET_POWER_HT_BYTES;
/// CTL index table.
pub const CTL_INDEX: usize =
    CAL_TARGET_POWER_2G_HT40 + NUM_2G_40_TARGET_POWERS * TARGET_POWER_HT_BYTES;
/// CTL edge data.
pub const CTL_DATA: usize = CTL_INDEX + NUM_CTLS;
/// Size of one CTL table (`{channel, ctl}` per edge per chain).
pub const CTL_DATA_BYTES: usize = MAX_CHAINS * NUM_BAND_EDGES * 2;
/// Trailing pad byte (outside the words read).
pub const PADDING: usize = CTL_DATA + NUM_CTLS * CTL_DATA_BYTES;
/// Size of the packed record, pad byte included.
pub const RECORD_BYTES: usize = PADDING + 1;

// ── Flag bits ────────────────────────────────────────────────────────────────

/// `eepMisc` bits.
pub mod misc {
    /// Multi-byte fields are stored big-endian.
    pub const BIG_ENDIAN: u8 = 0x01;
    /// Wake on wireless supported.
    pub const WOW: u8 = 0x02;
}

/// `opCapFlags` bits.
pub mod opflags {
    /// 5 GHz band.
    pub const OP_11A: u8 = 0x01;
    /// 2 GHz band.
    pub const OP_11G: u8 = 0x02;
    /// HT40 disabled on 5 GHz.
    pub const N_5G_HT40: u8 = 0x04;
    /// HT40 disabled on 2 GHz.
    pub const N_2G_HT40: u8 = 0x08;
    /// HT20 disabled on 5 GHz.
    pub const N_5G_HT20: u8 = 0x10;
    /// HT20 disabled on 2 GHz.
    pub const N_2G_HT20: u8 = 0x20;
}

/// `rfSilent` fields.
pub mod rfsilent {
    /// RF-silent enabled.
    pub const ENABLED: u16 = 0x0001;
    /// Polarity bit.
    pub const POLARITY: u16 = 0x0002;
    /// Shift of [`POLARITY`].
    pub const POLARITY_S: u16 = 1;
    /// GPIO selector.
    pub const GPIO_SEL: u16 = 0x001C;
    /// Shift of [`GPIO_SEL`].
    pub const GPIO_SEL_S: u16 = 2;
}

/// Bus type names indexed by `deviceType & 7`.
pub const DEVICE_TYPES: [&str; 8] = [
    "UNKNOWN",
    "Cardbus",
    "PCI",
    "MiniPCI",
    "Access Point",
    "PCIExpress",
    "UNKNOWN",
    "UNKNOWN",
];

/// Protection map access names indexed by the 2-bit region code.
pub const ACCESS_TYPES: [&str; 4] = ["ReadWrite", "WriteOnly", "ReadOnly", "NoAccess"];

/// Convert a 2 GHz channel byte to MHz.
#[must_use]
pub const fn fbin2freq_2g(bin: u8) -> u16 {
    2300 + bin as u16
}

#[cfg(test)]
#[allow(clippy::assertions_on_constants)]
mod tests {
    use super::*;

    #[test]
    fn record_geometry() {
        assert_eq!(CAL_BYTES % 2, 0);
        assert_eq!(CAL_WORDS, 363);
        assert_eq!(IMAGE_WORDS, 491);
        assert_eq!(PADDING, CAL_BYTES);
        assert_eq!(RECORD_BYTES, 727);
        assert_eq!(RECORD_BYTES / 2, CAL_WORDS);
    }

    #[test]
    fn modal_header_fits() {
        assert_eq!(modal::START, 96);
        assert_eq!(modal::SPUR_CHANS, 175);
        assert_eq!(CAL_FREQ_PIER_2G, 195);
        assert_eq!(CTL_INDEX, 522);
        assert_eq!(modal::FUTURE + modal::FUTURE_BYTES, modal::SPUR_CHANS);
        assert_eq!(
            modal::SPUR_CHANS + MODAL_SPURS * modal::SPUR_ENTRY_BYTES,
            modal::START + modal::SIZE
        );
        assert_eq!(base::FUTURE + base::FUTURE_BYTES, base::SIZE);
    }

    #[test]
    fn multibyte_fields_are_word_aligned() {
        let offsets = [
            base::LENGTH,
            base::CHECKSUM,
            base::VERSION,
            base::REG_DMN,
            base::RF_SILENT,
            base::BLUETOOTH_OPTIONS,
            base::DEVICE_CAP,
            base::BIN_BUILD_NUMBER,
            modal::ANT_CTRL_CHAIN,
            modal::ANT_CTRL_COMMON,
        ];
        for off in offsets {
            assert_eq!(off % 2, 0, "field at {off} is not word aligned");
        }
    }

    #[test]
    fn init_block_capacity() {
        assert_eq!(init::MAX_REGS, 41);
    }

    #[test]
    fn channel_conversion() {
        assert_eq!(fbin2freq_2g(112), 2412);
    }
}
