// SPDX-License-Identifier: AGPL-3.0-only

//! Typed view of an AR9287 EEPROM image
//!
//! [`InitBlock`] and [`CalibrationRecord`] are produced by
//! [`crate::decode`] and normalized in place by [`crate::validate`].
//! Field meanings are chip data; only the structure matters here.

use atheep_chip::eeprom::{
    self, init, misc, CUST_DATA_BYTES, HT_RATES, LEGACY_RATES, MAX_CHAINS, MODAL_SPURS,
    NUM_2G_20_TARGET_POWERS, NUM_2G_40_TARGET_POWERS, NUM_2G_CAL_PIERS,
    NUM_2G_CCK_TARGET_POWERS, NUM_BAND_EDGES, NUM_CTLS, PD_GAINS, PD_GAIN_ICEPTS,
};

/// One register initialization entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegInit {
    /// Register address (`0xffff` ends the list)
    pub addr: u16,
    /// Value to load
    pub value: u32,
}

/// Register initialization block at the start of the image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitBlock {
    /// Magic word
    pub magic: u16,
    /// Protection map, 2 bits per region
    pub prot: u16,
    /// Register initialization data pointer
    pub iptr: u16,
    /// Every entry slot, including those past the terminator
    pub slots: Vec<RegInit>,
}

impl InitBlock {
    /// Entries up to (not including) the `0xffff` terminator
    pub fn registers(&self) -> impl Iterator<Item = &RegInit> {
        self.slots.iter().take_while(|r| r.addr != init::REG_END)
    }

    /// Access code (0..=3) of protection region `region`
    pub fn region_access(&self, region: usize) -> u8 {
        #[allow(clippy::cast_possible_truncation)]
        let code = (self.prot >> (region * 2)) & 0x3;
        code as u8
    }
}

/// Base EEPROM header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BaseHeader {
    /// Declared record length in bytes
    pub length: u16,
    /// Checksum adjust word
    pub checksum: u16,
    /// `{major:4, revision:12}`
    pub version: u16,
    /// Operating capability flags
    pub op_cap_flags: u8,
    /// Miscellaneous flags
    pub eep_misc: u8,
    /// Regulatory domain codes
    pub reg_dmn: [u16; 2],
    /// MAC address
    pub mac_addr: [u8; 6],
    /// Receive chain mask
    pub rx_mask: u8,
    /// Transmit chain mask
    pub tx_mask: u8,
    /// RF-silent configuration
    pub rf_silent: u16,
    /// Bluetooth coexistence options
    pub bluetooth_options: u16,
    /// Device capability flags
    pub device_cap: u16,
    /// Calibration binary build number
    pub bin_build_number: u32,
    /// Device (bus) type
    pub device_type: u8,
    /// Open-loop power control
    pub open_loop_pwr_cntl: u8,
    /// Power table offset in dB
    pub pwr_table_offset: i8,
    /// Temperature sensor slope
    pub temp_sens_slope: i8,
    /// Temperature sensor slope with PAL on
    pub temp_sens_slope_pal_on: i8,
    /// Reserved
    pub future: [u8; eeprom::base::FUTURE_BYTES],
}

impl BaseHeader {
    /// Major version (top nibble)
    pub const fn major_version(&self) -> u16 {
        (self.version >> eeprom::EEP_VER_SHIFT) & 0xF
    }

    /// Revision (low 12 bits)
    pub const fn revision(&self) -> u16 {
        self.version & eeprom::EEP_REV_MASK
    }

    /// Whether the image declares big-endian multi-byte fields
    pub const fn is_big_endian(&self) -> bool {
        self.eep_misc & misc::BIG_ENDIAN != 0
    }

    /// Whether wake on wireless is supported
    pub const fn wake_on_wireless(&self) -> bool {
        self.eep_misc & misc::WOW != 0
    }

    /// Calibration binary `(major, minor, build)`
    #[allow(clippy::cast_possible_truncation)]
    pub const fn cal_bin_version(&self) -> (u8, u8, u8) {
        let n = self.bin_build_number;
        ((n >> 24) as u8, (n >> 16) as u8, (n >> 8) as u8)
    }

    /// Number of transmit chains enabled in `tx_mask`
    pub fn tx_chains(&self) -> usize {
        (0..MAX_CHAINS).filter(|i| self.tx_mask & (1 << i) != 0).count()
    }
}

/// Spur mitigation channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpurChannel {
    /// Spur frequency code
    pub chan: u16,
    /// Lower mitigation range
    pub range_low: u8,
    /// Upper mitigation range
    pub range_high: u8,
}

/// Modal (2 GHz) header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModalHeader {
    /// Per-chain antenna control
    pub ant_ctrl_chain: [u32; MAX_CHAINS],
    /// Common antenna control
    pub ant_ctrl_common: u32,
    /// Per-chain antenna gain
    pub antenna_gain_ch: [i8; MAX_CHAINS],
    /// Switch settling time
    pub switch_settling: u8,
    /// Per-chain TX/RX attenuation
    pub tx_rx_atten_ch: [u8; MAX_CHAINS],
    /// Per-chain RX/TX margin
    pub rx_tx_margin_ch: [u8; MAX_CHAINS],
    /// ADC desired size
    pub adc_desired_size: i8,
    /// TX end to XPA off
    pub tx_end_to_xpa_off: u8,
    /// TX end to RX on
    pub tx_end_to_rx_on: u8,
    /// TX frame to XPA on
    pub tx_frame_to_xpa_on: u8,
    /// CCA threshold
    pub thresh62: u8,
    /// Per-chain noise floor threshold
    pub noise_floor_thresh_ch: [i8; MAX_CHAINS],
    /// XPD gain
    pub xpd_gain: u8,
    /// External power detector
    pub xpd: u8,
    /// Per-chain I coefficient
    pub iq_cal_i_ch: [i8; MAX_CHAINS],
    /// Per-chain Q coefficient
    pub iq_cal_q_ch: [i8; MAX_CHAINS],
    /// PD gain overlap
    pub pd_gain_overlap: u8,
    /// XPA bias level
    pub xpa_bias_lvl: u8,
    /// TX frame to data start
    pub tx_frame_to_data_start: u8,
    /// TX frame to PA on
    pub tx_frame_to_pa_on: u8,
    /// HT40 power increment for PDADC
    pub ht40_power_inc_for_pdadc: u8,
    /// Per-chain bypass switch attenuation
    pub bsw_atten: [u8; MAX_CHAINS],
    /// Per-chain bypass switch margin
    pub bsw_margin: [u8; MAX_CHAINS],
    /// HT40 switch settling
    pub sw_settle_ht40: u8,
    /// AR92x7 modal version
    pub version: u8,
    /// Driver bias 1
    pub db1: u8,
    /// Driver bias 2
    pub db2: u8,
    /// CCK output bias
    pub ob_cck: u8,
    /// PSK output bias
    pub ob_psk: u8,
    /// QAM output bias
    pub ob_qam: u8,
    /// PAL-off output bias
    pub ob_pal_off: u8,
    /// Reserved
    pub future: [u8; eeprom::modal::FUTURE_BYTES],
    /// Spur channels
    pub spur_chans: [SpurChannel; MODAL_SPURS],
}

/// Per-pier power detector calibration (open-loop layout)
///
/// Closed-loop images only use `pwr_pdg` and `vpd_pdg`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalPierData {
    /// Power per PD gain intercept
    pub pwr_pdg: [[u8; PD_GAIN_ICEPTS]; PD_GAINS],
    /// Voltage per PD gain intercept
    pub vpd_pdg: [[u8; PD_GAIN_ICEPTS]; PD_GAINS],
    /// PCDAC per PD gain intercept
    pub pcdac: [[u8; PD_GAIN_ICEPTS]; PD_GAINS],
    /// Unused
    pub empty: [[u8; PD_GAIN_ICEPTS]; PD_GAINS],
}

/// Target powers for legacy rates at one channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetPowerLegacy {
    /// Channel (2 GHz bin, `0xff` unused)
    pub channel: u8,
    /// Power in half-dB per rate
    pub power_x2: [u8; LEGACY_RATES],
}

/// Target powers for HT rates at one channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetPowerHt {
    /// Channel (2 GHz bin, `0xff` unused)
    pub channel: u8,
    /// Power in half-dB per MCS
    pub power_x2: [u8; HT_RATES],
}

/// One CTL band edge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CtlEdge {
    /// Channel (2 GHz bin)
    pub channel: u8,
    /// `{flag:2, power_x2:6}`
    pub ctl: u8,
}

impl CtlEdge {
    /// Power limit in half-dB
    pub const fn power_x2(&self) -> u8 {
        self.ctl & 0x3F
    }

    /// Band edge flag
    pub const fn flag(&self) -> u8 {
        self.ctl >> 6
    }
}

/// Band edges for one CTL, per chain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CtlData {
    /// `edges[chain][edge]`
    pub edges: [[CtlEdge; NUM_BAND_EDGES]; MAX_CHAINS],
}

/// Calibration record following the init block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalibrationRecord {
    /// Base header
    pub base: BaseHeader,
    /// Customer data
    pub cust_data: [u8; CUST_DATA_BYTES],
    /// Modal header
    pub modal: ModalHeader,
    /// 2 GHz calibration pier channels
    pub cal_freq_pier_2g: [u8; NUM_2G_CAL_PIERS],
    /// `cal_pier_data_2g[chain][pier]`
    pub cal_pier_data_2g: [[CalPierData; NUM_2G_CAL_PIERS]; MAX_CHAINS],
    /// CCK target powers
    pub target_power_cck: [TargetPowerLegacy; NUM_2G_CCK_TARGET_POWERS],
    /// OFDM target powers
    pub target_power_2g: [TargetPowerLegacy; NUM_2G_20_TARGET_POWERS],
    /// HT20 target powers
    pub target_power_ht20: [TargetPowerHt; NUM_2G_20_TARGET_POWERS],
    /// HT40 target powers
    pub target_power_ht40: [TargetPowerHt; NUM_2G_40_TARGET_POWERS],
    /// CTL codes (`0` unused)
    pub ctl_index: [u8; NUM_CTLS],
    /// CTL band edges
    pub ctl_data: [CtlData; NUM_CTLS],
}

impl CalibrationRecord {
    /// Byte-reverse every field wider than one byte
    ///
    /// Applied when the image's endianness flag disagrees with the host.
    /// Applying it twice restores the record.
    pub fn swap_multibyte_fields(&mut self) {
        let base = &mut self.base;
        base.length = base.length.swap_bytes();
        base.checksum = base.checksum.swap_bytes();
        base.version = base.version.swap_bytes();
        base.reg_dmn[0] = base.reg_dmn[0].swap_bytes();
        base.reg_dmn[1] = base.reg_dmn[1].swap_bytes();
        base.rf_silent = base.rf_silent.swap_bytes();
        base.bluetooth_options = base.bluetooth_options.swap_bytes();
        base.device_cap = base.device_cap.swap_bytes();
        base.bin_build_number = base.bin_build_number.swap_bytes();

        let modal = &mut self.modal;
        modal.ant_ctrl_common = modal.ant_ctrl_common.swap_bytes();
        for ant in &mut modal.ant_ctrl_chain {
            *ant = ant.swap_bytes();
        }
        for spur in &mut modal.spur_chans {
            spur.chan = spur.chan.swap_bytes();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_stop_at_terminator() {
        let mut slots = vec![RegInit::default(); init::MAX_REGS];
        slots[0] = RegInit { addr: 0x4000, value: 1 };
        slots[1] = RegInit { addr: 0x4004, value: 2 };
        slots[2] = RegInit { addr: 0xFFFF, value: 0 };
        slots[3] = RegInit { addr: 0x4008, value: 3 };
        let block = InitBlock {
            magic: eeprom::MAGIC,
            prot: 0b1110_0100,
            iptr: 0,
            slots,
        };
        assert_eq!(block.registers().count(), 2);
        assert_eq!(block.region_access(0), 0);
        assert_eq!(block.region_access(1), 1);
        assert_eq!(block.region_access(2), 2);
        assert_eq!(block.region_access(3), 3);
    }

    #[test]
    fn version_fields() {
        let base = BaseHeader {
            version: 0xE003,
            eep_misc: misc::BIG_ENDIAN | misc::WOW,
            bin_build_number: 0x0102_0300,
            tx_mask: 0x3,
            ..BaseHeader::default()
        };
        assert_eq!(base.major_version(), 0xE);
        assert_eq!(base.revision(), 3);
        assert!(base.is_big_endian());
        assert!(base.wake_on_wireless());
        assert_eq!(base.cal_bin_version(), (1, 2, 3));
        assert_eq!(base.tx_chains(), 2);
    }

    /// Record whose every byte differs from its neighbours
    fn patterned_record() -> CalibrationRecord {
        #[allow(clippy::cast_possible_truncation)]
        let words: Vec<u16> = (0..eeprom::CAL_WORDS)
            .map(|i| u16::from_ne_bytes([(2 * i) as u8, (2 * i + 1) as u8 ^ 0x80]))
            .collect();
        crate::decode::decode_calibration(&words)
    }

    #[test]
    fn swap_reverses_every_multibyte_field() {
        let original = patterned_record();
        let mut rec = original.clone();
        rec.swap_multibyte_fields();

        let (b, o) = (&rec.base, &original.base);
        assert_eq!(b.length, o.length.swap_bytes());
        assert_eq!(b.checksum, o.checksum.swap_bytes());
        assert_eq!(b.version, o.version.swap_bytes());
        assert_eq!(b.reg_dmn[0], o.reg_dmn[0].swap_bytes());
        assert_eq!(b.reg_dmn[1], o.reg_dmn[1].swap_bytes());
        assert_eq!(b.rf_silent, o.rf_silent.swap_bytes());
        assert_eq!(b.bluetooth_options, o.bluetooth_options.swap_bytes());
        assert_eq!(b.device_cap, o.device_cap.swap_bytes());
        assert_eq!(b.bin_build_number, o.bin_build_number.swap_bytes());

        let (m, o) = (&rec.modal, &original.modal);
        assert_eq!(m.ant_ctrl_common, o.ant_ctrl_common.swap_bytes());
        for i in 0..MAX_CHAINS {
            assert_eq!(m.ant_ctrl_chain[i], o.ant_ctrl_chain[i].swap_bytes(), "chain {i}");
        }
        for i in 0..MODAL_SPURS {
            assert_eq!(m.spur_chans[i].chan, o.spur_chans[i].chan.swap_bytes(), "spur {i}");
            assert_eq!(m.spur_chans[i].range_low, o.spur_chans[i].range_low);
            assert_eq!(m.spur_chans[i].range_high, o.spur_chans[i].range_high);
        }

        // Single-byte data is left alone.
        assert_eq!(rec.base.mac_addr, original.base.mac_addr);
        assert_eq!(rec.base.eep_misc, original.base.eep_misc);
        assert_eq!(rec.cust_data, original.cust_data);
        assert_eq!(rec.ctl_data, original.ctl_data);
    }

    #[test]
    fn swap_twice_restores_record() {
        let original = patterned_record();
        let mut rec = original.clone();
        rec.swap_multibyte_fields();
        assert_ne!(rec, original);
        rec.swap_multibyte_fields();
        assert_eq!(rec, original);
    }

    #[test]
    fn ctl_edge_split() {
        let edge = CtlEdge { channel: 112, ctl: 0x7C };
        assert_eq!(edge.power_x2(), 0x3C);
        assert_eq!(edge.flag(), 1);
    }
}
