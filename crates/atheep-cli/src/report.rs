// SPDX-License-Identifier: AGPL-3.0-only

//! Human-readable EEPROM report

use atheep_chip::eeprom::{
    fbin2freq_2g, opflags, rfsilent, ACCESS_TYPES, DEVICE_TYPES, EEP_MINOR_VER_3,
    init::PROT_REGIONS,
};
use atheep_driver::{CalibrationRecord, Eeprom, InitBlock, TargetPowerHt, TargetPowerLegacy};
use std::fmt::{self, Write};

/// Report section selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Section {
    /// Register initialization block
    Init,
    /// Base header
    Base,
    /// Modal header
    Modal,
    /// Target powers and CTLs
    Power,
    /// Everything
    All,
}

const RATES_CCK: [&str; 4] = ["1L-5L", "5S", "11L", "11S"];
const RATES_OFDM: [&str; 4] = ["6-24", "36", "48", "54"];
const RATES_HT: [&str; 8] = ["MCS0", "MCS1", "MCS2", "MCS3", "MCS4", "MCS5", "MCS6", "MCS7"];

/// Render `section` of a validated image
pub fn render(out: &mut impl Write, eeprom: &Eeprom, section: Section) -> fmt::Result {
    let all = section == Section::All;
    if all || section == Section::Init {
        init_block(out, &eeprom.init)?;
    }
    if all || section == Section::Base {
        base_header(out, &eeprom.record)?;
    }
    if all || section == Section::Modal {
        modal_header(out, &eeprom.record)?;
    }
    if all || section == Section::Power {
        power_info(out, &eeprom.record)?;
    }
    Ok(())
}

fn section_name(out: &mut impl Write, name: &str) -> fmt::Result {
    writeln!(out, "{:=^60}", format!(" {name} "))
}

fn subsection_name(out: &mut impl Write, name: &str) -> fmt::Result {
    writeln!(out, "{:-^60}", format!(" {name} "))
}

fn init_block(out: &mut impl Write, init: &InitBlock) -> fmt::Result {
    section_name(out, "EEPROM Init data")?;

    writeln!(out, "{:<20} : {:#06X}", "Magic", init.magic)?;
    for region in 0..PROT_REGIONS {
        let access = ACCESS_TYPES[usize::from(init.region_access(region))];
        writeln!(out, "{:<20} : {access}", format!("Region{region} access"))?;
    }
    writeln!(out, "{:<20} : {:#06X}", "Regs init data ptr", init.iptr)?;
    writeln!(out)?;

    subsection_name(out, "Register initialization data")?;
    for reg in init.registers() {
        writeln!(out, "  {:04X}: {:08X}", reg.addr, reg.value)?;
    }
    writeln!(out)
}

fn flag(out: &mut impl Write, name: &str, set: bool) -> fmt::Result {
    writeln!(out, "{name:<30} : {}", u8::from(set))
}

fn base_header(out: &mut impl Write, record: &CalibrationRecord) -> fmt::Result {
    let base = &record.base;
    section_name(out, "EEPROM Base Header")?;

    writeln!(out, "{:<30} : {:2}", "Major Version", base.major_version())?;
    writeln!(out, "{:<30} : {:2}", "Minor Version", base.revision())?;
    writeln!(out, "{:<30} : {:#06X}", "Checksum", base.checksum)?;
    writeln!(out, "{:<30} : {:#06X}", "Length", base.length)?;
    writeln!(out, "{:<30} : {:#06X}", "RegDomain1", base.reg_dmn[0])?;
    writeln!(out, "{:<30} : {:#06X}", "RegDomain2", base.reg_dmn[1])?;
    let mac: Vec<String> = base.mac_addr.iter().map(|b| format!("{b:02X}")).collect();
    writeln!(out, "{:<30} : {}", "MacAddress", mac.join(":"))?;
    writeln!(out, "{:<30} : {:#06X}", "TX Mask", base.tx_mask)?;
    writeln!(out, "{:<30} : {:#06X}", "RX Mask", base.rx_mask)?;

    if base.rf_silent & rfsilent::ENABLED == 0 {
        writeln!(out, "{:<30} : disabled", "RfSilent")?;
    } else {
        let gpio = (base.rf_silent & rfsilent::GPIO_SEL) >> rfsilent::GPIO_SEL_S;
        let high = base.rf_silent & rfsilent::POLARITY != 0;
        writeln!(
            out,
            "{:<30} : GPIO:{gpio} Pol:{}",
            "RfSilent",
            if high { 'H' } else { 'L' }
        )?;
    }

    let op = base.op_cap_flags;
    flag(out, "OpFlags(5GHz)", op & opflags::OP_11A != 0)?;
    flag(out, "OpFlags(2GHz)", op & opflags::OP_11G != 0)?;
    flag(out, "OpFlags(Disable 2GHz HT20)", op & opflags::N_2G_HT20 != 0)?;
    flag(out, "OpFlags(Disable 2GHz HT40)", op & opflags::N_2G_HT40 != 0)?;
    flag(out, "OpFlags(Disable 5Ghz HT20)", op & opflags::N_5G_HT20 != 0)?;
    flag(out, "OpFlags(Disable 5Ghz HT40)", op & opflags::N_5G_HT40 != 0)?;
    flag(out, "Big Endian", base.is_big_endian())?;
    flag(out, "Wake on Wireless", base.wake_on_wireless())?;

    let (bin_major, bin_minor, bin_build) = base.cal_bin_version();
    writeln!(out, "{:<30} : {bin_major}", "Cal Bin Major Ver")?;
    writeln!(out, "{:<30} : {bin_minor}", "Cal Bin Minor Ver")?;
    writeln!(out, "{:<30} : {bin_build}", "Cal Bin Build")?;
    writeln!(out, "{:<30} : {}", "OpenLoop PowerControl", base.open_loop_pwr_cntl & 0x1)?;

    if base.revision() >= EEP_MINOR_VER_3 {
        let device = DEVICE_TYPES[usize::from(base.device_type & 0x7)];
        writeln!(out, "{:<30} : {device}", "Device Type")?;
    }

    writeln!(out, "\nCustomer Data in hex:")?;
    for row in record.cust_data.chunks(16) {
        let hex: Vec<String> = row.iter().map(|b| format!("{b:02X}")).collect();
        writeln!(out, "{}", hex.join(" "))?;
    }
    writeln!(out)
}

fn modal_header(out: &mut impl Write, record: &CalibrationRecord) -> fmt::Result {
    let m = &record.modal;
    section_name(out, "EEPROM Modal Header")?;

    let mut hex = |name: &str, value: u32| writeln!(out, "{name:<23} : 0x{value:X}");
    hex("Chain0 Ant. Control", m.ant_ctrl_chain[0])?;
    hex("Chain1 Ant. Control", m.ant_ctrl_chain[1])?;
    hex("Ant. Common Control", m.ant_ctrl_common)?;

    let rows: [(&str, i32); 38] = [
        ("Chain0 Ant. Gain", m.antenna_gain_ch[0].into()),
        ("Chain1 Ant. Gain", m.antenna_gain_ch[1].into()),
        ("Switch Settle", m.switch_settling.into()),
        ("Chain0 TxRxAtten", m.tx_rx_atten_ch[0].into()),
        ("Chain1 TxRxAtten", m.tx_rx_atten_ch[1].into()),
        ("Chain0 RxTxMargin", m.rx_tx_margin_ch[0].into()),
        ("Chain1 RxTxMargin", m.rx_tx_margin_ch[1].into()),
        ("ADC Desired size", m.adc_desired_size.into()),
        ("txEndToXpaOff", m.tx_end_to_xpa_off.into()),
        ("txEndToRxOn", m.tx_end_to_rx_on.into()),
        ("txFrameToXpaOn", m.tx_frame_to_xpa_on.into()),
        ("CCA Threshold", m.thresh62.into()),
        ("Chain0 NF Threshold", m.noise_floor_thresh_ch[0].into()),
        ("Chain1 NF Threshold", m.noise_floor_thresh_ch[1].into()),
        ("xpdGain", m.xpd_gain.into()),
        ("External PD", m.xpd.into()),
        ("Chain0 I Coefficient", m.iq_cal_i_ch[0].into()),
        ("Chain1 I Coefficient", m.iq_cal_i_ch[1].into()),
        ("Chain0 Q Coefficient", m.iq_cal_q_ch[0].into()),
        ("Chain1 Q Coefficient", m.iq_cal_q_ch[1].into()),
        ("pdGainOverlap", m.pd_gain_overlap.into()),
        ("xPA Bias Level", m.xpa_bias_lvl.into()),
        ("txFrameToDataStart", m.tx_frame_to_data_start.into()),
        ("txFrameToPaOn", m.tx_frame_to_pa_on.into()),
        ("HT40 Power Inc.", m.ht40_power_inc_for_pdadc.into()),
        ("Chain0 bswAtten", m.bsw_atten[0].into()),
        ("Chain1 bswAtten", m.bsw_atten[1].into()),
        ("Chain0 bswMargin", m.bsw_margin[0].into()),
        ("Chain1 bswMargin", m.bsw_margin[1].into()),
        ("HT40 Switch Settle", m.sw_settle_ht40.into()),
        ("AR92x7 Version", m.version.into()),
        ("DriverBias1", m.db1.into()),
        ("DriverBias2", m.db2.into()),
        ("CCK OutputBias", m.ob_cck.into()),
        ("PSK OutputBias", m.ob_psk.into()),
        ("QAM OutputBias", m.ob_qam.into()),
        ("PAL_OFF OutputBias", m.ob_pal_off.into()),
        ("Spur channels", spur_count(record).into()),
    ];
    for (name, value) in rows {
        writeln!(out, "{name:<23} : {value}")?;
    }
    writeln!(out)
}

fn spur_count(record: &CalibrationRecord) -> u8 {
    let used = record
        .modal
        .spur_chans
        .iter()
        .take_while(|s| s.chan != 0x8000 && s.chan != 0)
        .count();
    u8::try_from(used).unwrap_or(u8::MAX)
}

/// Half-dB steps as `dd.d`
fn half_db(value: u8) -> String {
    format!("{:>4}.{}", value / 2, if value % 2 == 0 { '0' } else { '5' })
}

fn legacy_table(
    out: &mut impl Write,
    name: &str,
    rows: &[TargetPowerLegacy],
    rates: &[&str],
) -> fmt::Result {
    subsection_name(out, &format!("{name} per-rate target power"))?;
    write!(out, "{:>10} |", "Freq, MHz")?;
    for rate in rates {
        write!(out, " {rate:>6}")?;
    }
    writeln!(out)?;
    for row in rows.iter().take_while(|r| r.channel != 0xFF) {
        write!(out, "{:>10} |", fbin2freq_2g(row.channel))?;
        for &p in &row.power_x2 {
            write!(out, " {:>6}", half_db(p))?;
        }
        writeln!(out)?;
    }
    writeln!(out)
}

fn ht_table(out: &mut impl Write, name: &str, rows: &[TargetPowerHt]) -> fmt::Result {
    subsection_name(out, &format!("{name} per-rate target power"))?;
    write!(out, "{:>10} |", "Freq, MHz")?;
    for rate in RATES_HT {
        write!(out, " {rate:>6}")?;
    }
    writeln!(out)?;
    for row in rows.iter().take_while(|r| r.channel != 0xFF) {
        write!(out, "{:>10} |", fbin2freq_2g(row.channel))?;
        for &p in &row.power_x2 {
            write!(out, " {:>6}", half_db(p))?;
        }
        writeln!(out)?;
    }
    writeln!(out)
}

fn power_info(out: &mut impl Write, record: &CalibrationRecord) -> fmt::Result {
    section_name(out, "EEPROM Power Info")?;

    legacy_table(out, "2 GHz CCK", &record.target_power_cck, &RATES_CCK)?;
    legacy_table(out, "2 GHz OFDM", &record.target_power_2g, &RATES_OFDM)?;
    ht_table(out, "2 GHz HT20", &record.target_power_ht20)?;
    ht_table(out, "2 GHz HT40", &record.target_power_ht40)?;

    subsection_name(out, "CTL data")?;
    let radios = record.base.tx_chains();
    for (index, data) in record.ctl_index.iter().zip(&record.ctl_data) {
        if *index == 0 {
            continue;
        }
        writeln!(out, "CTL: {index:#04x}")?;
        for (chain, edges) in data.edges.iter().enumerate().take(radios) {
            write!(out, "  chain {chain}:")?;
            for edge in edges.iter().take_while(|e| e.channel != 0xFF) {
                write!(
                    out,
                    " {}MHz/{}{}",
                    fbin2freq_2g(edge.channel),
                    half_db(edge.power_x2()).trim_start(),
                    if edge.flag() != 0 { "*" } else { "" }
                )?;
            }
            writeln!(out)?;
        }
    }
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use atheep_chip::eeprom::{base, CAL_START_WORD, CTL_INDEX, IMAGE_WORDS, MAGIC};
    use atheep_driver::{deserialize, WordBuffer};

    fn eeprom() -> Eeprom {
        let mut words = vec![0u16; IMAGE_WORDS];
        words[0] = MAGIC;
        words[3] = 0x4000;
        words[6] = 0xFFFF;
        words[CAL_START_WORD + base::VERSION / 2] = 0xE003;
        // CTL 0x11 in the first slot
        let mut ctl = words[CAL_START_WORD + CTL_INDEX / 2].to_ne_bytes();
        ctl[CTL_INDEX % 2] = 0x11;
        words[CAL_START_WORD + CTL_INDEX / 2] = u16::from_ne_bytes(ctl);

        let raw = WordBuffer::from_words(words);
        let (init, record) = deserialize(&raw).unwrap();
        Eeprom { init, record, raw }
    }

    #[test]
    fn full_report_has_every_section() {
        let mut out = String::new();
        render(&mut out, &eeprom(), Section::All).unwrap();
        assert!(out.contains("EEPROM Init data"));
        assert!(out.contains("  4000: 00000000"));
        assert!(out.contains(&format!("{:<20} : ReadWrite", "Region0 access")));
        assert!(out.contains(&format!("{:<30} : 14", "Major Version")));
        assert!(out.contains("Device Type"));
        assert!(out.contains(&format!("{:<30} : disabled", "RfSilent")));
        assert!(out.contains("EEPROM Modal Header"));
        assert!(out.contains("2 GHz HT40 per-rate target power"));
        assert!(out.contains("CTL: 0x11"));
    }

    #[test]
    fn single_section() {
        let mut out = String::new();
        render(&mut out, &eeprom(), Section::Base).unwrap();
        assert!(out.contains("EEPROM Base Header"));
        assert!(!out.contains("EEPROM Init data"));
        assert!(!out.contains("EEPROM Power Info"));
    }

    #[test]
    fn half_db_steps() {
        assert_eq!(half_db(0x3D).trim(), "30.5");
        assert_eq!(half_db(0).trim(), "0.0");
    }
}
