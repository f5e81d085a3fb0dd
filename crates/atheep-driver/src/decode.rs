// SPDX-License-Identifier: AGPL-3.0-only

//! Positional decoding of the raw word buffer
//!
//! The word buffer is laid out byte for byte the way the chip data lands in
//! host memory, then every field is read off in order. No validation and no
//! byte-order correction happens here.

use crate::acquire::WordBuffer;
use crate::error::{EepromError, Result};
use crate::model::{
    BaseHeader, CalPierData, CalibrationRecord, CtlData, CtlEdge, InitBlock, ModalHeader,
    RegInit, SpurChannel, TargetPowerHt, TargetPowerLegacy,
};
use atheep_chip::eeprom::{
    init, CAL_BYTES, CAL_WORDS, IMAGE_WORDS, INIT_WORDS, MAX_CHAINS, MODAL_SPURS,
    NUM_2G_20_TARGET_POWERS, NUM_2G_40_TARGET_POWERS, NUM_2G_CAL_PIERS,
    NUM_2G_CCK_TARGET_POWERS, NUM_BAND_EDGES, NUM_CTLS, PD_GAINS,
};
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Lay words out in host-native byte order
pub(crate) fn host_bytes(words: &[u16]) -> Bytes {
    let mut buf = BytesMut::with_capacity(words.len() * 2);
    for &w in words {
        buf.put_u16_ne(w);
    }
    buf.freeze()
}

/// Split a full image into its init block and calibration record
///
/// # Errors
///
/// Returns [`EepromError::ImageSize`] if the buffer is not exactly one image.
pub fn deserialize(buffer: &WordBuffer) -> Result<(InitBlock, CalibrationRecord)> {
    if buffer.len() != IMAGE_WORDS {
        return Err(EepromError::ImageSize {
            len: buffer.len(),
            expected: IMAGE_WORDS,
        });
    }

    let (init_words, cal_words) = buffer.words().split_at(INIT_WORDS);
    debug_assert_eq!(cal_words.len(), CAL_WORDS);

    Ok((decode_init_block(init_words), decode_calibration(cal_words)))
}

/// Decode the init block from its `INIT_WORDS` words
///
/// The caller guarantees the length; [`deserialize`] checks it.
pub(crate) fn decode_init_block(words: &[u16]) -> InitBlock {
    let mut buf = host_bytes(words);

    let magic = buf.get_u16_ne();
    let prot = buf.get_u16_ne();
    let iptr = buf.get_u16_ne();
    let slots = (0..init::MAX_REGS)
        .map(|_| RegInit {
            addr: buf.get_u16_ne(),
            value: buf.get_u32_ne(),
        })
        .collect();

    InitBlock {
        magic,
        prot,
        iptr,
        slots,
    }
}

/// Decode the calibration record from its `CAL_WORDS` words
///
/// The caller guarantees the length; [`deserialize`] checks it.
pub(crate) fn decode_calibration(words: &[u16]) -> CalibrationRecord {
    let mut buf = host_bytes(words);
    debug_assert_eq!(buf.remaining(), CAL_BYTES);

    let base = decode_base(&mut buf);
    let cust_data = bytes_array(&mut buf);
    let modal = decode_modal(&mut buf);
    let cal_freq_pier_2g = bytes_array(&mut buf);
    let cal_pier_data_2g = [(); MAX_CHAINS]
        .map(|()| [(); NUM_2G_CAL_PIERS].map(|()| decode_cal_pier(&mut buf)));
    let target_power_cck = [(); NUM_2G_CCK_TARGET_POWERS].map(|()| decode_target_leg(&mut buf));
    let target_power_2g = [(); NUM_2G_20_TARGET_POWERS].map(|()| decode_target_leg(&mut buf));
    let target_power_ht20 = [(); NUM_2G_20_TARGET_POWERS].map(|()| decode_target_ht(&mut buf));
    let target_power_ht40 = [(); NUM_2G_40_TARGET_POWERS].map(|()| decode_target_ht(&mut buf));
    let ctl_index = bytes_array(&mut buf);
    let ctl_data = [(); NUM_CTLS].map(|()| decode_ctl(&mut buf));

    debug_assert_eq!(buf.remaining(), 0);

    CalibrationRecord {
        base,
        cust_data,
        modal,
        cal_freq_pier_2g,
        cal_pier_data_2g,
        target_power_cck,
        target_power_2g,
        target_power_ht20,
        target_power_ht40,
        ctl_index,
        ctl_data,
    }
}

fn decode_base(buf: &mut Bytes) -> BaseHeader {
    BaseHeader {
        length: buf.get_u16_ne(),
        checksum: buf.get_u16_ne(),
        version: buf.get_u16_ne(),
        op_cap_flags: buf.get_u8(),
        eep_misc: buf.get_u8(),
        reg_dmn: [buf.get_u16_ne(), buf.get_u16_ne()],
        mac_addr: bytes_array(buf),
        rx_mask: buf.get_u8(),
        tx_mask: buf.get_u8(),
        rf_silent: buf.get_u16_ne(),
        bluetooth_options: buf.get_u16_ne(),
        device_cap: buf.get_u16_ne(),
        bin_build_number: buf.get_u32_ne(),
        device_type: buf.get_u8(),
        open_loop_pwr_cntl: buf.get_u8(),
        pwr_table_offset: buf.get_i8(),
        temp_sens_slope: buf.get_i8(),
        temp_sens_slope_pal_on: buf.get_i8(),
        future: bytes_array(buf),
    }
}

fn decode_modal(buf: &mut Bytes) -> ModalHeader {
    ModalHeader {
        ant_ctrl_chain: [(); MAX_CHAINS].map(|()| buf.get_u32_ne()),
        ant_ctrl_common: buf.get_u32_ne(),
        antenna_gain_ch: signed_array(buf),
        switch_settling: buf.get_u8(),
        tx_rx_atten_ch: bytes_array(buf),
        rx_tx_margin_ch: bytes_array(buf),
        adc_desired_size: buf.get_i8(),
        tx_end_to_xpa_off: buf.get_u8(),
        tx_end_to_rx_on: buf.get_u8(),
        tx_frame_to_xpa_on: buf.get_u8(),
        thresh62: buf.get_u8(),
        noise_floor_thresh_ch: signed_array(buf),
        xpd_gain: buf.get_u8(),
        xpd: buf.get_u8(),
        iq_cal_i_ch: signed_array(buf),
        iq_cal_q_ch: signed_array(buf),
        pd_gain_overlap: buf.get_u8(),
        xpa_bias_lvl: buf.get_u8(),
        tx_frame_to_data_start: buf.get_u8(),
        tx_frame_to_pa_on: buf.get_u8(),
        ht40_power_inc_for_pdadc: buf.get_u8(),
        bsw_atten: bytes_array(buf),
        bsw_margin: bytes_array(buf),
        sw_settle_ht40: buf.get_u8(),
        version: buf.get_u8(),
        db1: buf.get_u8(),
        db2: buf.get_u8(),
        ob_cck: buf.get_u8(),
        ob_psk: buf.get_u8(),
        ob_qam: buf.get_u8(),
        ob_pal_off: buf.get_u8(),
        future: bytes_array(buf),
        spur_chans: [(); MODAL_SPURS].map(|()| SpurChannel {
            chan: buf.get_u16_ne(),
            range_low: buf.get_u8(),
            range_high: buf.get_u8(),
        }),
    }
}

fn decode_cal_pier(buf: &mut Bytes) -> CalPierData {
    CalPierData {
        pwr_pdg: [(); PD_GAINS].map(|()| bytes_array(buf)),
        vpd_pdg: [(); PD_GAINS].map(|()| bytes_array(buf)),
        pcdac: [(); PD_GAINS].map(|()| bytes_array(buf)),
        empty: [(); PD_GAINS].map(|()| bytes_array(buf)),
    }
}

fn decode_target_leg(buf: &mut Bytes) -> TargetPowerLegacy {
    TargetPowerLegacy {
        channel: buf.get_u8(),
        power_x2: bytes_array(buf),
    }
}

fn decode_target_ht(buf: &mut Bytes) -> TargetPowerHt {
    TargetPowerHt {
        channel: buf.get_u8(),
        power_x2: bytes_array(buf),
    }
}

fn decode_ctl(buf: &mut Bytes) -> CtlData {
    CtlData {
        edges: [(); MAX_CHAINS].map(|()| {
            [(); NUM_BAND_EDGES].map(|()| CtlEdge {
                channel: buf.get_u8(),
                ctl: buf.get_u8(),
            })
        }),
    }
}

fn bytes_array<const N: usize>(buf: &mut Bytes) -> [u8; N] {
    let mut out = [0u8; N];
    buf.copy_to_slice(&mut out);
    out
}

fn signed_array<const N: usize>(buf: &mut Bytes) -> [i8; N] {
    bytes_array::<N>(buf).map(|b| i8::from_ne_bytes([b]))
}
