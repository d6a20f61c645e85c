//! ## irrbloss-frames::mgmt
//! **Management frame encoders**
//!
//! Probe request, authentication, association request, beacon and the
//! silence-filling noise probe. Element presence and ordering is conditioned
//! on the device's generation and platform so the synthesized population
//! decomposes into believable hardware eras under IE fingerprinting.

use bytes::Bytes;
use rand::Rng;

use irrbloss_core::band::Band;
use irrbloss_core::device::{DeviceGeneration, Platform, VirtualDevice};
use irrbloss_core::mac::MacAddr;

use crate::elements::{
    rates_for, APPLE_VENDOR, ELEM_DS_PARAMETER, ELEM_EXTENDED_CAPABILITIES, ELEM_HT_CAPABILITIES,
    ELEM_HT_OPERATION, ELEM_RSN, ELEM_SSID, ELEM_SUPPORTED_RATES, ELEM_VENDOR_SPECIFIC,
    ELEM_VHT_CAPABILITIES, ELEM_VHT_OPERATION, EXT_CAPS_ANDROID, EXT_CAPS_APPLE,
    EXT_HE_CAPABILITIES, HE_CAPS, HT_CAPS, RATES_5G, RATES_LEGACY, RSN_WPA2_PSK, VHT_CAPS,
    WFA_VENDOR,
};
use crate::header::push_header;
use crate::writer::{FrameError, FrameWriter};

/// SSID carried by a probe request. Choosing between a directed name and the
/// wildcard is the caller's policy; the encoder only serializes it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProbeSsid {
    Wildcard,
    Directed(String),
}

/// Directed or wildcard probe request from one virtual device.
///
/// Element order: SSID, rates, DS parameter, Apple extended capabilities
/// (iOS, ahead of HT), HT, VHT (non-Legacy), Android-flavored extended
/// capabilities (non-iOS non-Legacy), HE (Modern), WFA vendor, Apple vendor
/// (iOS last).
pub fn probe_request(
    device: &VirtualDevice,
    ssid: &ProbeSsid,
    band: Band,
    channel: u8,
) -> Result<Bytes, FrameError> {
    let mut w = FrameWriter::new();
    push_header(
        &mut w,
        [0x40, 0x00],
        [0x00, 0x00],
        MacAddr::BROADCAST,
        device.mac,
        MacAddr::BROADCAST,
        device.sequence.current(),
    )?;

    match ssid {
        ProbeSsid::Wildcard => w.element(ELEM_SSID, &[])?,
        ProbeSsid::Directed(name) => w.element(ELEM_SSID, name.as_bytes())?,
    }
    w.element(ELEM_SUPPORTED_RATES, rates_for(band, device.generation))?;
    w.element(ELEM_DS_PARAMETER, &[channel])?;

    let apple = device.platform == Platform::Ios;
    if apple {
        w.element(ELEM_EXTENDED_CAPABILITIES, &EXT_CAPS_APPLE)?;
    }
    w.element(ELEM_HT_CAPABILITIES, &HT_CAPS)?;
    if device.generation != DeviceGeneration::Legacy {
        w.element(ELEM_VHT_CAPABILITIES, &VHT_CAPS)?;
    }
    if !apple && device.generation != DeviceGeneration::Legacy {
        w.element(ELEM_EXTENDED_CAPABILITIES, &EXT_CAPS_ANDROID)?;
    }
    if device.generation == DeviceGeneration::Modern {
        w.ext_element(EXT_HE_CAPABILITIES, &HE_CAPS)?;
    }
    w.element(ELEM_VENDOR_SPECIFIC, &WFA_VENDOR)?;
    if apple {
        w.element(ELEM_VENDOR_SPECIFIC, &APPLE_VENDOR)?;
    }
    Ok(w.into_bytes())
}

/// Open-system authentication, first transaction, toward the device's
/// target BSSID.
pub fn authentication(device: &VirtualDevice) -> Result<Bytes, FrameError> {
    let mut w = FrameWriter::new();
    push_header(
        &mut w,
        [0xB0, 0x00],
        [0x00, 0x01],
        device.bssid_target,
        device.mac,
        device.bssid_target,
        device.sequence.current(),
    )?;
    // Algorithm 0 (open system), transaction sequence 1, status 0.
    w.put_slice(&[0x00, 0x00, 0x01, 0x00, 0x00, 0x00])?;
    Ok(w.into_bytes())
}

/// Association request with a WPA2-PSK RSN and era-conditioned capability
/// elements.
pub fn association_request(
    device: &VirtualDevice,
    ssid: &str,
    band: Band,
) -> Result<Bytes, FrameError> {
    let mut w = FrameWriter::new();
    push_header(
        &mut w,
        [0x00, 0x00],
        [0x00, 0x00],
        device.bssid_target,
        device.mac,
        device.bssid_target,
        device.sequence.current(),
    )?;
    // Capability info (ESS, privacy, short preamble/slot) and listen interval.
    w.put_slice(&[0x31, 0x04])?;
    w.put_slice(&[0x0A, 0x00])?;
    w.element(ELEM_SSID, ssid.as_bytes())?;
    w.element(ELEM_SUPPORTED_RATES, rates_for(band, device.generation))?;
    w.element(ELEM_RSN, &RSN_WPA2_PSK)?;
    w.element(ELEM_HT_CAPABILITIES, &HT_CAPS)?;
    if device.generation != DeviceGeneration::Legacy {
        w.element(ELEM_VHT_CAPABILITIES, &VHT_CAPS)?;
    }
    if device.generation == DeviceGeneration::Modern {
        w.ext_element(EXT_HE_CAPABILITIES, &HE_CAPS)?;
    }
    Ok(w.into_bytes())
}

/// Beacon for a synthetic AP. HT Operation goes out on both bands so
/// 2.4 GHz beacons read as 802.11n rather than bare 802.11g; VHT Operation
/// stays 5 GHz only.
pub fn beacon(
    ap_mac: MacAddr,
    ssid: &str,
    band: Band,
    channel: u8,
    seq: u16,
) -> Result<Bytes, FrameError> {
    let mut w = FrameWriter::new();
    push_header(
        &mut w,
        [0x80, 0x00],
        [0x00, 0x00],
        MacAddr::BROADCAST,
        ap_mac,
        ap_mac,
        seq,
    )?;
    // Zeroed timestamp, 100 TU interval, ESS + privacy capability.
    w.put_slice(&[0u8; 8])?;
    w.put_slice(&[0x64, 0x00])?;
    w.put_slice(&[0x31, 0x04])?;
    w.element(ELEM_SSID, ssid.as_bytes())?;
    let rates: &[u8] = match band {
        Band::FiveGhz => &RATES_5G,
        Band::TwoGhz => &RATES_LEGACY,
    };
    w.element(ELEM_SUPPORTED_RATES, rates)?;
    w.element(ELEM_DS_PARAMETER, &[channel])?;
    let mut ht_op = [0u8; 22];
    ht_op[0] = channel;
    w.element(ELEM_HT_OPERATION, &ht_op)?;
    if band == Band::FiveGhz {
        w.element(ELEM_VHT_OPERATION, &[0u8; 5])?;
    }
    Ok(w.into_bytes())
}

/// Anonymous probe used for silence filling: locally-administered random
/// source, either a short "hidden network" name or the wildcard, minimal
/// rate set, no capability elements. Cheap on purpose.
pub fn noise_probe<R: Rng>(rng: &mut R, band: Band) -> Result<Bytes, FrameError> {
    let mut w = FrameWriter::new();
    let mac = MacAddr::random_private(rng);
    let seq = rng.random_range(0..4096);
    push_header(
        &mut w,
        [0x40, 0x00],
        [0x00, 0x00],
        MacAddr::BROADCAST,
        mac,
        MacAddr::BROADCAST,
        seq,
    )?;
    if rng.random_range(0..100) < 40 {
        let len = rng.random_range(5..12usize);
        let mut name = [0u8; 11];
        for byte in name[..len].iter_mut() {
            *byte = rng.random_range(b'a'..b'z');
        }
        w.element(ELEM_SSID, &name[..len])?;
    } else {
        w.element(ELEM_SSID, &[])?;
    }
    let rates: &[u8] = match band {
        Band::FiveGhz => &RATES_5G,
        Band::TwoGhz => &RATES_LEGACY,
    };
    w.element(ELEM_SUPPORTED_RATES, rates)?;
    Ok(w.into_bytes())
}
