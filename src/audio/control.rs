// Thin synchronous accessors over the hardware control surface. Two layers,
// matching how the driver exposes them: raw named controls (MixerControl) and
// device-scoped volume/gain/mute helpers (Mixer).

use std::sync::Arc;

use tracing::debug;

use crate::audio::driver::ControlBackend;
use crate::audio::error::Result;
use crate::audio::types::DeviceMask;

// Control names the voice/routing paths poke. The backend owns the mapping to
// actual kernel controls.
pub const CTL_VOICE_RX_VOLUME: &str = "Voice Rx Volume";
pub const CTL_VOIP_RX_VOLUME: &str = "Voip Rx Volume";
pub const CTL_VOICE_TX_MUTE: &str = "Voice Tx Mute";
pub const CTL_VOIP_TX_MUTE: &str = "Voip Tx Mute";
pub const CTL_FM_VOLUME: &str = "FM Volume";
pub const CTL_LPA_RX_VOLUME: &str = "LPA RX Volume";
pub const CTL_MASTER_VOLUME: &str = "Master Playback Volume";
pub const CTL_MASTER_GAIN: &str = "Master Capture Gain";
pub const CTL_FLUENCE: &str = "Fluence";
pub const CTL_ANC: &str = "ANC Enable";
pub const CTL_TTY_MODE: &str = "TTY Mode";
pub const CTL_WIDE_VOICE: &str = "Widevoice Enable";
pub const CTL_BTSCO_RATE: &str = "BTSCO SampleRate";
pub const CTL_ACOUSTIC_PROFILE: &str = "Acoustic Profile";

/// Raw named-control accessor
#[derive(Clone)]
pub struct MixerControl {
    backend: Arc<dyn ControlBackend>,
}

impl MixerControl {
    pub fn new(backend: Arc<dyn ControlBackend>) -> Self {
        Self { backend }
    }

    pub fn get(&self, name: &str, index: u32) -> Result<i64> {
        Ok(self.backend.get(name, index)?)
    }

    pub fn set(&self, name: &str, value: i64, index: Option<u32>) -> Result<()> {
        debug!(control = name, value, "control set");
        Ok(self.backend.set(name, value, index)?)
    }

    pub fn set_string(&self, name: &str, value: &str) -> Result<()> {
        debug!(control = name, value, "control set");
        Ok(self.backend.set_string(name, value)?)
    }
}

/// Volume scale the control surface speaks: percent of full scale.
fn percent(volume: f32) -> i64 {
    // Callers clamp to [0.0, 1.0] by contract; out-of-range values propagate.
    (volume * 100.0) as i64
}

/// Playback volume control for the dominant endpoint in a mask.
fn playback_volume_control(devices: DeviceMask) -> &'static str {
    if devices.intersects(DeviceMask::EARPIECE) {
        "Earpiece Playback Volume"
    } else if devices.intersects(DeviceMask::WIRED_HEADSET | DeviceMask::WIRED_HEADPHONE) {
        "Headphone Playback Volume"
    } else if devices
        .intersects(DeviceMask::BLUETOOTH_SCO | DeviceMask::BLUETOOTH_SCO_HEADSET | DeviceMask::BLUETOOTH_A2DP)
    {
        "Bluetooth Playback Volume"
    } else if devices.intersects(DeviceMask::FM_RADIO) {
        CTL_FM_VOLUME
    } else {
        "Speaker Playback Volume"
    }
}

fn capture_gain_control(devices: DeviceMask) -> &'static str {
    if devices.intersects(DeviceMask::BLUETOOTH_SCO_MIC) {
        "Bluetooth Capture Gain"
    } else if devices.intersects(DeviceMask::WIRED_HEADSET_MIC) {
        "Headset Capture Gain"
    } else {
        "Mic Capture Gain"
    }
}

/// Device-scoped volume/gain/mute helpers over [`MixerControl`]
#[derive(Clone)]
pub struct Mixer {
    control: MixerControl,
}

impl Mixer {
    pub fn new(control: MixerControl) -> Self {
        Self { control }
    }

    pub fn control(&self) -> &MixerControl {
        &self.control
    }

    pub fn set_master_volume(&self, volume: f32) -> Result<()> {
        self.control.set(CTL_MASTER_VOLUME, percent(volume), None)
    }

    pub fn set_master_gain(&self, gain: f32) -> Result<()> {
        self.control.set(CTL_MASTER_GAIN, percent(gain), None)
    }

    /// Per-device stereo playback volume. Index 0 is left, 1 is right.
    pub fn set_volume(&self, devices: DeviceMask, left: f32, right: f32) -> Result<()> {
        let name = playback_volume_control(devices);
        self.control.set(name, percent(left), Some(0))?;
        self.control.set(name, percent(right), Some(1))
    }

    pub fn set_gain(&self, devices: DeviceMask, gain: f32) -> Result<()> {
        self.control.set(capture_gain_control(devices), percent(gain), None)
    }

    pub fn set_capture_mute(&self, devices: DeviceMask, muted: bool) -> Result<()> {
        let name = capture_gain_control(devices);
        self.control.set(name, if muted { 0 } else { 100 }, None)
    }

    pub fn capture_mute(&self, devices: DeviceMask) -> Result<bool> {
        Ok(self.control.get(capture_gain_control(devices), 0)? == 0)
    }

    pub fn set_playback_mute(&self, devices: DeviceMask, muted: bool) -> Result<()> {
        let name = playback_volume_control(devices);
        self.control.set(name, if muted { 0 } else { 100 }, None)
    }

    pub fn playback_mute(&self, devices: DeviceMask) -> Result<bool> {
        Ok(self.control.get(playback_volume_control(devices), 0)? == 0)
    }
}
