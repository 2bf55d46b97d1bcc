use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// Audio mode as reported by the surrounding framework
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioMode {
    Normal,
    Ringtone,
    /// Circuit-switched voice call in progress
    InCall,
    /// VoIP call in progress
    InCommunication,
}

impl Default for AudioMode {
    fn default() -> Self {
        AudioMode::Normal
    }
}

/// PCM sample format on the hardware path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleFormat {
    S8,
    S16Le,
    S24Le,
}

impl SampleFormat {
    pub fn bytes_per_sample(self) -> u32 {
        match self {
            SampleFormat::S8 => 1,
            SampleFormat::S16Le => 2,
            SampleFormat::S24Le => 4, // 24-bit samples travel in 32-bit slots
        }
    }
}

impl Default for SampleFormat {
    fn default() -> Self {
        SampleFormat::S16Le
    }
}

/// Stream direction relative to the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamDirection {
    Output,
    Input,
}

bitflags! {
    /// Bitset of physical routing endpoints. Output endpoints occupy the low
    /// half-word, capture endpoints the high half-word. An empty mask means
    /// "no device" and is invalid input to open/route operations.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DeviceMask: u32 {
        const EARPIECE            = 0x0000_0001;
        const SPEAKER             = 0x0000_0002;
        const WIRED_HEADSET       = 0x0000_0004;
        const WIRED_HEADPHONE     = 0x0000_0008;
        const BLUETOOTH_SCO       = 0x0000_0010;
        const BLUETOOTH_SCO_HEADSET = 0x0000_0020;
        const BLUETOOTH_A2DP      = 0x0000_0040;
        const AUX_DIGITAL         = 0x0000_0080;
        const FM_RADIO            = 0x0000_0100;

        const BUILTIN_MIC         = 0x0001_0000;
        const BLUETOOTH_SCO_MIC   = 0x0002_0000;
        const WIRED_HEADSET_MIC   = 0x0004_0000;
        const BACK_MIC            = 0x0008_0000;
    }
}

impl DeviceMask {
    /// True if the mask selects any capture endpoint.
    pub fn has_input(self) -> bool {
        self.bits() & 0xFFFF_0000 != 0
    }

    /// True if the mask selects any output endpoint.
    pub fn has_output(self) -> bool {
        self.bits() & 0x0000_FFFF != 0
    }

    /// The output-endpoint half of the mask.
    pub fn output_devices(self) -> DeviceMask {
        DeviceMask::from_bits_truncate(self.bits() & 0x0000_FFFF)
    }

    /// The capture-endpoint half of the mask.
    pub fn input_devices(self) -> DeviceMask {
        DeviceMask::from_bits_truncate(self.bits() & 0xFFFF_0000)
    }
}

bitflags! {
    /// Device-settings flag word holding accessibility and voice-path toggles
    /// pushed down from the settings applications. The TTY bits are mutually
    /// exclusive; use [`DeviceSettings::set_tty`] rather than inserting them
    /// directly.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DeviceSettings: u32 {
        const ANC      = 0x0000_0001;
        const DUAL_MIC = 0x0000_0002;
        const TTY_OFF  = 0x0000_0010;
        const TTY_FULL = 0x0000_0020;
        const TTY_VCO  = 0x0000_0040;
        const TTY_HCO  = 0x0000_0080;
    }
}

/// Mask clearing all TTY bits while preserving everything else.
const TTY_CLEAR: u32 = 0xFFFF_FF0F;

impl DeviceSettings {
    pub fn set_tty(&mut self, mode: TtyMode) {
        *self = DeviceSettings::from_bits_retain(self.bits() & TTY_CLEAR);
        self.insert(match mode {
            TtyMode::Off => DeviceSettings::TTY_OFF,
            TtyMode::Full => DeviceSettings::TTY_FULL,
            TtyMode::Vco => DeviceSettings::TTY_VCO,
            TtyMode::Hco => DeviceSettings::TTY_HCO,
        });
    }

    pub fn tty(self) -> TtyMode {
        if self.contains(DeviceSettings::TTY_FULL) {
            TtyMode::Full
        } else if self.contains(DeviceSettings::TTY_VCO) {
            TtyMode::Vco
        } else if self.contains(DeviceSettings::TTY_HCO) {
            TtyMode::Hco
        } else {
            TtyMode::Off
        }
    }
}

impl Default for DeviceSettings {
    fn default() -> Self {
        DeviceSettings::TTY_OFF
    }
}

/// TTY relay mode for the voice path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TtyMode {
    Off,
    Full,
    Vco,
    Hco,
}

impl TtyMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TtyMode::Off => "tty_off",
            TtyMode::Full => "tty_full",
            TtyMode::Vco => "tty_vco",
            TtyMode::Hco => "tty_hco",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "tty_off" => Some(TtyMode::Off),
            "tty_full" => Some(TtyMode::Full),
            "tty_vco" => Some(TtyMode::Vco),
            "tty_hco" => Some(TtyMode::Hco),
            _ => None,
        }
    }
}

/// Dual-mic beamforming orientation, forwarded to the control backend as a
/// string control value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FluenceMode {
    Endfire,
    Broadside,
}

impl FluenceMode {
    pub fn as_str(self) -> &'static str {
        match self {
            FluenceMode::Endfire => "endfire",
            FluenceMode::Broadside => "broadside",
        }
    }
}

/// Negotiated hardware configuration for one stream handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfig {
    pub format: SampleFormat,
    pub channels: u32,
    pub sample_rate: u32,
    /// Hardware buffer size in frames
    pub buffer_size: u32,
    /// Period (interrupt interval) in frames
    pub period_size: u32,
    /// Latency budget in microseconds
    pub latency_us: u32,
}

impl StreamConfig {
    /// Buffer size in bytes for the negotiated format.
    pub fn buffer_bytes(&self) -> usize {
        (self.buffer_size * self.channels * self.format.bytes_per_sample()) as usize
    }

    /// Bytes per frame for the negotiated format.
    pub fn frame_bytes(&self) -> usize {
        (self.channels * self.format.bytes_per_sample()) as usize
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            format: SampleFormat::S16Le,
            channels: DEFAULT_CHANNELS,
            sample_rate: DEFAULT_SAMPLE_RATE,
            buffer_size: DEFAULT_BUFFER_SIZE,
            period_size: DEFAULT_BUFFER_SIZE / 4,
            latency_us: PLAYBACK_LATENCY_US,
        }
    }
}
