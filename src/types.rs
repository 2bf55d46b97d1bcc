// Crate-wide constants shared by the routing resolver, stream negotiation,
// and the hardware facade.

/// Default playback sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;
/// Default playback/capture channel count.
pub const DEFAULT_CHANNELS: u32 = 2;

/// Circuit-switched voice path sample rate in Hz.
pub const VOICE_SAMPLE_RATE: u32 = 8000;
pub const VOICE_CHANNELS: u32 = 1;

/// Latency budgets in microseconds. These are routing decisions, not
/// measurements; the output stream reports them verbatim.
pub const PLAYBACK_LATENCY_US: u32 = 24000;
pub const RECORD_LATENCY_US: u32 = 96000;
pub const VOICE_LATENCY_US: u32 = 85333;
pub const VOIP_PLAYBACK_LATENCY_US: u32 = 6400;
pub const VOIP_RECORD_LATENCY_US: u32 = 6400;

/// Hardware buffer geometry in frames.
pub const DEFAULT_BUFFER_SIZE: u32 = 2048;
pub const DEFAULT_IN_BUFFER_SIZE: u32 = 320;
pub const FM_BUFFER_SIZE: u32 = 1024;
pub const VOICE_BUFFER_SIZE: u32 = 320;

pub const VOIP_SAMPLE_RATE_8K: u32 = 8000;
pub const VOIP_SAMPLE_RATE_16K: u32 = 16000;
pub const VOIP_CHANNELS: u32 = 1;
pub const VOIP_BUFFER_SIZE_8K: u32 = 320;
pub const VOIP_BUFFER_SIZE_16K: u32 = 640;

/// Use-case names are passed verbatim to the vendor use-case manager, which
/// stores them in a fixed 25-byte field.
pub const USE_CASE_NAME_MAX: usize = 24;

// Keys recognized by the global and per-stream parameter interfaces.
// Unknown keys are ignored, never rejected.
pub const DUALMIC_KEY: &str = "dualmic_enabled";
pub const ANC_KEY: &str = "anc_enabled";
pub const TTY_MODE_KEY: &str = "tty_mode";
pub const BT_SAMPLERATE_KEY: &str = "bt_samplerate";
pub const BT_HEADSET_VGS_KEY: &str = "bt_headset_vgs";
pub const WIDE_VOICE_KEY: &str = "wide_voice_enable";
pub const ROUTING_KEY: &str = "routing";
