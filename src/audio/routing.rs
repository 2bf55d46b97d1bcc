// Routing policy: maps the facade's global state snapshot to the use case,
// sample format, and buffer geometry one stream handle should run with.
// Pure functions only; the facade owns all state and locking.

use crate::audio::types::{
    AudioMode, DeviceMask, DeviceSettings, SampleFormat, StreamConfig, StreamDirection,
};
use crate::types::*;

// Use-case names, the join key to the vendor use-case manager.
pub const USE_CASE_VOICE_CALL: &str = "voice-call";
pub const USE_CASE_VOIP: &str = "voip-call";
pub const USE_CASE_FM: &str = "fm-radio";
pub const USE_CASE_HIFI: &str = "hifi";
pub const USE_CASE_CAPTURE: &str = "capture";
pub const USE_CASE_LOW_POWER_PREFIX: &str = "hifi-lowpower";

/// Snapshot of the facade state the resolver consumes. Built under the coarse
/// lock; the resolver itself never touches shared state.
#[derive(Debug, Clone, Copy)]
pub struct RoutingContext {
    pub mode: AudioMode,
    pub devices: DeviceMask,
    pub voice_call_active: bool,
    pub fm_active: bool,
    pub voip_stream_count: u32,
    pub settings: DeviceSettings,
}

/// One resolved routing decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingPlan {
    pub use_case: String,
    pub config: StreamConfig,
    /// Duplex voice paths open a secondary rx session next to the primary.
    pub needs_rx: bool,
}

/// Rates the hardware frontend accepts for capture.
pub const SUPPORTED_INPUT_RATES: &[u32] = &[8000, 11025, 12000, 16000, 22050, 24000, 32000, 44100];

/// Rates the hardware frontend accepts for playback.
pub const SUPPORTED_OUTPUT_RATES: &[u32] =
    &[8000, 11025, 12000, 16000, 22050, 24000, 32000, 44100, 48000];

pub fn supported_rates(direction: StreamDirection) -> &'static [u32] {
    match direction {
        StreamDirection::Output => SUPPORTED_OUTPUT_RATES,
        StreamDirection::Input => SUPPORTED_INPUT_RATES,
    }
}

/// Nearest supported rate by absolute distance, ties toward the lower rate.
pub fn nearest_supported_rate(rate: u32, direction: StreamDirection) -> u32 {
    let rates = supported_rates(direction);
    let mut best = rates[0];
    for &candidate in rates {
        let d_candidate = candidate.abs_diff(rate);
        let d_best = best.abs_diff(rate);
        if d_candidate < d_best || (d_candidate == d_best && candidate < best) {
            best = candidate;
        }
    }
    best
}

/// Resolve the routing decision for one stream. Priority ladder, first match
/// wins: voice call, then VoIP, then FM, then the generic use case for the
/// stream's direction.
pub fn resolve(
    ctx: &RoutingContext,
    direction: StreamDirection,
    requested_rate: u32,
    requested_channels: u32,
) -> RoutingPlan {
    if ctx.voice_call_active || ctx.mode == AudioMode::InCall {
        return RoutingPlan {
            use_case: USE_CASE_VOICE_CALL.to_string(),
            config: StreamConfig {
                format: SampleFormat::S16Le,
                channels: VOICE_CHANNELS,
                sample_rate: VOICE_SAMPLE_RATE,
                buffer_size: VOICE_BUFFER_SIZE,
                period_size: VOICE_BUFFER_SIZE / 4,
                latency_us: VOICE_LATENCY_US,
            },
            needs_rx: true,
        };
    }

    if ctx.voip_stream_count > 0 || ctx.mode == AudioMode::InCommunication {
        // The caller picks the VoIP rate class; buffer geometry follows it.
        let (rate, buffer) = if requested_rate >= VOIP_SAMPLE_RATE_16K {
            (VOIP_SAMPLE_RATE_16K, VOIP_BUFFER_SIZE_16K)
        } else {
            (VOIP_SAMPLE_RATE_8K, VOIP_BUFFER_SIZE_8K)
        };
        let latency = match direction {
            StreamDirection::Output => VOIP_PLAYBACK_LATENCY_US,
            StreamDirection::Input => VOIP_RECORD_LATENCY_US,
        };
        return RoutingPlan {
            use_case: USE_CASE_VOIP.to_string(),
            config: StreamConfig {
                format: SampleFormat::S16Le,
                channels: VOIP_CHANNELS,
                sample_rate: rate,
                buffer_size: buffer,
                period_size: buffer / 4,
                latency_us: latency,
            },
            needs_rx: true,
        };
    }

    if ctx.fm_active && direction == StreamDirection::Output {
        return RoutingPlan {
            use_case: USE_CASE_FM.to_string(),
            config: StreamConfig {
                format: SampleFormat::S16Le,
                channels: DEFAULT_CHANNELS,
                sample_rate: DEFAULT_SAMPLE_RATE,
                buffer_size: FM_BUFFER_SIZE,
                period_size: FM_BUFFER_SIZE / 4,
                latency_us: PLAYBACK_LATENCY_US,
            },
            needs_rx: false,
        };
    }

    match direction {
        StreamDirection::Output => RoutingPlan {
            use_case: USE_CASE_HIFI.to_string(),
            config: StreamConfig {
                format: SampleFormat::S16Le,
                channels: DEFAULT_CHANNELS,
                sample_rate: DEFAULT_SAMPLE_RATE,
                buffer_size: DEFAULT_BUFFER_SIZE,
                period_size: DEFAULT_BUFFER_SIZE / 4,
                latency_us: PLAYBACK_LATENCY_US,
            },
            needs_rx: false,
        },
        StreamDirection::Input => RoutingPlan {
            use_case: USE_CASE_CAPTURE.to_string(),
            config: StreamConfig {
                format: SampleFormat::S16Le,
                channels: requested_channels.clamp(1, 2),
                sample_rate: DEFAULT_SAMPLE_RATE,
                buffer_size: DEFAULT_IN_BUFFER_SIZE,
                period_size: DEFAULT_IN_BUFFER_SIZE / 4,
                latency_us: RECORD_LATENCY_US,
            },
            needs_rx: false,
        },
    }
}

/// Configuration a live handle for `use_case` should run with during a global
/// re-route. Priority use cases dictate their configuration; generic handles
/// keep whatever they negotiated (only their device binding moves), so `None`
/// means "preserve the handle's current configuration".
pub fn config_for_use_case(
    use_case: &str,
    direction: StreamDirection,
    current_rate: u32,
) -> Option<StreamConfig> {
    match use_case {
        USE_CASE_VOICE_CALL => Some(StreamConfig {
            format: SampleFormat::S16Le,
            channels: VOICE_CHANNELS,
            sample_rate: VOICE_SAMPLE_RATE,
            buffer_size: VOICE_BUFFER_SIZE,
            period_size: VOICE_BUFFER_SIZE / 4,
            latency_us: VOICE_LATENCY_US,
        }),
        USE_CASE_VOIP => {
            let (rate, buffer) = if current_rate >= VOIP_SAMPLE_RATE_16K {
                (VOIP_SAMPLE_RATE_16K, VOIP_BUFFER_SIZE_16K)
            } else {
                (VOIP_SAMPLE_RATE_8K, VOIP_BUFFER_SIZE_8K)
            };
            let latency = match direction {
                StreamDirection::Output => VOIP_PLAYBACK_LATENCY_US,
                StreamDirection::Input => VOIP_RECORD_LATENCY_US,
            };
            Some(StreamConfig {
                format: SampleFormat::S16Le,
                channels: VOIP_CHANNELS,
                sample_rate: rate,
                buffer_size: buffer,
                period_size: buffer / 4,
                latency_us: latency,
            })
        }
        USE_CASE_FM => Some(StreamConfig {
            format: SampleFormat::S16Le,
            channels: DEFAULT_CHANNELS,
            sample_rate: DEFAULT_SAMPLE_RATE,
            buffer_size: FM_BUFFER_SIZE,
            period_size: FM_BUFFER_SIZE / 4,
            latency_us: PLAYBACK_LATENCY_US,
        }),
        _ => None,
    }
}

/// Dedicated low-power playback plan, keyed by the caller's session id. This
/// path bypasses the priority ladder and coexists with the regular playback
/// handle.
pub fn low_power_plan(session_id: i32) -> RoutingPlan {
    let mut use_case = format!("{}-{}", USE_CASE_LOW_POWER_PREFIX, session_id);
    use_case.truncate(USE_CASE_NAME_MAX);
    RoutingPlan {
        use_case,
        config: StreamConfig {
            format: SampleFormat::S16Le,
            channels: DEFAULT_CHANNELS,
            sample_rate: DEFAULT_SAMPLE_RATE,
            buffer_size: DEFAULT_BUFFER_SIZE,
            period_size: DEFAULT_BUFFER_SIZE / 4,
            latency_us: PLAYBACK_LATENCY_US,
        },
        needs_rx: false,
    }
}

/// Input buffer size in bytes for a requested configuration, or 0 if the
/// combination is unsupported. The zero sentinel is the contract; this call
/// never fails.
pub fn input_buffer_size(sample_rate: u32, format: SampleFormat, channels: u32) -> usize {
    if format != SampleFormat::S16Le {
        return 0;
    }
    if !(1..=2).contains(&channels) {
        return 0;
    }
    if !SUPPORTED_INPUT_RATES.contains(&sample_rate) {
        return 0;
    }
    let rate_multiple = (sample_rate / 8000).max(1);
    (DEFAULT_IN_BUFFER_SIZE * rate_multiple * channels * format.bytes_per_sample()) as usize
}
