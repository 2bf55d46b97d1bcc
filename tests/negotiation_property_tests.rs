use alsa_hal::audio::routing::{resolve, supported_rates, RoutingContext};
use alsa_hal::audio::stream::negotiate_config;
use alsa_hal::audio::types::{
    AudioMode, DeviceMask, DeviceSettings, SampleFormat, StreamDirection,
};
use alsa_hal::audio::SetOutcome;

use proptest::prelude::*;

fn idle_context() -> RoutingContext {
    RoutingContext {
        mode: AudioMode::Normal,
        devices: DeviceMask::SPEAKER,
        voice_call_active: false,
        fm_active: false,
        voip_stream_count: 0,
        settings: DeviceSettings::default(),
    }
}

fn any_format() -> impl Strategy<Value = SampleFormat> {
    prop_oneof![
        Just(SampleFormat::S8),
        Just(SampleFormat::S16Le),
        Just(SampleFormat::S24Le),
    ]
}

fn any_direction() -> impl Strategy<Value = StreamDirection> {
    prop_oneof![Just(StreamDirection::Output), Just(StreamDirection::Input)]
}

proptest! {
    /// Negotiation never yields a tuple outside the declared supported set:
    /// the request is either accepted unchanged or rewritten onto it.
    #[test]
    fn negotiated_tuple_is_always_supported(
        rate in 1000u32..200_000,
        channels in 0u32..9,
        format in any_format(),
        direction in any_direction(),
    ) {
        let plan = resolve(&idle_context(), direction, rate, channels);
        let (config, outcome) = negotiate_config(&plan, direction, format, channels, rate);

        prop_assert!(supported_rates(direction).contains(&config.sample_rate));
        prop_assert!((1..=2).contains(&config.channels));
        prop_assert_eq!(config.format, SampleFormat::S16Le);

        // An accepted outcome means the request really was honored verbatim.
        if outcome == SetOutcome::Accepted {
            prop_assert_eq!(config.sample_rate, rate);
            prop_assert_eq!(config.channels, channels);
            prop_assert_eq!(config.format, format);
        }
    }

    /// A supported request is reported as accepted, with no silent rewrite.
    #[test]
    fn supported_requests_pass_unchanged(
        rate_index in 0usize..8,
        channels in 1u32..3,
        direction in any_direction(),
    ) {
        let rate = supported_rates(direction)[rate_index];
        let plan = resolve(&idle_context(), direction, rate, channels);
        let (config, outcome) =
            negotiate_config(&plan, direction, SampleFormat::S16Le, channels, rate);

        prop_assert_eq!(outcome, SetOutcome::Accepted);
        prop_assert_eq!(config.sample_rate, rate);
        prop_assert_eq!(config.channels, channels);
    }
}
