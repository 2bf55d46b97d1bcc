use std::sync::Arc;

use alsa_hal::audio::driver::mock::{MockControlBackend, MockPcmDriver, MockUseCaseManager};
use alsa_hal::audio::driver::ControlBackend;
use alsa_hal::audio::{AudioHardware, AudioMode, DeviceMask, HalError, SampleFormat};

/// Test the global parameter interface and its control-surface side effects
#[cfg(test)]
mod parameter_tests {
    use super::*;

    fn create_test_hal() -> (
        AudioHardware,
        Arc<MockPcmDriver>,
        Arc<MockUseCaseManager>,
        Arc<MockControlBackend>,
    ) {
        let pcm = Arc::new(MockPcmDriver::new());
        let ucm = Arc::new(MockUseCaseManager::new());
        let control = Arc::new(MockControlBackend::new());
        let hal = AudioHardware::new(pcm.clone(), ucm.clone(), control.clone());
        (hal, pcm, ucm, control)
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let (hal, _, _, _) = create_test_hal();
        hal.set_parameters("definitely_not_a_key=42;another=x")
            .expect("unknown keys must be ignored, not rejected");
    }

    #[test]
    fn test_tty_mode_round_trips() {
        let (hal, _, _, control) = create_test_hal();

        hal.set_parameters("tty_mode=tty_vco").expect("tty set");
        assert_eq!(control.last_string("TTY Mode"), Some("tty_vco".to_string()));
        assert_eq!(hal.get_parameters("tty_mode"), "tty_mode=tty_vco");

        // Garbage TTY values are ignored.
        hal.set_parameters("tty_mode=sideways").expect("ignored");
        assert_eq!(hal.get_parameters("tty_mode"), "tty_mode=tty_vco");
    }

    #[test]
    fn test_bt_keys_update_state_and_controls() {
        let (hal, _, _, control) = create_test_hal();

        hal.set_parameters("bt_samplerate=16000;bt_headset_vgs=on")
            .expect("bt keys");
        assert_eq!(control.last_value("BTSCO SampleRate"), Some(16000));
        assert_eq!(
            hal.get_parameters("bt_headset_vgs;bt_samplerate"),
            "bt_headset_vgs=on;bt_samplerate=16000"
        );

        hal.set_parameters("bt_headset_vgs=off").expect("bt vgs off");
        assert_eq!(hal.get_parameters("bt_headset_vgs"), "bt_headset_vgs=off");
    }

    #[test]
    fn test_dual_mic_drives_fluence_mode() {
        let (hal, _, _, control) = create_test_hal();

        hal.set_parameters("dualmic_enabled=true").expect("dual mic on");
        assert_eq!(control.last_string("Fluence"), Some("broadside".to_string()));
        assert_eq!(hal.get_parameters("dualmic_enabled"), "dualmic_enabled=true");

        hal.set_parameters("dualmic_enabled=false").expect("dual mic off");
        assert_eq!(control.last_string("Fluence"), Some("endfire".to_string()));
    }

    #[test]
    fn test_wide_voice_and_anc_toggle_controls() {
        let (hal, _, _, control) = create_test_hal();

        hal.set_parameters("wide_voice_enable=true;anc_enabled=true")
            .expect("toggles");
        assert_eq!(control.last_value("Widevoice Enable"), Some(1));
        assert_eq!(control.last_value("ANC Enable"), Some(1));

        hal.set_parameters("anc_enabled=false").expect("anc off");
        assert_eq!(control.last_value("ANC Enable"), Some(0));
    }

    #[test]
    fn test_routing_key_drives_global_routing() {
        let (hal, pcm, _, _) = create_test_hal();

        let (playback, _) = hal
            .open_output_stream(DeviceMask::SPEAKER, SampleFormat::S16Le, 2, 44100)
            .expect("playback open");
        let first = pcm.last_session().unwrap();

        let headphone = DeviceMask::WIRED_HEADPHONE.bits();
        hal.set_parameters(&format!("routing={}", headphone))
            .expect("routing change");
        assert!(first.is_closed(), "device change must rebind the playback path");
        assert_eq!(
            hal.get_parameters("routing"),
            format!("routing={}", headphone)
        );

        hal.close_output_stream(playback).expect("close");
    }

    #[test]
    fn test_mic_mute_targets_the_active_path() {
        let (hal, _, _, control) = create_test_hal();

        hal.set_mic_mute(true).expect("mute");
        assert!(hal.mic_mute());
        assert_eq!(control.last_value("Voice Tx Mute"), Some(1));

        // In communication mode the VoIP knob is the one that matters.
        hal.set_mode(AudioMode::InCommunication).expect("voip mode");
        assert!(!hal.mic_mute(), "voip mute state is tracked separately");
        hal.set_mic_mute(true).expect("voip mute");
        assert_eq!(control.last_value("Voip Tx Mute"), Some(1));
    }

    #[test]
    fn test_voice_volume_picks_the_call_knob() {
        let (hal, _, _, control) = create_test_hal();

        hal.set_voice_volume(0.8).expect("voice volume");
        assert_eq!(control.last_value("Voice Rx Volume"), Some(80));

        hal.set_mode(AudioMode::InCommunication).expect("voip mode");
        hal.set_voice_volume(0.3).expect("voip volume");
        assert_eq!(control.last_value("Voip Rx Volume"), Some(30));
    }

    #[test]
    fn test_fm_and_lpa_volume_controls() {
        let (hal, _, _, control) = create_test_hal();
        hal.set_fm_volume(0.6).expect("fm volume");
        hal.set_lpa_volume(0.9).expect("lpa volume");
        assert_eq!(control.last_value("FM Volume"), Some(60));
        assert_eq!(control.last_value("LPA RX Volume"), Some(90));
    }

    #[test]
    fn test_input_buffer_size_contract() {
        let (hal, _, _, _) = create_test_hal();
        // Unsupported channel count returns the zero sentinel, not an error.
        assert_eq!(hal.get_input_buffer_size(44100, SampleFormat::S16Le, 4), 0);
        assert_eq!(hal.get_input_buffer_size(44100, SampleFormat::S8, 2), 0);
        assert_ne!(hal.get_input_buffer_size(44100, SampleFormat::S16Le, 2), 0);
    }
}

/// Collaborator failures must surface to the caller unmodified; the HAL never
/// retries or masks them
#[cfg(test)]
mod collaborator_failure_tests {
    use super::*;

    mockall::mock! {
        Control {}

        impl ControlBackend for Control {
            fn get(&self, name: &str, index: u32) -> anyhow::Result<i64>;
            fn set(&self, name: &str, value: i64, index: Option<u32>) -> anyhow::Result<()>;
            fn set_string(&self, name: &str, value: &str) -> anyhow::Result<()>;
        }
    }

    #[test]
    fn test_control_failure_is_surfaced_without_retry() {
        let mut control = MockControl::new();
        control
            .expect_set()
            .times(1)
            .returning(|_, _, _| Err(anyhow::anyhow!("EBUSY")));

        let hal = AudioHardware::new(
            Arc::new(MockPcmDriver::new()),
            Arc::new(MockUseCaseManager::new()),
            Arc::new(control),
        );

        let result = hal.set_parameters("wide_voice_enable=true");
        assert!(
            matches!(result, Err(HalError::Driver(_))),
            "control failure must propagate as a driver error"
        );
    }
}
