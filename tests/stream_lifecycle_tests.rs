use std::sync::Arc;

use alsa_hal::audio::driver::mock::{MockControlBackend, MockPcmDriver, MockUseCaseManager};
use alsa_hal::audio::{AudioHardware, DeviceMask, SampleFormat, SetOutcome};

/// Test stream open/close/standby lifecycle against the mock drivers
#[cfg(test)]
mod stream_lifecycle_tests {
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
    fn test_speaker_playback_opens_unadjusted() {
        let (hal, pcm, ucm, _) = create_test_hal();

        let (stream, outcome) = hal
            .open_output_stream(DeviceMask::SPEAKER, SampleFormat::S16Le, 2, 44100)
            .expect("speaker playback should open");

        assert_eq!(outcome, SetOutcome::Accepted, "44100/2/S16 needs no adjustment");
        assert_eq!(stream.sample_rate(), 44100);
        assert_eq!(stream.channels(), 2);
        assert_eq!(stream.latency_us(), 24000);
        // 2048 frames of 16-bit stereo
        assert_eq!(stream.buffer_size(), 2048 * 4);
        assert_eq!(stream.use_case(), "hifi");
        assert_eq!(pcm.open_count(), 1, "one PCM session for one stream");
        assert_eq!(ucm.bound_use_cases(), vec!["hifi"]);
    }

    #[test]
    fn test_open_then_close_leaves_no_residue() {
        let (hal, pcm, ucm, _) = create_test_hal();

        let (stream, _) = hal
            .open_output_stream(DeviceMask::SPEAKER, SampleFormat::S16Le, 2, 44100)
            .expect("open should succeed");
        assert_eq!(pcm.live_sessions().len(), 1);

        hal.close_output_stream(stream).expect("close should succeed");

        assert!(pcm.live_sessions().is_empty(), "close must close the session");
        assert!(ucm.bound_use_cases().is_empty(), "close must unbind the use case");
        let handles = hal.dump()["handles"].as_array().unwrap().len();
        assert_eq!(handles, 0, "registry must be back to its pre-open state");
    }

    #[test]
    fn test_zero_device_mask_fails_fast() {
        let (hal, pcm, _, _) = create_test_hal();

        let result = hal.open_output_stream(DeviceMask::empty(), SampleFormat::S16Le, 2, 44100);
        assert!(result.is_err(), "zero device mask is illegal for open");
        assert_eq!(pcm.open_count(), 0, "no driver call for an invalid request");

        // An input-only mask is equally unusable for playback.
        let result = hal.open_output_stream(DeviceMask::BUILTIN_MIC, SampleFormat::S16Le, 2, 44100);
        assert!(result.is_err(), "capture-only mask cannot open a playback stream");
    }

    #[test]
    fn test_unsupported_capture_rate_is_adjusted_not_rejected() {
        let (hal, _, _, _) = create_test_hal();

        let (stream, outcome) = hal
            .open_input_stream(DeviceMask::BUILTIN_MIC, SampleFormat::S16Le, 2, 48000)
            .expect("capture should still open with best-effort settings");

        assert_eq!(outcome, SetOutcome::Adjusted, "48 kHz capture is coerced");
        assert_eq!(stream.sample_rate(), 44100);
    }

    #[test]
    fn test_standby_then_resume_reproduces_configuration() {
        let (hal, pcm, _, _) = create_test_hal();

        let (mut stream, _) = hal
            .open_input_stream(DeviceMask::BUILTIN_MIC, SampleFormat::S16Le, 1, 16000)
            .expect("capture open");
        let first = pcm.last_session().expect("session exists");
        let negotiated = (stream.sample_rate(), stream.channels());

        stream.standby().expect("standby");
        assert!(first.is_closed(), "standby closes the hardware session");
        assert_eq!(
            hal.dump()["handles"].as_array().unwrap().len(),
            1,
            "standby keeps the handle"
        );

        // Next read resumes with identical parameters, no re-resolution.
        let mut buf = vec![0u8; 64];
        stream.read(&mut buf).expect("read resumes from standby");
        let resumed = pcm.last_session().expect("resumed session");
        assert!(!resumed.is_closed());
        assert_eq!(resumed.request().config.sample_rate, negotiated.0);
        assert_eq!(resumed.request().config.channels, negotiated.1);
        assert_eq!((stream.sample_rate(), stream.channels()), negotiated);

        hal.close_input_stream(stream).expect("close");
    }

    #[test]
    fn test_write_survives_underrun_with_full_count() {
        let (hal, pcm, _, _) = create_test_hal();

        let (mut stream, _) = hal
            .open_output_stream(DeviceMask::SPEAKER, SampleFormat::S16Le, 2, 44100)
            .expect("open");
        let session = pcm.last_session().unwrap();
        session.push_xrun(0);

        let buf = vec![0u8; 4096];
        let written = stream.write(&buf).expect("underrun must not fail the write");
        assert_eq!(written, buf.len(), "silence-fill semantics return the full count");
        assert_eq!(stream.underrun_count(), 1);
    }

    #[test]
    fn test_input_frames_lost_reads_and_clears() {
        let (hal, pcm, _, _) = create_test_hal();

        let (mut stream, _) = hal
            .open_input_stream(DeviceMask::BUILTIN_MIC, SampleFormat::S16Le, 2, 44100)
            .expect("open");
        let session = pcm.last_session().unwrap();
        session.push_xrun(128);

        let mut buf = vec![0u8; 256];
        stream.read(&mut buf).expect("read");

        assert_eq!(stream.get_input_frames_lost(), 128);
        assert_eq!(
            stream.get_input_frames_lost(),
            0,
            "second call with no intervening overrun must return 0"
        );
    }

    #[test]
    fn test_render_position_tracks_frames() {
        let (hal, _, _, _) = create_test_hal();

        let (mut stream, _) = hal
            .open_output_stream(DeviceMask::SPEAKER, SampleFormat::S16Le, 2, 44100)
            .expect("open");

        // 2048 frames of 16-bit stereo
        let buf = vec![0u8; 2048 * 4];
        stream.write(&buf).expect("write");
        let position = stream.get_render_position().expect("position");
        assert_eq!(position, 2048);

        stream.write(&buf).expect("write");
        let later = stream.get_render_position().expect("position");
        assert!(later >= position, "render position must not go backwards");
    }

    #[test]
    fn test_render_position_falls_back_without_driver_support() {
        let (hal, pcm, _, _) = create_test_hal();
        pcm.set_report_position(false);

        let (mut stream, _) = hal
            .open_output_stream(DeviceMask::SPEAKER, SampleFormat::S16Le, 2, 44100)
            .expect("open");
        let buf = vec![0u8; 1024 * 4];
        stream.write(&buf).expect("write");

        let position = stream.get_render_position().expect("fallback position");
        assert_eq!(position, 1024, "cumulative write counter stands in");
    }

    #[test]
    fn test_audio_effects_are_unsupported_on_capture() {
        let (hal, _, _, _) = create_test_hal();

        let (stream, _) = hal
            .open_input_stream(DeviceMask::BUILTIN_MIC, SampleFormat::S16Le, 2, 44100)
            .expect("open");

        assert!(stream.add_audio_effect(1).is_err());
        assert!(stream.remove_audio_effect(1).is_err());
    }

    #[test]
    fn test_volume_and_gain_reach_the_control_surface() {
        let (hal, _, _, control) = create_test_hal();

        let (out_stream, _) = hal
            .open_output_stream(DeviceMask::SPEAKER, SampleFormat::S16Le, 2, 44100)
            .expect("open output");
        out_stream.set_volume(1.0, 1.0).expect("volume");
        assert_eq!(control.last_value("Speaker Playback Volume"), Some(100));

        let (in_stream, _) = hal
            .open_input_stream(DeviceMask::BUILTIN_MIC, SampleFormat::S16Le, 2, 44100)
            .expect("open input");
        in_stream.set_gain(0.5).expect("gain");
        assert_eq!(control.last_value("Mic Capture Gain"), Some(50));
    }

    #[test]
    fn test_transport_refusal_surfaces_and_leaks_nothing() {
        let (hal, pcm, ucm, _) = create_test_hal();
        pcm.refuse("hifi");

        let result = hal.open_output_stream(DeviceMask::SPEAKER, SampleFormat::S16Le, 2, 44100);
        assert!(result.is_err(), "transport refusal must surface to the caller");
        assert!(ucm.bound_use_cases().is_empty(), "failed open unbinds the use case");
        assert_eq!(
            hal.dump()["handles"].as_array().unwrap().len(),
            0,
            "failed open leaves no handle behind"
        );
    }
}
