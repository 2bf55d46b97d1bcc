// Hardware facade: owns the handle registry and every piece of global routing
// state under one coarse lock, and turns framework lifecycle calls into
// ordered driver transitions.
//
// The lock guards metadata only. Stream transfers copy their session
// reference out under the lock and then run lock-free, so a long blocking
// write never stalls a routing change.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use serde_json::json;
use tracing::{error, info, warn};

use crate::audio::control::{
    Mixer, MixerControl, CTL_ANC, CTL_BTSCO_RATE, CTL_FLUENCE, CTL_FM_VOLUME, CTL_LPA_RX_VOLUME,
    CTL_TTY_MODE, CTL_VOICE_RX_VOLUME, CTL_VOICE_TX_MUTE, CTL_VOIP_RX_VOLUME, CTL_VOIP_TX_MUTE,
    CTL_WIDE_VOICE,
};
use crate::audio::driver::{ControlBackend, PcmDriver, PcmRequest, UseCaseManager};
use crate::audio::error::{HalError, Result, SetOutcome};
use crate::audio::handle::{Handle, HandleRegistry};
use crate::audio::params::ParameterMap;
use crate::audio::routing::{
    config_for_use_case, input_buffer_size, low_power_plan, resolve, RoutingContext,
    USE_CASE_FM, USE_CASE_VOICE_CALL, USE_CASE_VOIP,
};
use crate::audio::stream::ops::{negotiate_config, validate_devices, StreamOps};
use crate::audio::stream::{AudioInputStream, AudioOutputStream};
use crate::audio::types::{
    AudioMode, DeviceMask, DeviceSettings, FluenceMode, SampleFormat, StreamConfig,
    StreamDirection, TtyMode,
};
use crate::types::{
    ANC_KEY, BT_HEADSET_VGS_KEY, BT_SAMPLERATE_KEY, DEFAULT_CHANNELS, DEFAULT_SAMPLE_RATE,
    DUALMIC_KEY, ROUTING_KEY, TTY_MODE_KEY, VOICE_SAMPLE_RATE, WIDE_VOICE_KEY,
};

/// Global facade state. Every field is read and written only while the
/// facade's coarse lock is held; this is the sole source of truth the routing
/// resolver consumes.
pub(crate) struct HalState {
    pub mode: AudioMode,
    pub cur_device: DeviceMask,
    pub mic_mute: bool,
    pub voip_mic_mute: bool,
    pub voip_stream_count: u32,
    pub voice_call_active: bool,
    pub fm_active: bool,
    pub bt_vgs: bool,
    pub bt_samplerate: u32,
    pub wide_voice: bool,
    pub settings: DeviceSettings,
    pub registry: HandleRegistry,
    // The voice and FM paths have no framework stream object; the facade
    // itself holds their registry reference while they are active.
    voice_ref_held: bool,
    fm_ref_held: bool,
}

impl HalState {
    fn new() -> Self {
        Self {
            mode: AudioMode::Normal,
            cur_device: DeviceMask::empty(),
            mic_mute: false,
            voip_mic_mute: false,
            voip_stream_count: 0,
            voice_call_active: false,
            fm_active: false,
            bt_vgs: false,
            bt_samplerate: 8000,
            wide_voice: false,
            settings: DeviceSettings::default(),
            registry: HandleRegistry::new(),
            voice_ref_held: false,
            fm_ref_held: false,
        }
    }

    pub(crate) fn routing_context(&self) -> RoutingContext {
        RoutingContext {
            mode: self.mode,
            devices: self.cur_device,
            voice_call_active: self.voice_call_active,
            fm_active: self.fm_active,
            voip_stream_count: self.voip_stream_count,
            settings: self.settings,
        }
    }

    /// True while any VoIP activity should steer routing.
    fn voip_active(&self) -> bool {
        self.voip_stream_count > 0 || self.mode == AudioMode::InCommunication
    }

    /// Stream-close bookkeeping that must happen under the lock.
    pub(crate) fn note_stream_closed(&mut self, use_case: &str) {
        if use_case == USE_CASE_VOIP {
            self.voip_stream_count = self.voip_stream_count.saturating_sub(1);
            info!(remaining = self.voip_stream_count, "voip stream closed");
        }
    }
}

/// Shared interior of the facade. Streams hold an `Arc` of this as their
/// non-owning back-reference.
pub(crate) struct HalInner {
    state: Mutex<HalState>,
    pcm_driver: Arc<dyn PcmDriver>,
    ucm: Arc<dyn UseCaseManager>,
    mixer: Mixer,
}

impl HalInner {
    pub(crate) fn lock_state(&self) -> MutexGuard<'_, HalState> {
        self.state.lock()
    }

    pub(crate) fn mixer(&self) -> &Mixer {
        &self.mixer
    }

    /// Open the driver sessions for a handle: bind the use case first so the
    /// kernel routing path exists before the PCM starts, then the primary
    /// session, then the rx session for duplex paths. Any failure unwinds
    /// what was already opened.
    pub(crate) fn open_handle_sessions(&self, handle: &mut Handle) -> Result<()> {
        debug_assert!(!handle.is_opened(), "double open of {}", handle.use_case);
        let token = self.ucm.bind(&handle.use_case)?;
        let request = PcmRequest {
            use_case: handle.use_case.clone(),
            devices: handle.devices,
            direction: handle.direction,
            config: handle.config,
        };
        let pcm = match self.pcm_driver.open(&request) {
            Ok(session) => session,
            Err(e) => {
                self.ucm.unbind(token);
                return Err(e.into());
            }
        };
        let rx_pcm = if handle.needs_rx {
            let rx_request = PcmRequest {
                direction: match handle.direction {
                    StreamDirection::Output => StreamDirection::Input,
                    StreamDirection::Input => StreamDirection::Output,
                },
                ..request
            };
            match self.pcm_driver.open(&rx_request) {
                Ok(session) => Some(session),
                Err(e) => {
                    pcm.close();
                    self.ucm.unbind(token);
                    return Err(e.into());
                }
            }
        } else {
            None
        };
        handle.pcm = Some(pcm);
        handle.rx_pcm = rx_pcm;
        handle.uc_token = Some(token);
        info!(use_case = %handle.use_case, devices = ?handle.devices, "sessions opened");
        Ok(())
    }

    /// Close a handle's sessions and unbind its use case. Closing the session
    /// terminates any transfer still blocked on it; that is the transport's
    /// contract.
    pub(crate) fn close_handle_sessions(&self, handle: &mut Handle) {
        let (pcm, rx_pcm, token) = handle.take_sessions();
        if let Some(session) = pcm {
            session.close();
        }
        if let Some(session) = rx_pcm {
            session.close();
        }
        if let Some(token) = token {
            self.ucm.unbind(token);
        }
        info!(use_case = %handle.use_case, "sessions closed");
    }
}

/// Top-level hardware abstraction consumed by the audio framework
pub struct AudioHardware {
    inner: Arc<HalInner>,
}

impl AudioHardware {
    pub fn new(
        pcm_driver: Arc<dyn PcmDriver>,
        ucm: Arc<dyn UseCaseManager>,
        control: Arc<dyn ControlBackend>,
    ) -> Self {
        let mixer = Mixer::new(MixerControl::new(control));
        Self {
            inner: Arc::new(HalInner {
                state: Mutex::new(HalState::new()),
                pcm_driver,
                ucm,
                mixer,
            }),
        }
    }

    /// Construction wires every collaborator, so a live facade is always
    /// initialized; kept for the framework's probe sequence.
    pub fn init_check(&self) -> Result<()> {
        Ok(())
    }

    pub fn mode(&self) -> AudioMode {
        self.inner.lock_state().mode
    }

    /// Mode change from the framework. Re-resolves routing for every open
    /// handle; entering or leaving a call is what starts and stops the voice
    /// path.
    pub fn set_mode(&self, mode: AudioMode) -> Result<()> {
        let mut state = self.inner.lock_state();
        if state.mode == mode {
            return Ok(());
        }
        info!(?mode, "audio mode change");
        state.mode = mode;
        state.voice_call_active = mode == AudioMode::InCall;
        let device = state.cur_device;
        if device.is_empty() {
            // Nothing routed yet; the first stream open will pick this up.
            return Ok(());
        }
        self.do_routing_locked(&mut state, device)
    }

    // ------------------------------------------------------------------
    // Volume and mute

    /// Voice-call downlink volume, range [0.0, 1.0] by contract.
    pub fn set_voice_volume(&self, volume: f32) -> Result<()> {
        let state = self.inner.lock_state();
        let control = if state.voip_active() {
            CTL_VOIP_RX_VOLUME
        } else {
            CTL_VOICE_RX_VOLUME
        };
        self.inner.mixer.control().set(control, (volume * 100.0) as i64, None)
    }

    pub fn set_master_volume(&self, volume: f32) -> Result<()> {
        self.inner.mixer.set_master_volume(volume)
    }

    pub fn set_fm_volume(&self, volume: f32) -> Result<()> {
        self.inner
            .mixer
            .control()
            .set(CTL_FM_VOLUME, (volume * 100.0) as i64, None)
    }

    pub fn set_lpa_volume(&self, volume: f32) -> Result<()> {
        self.inner
            .mixer
            .control()
            .set(CTL_LPA_RX_VOLUME, (volume * 100.0) as i64, None)
    }

    pub fn set_mic_mute(&self, muted: bool) -> Result<()> {
        let mut state = self.inner.lock_state();
        if state.voip_active() {
            if state.voip_mic_mute != muted {
                state.voip_mic_mute = muted;
                self.inner
                    .mixer
                    .control()
                    .set(CTL_VOIP_TX_MUTE, muted as i64, None)?;
            }
        } else if state.mic_mute != muted {
            state.mic_mute = muted;
            self.inner
                .mixer
                .control()
                .set(CTL_VOICE_TX_MUTE, muted as i64, None)?;
        }
        Ok(())
    }

    pub fn mic_mute(&self) -> bool {
        let state = self.inner.lock_state();
        if state.voip_active() {
            state.voip_mic_mute
        } else {
            state.mic_mute
        }
    }

    // ------------------------------------------------------------------
    // Global parameters

    /// Global parameter set. Recognized keys update device settings and poke
    /// the control surface; `routing` re-routes every open handle. Unknown
    /// keys are ignored, never rejected.
    pub fn set_parameters(&self, key_value_pairs: &str) -> Result<()> {
        let params = ParameterMap::parse(key_value_pairs);
        let mut state = self.inner.lock_state();

        if let Some(value) = params.get(DUALMIC_KEY) {
            let enabled = value == "true";
            state.settings.set(DeviceSettings::DUAL_MIC, enabled);
            let fluence = if enabled {
                FluenceMode::Broadside
            } else {
                FluenceMode::Endfire
            };
            self.inner
                .mixer
                .control()
                .set_string(CTL_FLUENCE, fluence.as_str())?;
        }

        if let Some(value) = params.get(ANC_KEY) {
            let enabled = value == "true";
            if state.settings.contains(DeviceSettings::ANC) != enabled {
                state.settings.set(DeviceSettings::ANC, enabled);
                self.inner
                    .mixer
                    .control()
                    .set(CTL_ANC, enabled as i64, None)?;
                let device = state.cur_device;
                if !device.is_empty() {
                    self.do_routing_locked(&mut state, device)?;
                }
            }
        }

        if let Some(value) = params.get(TTY_MODE_KEY) {
            if let Some(mode) = TtyMode::parse(value) {
                state.settings.set_tty(mode);
                self.inner
                    .mixer
                    .control()
                    .set_string(CTL_TTY_MODE, mode.as_str())?;
            } else {
                warn!(value, "unrecognized tty mode ignored");
            }
        }

        if let Some(rate) = params.get_int(BT_SAMPLERATE_KEY) {
            state.bt_samplerate = rate as u32;
            self.inner.mixer.control().set(CTL_BTSCO_RATE, rate, None)?;
        }

        if let Some(value) = params.get(BT_HEADSET_VGS_KEY) {
            state.bt_vgs = value == "on";
        }

        if let Some(value) = params.get(WIDE_VOICE_KEY) {
            let enabled = value == "true";
            state.wide_voice = enabled;
            self.inner
                .mixer
                .control()
                .set(CTL_WIDE_VOICE, enabled as i64, None)?;
        }

        if let Some(raw) = params.get_int(ROUTING_KEY) {
            let devices = DeviceMask::from_bits_truncate(raw as u32);
            self.do_routing_locked(&mut state, devices)?;
        }

        Ok(())
    }

    /// Echo the current value for each recognized requested key.
    pub fn get_parameters(&self, keys: &str) -> String {
        let state = self.inner.lock_state();
        let mut reply = ParameterMap::new();
        for key in keys.split(';').map(|k| k.split_once('=').map_or(k, |(k, _)| k)) {
            match key {
                DUALMIC_KEY => reply.set(
                    DUALMIC_KEY,
                    state.settings.contains(DeviceSettings::DUAL_MIC).to_string(),
                ),
                ANC_KEY => reply.set(
                    ANC_KEY,
                    state.settings.contains(DeviceSettings::ANC).to_string(),
                ),
                TTY_MODE_KEY => reply.set(TTY_MODE_KEY, state.settings.tty().as_str()),
                BT_SAMPLERATE_KEY => {
                    reply.set(BT_SAMPLERATE_KEY, state.bt_samplerate.to_string())
                }
                BT_HEADSET_VGS_KEY => {
                    reply.set(BT_HEADSET_VGS_KEY, if state.bt_vgs { "on" } else { "off" })
                }
                WIDE_VOICE_KEY => reply.set(WIDE_VOICE_KEY, state.wide_voice.to_string()),
                ROUTING_KEY => reply.set(ROUTING_KEY, state.cur_device.bits().to_string()),
                _ => {}
            }
        }
        reply.encode()
    }

    /// Input buffer size in bytes for a requested configuration, 0 when the
    /// combination is unsupported.
    pub fn get_input_buffer_size(
        &self,
        sample_rate: u32,
        format: SampleFormat,
        channels: u32,
    ) -> usize {
        input_buffer_size(sample_rate, format, channels)
    }

    // ------------------------------------------------------------------
    // Stream lifecycle

    /// Open a playback stream. The request is negotiated to the nearest
    /// supported configuration rather than rejected; the returned outcome
    /// says whether anything was rewritten.
    pub fn open_output_stream(
        &self,
        devices: DeviceMask,
        format: SampleFormat,
        channels: u32,
        sample_rate: u32,
    ) -> Result<(AudioOutputStream, SetOutcome)> {
        validate_devices(devices, StreamDirection::Output)?;
        let mut state = self.inner.lock_state();
        let ctx = state.routing_context();
        let plan = resolve(&ctx, StreamDirection::Output, sample_rate, channels);
        let (config, outcome) =
            negotiate_config(&plan, StreamDirection::Output, format, channels, sample_rate);
        let is_voip = plan.use_case == USE_CASE_VOIP;
        self.open_stream_handle(
            &mut state,
            &plan.use_case,
            devices,
            StreamDirection::Output,
            config,
            plan.needs_rx,
        )?;
        if is_voip {
            state.voip_stream_count += 1;
            info!(count = state.voip_stream_count, "voip stream opened");
        }
        state.cur_device |= devices;
        drop(state);
        let ops = StreamOps::new(
            self.inner.clone(),
            StreamDirection::Output,
            plan.use_case,
            devices,
            config,
        );
        Ok((AudioOutputStream::new(ops), outcome))
    }

    pub fn close_output_stream(&self, mut stream: AudioOutputStream) -> Result<()> {
        stream.ops_mut().close()
    }

    /// Open a capture stream; same adjusted-not-rejected negotiation as the
    /// output side.
    pub fn open_input_stream(
        &self,
        devices: DeviceMask,
        format: SampleFormat,
        channels: u32,
        sample_rate: u32,
    ) -> Result<(AudioInputStream, SetOutcome)> {
        validate_devices(devices, StreamDirection::Input)?;
        let mut state = self.inner.lock_state();
        let ctx = state.routing_context();
        let plan = resolve(&ctx, StreamDirection::Input, sample_rate, channels);
        let (config, outcome) =
            negotiate_config(&plan, StreamDirection::Input, format, channels, sample_rate);
        let is_voip = plan.use_case == USE_CASE_VOIP;
        self.open_stream_handle(
            &mut state,
            &plan.use_case,
            devices,
            StreamDirection::Input,
            config,
            plan.needs_rx,
        )?;
        if is_voip {
            state.voip_stream_count += 1;
            info!(count = state.voip_stream_count, "voip stream opened");
        }
        state.cur_device |= devices;
        drop(state);
        let ops = StreamOps::new(
            self.inner.clone(),
            StreamDirection::Input,
            plan.use_case,
            devices,
            config,
        );
        Ok((AudioInputStream::new(ops), outcome))
    }

    pub fn close_input_stream(&self, mut stream: AudioInputStream) -> Result<()> {
        stream.ops_mut().close()
    }

    /// Open a dedicated low-power playback session, keyed by the caller's
    /// session id. Bypasses the routing priority ladder and coexists with the
    /// regular playback handle; like every other open path it renegotiates
    /// rather than failing on a mismatched format.
    pub fn open_output_session(
        &self,
        devices: DeviceMask,
        format: SampleFormat,
        session_id: i32,
    ) -> Result<(AudioOutputStream, SetOutcome)> {
        validate_devices(devices, StreamDirection::Output)?;
        let plan = low_power_plan(session_id);
        let (config, outcome) = negotiate_config(
            &plan,
            StreamDirection::Output,
            format,
            DEFAULT_CHANNELS,
            DEFAULT_SAMPLE_RATE,
        );
        let mut state = self.inner.lock_state();
        self.open_stream_handle(
            &mut state,
            &plan.use_case,
            devices,
            StreamDirection::Output,
            config,
            plan.needs_rx,
        )?;
        state.cur_device |= devices;
        drop(state);
        let ops = StreamOps::new(
            self.inner.clone(),
            StreamDirection::Output,
            plan.use_case,
            devices,
            config,
        );
        Ok((AudioOutputStream::new(ops), outcome))
    }

    pub fn close_output_session(&self, stream: AudioOutputStream) -> Result<()> {
        self.close_output_stream(stream)
    }

    /// Acquire the registry handle for a stream open and bring its sessions
    /// up. A failed session open releases the just-taken reference so the
    /// registry is left exactly as it was.
    fn open_stream_handle(
        &self,
        state: &mut HalState,
        use_case: &str,
        devices: DeviceMask,
        direction: StreamDirection,
        config: StreamConfig,
        needs_rx: bool,
    ) -> Result<()> {
        let handle = state
            .registry
            .acquire(use_case, devices, direction, config, needs_rx)?;
        if !handle.is_opened() {
            if let Err(e) = self.inner.open_handle_sessions(handle) {
                error!(use_case, "session open failed: {e}");
                if let Some(mut dead) = state.registry.release(use_case) {
                    self.inner.close_handle_sessions(&mut dead);
                }
                return Err(e);
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Routing

    /// Central routing transition: re-resolve every open handle against the
    /// new device mask, tearing down and reopening only the handles whose
    /// resolved configuration actually changed. Handles that already
    /// transitioned keep their new state if a later one fails; the error
    /// reports which use cases were left behind.
    pub fn do_routing(&self, devices: DeviceMask) -> Result<()> {
        if devices.is_empty() {
            return Err(HalError::invalid_device(devices));
        }
        let mut state = self.inner.lock_state();
        self.do_routing_locked(&mut state, devices)
    }

    fn do_routing_locked(&self, state: &mut HalState, new_device: DeviceMask) -> Result<()> {
        if new_device.is_empty() {
            return Err(HalError::invalid_device(new_device));
        }
        info!(devices = ?new_device, mode = ?state.mode, "routing change");
        let mut failed: Vec<String> = Vec::new();

        state.fm_active = new_device.contains(DeviceMask::FM_RADIO);
        let voice_active = state.voice_call_active;
        let fm_active = state.fm_active;

        // The voice and FM paths come and go with the call state and device
        // mask rather than with any framework stream; the facade holds their
        // registry reference itself.
        self.sync_facade_path(state, USE_CASE_VOICE_CALL, voice_active, new_device, &mut failed);
        self.sync_facade_path(state, USE_CASE_FM, fm_active, new_device, &mut failed);

        // Re-resolve live handles in insertion order, oldest first.
        for use_case in state.registry.use_cases() {
            if failed.contains(&use_case) {
                continue;
            }
            let Some(handle) = state.registry.find_mut(&use_case) else {
                continue;
            };
            let target_devices = scoped_devices(handle, new_device);
            let target_config =
                config_for_use_case(&use_case, handle.direction, handle.config.sample_rate)
                    .unwrap_or(handle.config);
            if handle.devices == target_devices && handle.config == target_config {
                // Configuration unchanged: leave the handle alone so live
                // audio does not glitch on a redundant reopen.
                continue;
            }
            let was_open = handle.is_opened();
            if was_open {
                self.inner.close_handle_sessions(handle);
            }
            handle.devices = target_devices;
            handle.config = target_config;
            if was_open {
                if let Err(e) = self.inner.open_handle_sessions(handle) {
                    error!(use_case = %use_case, "reopen failed during routing change: {e}");
                    failed.push(use_case);
                }
            }
        }

        if failed.is_empty() {
            state.cur_device = new_device;
            Ok(())
        } else {
            Err(HalError::PartialRoutingFailure { failed })
        }
    }

    /// Bring a facade-owned path (voice call, FM) up or down to match
    /// `active`. Idempotent; open failures land in `failed`.
    fn sync_facade_path(
        &self,
        state: &mut HalState,
        use_case: &str,
        active: bool,
        new_device: DeviceMask,
        failed: &mut Vec<String>,
    ) {
        let currently_held = match use_case {
            USE_CASE_VOICE_CALL => state.voice_ref_held,
            _ => state.fm_ref_held,
        };
        if active && !currently_held {
            let (direction, rate, needs_rx, devices) = if use_case == USE_CASE_VOICE_CALL {
                (StreamDirection::Output, VOICE_SAMPLE_RATE, true, new_device)
            } else {
                (
                    StreamDirection::Output,
                    DEFAULT_SAMPLE_RATE,
                    false,
                    new_device.output_devices(),
                )
            };
            let config = config_for_use_case(use_case, direction, rate).unwrap_or_default();
            let open_result = match state
                .registry
                .acquire(use_case, devices, direction, config, needs_rx)
            {
                Ok(handle) if handle.is_opened() => Ok(()),
                Ok(handle) => self.inner.open_handle_sessions(handle),
                Err(e) => {
                    error!(use_case, "path acquire failed: {e}");
                    failed.push(use_case.to_string());
                    return;
                }
            };
            if let Err(e) = open_result {
                error!(use_case, "path start failed: {e}");
                if let Some(mut dead) = state.registry.release(use_case) {
                    self.inner.close_handle_sessions(&mut dead);
                }
                failed.push(use_case.to_string());
                return;
            }
            info!(use_case, "path started");
            match use_case {
                USE_CASE_VOICE_CALL => state.voice_ref_held = true,
                _ => state.fm_ref_held = true,
            }
        } else if !active && currently_held {
            if let Some(mut handle) = state.registry.release(use_case) {
                self.inner.close_handle_sessions(&mut handle);
            }
            match use_case {
                USE_CASE_VOICE_CALL => state.voice_ref_held = false,
                _ => state.fm_ref_held = false,
            }
            info!(use_case, "path stopped");
        }
    }

    // ------------------------------------------------------------------
    // Diagnostics

    /// Snapshot of the global state and open handles.
    pub fn dump(&self) -> serde_json::Value {
        let state = self.inner.lock_state();
        let handles: Vec<serde_json::Value> = state
            .registry
            .iter()
            .map(|h| {
                json!({
                    "use_case": h.use_case,
                    "devices": h.devices.bits(),
                    "opened": h.is_opened(),
                    "refs": h.ref_count(),
                    "config": serde_json::to_value(h.config).unwrap_or(serde_json::Value::Null),
                })
            })
            .collect();
        json!({
            "mode": serde_json::to_value(state.mode).unwrap_or(serde_json::Value::Null),
            "devices": state.cur_device.bits(),
            "mic_mute": state.mic_mute,
            "voip_mic_mute": state.voip_mic_mute,
            "voip_streams": state.voip_stream_count,
            "voice_call_active": state.voice_call_active,
            "fm_active": state.fm_active,
            "bt_headset_vgs": state.bt_vgs,
            "settings": state.settings.bits(),
            "handles": handles,
        })
    }
}

/// Device mask a handle should bind after a routing change: duplex paths take
/// the whole mask, one-directional handles take their half. An empty result
/// keeps the current binding (the change did not touch this handle's side).
fn scoped_devices(handle: &Handle, new_device: DeviceMask) -> DeviceMask {
    let scoped = if handle.needs_rx {
        new_device
    } else {
        match handle.direction {
            StreamDirection::Output => new_device.output_devices(),
            StreamDirection::Input => new_device.input_devices(),
        }
    };
    if scoped.is_empty() {
        handle.devices
    } else {
        scoped
    }
}
