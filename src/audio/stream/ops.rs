// Shared stream operations core: parameter negotiation, open/close/standby,
// per-stream parameters. Both concrete streams embed one of these.
//
// The core holds non-owning references: the facade owns the registry and the
// handles; a stream reaches its handle through the use-case name it acquired.

use std::sync::Arc;

use tracing::{info, warn};

use crate::audio::driver::PcmSession;
use crate::audio::error::{HalError, Result, SetOutcome};
use crate::audio::hardware::HalInner;
use crate::audio::params::ParameterMap;
use crate::audio::routing::{nearest_supported_rate, RoutingPlan, USE_CASE_CAPTURE, USE_CASE_HIFI};
use crate::audio::types::{DeviceMask, SampleFormat, StreamConfig, StreamDirection};
use crate::types::ROUTING_KEY;

/// Negotiate a requested (format, channels, rate) tuple against a resolved
/// routing plan. Generic use cases honor the request where the hardware can;
/// priority use cases (voice, VoIP, FM, low-power) dictate their own
/// configuration. Either way the caller gets a usable config plus whether it
/// was rewritten.
pub fn negotiate_config(
    plan: &RoutingPlan,
    direction: StreamDirection,
    format: SampleFormat,
    channels: u32,
    rate: u32,
) -> (StreamConfig, SetOutcome) {
    let mut config = plan.config;
    if plan.use_case == USE_CASE_HIFI || plan.use_case == USE_CASE_CAPTURE {
        config.format = SampleFormat::S16Le;
        config.channels = channels.clamp(1, 2);
        config.sample_rate = nearest_supported_rate(rate, direction);
    }
    let outcome = if config.format == format && config.channels == channels && config.sample_rate == rate
    {
        SetOutcome::Accepted
    } else {
        SetOutcome::Adjusted
    };
    (config, outcome)
}

/// Validate the device mask a stream open request carries. Zero is illegal,
/// and the mask must select an endpoint on the stream's side of the hardware.
pub fn validate_devices(devices: DeviceMask, direction: StreamDirection) -> Result<()> {
    if devices.is_empty() {
        return Err(HalError::invalid_device(devices));
    }
    let usable = match direction {
        StreamDirection::Output => devices.has_output(),
        StreamDirection::Input => devices.has_input(),
    };
    if !usable {
        return Err(HalError::invalid_device(devices));
    }
    Ok(())
}

/// Per-stream state shared by both stream directions
pub struct StreamOps {
    hal: Arc<HalInner>,
    direction: StreamDirection,
    use_case: String,
    devices: DeviceMask,
    config: StreamConfig,
    /// Wake/power resource held while the stream is actively transferring.
    power_lock: bool,
    closed: bool,
}

impl StreamOps {
    pub(crate) fn new(
        hal: Arc<HalInner>,
        direction: StreamDirection,
        use_case: String,
        devices: DeviceMask,
        config: StreamConfig,
    ) -> Self {
        Self {
            hal,
            direction,
            use_case,
            devices,
            config,
            power_lock: true,
            closed: false,
        }
    }

    pub fn direction(&self) -> StreamDirection {
        self.direction
    }

    pub fn use_case(&self) -> &str {
        &self.use_case
    }

    pub fn devices(&self) -> DeviceMask {
        self.devices
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    pub fn channels(&self) -> u32 {
        self.config.channels
    }

    pub fn format(&self) -> SampleFormat {
        self.config.format
    }

    /// Hardware buffer size in bytes for the negotiated format.
    pub fn buffer_size(&self) -> usize {
        self.config.buffer_bytes()
    }

    pub fn latency_us(&self) -> u32 {
        self.config.latency_us
    }

    pub(crate) fn config(&self) -> StreamConfig {
        self.config
    }

    pub(crate) fn hal(&self) -> &Arc<HalInner> {
        &self.hal
    }

    /// True while the stream holds its wake/power resource, i.e. between a
    /// transfer and the next standby or close.
    pub fn holds_power_lock(&self) -> bool {
        self.power_lock
    }

    /// Session to transfer on, resuming from standby if needed. Copies the
    /// session reference out under the coarse lock; the transfer itself runs
    /// lock-free so long writes never stall routing changes.
    pub(crate) fn transfer_session(&mut self) -> Result<Arc<dyn PcmSession>> {
        if self.closed {
            return Err(HalError::ResourceUnavailable("stream is closed".into()));
        }
        let mut state = self.hal.lock_state();
        let inner = self.hal.clone();
        let handle = state
            .registry
            .find_mut(&self.use_case)
            .ok_or_else(|| HalError::ResourceUnavailable(format!("no handle for {}", self.use_case)))?;
        if !handle.is_opened() {
            inner.open_handle_sessions(handle)?;
            info!(use_case = %self.use_case, "stream resumed from standby");
        }
        self.power_lock = true;
        let session = if handle.needs_rx && self.direction != handle.direction {
            handle.rx_pcm.clone().or_else(|| handle.pcm.clone())
        } else {
            handle.pcm.clone()
        };
        session.ok_or_else(|| HalError::ResourceUnavailable(format!("{} has no session", self.use_case)))
    }

    /// Enter standby: close the hardware session but keep the handle and its
    /// negotiated configuration, so a later resume reopens with identical
    /// parameters without re-resolving routing. A shared handle stays open
    /// for its other users.
    pub fn standby(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        let mut state = self.hal.lock_state();
        let inner = self.hal.clone();
        if let Some(handle) = state.registry.find_mut(&self.use_case) {
            if handle.is_opened() && handle.ref_count() == 1 {
                inner.close_handle_sessions(handle);
                info!(use_case = %self.use_case, "stream in standby");
            }
        }
        self.power_lock = false;
        Ok(())
    }

    /// Close the stream: release the handle, closing its sessions once no
    /// other stream references it. After a successful close no further
    /// transfer will occur on this stream.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        let mut state = self.hal.lock_state();
        let inner = self.hal.clone();
        if let Some(mut handle) = state.registry.release(&self.use_case) {
            inner.close_handle_sessions(&mut handle);
        }
        state.note_stream_closed(&self.use_case);
        self.power_lock = false;
        self.closed = true;
        info!(use_case = %self.use_case, "stream closed");
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Per-stream parameters. The only actionable key is `routing`, which
    /// re-routes just this stream's handle; the call is idempotent when the
    /// encoded device mask already matches.
    pub fn set_parameters(&mut self, key_value_pairs: &str) -> Result<()> {
        let params = ParameterMap::parse(key_value_pairs);
        if let Some(raw) = params.get_int(ROUTING_KEY) {
            let devices = DeviceMask::from_bits_truncate(raw as u32);
            validate_devices(devices, self.direction)?;
            if devices != self.devices {
                self.reroute(devices)?;
            }
        }
        // Unknown keys are ignored, not rejected.
        Ok(())
    }

    pub fn get_parameters(&self, keys: &str) -> String {
        let requested = ParameterMap::parse(keys);
        let mut reply = ParameterMap::new();
        for key in requested.keys() {
            if key == ROUTING_KEY {
                reply.set(ROUTING_KEY, self.devices.bits().to_string());
            }
        }
        // A bare key list arrives as `key=;` segments or plain names; answer
        // plain names too.
        if reply.is_empty() && keys.contains(ROUTING_KEY) {
            reply.set(ROUTING_KEY, self.devices.bits().to_string());
        }
        reply.encode()
    }

    /// Move this stream's handle to a new device mask. The handle keeps its
    /// identity and negotiated configuration; only the routing binding is
    /// torn down and rebuilt, and only if it was live.
    fn reroute(&mut self, devices: DeviceMask) -> Result<()> {
        let mut state = self.hal.lock_state();
        let inner = self.hal.clone();
        let Some(handle) = state.registry.find_mut(&self.use_case) else {
            warn!(use_case = %self.use_case, "reroute with no handle");
            self.devices = devices;
            return Ok(());
        };
        let was_open = handle.is_opened();
        if was_open {
            inner.close_handle_sessions(handle);
        }
        handle.devices = devices;
        if was_open {
            inner.open_handle_sessions(handle)?;
        }
        self.devices = devices;
        info!(use_case = %self.use_case, devices = ?devices, "stream rerouted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::routing::{low_power_plan, resolve, RoutingContext};
    use crate::audio::types::{AudioMode, DeviceSettings};

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

    #[test]
    fn generic_negotiation_accepts_supported_tuple() {
        let plan = resolve(&idle_context(), StreamDirection::Output, 44100, 2);
        let (config, outcome) =
            negotiate_config(&plan, StreamDirection::Output, SampleFormat::S16Le, 2, 44100);
        assert_eq!(outcome, SetOutcome::Accepted);
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.buffer_size, 2048);
    }

    #[test]
    fn capture_48k_is_adjusted_to_44100() {
        let plan = resolve(&idle_context(), StreamDirection::Input, 48000, 2);
        let (config, outcome) =
            negotiate_config(&plan, StreamDirection::Input, SampleFormat::S16Le, 2, 48000);
        assert_eq!(outcome, SetOutcome::Adjusted);
        assert_eq!(config.sample_rate, 44100);
    }

    #[test]
    fn voice_plan_dictates_configuration() {
        let ctx = RoutingContext {
            voice_call_active: true,
            ..idle_context()
        };
        let plan = resolve(&ctx, StreamDirection::Output, 44100, 2);
        let (config, outcome) =
            negotiate_config(&plan, StreamDirection::Output, SampleFormat::S16Le, 2, 44100);
        assert_eq!(outcome, SetOutcome::Adjusted);
        assert_eq!(config.sample_rate, 8000);
        assert_eq!(config.channels, 1);
    }

    #[test]
    fn low_power_negotiation_reports_adjustment() {
        let plan = low_power_plan(1);
        let (_, outcome) =
            negotiate_config(&plan, StreamDirection::Output, SampleFormat::S16Le, 2, 48000);
        assert_eq!(outcome, SetOutcome::Adjusted);
        let (_, outcome) =
            negotiate_config(&plan, StreamDirection::Output, SampleFormat::S16Le, 2, 44100);
        assert_eq!(outcome, SetOutcome::Accepted);
    }

    #[test]
    fn zero_device_mask_fails_fast() {
        assert!(validate_devices(DeviceMask::empty(), StreamDirection::Output).is_err());
        assert!(validate_devices(DeviceMask::BUILTIN_MIC, StreamDirection::Output).is_err());
        assert!(validate_devices(DeviceMask::SPEAKER, StreamDirection::Output).is_ok());
    }
}
