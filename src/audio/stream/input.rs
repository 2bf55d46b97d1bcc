// Capture endpoint: blocking read from the PCM session, gain, and the
// read-and-clear frame-loss counter the framework polls.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::audio::control::CTL_ACOUSTIC_PROFILE;
use crate::audio::driver::Transfer;
use crate::audio::error::{HalError, Result};
use crate::audio::stream::ops::StreamOps;
use crate::audio::types::SampleFormat;
use crate::audio_debug;

pub struct AudioInputStream {
    ops: StreamOps,
    /// Frames dropped by the driver since the last `get_input_frames_lost`,
    /// typically because this process stayed blocked past the driver's buffer
    /// capacity.
    frames_lost: AtomicU64,
}

impl AudioInputStream {
    pub(crate) fn new(ops: StreamOps) -> Self {
        Self {
            ops,
            frames_lost: AtomicU64::new(0),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.ops.sample_rate()
    }

    pub fn channels(&self) -> u32 {
        self.ops.channels()
    }

    pub fn format(&self) -> SampleFormat {
        self.ops.format()
    }

    /// Hardware buffer size in bytes.
    pub fn buffer_size(&self) -> usize {
        self.ops.buffer_size()
    }

    pub fn use_case(&self) -> &str {
        self.ops.use_case()
    }

    /// Blocking read. An overrun bumps the frame-loss counter and the read
    /// keeps going; the framework learns about the gap through
    /// [`AudioInputStream::get_input_frames_lost`].
    pub fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let session = self.ops.transfer_session()?;
        let mut filled = 0usize;
        while filled < buffer.len() {
            match session.read(&mut buffer[filled..]) {
                Ok(Transfer::Complete(0)) => break,
                Ok(Transfer::Complete(n)) => filled += n,
                Ok(Transfer::Xrun { frames_lost }) => {
                    self.frames_lost.fetch_add(frames_lost, Ordering::Relaxed);
                    audio_debug!(
                        "overrun on {}, {} frames lost",
                        self.ops.use_case(),
                        frames_lost
                    );
                }
                Err(e) => {
                    if filled > 0 {
                        break;
                    }
                    return Err(e.into());
                }
            }
        }
        Ok(filled)
    }

    /// Frames lost in the driver since the last call. Read-and-clear: the
    /// counter resets to zero on every call, so back-to-back calls with no
    /// intervening overrun return 0.
    pub fn get_input_frames_lost(&self) -> u64 {
        self.frames_lost.swap(0, Ordering::Relaxed)
    }

    /// Capture gain for this stream's routed device.
    pub fn set_gain(&self, gain: f32) -> Result<()> {
        self.ops.hal().mixer().set_gain(self.ops.devices(), gain)
    }

    /// Vendor acoustic tuning profile, forwarded to the control surface.
    pub fn set_acoustic_params(&self, profile: &str) -> Result<()> {
        self.ops
            .hal()
            .mixer()
            .control()
            .set_string(CTL_ACOUSTIC_PROFILE, profile)
    }

    /// Effect insertion is not wired on the capture path.
    pub fn add_audio_effect(&self, _effect_id: u64) -> Result<()> {
        Err(HalError::Unsupported("audio effects on input streams"))
    }

    pub fn remove_audio_effect(&self, _effect_id: u64) -> Result<()> {
        Err(HalError::Unsupported("audio effects on input streams"))
    }

    pub fn standby(&mut self) -> Result<()> {
        self.ops.standby()
    }

    pub fn set_parameters(&mut self, key_value_pairs: &str) -> Result<()> {
        self.ops.set_parameters(key_value_pairs)
    }

    pub fn get_parameters(&self, keys: &str) -> String {
        self.ops.get_parameters(keys)
    }

    pub(crate) fn ops_mut(&mut self) -> &mut StreamOps {
        &mut self.ops
    }
}
