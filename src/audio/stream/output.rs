// Playback endpoint: blocking write to the primary PCM session plus
// volume/latency/render-position accessors over the shared operations core.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::audio::driver::Transfer;
use crate::audio::error::{HalError, Result};
use crate::audio::stream::ops::StreamOps;
use crate::audio::types::SampleFormat;
use crate::audio_debug;

pub struct AudioOutputStream {
    ops: StreamOps,
    /// Frames written since the stream last left standby; render-position
    /// fallback when the driver cannot report one.
    frame_count: AtomicU64,
    underruns: AtomicU64,
}

impl AudioOutputStream {
    pub(crate) fn new(ops: StreamOps) -> Self {
        Self {
            ops,
            frame_count: AtomicU64::new(0),
            underruns: AtomicU64::new(0),
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

    /// The routing-decided latency budget in microseconds, not a measurement.
    pub fn latency_us(&self) -> u32 {
        self.ops.latency_us()
    }

    pub fn use_case(&self) -> &str {
        self.ops.use_case()
    }

    /// Blocking write. Returns the full requested byte count even across a
    /// hardware underrun (the driver recovers and plays silence for the gap);
    /// upstream mixing cannot react meaningfully mid-stream, so underruns are
    /// counted here instead of propagated.
    pub fn write(&mut self, buffer: &[u8]) -> Result<usize> {
        let session = self.ops.transfer_session()?;
        let frame_bytes = self.ops.config().frame_bytes().max(1);
        let mut written = 0usize;
        while written < buffer.len() {
            match session.write(&buffer[written..]) {
                Ok(Transfer::Complete(0)) => break,
                Ok(Transfer::Complete(n)) => written += n,
                Ok(Transfer::Xrun { .. }) => {
                    self.underruns.fetch_add(1, Ordering::Relaxed);
                    audio_debug!(
                        "underrun on {} after {} bytes",
                        self.ops.use_case(),
                        written
                    );
                }
                Err(e) => {
                    if written == 0 {
                        return Err(e.into());
                    }
                    // A hard failure mid-transfer reports what actually moved.
                    self.frame_count
                        .fetch_add((written / frame_bytes) as u64, Ordering::Relaxed);
                    return Ok(written);
                }
            }
        }
        self.frame_count
            .fetch_add((written / frame_bytes) as u64, Ordering::Relaxed);
        Ok(buffer.len())
    }

    /// Frames consumed by the DSP since the stream left standby. Monotonically
    /// non-decreasing; falls back to the cumulative write counter when the
    /// driver cannot report a position.
    pub fn get_render_position(&mut self) -> Result<u64> {
        let session = self.ops.transfer_session()?;
        match session.render_position() {
            Ok(Some(frames)) => Ok(frames),
            Ok(None) => Ok(self.frame_count.load(Ordering::Relaxed)),
            Err(e) => Err(HalError::Driver(e)),
        }
    }

    /// Underruns absorbed by `write` since the stream was created.
    pub fn underrun_count(&self) -> u64 {
        self.underruns.load(Ordering::Relaxed)
    }

    /// Stereo volume for this stream's routed device.
    pub fn set_volume(&self, left: f32, right: f32) -> Result<()> {
        self.ops
            .hal()
            .mixer()
            .set_volume(self.ops.devices(), left, right)
    }

    pub fn standby(&mut self) -> Result<()> {
        self.frame_count.store(0, Ordering::Relaxed);
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
