// Collaborator boundary: the PCM transport, the vendor use-case manager, and
// the hardware control surface are opaque capabilities behind these traits.
// Everything above this module is platform-independent.

use std::sync::Arc;

use anyhow::Result;

use crate::audio::types::{DeviceMask, StreamConfig, StreamDirection};

#[cfg(feature = "driver-mock")]
pub mod mock;

/// Everything the transport needs to open one hardware PCM endpoint
#[derive(Debug, Clone)]
pub struct PcmRequest {
    pub use_case: String,
    pub devices: DeviceMask,
    pub direction: StreamDirection,
    pub config: StreamConfig,
}

/// Result of one blocking transfer on a PCM session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    /// Bytes actually moved
    Complete(usize),
    /// The hardware ring xruned before the transfer finished. `frames_lost`
    /// is what the driver dropped (0 for playback underruns).
    Xrun { frames_lost: u64 },
}

/// One open hardware PCM endpoint.
///
/// Transfers block up to the transport's internal timeout. `close` called from
/// another thread must race-free terminate a pending transfer; that is the
/// transport's contract, not this layer's.
pub trait PcmSession: Send + Sync {
    fn write(&self, buf: &[u8]) -> Result<Transfer>;
    fn read(&self, buf: &mut [u8]) -> Result<Transfer>;

    /// DSP frame position since the session left standby. `Ok(None)` means the
    /// driver cannot report one.
    fn render_position(&self) -> Result<Option<u64>>;

    /// Idempotent. After this returns no further transfer will complete.
    fn close(&self);
}

/// Factory for PCM sessions
pub trait PcmDriver: Send + Sync {
    fn open(&self, request: &PcmRequest) -> Result<Arc<dyn PcmSession>>;
}

/// Token returned by the use-case manager for one bound routing profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UseCaseToken(pub u64);

/// Vendor use-case manager mapping a use-case name to a kernel mixer
/// configuration. Names are bounded; see [`crate::types::USE_CASE_NAME_MAX`].
pub trait UseCaseManager: Send + Sync {
    fn bind(&self, use_case: &str) -> Result<UseCaseToken>;
    fn unbind(&self, token: UseCaseToken);
}

/// Named hardware control access (volume/gain/mute knobs, vendor switches)
pub trait ControlBackend: Send + Sync {
    fn get(&self, name: &str, index: u32) -> Result<i64>;
    fn set(&self, name: &str, value: i64, index: Option<u32>) -> Result<()>;
    fn set_string(&self, name: &str, value: &str) -> Result<()>;
}
