// Error taxonomy for the hardware abstraction layer.
//
// Collaborator (driver, use-case manager, control) failures are surfaced to
// the immediate caller with no internal retry; masking a driver failure risks
// silent audio loss.

use crate::audio::types::DeviceMask;

/// Errors surfaced by the HAL
#[derive(Debug, thiserror::Error)]
pub enum HalError {
    #[error("invalid device mask {0:#010x}")]
    InvalidDevice(u32),

    #[error("unsupported configuration: {0}")]
    InvalidArgument(String),

    #[error("resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// Some but not all affected handles reopened during a routing change.
    /// Handles that already transitioned keep their new state; the names list
    /// the use cases left behind.
    #[error("routing change incomplete, failed use cases: {failed:?}")]
    PartialRoutingFailure { failed: Vec<String> },

    #[error("operation not supported: {0}")]
    Unsupported(&'static str),

    #[error("driver error: {0}")]
    Driver(#[from] anyhow::Error),
}

impl HalError {
    pub(crate) fn invalid_device(mask: DeviceMask) -> Self {
        HalError::InvalidDevice(mask.bits())
    }
}

pub type Result<T> = std::result::Result<T, HalError>;

/// Outcome of a parameter negotiation. A stream still opens when the request
/// cannot be honored exactly; the caller reads the adjusted values back from
/// the stream instead of retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// Requested values accepted unchanged
    Accepted,
    /// One or more values rewritten to the nearest supported configuration
    Adjusted,
}

impl SetOutcome {
    pub fn was_adjusted(self) -> bool {
        matches!(self, SetOutcome::Adjusted)
    }
}
