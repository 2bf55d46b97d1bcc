// Stream handles and their registry. A handle is one physical routing/session
// binding; the registry keeps at most one per use-case name, in insertion
// order, refcounted by the streams that share it.
//
// No operation here is safe without the facade's coarse lock held; the
// registry performs no locking and no driver calls of its own.

use std::sync::Arc;

use tracing::info;

use crate::audio::driver::{PcmSession, UseCaseToken};
use crate::audio::error::{HalError, Result};
use crate::audio::types::{DeviceMask, StreamConfig, StreamDirection};
use crate::types::USE_CASE_NAME_MAX;

/// Upper bound on concurrently active use cases; the hardware frontend has a
/// fixed number of PCM frontends to bind.
pub const MAX_HANDLES: usize = 32;

/// One open routing/session binding to a use case
pub struct Handle {
    pub use_case: String,
    pub devices: DeviceMask,
    /// Direction of the primary session; a duplex handle's rx session runs
    /// the opposite way.
    pub direction: StreamDirection,
    pub config: StreamConfig,
    /// Duplex voice paths carry a secondary rx session.
    pub needs_rx: bool,
    /// Present iff the handle is opened (not standby).
    pub pcm: Option<Arc<dyn PcmSession>>,
    pub rx_pcm: Option<Arc<dyn PcmSession>>,
    pub uc_token: Option<UseCaseToken>,
    ref_count: u32,
}

impl Handle {
    fn new(
        use_case: String,
        devices: DeviceMask,
        direction: StreamDirection,
        config: StreamConfig,
        needs_rx: bool,
    ) -> Self {
        Self {
            use_case,
            devices,
            direction,
            config,
            needs_rx,
            pcm: None,
            rx_pcm: None,
            uc_token: None,
            ref_count: 1,
        }
    }

    /// True when hardware sessions are open (the handle is not in standby).
    pub fn is_opened(&self) -> bool {
        self.pcm.is_some()
    }

    pub fn ref_count(&self) -> u32 {
        self.ref_count
    }

    /// Detach all driver state for closing. The caller performs the actual
    /// session close and use-case unbind; the handle itself drops to standby.
    pub fn take_sessions(
        &mut self,
    ) -> (
        Option<Arc<dyn PcmSession>>,
        Option<Arc<dyn PcmSession>>,
        Option<UseCaseToken>,
    ) {
        (self.pcm.take(), self.rx_pcm.take(), self.uc_token.take())
    }
}

impl std::fmt::Debug for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle")
            .field("use_case", &self.use_case)
            .field("devices", &self.devices)
            .field("config", &self.config)
            .field("opened", &self.is_opened())
            .field("ref_count", &self.ref_count)
            .finish()
    }
}

/// Insertion-ordered collection of handles, one per use-case name
#[derive(Default)]
pub struct HandleRegistry {
    handles: Vec<Handle>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the handle for `use_case`, creating it if absent. Acquiring an
    /// existing handle bumps its refcount and widens its device mask; the
    /// negotiated configuration of a live handle is not disturbed.
    pub fn acquire(
        &mut self,
        use_case: &str,
        devices: DeviceMask,
        direction: StreamDirection,
        config: StreamConfig,
        needs_rx: bool,
    ) -> Result<&mut Handle> {
        if use_case.is_empty() || use_case.len() > USE_CASE_NAME_MAX {
            return Err(HalError::InvalidArgument(format!(
                "use case name must be 1..={} bytes, got {:?}",
                USE_CASE_NAME_MAX, use_case
            )));
        }
        if let Some(index) = self.handles.iter().position(|h| h.use_case == use_case) {
            let handle = &mut self.handles[index];
            handle.ref_count += 1;
            handle.devices |= devices;
            info!(use_case, refs = handle.ref_count, "handle shared");
            return Ok(handle);
        }
        if self.handles.len() >= MAX_HANDLES {
            return Err(HalError::ResourceUnavailable(format!(
                "no free handle slot for {}",
                use_case
            )));
        }
        info!(use_case, "handle created");
        self.handles.push(Handle::new(
            use_case.to_string(),
            devices,
            direction,
            config,
            needs_rx,
        ));
        Ok(self.handles.last_mut().unwrap())
    }

    /// Drop one reference to `use_case`. Returns the handle once the last
    /// reference is gone so the caller can close its sessions; `None` while
    /// other streams still hold it.
    pub fn release(&mut self, use_case: &str) -> Option<Handle> {
        let Some(index) = self.handles.iter().position(|h| h.use_case == use_case) else {
            // A release with no matching handle is a bookkeeping bug upstream.
            debug_assert!(false, "release of unknown use case {use_case}");
            return None;
        };
        let handle = &mut self.handles[index];
        handle.ref_count -= 1;
        if handle.ref_count > 0 {
            info!(use_case, refs = handle.ref_count, "handle still shared");
            return None;
        }
        info!(use_case, "handle removed");
        Some(self.handles.remove(index))
    }

    pub fn find(&self, use_case: &str) -> Option<&Handle> {
        self.handles.iter().find(|h| h.use_case == use_case)
    }

    pub fn find_mut(&mut self, use_case: &str) -> Option<&mut Handle> {
        self.handles.iter_mut().find(|h| h.use_case == use_case)
    }

    /// Handles in insertion order: first opened, first considered during a
    /// global re-route.
    pub fn iter(&self) -> impl Iterator<Item = &Handle> {
        self.handles.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Handle> {
        self.handles.iter_mut()
    }

    pub fn use_cases(&self) -> Vec<String> {
        self.handles.iter().map(|h| h.use_case.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
