// In-memory driver backends for tests and board bring-up. No hardware is
// touched; every interaction is recorded so tests can assert on the exact
// sequence of driver calls the HAL produced.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use parking_lot::Mutex;

use super::{ControlBackend, PcmDriver, PcmRequest, PcmSession, Transfer, UseCaseManager, UseCaseToken};

/// Scripted PCM session. Writes succeed and advance the frame position unless
/// an xrun has been queued; reads fill the buffer with zeros.
pub struct MockPcmSession {
    request: PcmRequest,
    closed: AtomicBool,
    frames_moved: AtomicU64,
    report_position: bool,
    scripted_xruns: Mutex<VecDeque<u64>>,
}

impl MockPcmSession {
    fn new(request: PcmRequest, report_position: bool) -> Self {
        Self {
            request,
            closed: AtomicBool::new(false),
            frames_moved: AtomicU64::new(0),
            report_position,
            scripted_xruns: Mutex::new(VecDeque::new()),
        }
    }

    /// Queue an xrun for a future transfer; `frames_lost` applies to capture
    /// sessions only.
    pub fn push_xrun(&self, frames_lost: u64) {
        self.scripted_xruns.lock().push_back(frames_lost);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn frames_moved(&self) -> u64 {
        self.frames_moved.load(Ordering::SeqCst)
    }

    pub fn use_case(&self) -> &str {
        &self.request.use_case
    }

    /// The open request this session was created from.
    pub fn request(&self) -> &PcmRequest {
        &self.request
    }

    fn transfer(&self, bytes: usize) -> Result<Transfer> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(anyhow!("session closed"));
        }
        if let Some(frames_lost) = self.scripted_xruns.lock().pop_front() {
            return Ok(Transfer::Xrun { frames_lost });
        }
        let frames = bytes / self.request.config.frame_bytes().max(1);
        self.frames_moved.fetch_add(frames as u64, Ordering::SeqCst);
        Ok(Transfer::Complete(bytes))
    }
}

impl PcmSession for MockPcmSession {
    fn write(&self, buf: &[u8]) -> Result<Transfer> {
        self.transfer(buf.len())
    }

    fn read(&self, buf: &mut [u8]) -> Result<Transfer> {
        buf.fill(0);
        self.transfer(buf.len())
    }

    fn render_position(&self) -> Result<Option<u64>> {
        if self.report_position {
            Ok(Some(self.frames_moved.load(Ordering::SeqCst)))
        } else {
            Ok(None)
        }
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// PCM driver double recording every open and handing out scripted sessions
#[derive(Default)]
pub struct MockPcmDriver {
    refuse_use_cases: Mutex<HashSet<String>>,
    sessions: Mutex<Vec<Arc<MockPcmSession>>>,
    report_position: AtomicBool,
}

impl MockPcmDriver {
    pub fn new() -> Self {
        let driver = Self::default();
        driver.report_position.store(true, Ordering::SeqCst);
        driver
    }

    /// Make subsequent opens for `use_case` fail, as a transport refusing the
    /// endpoint would.
    pub fn refuse(&self, use_case: &str) {
        self.refuse_use_cases.lock().insert(use_case.to_string());
    }

    pub fn allow(&self, use_case: &str) {
        self.refuse_use_cases.lock().remove(use_case);
    }

    /// Disable render-position reporting on sessions opened from now on.
    pub fn set_report_position(&self, report: bool) {
        self.report_position.store(report, Ordering::SeqCst);
    }

    /// Every session ever opened, in open order.
    pub fn sessions(&self) -> Vec<Arc<MockPcmSession>> {
        self.sessions.lock().clone()
    }

    pub fn open_count(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Sessions currently open (not yet closed).
    pub fn live_sessions(&self) -> Vec<Arc<MockPcmSession>> {
        self.sessions
            .lock()
            .iter()
            .filter(|s| !s.is_closed())
            .cloned()
            .collect()
    }

    pub fn last_session(&self) -> Option<Arc<MockPcmSession>> {
        self.sessions.lock().last().cloned()
    }
}

impl PcmDriver for MockPcmDriver {
    fn open(&self, request: &PcmRequest) -> Result<Arc<dyn PcmSession>> {
        if self.refuse_use_cases.lock().contains(&request.use_case) {
            return Err(anyhow!("transport refused endpoint for {}", request.use_case));
        }
        let session = Arc::new(MockPcmSession::new(
            request.clone(),
            self.report_position.load(Ordering::SeqCst),
        ));
        self.sessions.lock().push(session.clone());
        Ok(session)
    }
}

/// Use-case manager double recording bind/unbind order
#[derive(Default)]
pub struct MockUseCaseManager {
    next_token: AtomicU64,
    bound: Mutex<Vec<(UseCaseToken, String)>>,
    refuse_all: AtomicBool,
}

impl MockUseCaseManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refuse_binds(&self, refuse: bool) {
        self.refuse_all.store(refuse, Ordering::SeqCst);
    }

    /// Use cases currently bound, in bind order.
    pub fn bound_use_cases(&self) -> Vec<String> {
        self.bound.lock().iter().map(|(_, uc)| uc.clone()).collect()
    }
}

impl UseCaseManager for MockUseCaseManager {
    fn bind(&self, use_case: &str) -> Result<UseCaseToken> {
        if self.refuse_all.load(Ordering::SeqCst) {
            return Err(anyhow!("use-case manager refused {}", use_case));
        }
        let token = UseCaseToken(self.next_token.fetch_add(1, Ordering::SeqCst));
        self.bound.lock().push((token, use_case.to_string()));
        Ok(token)
    }

    fn unbind(&self, token: UseCaseToken) {
        self.bound.lock().retain(|(t, _)| *t != token);
    }
}

/// Control backend double storing integer and string control writes
#[derive(Default)]
pub struct MockControlBackend {
    values: Mutex<Vec<(String, u32, i64)>>,
    strings: Mutex<Vec<(String, String)>>,
}

impl MockControlBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last integer value written to `name`, any index.
    pub fn last_value(&self, name: &str) -> Option<i64> {
        self.values
            .lock()
            .iter()
            .rev()
            .find(|(n, _, _)| n == name)
            .map(|(_, _, v)| *v)
    }

    /// Last string value written to `name`.
    pub fn last_string(&self, name: &str) -> Option<String> {
        self.strings
            .lock()
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }
}

impl ControlBackend for MockControlBackend {
    fn get(&self, name: &str, index: u32) -> Result<i64> {
        self.values
            .lock()
            .iter()
            .rev()
            .find(|(n, i, _)| n == name && *i == index)
            .map(|(_, _, v)| *v)
            .ok_or_else(|| anyhow!("no such control: {}", name))
    }

    fn set(&self, name: &str, value: i64, index: Option<u32>) -> Result<()> {
        self.values
            .lock()
            .push((name.to_string(), index.unwrap_or(0), value));
        Ok(())
    }

    fn set_string(&self, name: &str, value: &str) -> Result<()> {
        self.strings
            .lock()
            .push((name.to_string(), value.to_string()));
        Ok(())
    }
}
