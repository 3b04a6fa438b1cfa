//! Cooperative, display-refresh-driven render loop.
//!
//! The scheduler never draws. It owns the single pending frame request and
//! decides, on each display tick, whether the caller should render a live
//! frame or whether the loop has ended.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Opaque id of one requested display tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameToken(u64);

/// Source of display-refresh-aligned callbacks.
pub trait FrameClock {
    /// Ask for one callback on the next display refresh.
    fn request_frame(&mut self) -> FrameToken;
    /// Withdraw a pending request; unknown tokens are ignored.
    fn cancel_frame(&mut self, token: FrameToken);
}

impl<C: FrameClock> FrameClock for Rc<RefCell<C>> {
    fn request_frame(&mut self) -> FrameToken {
        self.borrow_mut().request_frame()
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        self.borrow_mut().cancel_frame(token);
    }
}

/// Frame clock driven by the host: requests queue up until the host drains them.
#[derive(Debug, Default)]
pub struct ManualFrameClock {
    next_id: u64,
    pending: VecDeque<FrameToken>,
}

impl ManualFrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return the oldest pending request, if any.
    pub fn next_due(&mut self) -> Option<FrameToken> {
        self.pending.pop_front()
    }

    /// Number of requests not yet delivered.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

impl FrameClock for ManualFrameClock {
    fn request_frame(&mut self) -> FrameToken {
        self.next_id += 1;
        let token = FrameToken(self.next_id);
        self.pending.push_back(token);
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        self.pending.retain(|pending| *pending != token);
    }
}

/// Loop state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
}

/// What the caller should do with a delivered tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Draw one live frame; the next tick is already requested.
    Render,
    /// Playback is no longer active; the loop went idle.
    Stopped,
    /// Stale, cancelled, or post-teardown tick; do nothing.
    Ignored,
}

/// Single cooperative loop with at most one pending tick.
#[derive(Debug)]
pub struct RenderScheduler {
    state: SchedulerState,
    pending: Option<FrameToken>,
}

impl Default for RenderScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderScheduler {
    pub fn new() -> Self {
        Self {
            state: SchedulerState::Idle,
            pending: None,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    /// The outstanding frame request, if any.
    pub fn pending(&self) -> Option<FrameToken> {
        self.pending
    }

    /// Enter `Running` and request the first tick. No-op (returns `false`) when already running.
    pub fn start(&mut self, clock: &mut dyn FrameClock) -> bool {
        if self.is_running() {
            return false;
        }
        self.state = SchedulerState::Running;
        self.pending = Some(clock.request_frame());
        tracing::debug!("Render loop started");
        true
    }

    /// Cancel the pending tick and go idle. Safe to call repeatedly.
    pub fn stop(&mut self, clock: &mut dyn FrameClock) {
        if let Some(token) = self.pending.take() {
            clock.cancel_frame(token);
        }
        if self.is_running() {
            tracing::debug!("Render loop stopped");
        }
        self.state = SchedulerState::Idle;
    }

    /// Handle a delivered tick.
    ///
    /// `is_playing` must be read from the transport by the caller at the moment
    /// of the tick, so a pause requested mid-flight ends the loop here.
    pub fn on_tick(
        &mut self,
        token: FrameToken,
        is_playing: bool,
        clock: &mut dyn FrameClock,
    ) -> TickOutcome {
        if !self.is_running() || self.pending != Some(token) {
            return TickOutcome::Ignored;
        }
        self.pending = None;
        if !is_playing {
            self.state = SchedulerState::Idle;
            tracing::debug!("Render loop ended: transport not playing");
            return TickOutcome::Stopped;
        }
        self.pending = Some(clock.request_frame());
        TickOutcome::Render
    }
}
