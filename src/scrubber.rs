//! Pointer scrubbing state machine.
//!
//! Translates press/drag/release into seek targets. Applying the seek and
//! deciding whether to redraw is left to the caller, which knows whether the
//! render loop is running.

use crate::mapper::CoordinateMapper;

/// Pointer interaction state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScrubState {
    #[default]
    Released,
    Pressed,
    Dragging,
}

#[derive(Debug, Default)]
pub struct ScrubberController {
    state: ScrubState,
}

impl ScrubberController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ScrubState {
        self.state
    }

    /// Begin a scrub at `x`. Returns the seek target; presses outside the chart are ignored.
    pub fn press(&mut self, x: f64, mapper: Option<&CoordinateMapper>) -> Option<f64> {
        let target = mapper?.x_to_time(x)?;
        self.state = ScrubState::Pressed;
        Some(target)
    }

    /// Continue a scrub. Returns the seek target while pressed and inside the chart.
    pub fn drag(&mut self, x: f64, mapper: Option<&CoordinateMapper>) -> Option<f64> {
        if self.state == ScrubState::Released {
            return None;
        }
        self.state = ScrubState::Dragging;
        mapper?.x_to_time(x)
    }

    /// End the scrub. Returns whether one was in progress.
    pub fn release(&mut self) -> bool {
        let active = self.state != ScrubState::Released;
        self.state = ScrubState::Released;
        active
    }

    /// Pointer left the surface; same as releasing.
    pub fn leave(&mut self) -> bool {
        self.release()
    }
}
