//! Playback transport contract and a clock-driven implementation.
//!
//! The transport owns play state and position; the visualizer only reads it
//! through a shared handle at the moment it draws or ticks.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

/// Play/pause/seek primitives exposed by the host's playback engine.
pub trait Transport {
    fn play(&mut self);
    fn pause(&mut self);
    /// Jump to `seconds`; implementations clamp to `[0, duration]`.
    fn seek(&mut self, seconds: f64);
    /// Position in seconds, read fresh on every call.
    fn current_time(&self) -> f64;
    /// Total length in seconds; zero until metadata is known.
    fn duration(&self) -> f64;
    fn is_playing(&self) -> bool;

    /// Snapshot of all readable state at once.
    fn snapshot(&self) -> PlaybackState {
        PlaybackState {
            current_time: self.current_time(),
            duration: self.duration(),
            is_playing: self.is_playing(),
        }
    }
}

/// Shared, directly-read handle to the transport.
///
/// The scheduler and renderers borrow it at tick/draw time instead of keeping
/// copies of play state.
pub type SharedTransport = Rc<RefCell<dyn Transport>>;

/// Point-in-time view of the transport.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlaybackState {
    pub current_time: f64,
    pub duration: f64,
    pub is_playing: bool,
}

/// Notifications emitted by the transport and forwarded by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportEvent {
    /// Duration became known.
    LoadedMetadata,
    /// Position changed outside of normal playback progress.
    TimeUpdate,
    /// Playback reached the end of the media.
    Ended,
}

/// Transport that advances position with a monotonic clock.
///
/// Suitable for headless hosts that have no audio output but still need a
/// timeline to scrub and play through.
#[derive(Debug)]
pub struct ClockTransport {
    duration: f64,
    anchor_position: f64,
    started_at: Option<Instant>,
}

impl ClockTransport {
    /// Create a paused transport at position zero.
    pub fn new(duration: f64) -> Self {
        Self {
            duration: sanitize_duration(duration),
            anchor_position: 0.0,
            started_at: None,
        }
    }

    /// Replace the media length, clamping the current position into it.
    pub fn set_duration(&mut self, duration: f64) {
        let position = self.current_time();
        self.duration = sanitize_duration(duration);
        self.anchor_position = position.min(self.duration);
        if self.started_at.is_some() {
            self.started_at = Some(Instant::now());
        }
    }

    /// Report `Ended` once when playback runs past the end, then settle paused at the end.
    pub fn poll_event(&mut self) -> Option<TransportEvent> {
        if self.started_at.is_some() && self.raw_position() >= self.duration {
            self.anchor_position = self.duration;
            self.started_at = None;
            return Some(TransportEvent::Ended);
        }
        None
    }

    fn raw_position(&self) -> f64 {
        match self.started_at {
            Some(started) => self.anchor_position + started.elapsed().as_secs_f64(),
            None => self.anchor_position,
        }
    }
}

impl Transport for ClockTransport {
    fn play(&mut self) {
        if self.started_at.is_some() || self.duration <= 0.0 {
            return;
        }
        if self.anchor_position >= self.duration {
            self.anchor_position = 0.0;
        }
        self.started_at = Some(Instant::now());
    }

    fn pause(&mut self) {
        self.anchor_position = self.current_time();
        self.started_at = None;
    }

    fn seek(&mut self, seconds: f64) {
        let target = if seconds.is_finite() { seconds } else { 0.0 };
        self.anchor_position = target.clamp(0.0, self.duration);
        if self.started_at.is_some() {
            self.started_at = Some(Instant::now());
        }
    }

    fn current_time(&self) -> f64 {
        self.raw_position().min(self.duration)
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn is_playing(&self) -> bool {
        self.started_at.is_some() && self.raw_position() < self.duration
    }
}

fn sanitize_duration(duration: f64) -> f64 {
    if duration.is_finite() { duration.max(0.0) } else { 0.0 }
}
