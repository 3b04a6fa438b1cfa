//! Live sample access for the playing audio.
//!
//! A [`TapSource`] attaches an analyser to a loaded buffer and transport. The
//! [`LiveTapSlot`] owns the attached tap and remembers when the platform
//! cannot provide one, so callers fall back to static rendering instead of
//! retrying on every frame.

mod sample_tap;

use std::sync::Arc;

use crate::samples::SampleBuffer;
use crate::transport::SharedTransport;

pub use sample_tap::{SampleTap, SampleTapSource};

/// Byte-quantized views of the audio currently playing.
pub trait LiveTap {
    /// Number of bytes `read_time_domain` produces.
    fn time_domain_len(&self) -> usize;
    /// Number of bytes `read_frequency_domain` produces.
    fn frequency_bin_count(&self) -> usize;
    /// Fill `out` with unsigned samples centered on 128.
    fn read_time_domain(&mut self, out: &mut Vec<u8>);
    /// Fill `out` with magnitudes, 0 for silence up to 255 for loud bins.
    fn read_frequency_domain(&mut self, out: &mut Vec<u8>);
}

/// Creates live taps for a loaded buffer.
pub trait TapSource {
    fn attach(
        &mut self,
        samples: &Arc<SampleBuffer>,
        transport: &SharedTransport,
    ) -> Result<Box<dyn LiveTap>, TapError>;
}

/// Attach failures.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TapError {
    /// The platform cannot provide live sample access.
    #[error("Live tap unavailable: {reason}")]
    Unavailable { reason: String },
    /// The attach failed but may succeed later.
    #[error("Live tap attach failed: {reason}")]
    Transient { reason: String },
}

/// Whether a live tap is usable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TapState {
    Detached,
    Attached,
    Unsupported,
}

/// Holds at most one attached tap for the current audio.
pub struct LiveTapSlot {
    tap: Option<Box<dyn LiveTap>>,
    unsupported: bool,
    transient_failures: u32,
    retry_limit: u32,
}

impl LiveTapSlot {
    /// `retry_limit` is how many transient attach failures are tolerated before giving up.
    pub fn new(retry_limit: u32) -> Self {
        Self {
            tap: None,
            unsupported: false,
            transient_failures: 0,
            retry_limit,
        }
    }

    pub fn state(&self) -> TapState {
        if self.tap.is_some() {
            TapState::Attached
        } else if self.unsupported {
            TapState::Unsupported
        } else {
            TapState::Detached
        }
    }

    /// Attach on first use and return the tap, or `None` when live access is unavailable.
    pub fn ensure_attached(
        &mut self,
        source: &mut dyn TapSource,
        samples: &Arc<SampleBuffer>,
        transport: &SharedTransport,
    ) -> Option<&mut dyn LiveTap> {
        if self.unsupported {
            return None;
        }
        if self.tap.is_none() {
            match source.attach(samples, transport) {
                Ok(tap) => {
                    tracing::info!(
                        "Live tap attached ({} time samples, {} bins)",
                        tap.time_domain_len(),
                        tap.frequency_bin_count()
                    );
                    self.transient_failures = 0;
                    self.tap = Some(tap);
                }
                Err(err @ TapError::Unavailable { .. }) => {
                    tracing::warn!("{err}; falling back to static rendering");
                    self.unsupported = true;
                }
                Err(err @ TapError::Transient { .. }) => {
                    self.transient_failures += 1;
                    if self.transient_failures > self.retry_limit {
                        tracing::warn!(
                            "{err}; giving up after {} attempts",
                            self.transient_failures
                        );
                        self.unsupported = true;
                    } else {
                        tracing::debug!("{err}; will retry on next play");
                    }
                }
            }
        }
        self.tap_mut()
    }

    /// The attached tap, without attempting to attach.
    pub fn tap_mut(&mut self) -> Option<&mut dyn LiveTap> {
        match self.tap.as_deref_mut() {
            Some(tap) => Some(tap),
            None => None,
        }
    }

    /// Drop the attached tap. Safe to call repeatedly.
    pub fn detach(&mut self) {
        if self.tap.take().is_some() {
            tracing::debug!("Live tap detached");
        }
    }

    /// Detach and forget any earlier failure so new audio can try again.
    pub fn reset(&mut self) {
        self.detach();
        self.unsupported = false;
        self.transient_failures = 0;
    }
}
