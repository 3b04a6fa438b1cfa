//! Decoded audio held in memory for visualization.

use thiserror::Error;

/// Errors raised when decoded audio violates the buffer invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SampleBufferError {
    /// No channels were supplied.
    #[error("Sample buffer needs at least one channel")]
    NoChannels,
    /// The sample rate was zero.
    #[error("Sample buffer sample rate must be non-zero")]
    ZeroSampleRate,
    /// Channels were supplied but held no frames.
    #[error("Sample buffer holds no frames")]
    Empty,
    /// A channel length differs from the first channel.
    #[error("Channel {channel} has {found} frames, expected {expected}")]
    ChannelLengthMismatch {
        /// Index of the offending channel.
        channel: usize,
        /// Frame count of channel 0.
        expected: usize,
        /// Frame count of the offending channel.
        found: usize,
    },
}

/// Immutable multi-channel audio decoded from a single file.
///
/// Every channel holds the same number of frames and the duration is always
/// positive. Share it behind an `Arc` so the envelope builder and live tap can
/// read it without copying.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    sample_rate: u32,
    channels: Vec<Box<[f32]>>,
    duration_seconds: f64,
}

impl SampleBuffer {
    /// Build a buffer from planar (per-channel) samples.
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self, SampleBufferError> {
        if sample_rate == 0 {
            return Err(SampleBufferError::ZeroSampleRate);
        }
        let Some(first) = channels.first() else {
            return Err(SampleBufferError::NoChannels);
        };
        let expected = first.len();
        if expected == 0 {
            return Err(SampleBufferError::Empty);
        }
        if let Some((channel, found)) = channels
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|(_, len)| *len != expected)
        {
            return Err(SampleBufferError::ChannelLengthMismatch {
                channel,
                expected,
                found,
            });
        }
        Ok(Self {
            sample_rate,
            duration_seconds: expected as f64 / sample_rate as f64,
            channels: channels.into_iter().map(Vec::into_boxed_slice).collect(),
        })
    }

    /// Build a buffer from interleaved samples, dropping any trailing partial frame.
    pub fn from_interleaved(
        samples: &[f32],
        channel_count: usize,
        sample_rate: u32,
    ) -> Result<Self, SampleBufferError> {
        if channel_count == 0 {
            return Err(SampleBufferError::NoChannels);
        }
        let frames = samples.len() / channel_count;
        let mut planar = vec![Vec::with_capacity(frames); channel_count];
        for frame in samples.chunks_exact(channel_count) {
            for (channel, &sample) in planar.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }
        Self::new(sample_rate, planar)
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels (at least one).
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Frames per channel.
    pub fn frame_count(&self) -> usize {
        self.channels[0].len()
    }

    /// Duration in seconds; always greater than zero.
    pub fn duration(&self) -> f64 {
        self.duration_seconds
    }

    /// Samples for one channel, if it exists.
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(|samples| &samples[..])
    }

    /// The channel used for envelope and live analysis.
    pub fn reference_channel(&self) -> &[f32] {
        &self.channels[0]
    }

    /// Frame index nearest to `seconds`, clamped to the buffer.
    pub fn frame_at(&self, seconds: f64) -> usize {
        let frame = (seconds.max(0.0) * self.sample_rate as f64).floor() as usize;
        frame.min(self.frame_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_follows_frames_and_rate() {
        let buffer = SampleBuffer::new(4, vec![vec![0.0; 10], vec![0.5; 10]]).unwrap();
        assert_eq!(buffer.channel_count(), 2);
        assert_eq!(buffer.frame_count(), 10);
        assert!((buffer.duration() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn rejects_mismatched_channels() {
        let err = SampleBuffer::new(8, vec![vec![0.0; 4], vec![0.0; 3]]).unwrap_err();
        assert_eq!(
            err,
            SampleBufferError::ChannelLengthMismatch {
                channel: 1,
                expected: 4,
                found: 3
            }
        );
    }

    #[test]
    fn rejects_empty_and_zero_rate() {
        assert_eq!(
            SampleBuffer::new(8, vec![Vec::new()]).unwrap_err(),
            SampleBufferError::Empty
        );
        assert_eq!(
            SampleBuffer::new(0, vec![vec![0.1]]).unwrap_err(),
            SampleBufferError::ZeroSampleRate
        );
        assert_eq!(
            SampleBuffer::new(8, Vec::new()).unwrap_err(),
            SampleBufferError::NoChannels
        );
    }

    #[test]
    fn interleaved_input_is_split_per_channel() {
        let buffer = SampleBuffer::from_interleaved(&[0.1, -0.1, 0.2, -0.2, 0.3], 2, 2).unwrap();
        assert_eq!(buffer.channel(0).unwrap(), &[0.1, 0.2]);
        assert_eq!(buffer.channel(1).unwrap(), &[-0.1, -0.2]);
        assert!(buffer.channel(2).is_none());
    }

    #[test]
    fn frame_at_clamps_to_length() {
        let buffer = SampleBuffer::new(10, vec![vec![0.0; 20]]).unwrap();
        assert_eq!(buffer.frame_at(-1.0), 0);
        assert_eq!(buffer.frame_at(0.55), 5);
        assert_eq!(buffer.frame_at(30.0), 20);
    }
}
