//! Per-column min/max summaries used for static waveform drawing.

use std::ops::Range;

use crate::samples::SampleBuffer;

/// Ordered `(min, max)` pairs, one per chart pixel column.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Envelope {
    columns: Vec<(f32, f32)>,
}

impl Envelope {
    /// Number of columns; equals the chart width it was built for.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True when built for a zero-width chart.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// All column extrema, left to right.
    pub fn columns(&self) -> &[(f32, f32)] {
        &self.columns
    }
}

/// Downsamples one channel into a fixed-width [`Envelope`].
///
/// Pure and deterministic: the same samples and width always produce a
/// bit-identical envelope.
pub struct EnvelopeBuilder;

impl EnvelopeBuilder {
    /// Samples scanned per column: `ceil(sample_count / width)`, at least one.
    pub fn step_for(sample_count: usize, width: usize) -> usize {
        if width == 0 {
            return 1;
        }
        sample_count.div_ceil(width).max(1)
    }

    /// Sample range scanned for `column`.
    ///
    /// Columns past the end of short inputs are clamped onto the last sample so
    /// every column still has a defined window.
    pub fn column_window(column: usize, step: usize, sample_count: usize) -> Range<usize> {
        if sample_count == 0 {
            return 0..0;
        }
        let start = column.saturating_mul(step).min(sample_count - 1);
        let end = start.saturating_add(step).min(sample_count).max(start + 1);
        start..end
    }

    /// Build the envelope of `samples` for a chart `width` pixels wide.
    pub fn build(samples: &[f32], width: usize) -> Envelope {
        if samples.is_empty() {
            return Envelope {
                columns: vec![(0.0, 0.0); width],
            };
        }
        let step = Self::step_for(samples.len(), width);
        let columns = (0..width)
            .map(|column| {
                let window = &samples[Self::column_window(column, step, samples.len())];
                let (min, max) = window
                    .iter()
                    .filter(|s| s.is_finite())
                    .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), &s| {
                        (min.min(s), max.max(s))
                    });
                // Column without a single finite sample.
                if min > max { (0.0, 0.0) } else { (min, max) }
            })
            .collect();
        Envelope { columns }
    }

    /// Build the envelope of the buffer's reference channel.
    pub fn build_for(buffer: &SampleBuffer, width: usize) -> Envelope {
        Self::build(buffer.reference_channel(), width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_matches_ceil_division() {
        assert_eq!(EnvelopeBuilder::step_for(44_100, 100), 441);
        assert_eq!(EnvelopeBuilder::step_for(1_001, 100), 11);
        assert_eq!(EnvelopeBuilder::step_for(3, 100), 1);
    }

    #[test]
    fn first_column_scans_leading_step() {
        let step = EnvelopeBuilder::step_for(44_100, 100);
        assert_eq!(EnvelopeBuilder::column_window(0, step, 44_100), 0..441);
        assert_eq!(EnvelopeBuilder::column_window(99, step, 44_100), 43_659..44_100);
    }

    #[test]
    fn length_matches_width_for_extremes() {
        let samples: Vec<f32> = (0..200_003).map(|i| ((i % 17) as f32 - 8.0) / 8.0).collect();
        assert_eq!(EnvelopeBuilder::build(&samples, 1).len(), 1);
        assert_eq!(EnvelopeBuilder::build(&samples, 997).len(), 997);
        assert_eq!(EnvelopeBuilder::build(&samples[..5], 640).len(), 640);
    }

    #[test]
    fn single_column_covers_all_samples() {
        let envelope = EnvelopeBuilder::build(&[0.2, -0.7, 0.9, 0.1], 1);
        assert_eq!(envelope.columns(), &[(-0.7, 0.9)]);
    }

    #[test]
    fn short_input_still_defines_every_column() {
        let envelope = EnvelopeBuilder::build(&[0.25, -0.5], 4);
        assert_eq!(
            envelope.columns(),
            &[(0.25, 0.25), (-0.5, -0.5), (-0.5, -0.5), (-0.5, -0.5)]
        );
        assert!(envelope.columns().iter().all(|(min, max)| min <= max));
    }

    #[test]
    fn build_is_deterministic() {
        let samples: Vec<f32> = (0..10_000).map(|i| (i as f32 * 0.013).sin()).collect();
        let first = EnvelopeBuilder::build(&samples, 333);
        let second = EnvelopeBuilder::build(&samples, 333);
        let bits = |env: &Envelope| {
            env.columns()
                .iter()
                .map(|(a, b)| (a.to_bits(), b.to_bits()))
                .collect::<Vec<_>>()
        };
        assert_eq!(bits(&first), bits(&second));
    }

    #[test]
    fn non_finite_samples_are_skipped() {
        let samples = [f32::NAN, f32::NAN, 0.5, f32::INFINITY, -0.25, f32::NAN];
        let envelope = EnvelopeBuilder::build(&samples, 3);
        assert_eq!(envelope.columns(), &[(0.0, 0.0), (0.5, 0.5), (-0.25, -0.25)]);
    }

    #[test]
    fn empty_samples_yield_flat_columns() {
        assert_eq!(EnvelopeBuilder::build(&[], 3).columns(), &[(0.0, 0.0); 3]);
    }
}
