//! Decode collaborators that turn file bytes into a [`SampleBuffer`].

use std::io::Cursor;

use hound::SampleFormat;
use thiserror::Error;

use crate::samples::{SampleBuffer, SampleBufferError};

/// Errors reported when audio bytes cannot become a sample buffer.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes are not in a format this decoder understands.
    #[error("Unsupported audio format: {message}")]
    Unsupported {
        /// Reason reported by the container parser.
        message: String,
    },
    /// A sample could not be read from an otherwise valid container.
    #[error("Sample error: {source}")]
    Sample {
        /// Underlying WAV error.
        source: hound::Error,
    },
    /// Decoded audio violated the sample buffer invariants.
    #[error(transparent)]
    Buffer(#[from] SampleBufferError),
}

/// Converts encoded file bytes into decoded audio.
pub trait DecodeService {
    /// Decode a complete file held in memory.
    fn decode(&self, bytes: &[u8]) -> Result<SampleBuffer, DecodeError>;
}

/// WAV decoder supporting integer PCM and 32-bit float files.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavDecoder;

impl DecodeService for WavDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<SampleBuffer, DecodeError> {
        let mut reader = hound::WavReader::new(Cursor::new(bytes)).map_err(|source| {
            DecodeError::Unsupported {
                message: source.to_string(),
            }
        })?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;
        let interleaved = match spec.sample_format {
            SampleFormat::Float => read_float_samples(&mut reader)?,
            SampleFormat::Int => read_int_samples(&mut reader, spec.bits_per_sample)?,
        };
        tracing::debug!(
            channels,
            sample_rate = spec.sample_rate,
            samples = interleaved.len(),
            "Decoded wav payload"
        );
        Ok(SampleBuffer::from_interleaved(
            &interleaved,
            channels,
            spec.sample_rate,
        )?)
    }
}

fn read_float_samples(
    reader: &mut hound::WavReader<Cursor<&[u8]>>,
) -> Result<Vec<f32>, DecodeError> {
    reader
        .samples::<f32>()
        .map(|s| s.map_err(|source| DecodeError::Sample { source }))
        .collect()
}

fn read_int_samples(
    reader: &mut hound::WavReader<Cursor<&[u8]>>,
    bits_per_sample: u16,
) -> Result<Vec<f32>, DecodeError> {
    let scale = (1i64 << bits_per_sample.saturating_sub(1)).max(1) as f32;
    reader
        .samples::<i32>()
        .map(|s| {
            s.map(|v| v as f32 / scale)
                .map_err(|source| DecodeError::Sample { source })
        })
        .collect()
}
