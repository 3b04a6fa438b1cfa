use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{Fft, FftPlanner, num_complex::Complex};

use super::{LiveTap, TapError, TapSource};
use crate::config::LiveTapSettings;
use crate::samples::SampleBuffer;
use crate::transport::SharedTransport;

/// Attaches [`SampleTap`]s configured from [`LiveTapSettings`].
#[derive(Clone, Debug, Default)]
pub struct SampleTapSource {
    settings: LiveTapSettings,
}

impl SampleTapSource {
    pub fn new(settings: LiveTapSettings) -> Self {
        Self { settings }
    }
}

impl TapSource for SampleTapSource {
    fn attach(
        &mut self,
        samples: &Arc<SampleBuffer>,
        transport: &SharedTransport,
    ) -> Result<Box<dyn LiveTap>, TapError> {
        if samples.channel_count() == 0 {
            return Err(TapError::Unavailable {
                reason: "buffer has no channels".into(),
            });
        }
        Ok(Box::new(SampleTap::new(
            Arc::clone(samples),
            transport.clone(),
            &self.settings,
        )))
    }
}

/// Software analyser reading the decoded buffer at the transport position.
///
/// Each read covers the `fft_size` frames that end at the current playhead,
/// down-mixed to mono.
pub struct SampleTap {
    samples: Arc<SampleBuffer>,
    transport: SharedTransport,
    fft_size: usize,
    smoothing: f32,
    min_decibels: f32,
    max_decibels: f32,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    mono: Vec<f32>,
    spectrum: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

impl SampleTap {
    pub fn new(
        samples: Arc<SampleBuffer>,
        transport: SharedTransport,
        settings: &LiveTapSettings,
    ) -> Self {
        let fft_size = settings.fft_size.max(2);
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(fft_size);
        Self {
            samples,
            transport,
            fft_size,
            smoothing: settings.smoothing.clamp(0.0, 1.0),
            min_decibels: settings.min_decibels,
            max_decibels: settings.max_decibels,
            fft,
            window: blackman_window(fft_size),
            mono: vec![0.0; fft_size],
            spectrum: vec![Complex { re: 0.0, im: 0.0 }; fft_size],
            smoothed: vec![0.0; fft_size / 2],
        }
    }

    /// Fill `mono` with the frames preceding the playhead; zero before the start.
    fn capture_window(&mut self) {
        let seconds = self.transport.borrow().current_time();
        let end = self.samples.frame_at(seconds);
        let channels = self.samples.channel_count();
        let start = end as isize - self.fft_size as isize;
        for (offset, slot) in self.mono.iter_mut().enumerate() {
            let frame = start + offset as isize;
            if frame < 0 {
                *slot = 0.0;
                continue;
            }
            let frame = frame as usize;
            let sum = (0..channels)
                .filter_map(|channel| self.samples.channel(channel)?.get(frame))
                .sum::<f32>();
            *slot = sum / channels as f32;
        }
    }

    fn decibels_to_byte(&self, magnitude: f32) -> u8 {
        if magnitude <= 0.0 {
            return 0;
        }
        let decibels = 20.0 * magnitude.log10();
        let range = (self.max_decibels - self.min_decibels).max(f32::EPSILON);
        let scaled = 255.0 / range * (decibels - self.min_decibels);
        scaled.floor().clamp(0.0, 255.0) as u8
    }
}

impl LiveTap for SampleTap {
    fn time_domain_len(&self) -> usize {
        self.fft_size
    }

    fn frequency_bin_count(&self) -> usize {
        self.fft_size / 2
    }

    fn read_time_domain(&mut self, out: &mut Vec<u8>) {
        self.capture_window();
        out.clear();
        out.extend(self.mono.iter().map(|sample| sample_to_byte(*sample)));
    }

    fn read_frequency_domain(&mut self, out: &mut Vec<u8>) {
        self.capture_window();
        for ((bin, sample), weight) in self.spectrum.iter_mut().zip(&self.mono).zip(&self.window) {
            *bin = Complex {
                re: sample * weight,
                im: 0.0,
            };
        }
        self.fft.process(&mut self.spectrum);
        let scale = 1.0 / self.fft_size as f32;
        let smoothing = self.smoothing;
        for (previous, bin) in self.smoothed.iter_mut().zip(&self.spectrum) {
            let magnitude = bin.norm() * scale;
            *previous = smoothing * *previous + (1.0 - smoothing) * magnitude;
        }
        out.clear();
        out.extend(
            self.smoothed
                .iter()
                .map(|magnitude| self.decibels_to_byte(*magnitude)),
        );
    }
}

fn sample_to_byte(sample: f32) -> u8 {
    (128.0 * (1.0 + sample)).floor().clamp(0.0, 255.0) as u8
}

fn blackman_window(size: usize) -> Vec<f32> {
    const ALPHA: f32 = 0.16;
    let a0 = 0.5 * (1.0 - ALPHA);
    let a1 = 0.5;
    let a2 = 0.5 * ALPHA;
    (0..size)
        .map(|n| {
            let phase = 2.0 * PI * n as f32 / size as f32;
            a0 - a1 * phase.cos() + a2 * (2.0 * phase).cos()
        })
        .collect()
}
