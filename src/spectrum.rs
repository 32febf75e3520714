//! Windowed forward FFT producing a half-length dB magnitude spectrum.
//!
//! The transform itself comes from `realfft`; this wrapper owns the Hann
//! window, the 1/N normalization, and the decibel conversion, and reuses its
//! buffers so the per-frame path does not allocate.

use std::f32::consts::PI;
use std::sync::Arc;

use num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};

use crate::analysis::DB_FLOOR;
use crate::error::AnalysisError;

/// Smallest window the processor accepts.
pub const MIN_BUFFER_SIZE: usize = 64;

pub struct SpectrumProcessor {
    fft: Arc<dyn RealToComplex<f32>>,
    window: Vec<f32>,
    input: Vec<f32>,
    output: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    buffer_size: usize,
    sample_rate: f32,
}

impl SpectrumProcessor {
    /// Plan a forward real FFT for windows of `buffer_size` samples.
    ///
    /// `buffer_size` must be a power of two and at least [`MIN_BUFFER_SIZE`].
    pub fn new(buffer_size: usize, sample_rate: f32) -> Result<Self, AnalysisError> {
        if buffer_size < MIN_BUFFER_SIZE || !buffer_size.is_power_of_two() {
            return Err(AnalysisError::InvalidBufferSize { size: buffer_size });
        }

        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(buffer_size);
        let output = fft.make_output_vec();
        let scratch = fft.make_scratch_vec();

        Ok(Self {
            fft,
            window: hann_window(buffer_size),
            input: vec![0.0; buffer_size],
            output,
            scratch,
            buffer_size,
            sample_rate,
        })
    }

    /// Magnitude bins produced per frame: DC up to, excluding, Nyquist.
    pub fn spectrum_len(&self) -> usize {
        self.buffer_size / 2
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Frequency spacing between adjacent bins in Hz.
    pub fn resolution_hz(&self) -> f32 {
        self.sample_rate / self.buffer_size as f32
    }

    /// Center frequency of a bin in Hz.
    pub fn bin_to_hz(&self, bin: usize) -> f32 {
        bin as f32 * self.resolution_hz()
    }

    /// Window, transform, and write `spectrum_len()` dB magnitudes into
    /// `spectrum_db`, replacing its contents.
    pub fn process(
        &mut self,
        time_data: &[f32],
        spectrum_db: &mut Vec<f32>,
    ) -> Result<(), AnalysisError> {
        if time_data.len() != self.buffer_size {
            return Err(AnalysisError::WindowSizeMismatch {
                expected: self.buffer_size,
                actual: time_data.len(),
            });
        }

        for (dst, (&sample, &coeff)) in self
            .input
            .iter_mut()
            .zip(time_data.iter().zip(self.window.iter()))
        {
            *dst = sample * coeff;
        }

        self.fft
            .process_with_scratch(&mut self.input, &mut self.output, &mut self.scratch)
            .map_err(|e| AnalysisError::FftFailed {
                reason: e.to_string(),
            })?;

        let half = self.spectrum_len();
        let n = self.buffer_size as f32;
        spectrum_db.clear();
        spectrum_db.extend(
            self.output[..half]
                .iter()
                .map(|c| 20.0 * (c.norm() / n).max(DB_FLOOR).log10()),
        );

        Ok(())
    }
}

/// Hann window coefficients: 0.5 * (1 - cos(2*pi*i / (n-1)))
fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / (size as f32 - 1.0)).cos()))
        .collect()
}
