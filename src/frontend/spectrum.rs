// Spectrum module - PCM frame to N-band magnitude vector
//
// One frame of 2N samples is Hann-windowed and transformed with a forward
// FFT; the first N bins become the feature vector. Magnitudes are scaled by
// 2 / frame_size so a full-scale sine lands near 1.0 regardless of N.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use crate::error::FrontendError;

/// Computes fixed-length magnitude spectra from PCM frames
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    bands: usize,
    /// Hann window (pre-computed)
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
}

impl SpectrumAnalyzer {
    /// Create an analyzer producing `bands` magnitudes per frame
    ///
    /// # Errors
    /// `InvalidBands` if `bands == 0`.
    pub fn new(bands: usize) -> Result<Self, FrontendError> {
        if bands == 0 {
            return Err(FrontendError::InvalidBands { bands });
        }

        let frame_size = bands * 2;
        let window = (0..frame_size)
            .map(|i| {
                0.5 * (1.0
                    - ((2.0 * std::f32::consts::PI * i as f32) / (frame_size as f32 - 1.0)).cos())
            })
            .collect();

        let fft = FftPlanner::new().plan_fft_forward(frame_size);

        Ok(Self {
            fft,
            bands,
            window,
            buffer: Vec::with_capacity(frame_size),
        })
    }

    pub fn bands(&self) -> usize {
        self.bands
    }

    /// Samples consumed per frame
    pub fn frame_size(&self) -> usize {
        self.window.len()
    }

    /// Magnitude spectrum of one frame
    ///
    /// Short frames are zero-padded; samples beyond `frame_size()` are ignored.
    /// The result always has `bands()` entries.
    pub fn analyze(&mut self, frame: &[f32]) -> Vec<f32> {
        let frame_size = self.frame_size();

        self.buffer.clear();
        self.buffer.extend(
            frame
                .iter()
                .zip(&self.window)
                .map(|(&sample, &w)| Complex::new(sample * w, 0.0)),
        );
        self.buffer.resize(frame_size, Complex::new(0.0, 0.0));

        self.fft.process(&mut self.buffer);

        let scale = 2.0 / frame_size as f32;
        self.buffer[..self.bands]
            .iter()
            .map(|c| c.norm() * scale)
            .collect()
    }
}
