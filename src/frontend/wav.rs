// WAV frame source - offline replacement for live capture
//
// Decodes a WAV file to mono f32 and hands it out in fixed-size frames for
// the spectrum analyzer.

use std::path::Path;

use crate::error::FrontendError;

use super::spectrum::SpectrumAnalyzer;

/// Mono PCM split into analysis frames
#[derive(Debug, Clone)]
pub struct WavFrameSource {
    samples: Vec<f32>,
    sample_rate: u32,
    frame_size: usize,
}

impl WavFrameSource {
    /// Decode `path` into frames of `frame_size` samples
    ///
    /// Multi-channel audio is averaged to mono. Integer samples are scaled to
    /// [-1.0, 1.0].
    ///
    /// # Errors
    /// `DecodeFailed` if the file cannot be opened or read.
    pub fn open<P: AsRef<Path>>(path: P, frame_size: usize) -> Result<Self, FrontendError> {
        let (samples, sample_rate) = read_wav(path.as_ref())?;
        log::info!(
            "[Frontend] Decoded {:?}: {} samples at {} Hz",
            path.as_ref(),
            samples.len(),
            sample_rate
        );
        Ok(Self::from_samples(samples, sample_rate, frame_size))
    }

    pub fn from_samples(samples: Vec<f32>, sample_rate: u32, frame_size: usize) -> Self {
        Self {
            samples,
            sample_rate,
            frame_size: frame_size.max(1),
        }
    }

    /// Fail unless the decoded rate equals `expected`
    pub fn require_sample_rate(&self, expected: u32) -> Result<(), FrontendError> {
        if self.sample_rate != expected {
            return Err(FrontendError::SampleRateMismatch {
                expected,
                actual: self.sample_rate,
            });
        }
        Ok(())
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Number of frames, counting a trailing partial frame
    pub fn frame_count(&self) -> usize {
        self.samples.len().div_ceil(self.frame_size)
    }

    /// Frames in order; the last one may be short
    pub fn frames(&self) -> impl Iterator<Item = &[f32]> + '_ {
        self.samples.chunks(self.frame_size)
    }

    /// Feature vector for every frame
    pub fn spectra(&self, analyzer: &mut SpectrumAnalyzer) -> Vec<Vec<f32>> {
        self.frames().map(|frame| analyzer.analyze(frame)).collect()
    }
}

fn decode_error(path: &Path, err: impl std::fmt::Display) -> FrontendError {
    FrontendError::DecodeFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

fn read_wav(path: &Path) -> Result<(Vec<f32>, u32), FrontendError> {
    let mut reader = hound::WavReader::open(path).map_err(|err| decode_error(path, err))?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(decode_error(path, "zero channels"));
    }

    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<f32>, _>>()
            .map_err(|err| decode_error(path, err))?,
        hound::SampleFormat::Int => {
            if !(1..=32).contains(&spec.bits_per_sample) {
                return Err(decode_error(
                    path,
                    format!("unsupported bits_per_sample={}", spec.bits_per_sample),
                ));
            }
            let full_scale = (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|sample| sample.map(|v| v as f32 / full_scale))
                .collect::<Result<Vec<f32>, _>>()
                .map_err(|err| decode_error(path, err))?
        }
    };

    let channels = spec.channels as usize;
    if channels == 1 {
        return Ok((samples, spec.sample_rate));
    }

    let mono = samples
        .chunks(channels)
        .map(|chunk| chunk.iter().sum::<f32>() / chunk.len() as f32)
        .collect();
    Ok((mono, spec.sample_rate))
}
