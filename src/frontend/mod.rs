// Front-end module - raw audio to feature vectors
//
// The session only sees fixed-length magnitude vectors; this module is one
// way to produce them from recorded audio.

pub mod spectrum;
pub mod wav;

pub use spectrum::SpectrumAnalyzer;
pub use wav::WavFrameSource;
