// Front-end error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Front-end error code constants
///
/// Error code range: 5001-5003
pub struct FrontendErrorCodes {}

impl FrontendErrorCodes {
    /// Band count must be > 0
    pub const INVALID_BANDS: i32 = 5001;

    /// Audio file could not be opened or decoded
    pub const DECODE_FAILED: i32 = 5002;

    /// Audio file sample rate differs from the configured one
    pub const SAMPLE_RATE_MISMATCH: i32 = 5003;
}

/// Log a front-end error with structured context
pub fn log_frontend_error(err: &FrontendError, context: &str) {
    error!(
        "Frontend error in {}: code={}, component=Frontend, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Spectral front-end errors
#[derive(Debug, Clone, PartialEq)]
pub enum FrontendError {
    InvalidBands { bands: usize },

    /// hound could not read the file
    DecodeFailed { path: String, reason: String },

    SampleRateMismatch { expected: u32, actual: u32 },
}

impl ErrorCode for FrontendError {
    fn code(&self) -> i32 {
        match self {
            FrontendError::InvalidBands { .. } => FrontendErrorCodes::INVALID_BANDS,
            FrontendError::DecodeFailed { .. } => FrontendErrorCodes::DECODE_FAILED,
            FrontendError::SampleRateMismatch { .. } => FrontendErrorCodes::SAMPLE_RATE_MISMATCH,
        }
    }

    fn message(&self) -> String {
        match self {
            FrontendError::InvalidBands { bands } => {
                format!("Invalid band count {}. Must be > 0", bands)
            }
            FrontendError::DecodeFailed { path, reason } => {
                format!("Failed to decode {}: {}", path, reason)
            }
            FrontendError::SampleRateMismatch { expected, actual } => {
                format!("Expected {} Hz audio, got {} Hz", expected, actual)
            }
        }
    }
}

impl fmt::Display for FrontendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FrontendError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for FrontendError {}
