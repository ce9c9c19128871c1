// Dataset error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Dataset error code constants
///
/// Error code range: 1001-1005
pub struct DatasetErrorCodes {}

impl DatasetErrorCodes {
    /// Feature vector length does not match the configured band count
    pub const INVALID_DIMENSION: i32 = 1001;

    /// Label is not one of the configured class names
    pub const UNKNOWN_LABEL: i32 = 1002;

    /// Persisted row could not be parsed
    pub const MALFORMED_ROW: i32 = 1003;

    /// Dataset file could not be read or written
    pub const IO: i32 = 1004;

    /// Configured class names are unusable (empty, duplicated, or missing the neutral class)
    pub const INVALID_CLASS_SET: i32 = 1005;
}

/// Log a dataset error with structured context
///
/// Emits the numeric code, the component, and the message on one line.
pub fn log_dataset_error(err: &DatasetError, context: &str) {
    error!(
        "Dataset error in {}: code={}, component=TrainingSet, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Dataset-related errors
///
/// These errors cover capture, training set mutation, and persistence.
/// All of them reject a single unit (one frame, one append, one row) and
/// leave the training set untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetError {
    /// Feature vector has the wrong number of bands
    InvalidDimension { expected: usize, actual: usize },

    /// Label outside the configured class set
    UnknownLabel { label: String },

    /// Persisted row does not have `bands + 1` columns or a feature is not a number
    MalformedRow { line: usize, reason: String },

    /// Underlying file I/O failed
    Io { details: String },

    /// Class configuration rejected at startup
    InvalidClassSet { reason: String },
}

impl ErrorCode for DatasetError {
    fn code(&self) -> i32 {
        match self {
            DatasetError::InvalidDimension { .. } => DatasetErrorCodes::INVALID_DIMENSION,
            DatasetError::UnknownLabel { .. } => DatasetErrorCodes::UNKNOWN_LABEL,
            DatasetError::MalformedRow { .. } => DatasetErrorCodes::MALFORMED_ROW,
            DatasetError::Io { .. } => DatasetErrorCodes::IO,
            DatasetError::InvalidClassSet { .. } => DatasetErrorCodes::INVALID_CLASS_SET,
        }
    }

    fn message(&self) -> String {
        match self {
            DatasetError::InvalidDimension { expected, actual } => {
                format!(
                    "Feature vector has {} bands, expected {}",
                    actual, expected
                )
            }
            DatasetError::UnknownLabel { label } => {
                format!("Unknown label '{}'", label)
            }
            DatasetError::MalformedRow { line, reason } => {
                format!("Malformed row at line {}: {}", line, reason)
            }
            DatasetError::Io { details } => format!("Dataset I/O error: {}", details),
            DatasetError::InvalidClassSet { reason } => {
                format!("Invalid class configuration: {}", reason)
            }
        }
    }
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DatasetError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for DatasetError {}

impl From<std::io::Error> for DatasetError {
    fn from(err: std::io::Error) -> Self {
        DatasetError::Io {
            details: err.to_string(),
        }
    }
}
