// Classifier error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Classifier error code constants
///
/// Error code range: 2001-2003
pub struct ClassifierErrorCodes {}

impl ClassifierErrorCodes {
    /// Training was requested on a set where every class is empty
    pub const EMPTY_TRAINING_SET: i32 = 2001;

    /// Classification was requested before any model exists
    pub const NOT_TRAINED: i32 = 2002;

    /// Query or added sample has the wrong number of bands
    pub const INVALID_DIMENSION: i32 = 2003;
}

/// Log a classifier error with structured context
pub fn log_classifier_error(err: &ClassifierError, context: &str) {
    error!(
        "Classifier error in {}: code={}, component=Classifier, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Classifier readiness and input errors
///
/// Readiness errors (`EmptyTrainingSet`, `NotTrained`) block classification
/// but never invalidate an existing model.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifierError {
    /// Every configured class has zero samples
    EmptyTrainingSet,

    /// No model has been built yet
    NotTrained,

    /// Sample length differs from the model's band count
    InvalidDimension { expected: usize, actual: usize },
}

impl ErrorCode for ClassifierError {
    fn code(&self) -> i32 {
        match self {
            ClassifierError::EmptyTrainingSet => ClassifierErrorCodes::EMPTY_TRAINING_SET,
            ClassifierError::NotTrained => ClassifierErrorCodes::NOT_TRAINED,
            ClassifierError::InvalidDimension { .. } => ClassifierErrorCodes::INVALID_DIMENSION,
        }
    }

    fn message(&self) -> String {
        match self {
            ClassifierError::EmptyTrainingSet => {
                "Training set is empty. Capture samples first.".to_string()
            }
            ClassifierError::NotTrained => {
                "Classifier not trained. Call train() first.".to_string()
            }
            ClassifierError::InvalidDimension { expected, actual } => {
                format!("Sample has {} bands, model expects {}", actual, expected)
            }
        }
    }
}

impl fmt::Display for ClassifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ClassifierError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for ClassifierError {}
