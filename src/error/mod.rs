// Error types for the vibration classifier
//
// This module defines one error enum per pipeline stage (dataset, classifier,
// actuator, front-end, session), each carrying a numeric code so operator-facing
// surfaces can report failures without matching on variants.

mod actuator;
mod classifier;
mod dataset;
mod frontend;
mod session;

pub use actuator::{log_actuator_error, ActuatorError, ActuatorErrorCodes};
pub use classifier::{log_classifier_error, ClassifierError, ClassifierErrorCodes};
pub use dataset::{log_dataset_error, DatasetError, DatasetErrorCodes};
pub use frontend::{log_frontend_error, FrontendError, FrontendErrorCodes};
pub use session::{SessionError, SessionErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, so the CLI and the trial log can report
/// failures uniformly.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
