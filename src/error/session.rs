// Session error types

use crate::error::{ActuatorError, ClassifierError, DatasetError, ErrorCode};
use std::fmt;

/// Session-level error code constants
///
/// Wrapped errors report their own codes; only the state machine owns a code
/// in this range.
pub struct SessionErrorCodes {}

impl SessionErrorCodes {
    /// Event is not valid in the current mode
    pub const INVALID_TRANSITION: i32 = 4001;
}

/// Errors surfaced by session operations
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    Dataset(DatasetError),
    Classifier(ClassifierError),
    Actuator(ActuatorError),

    /// Event rejected by the mode state machine
    InvalidTransition { event: String, mode: String },
}

impl ErrorCode for SessionError {
    fn code(&self) -> i32 {
        match self {
            SessionError::Dataset(err) => err.code(),
            SessionError::Classifier(err) => err.code(),
            SessionError::Actuator(err) => err.code(),
            SessionError::InvalidTransition { .. } => SessionErrorCodes::INVALID_TRANSITION,
        }
    }

    fn message(&self) -> String {
        match self {
            SessionError::Dataset(err) => err.message(),
            SessionError::Classifier(err) => err.message(),
            SessionError::Actuator(err) => err.message(),
            SessionError::InvalidTransition { event, mode } => {
                format!("Cannot handle {} while {}", event, mode)
            }
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Dataset(err) => err.fmt(f),
            SessionError::Classifier(err) => err.fmt(f),
            SessionError::Actuator(err) => err.fmt(f),
            SessionError::InvalidTransition { .. } => write!(
                f,
                "SessionError::{:?} (code {}): {}",
                self,
                self.code(),
                self.message()
            ),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Dataset(err) => Some(err),
            SessionError::Classifier(err) => Some(err),
            SessionError::Actuator(err) => Some(err),
            SessionError::InvalidTransition { .. } => None,
        }
    }
}

impl From<DatasetError> for SessionError {
    fn from(err: DatasetError) -> Self {
        SessionError::Dataset(err)
    }
}

impl From<ClassifierError> for SessionError {
    fn from(err: ClassifierError) -> Self {
        SessionError::Classifier(err)
    }
}

impl From<ActuatorError> for SessionError {
    fn from(err: ActuatorError) -> Self {
        SessionError::Actuator(err)
    }
}
