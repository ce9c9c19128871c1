// Actuator error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Actuator error code constants
///
/// Error code range: 3001-3003
pub struct ActuatorErrorCodes {}

impl ActuatorErrorCodes {
    /// Output channel could not be opened
    pub const CHANNEL_UNAVAILABLE: i32 = 3001;

    /// Writing a code to the channel failed
    pub const CHANNEL_WRITE_FAILURE: i32 = 3002;

    /// A scheduled emission was cancelled before the settling delay elapsed
    pub const CANCELLED: i32 = 3003;
}

/// Log an actuator error with structured context
pub fn log_actuator_error(err: &ActuatorError, context: &str) {
    error!(
        "Actuator error in {}: code={}, component=Actuator, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Actuation errors
///
/// These are reported and never retried. They do not affect the trial log.
#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorError {
    /// Device could not be opened at session start
    ChannelUnavailable { device: String, reason: String },

    /// Writing the code failed
    ChannelWriteFailure { code: u8, reason: String },

    /// Emission was cancelled during the settling delay
    Cancelled { code: u8 },
}

impl ErrorCode for ActuatorError {
    fn code(&self) -> i32 {
        match self {
            ActuatorError::ChannelUnavailable { .. } => ActuatorErrorCodes::CHANNEL_UNAVAILABLE,
            ActuatorError::ChannelWriteFailure { .. } => {
                ActuatorErrorCodes::CHANNEL_WRITE_FAILURE
            }
            ActuatorError::Cancelled { .. } => ActuatorErrorCodes::CANCELLED,
        }
    }

    fn message(&self) -> String {
        match self {
            ActuatorError::ChannelUnavailable { device, reason } => {
                format!("Actuator channel {} not available: {}", device, reason)
            }
            ActuatorError::ChannelWriteFailure { code, reason } => {
                format!("Failed to write code {}: {}", code, reason)
            }
            ActuatorError::Cancelled { code } => {
                format!("Emission of code {} cancelled", code)
            }
        }
    }
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ActuatorError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for ActuatorError {}
