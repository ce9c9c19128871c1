// Session mode state machine
//
// Replaces key-driven toggles with named events:
//
//   Idle --StartCapture--> Capturing(class) --StopCapture--> Idle
//   Idle --StartTrial--> Collecting --StopTrial--> Idle
//
// Train, Untrain and SelectNextClass never leave the capture/idle side, so a
// model swap can never land in the middle of a trial.

use std::fmt;

use crate::dataset::{ClassId, ClassSet};

/// Current mode of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Not capturing and not in a trial; frames are classified for display if a model exists
    Idle,
    /// Every frame is appended to the training set under this class
    Capturing(ClassId),
    /// Every frame is classified and fed to the decision window
    Collecting,
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionMode::Idle => write!(f, "Idle"),
            SessionMode::Capturing(class) => write!(f, "Capturing(#{})", class.index()),
            SessionMode::Collecting => write!(f, "Collecting"),
        }
    }
}

impl SessionMode {
    /// Like `Display`, with the capture class resolved to its name
    pub fn describe(&self, classes: &ClassSet) -> String {
        match self {
            SessionMode::Capturing(class) => format!("Capturing({})", classes.name(*class)),
            other => other.to_string(),
        }
    }
}

/// Operator input, independent of any key binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Move the capture cursor to the next configured class
    SelectNextClass,
    StartCapture,
    StopCapture,
    /// Rebuild the model from the training set
    Train,
    /// Discard the model
    Untrain,
    /// Trial start edge
    StartTrial,
    /// Trial stop edge; reduces and actuates
    StopTrial,
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionEvent::SelectNextClass => "SelectNextClass",
            SessionEvent::StartCapture => "StartCapture",
            SessionEvent::StopCapture => "StopCapture",
            SessionEvent::Train => "Train",
            SessionEvent::Untrain => "Untrain",
            SessionEvent::StartTrial => "StartTrial",
            SessionEvent::StopTrial => "StopTrial",
        };
        f.write_str(name)
    }
}

impl SessionEvent {
    /// Whether the event is legal in `mode`
    ///
    /// Readiness (a trained model for StartTrial) is checked separately.
    pub fn allowed_in(self, mode: SessionMode) -> bool {
        match self {
            SessionEvent::SelectNextClass | SessionEvent::Train | SessionEvent::Untrain => {
                !matches!(mode, SessionMode::Collecting)
            }
            SessionEvent::StartCapture | SessionEvent::StartTrial => {
                matches!(mode, SessionMode::Idle)
            }
            SessionEvent::StopCapture => matches!(mode, SessionMode::Capturing(_)),
            SessionEvent::StopTrial => matches!(mode, SessionMode::Collecting),
        }
    }
}
