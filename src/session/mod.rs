// Session module - capture, training, trials and actuation behind one owner

pub mod core;
pub mod state;
pub mod trial_log;

pub use self::core::{EventOutcome, FrameOutcome, Session, SessionStatus};
pub use state::{SessionEvent, SessionMode};
pub use trial_log::{TrialLog, TrialRecord};
