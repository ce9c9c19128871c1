// Vibration Classifier Core
// Spectral feature vectors -> nearest-neighbor labels -> trial decisions -> actuator codes

// Module declarations
pub mod actuator;
pub mod analysis;
pub mod config;
pub mod dataset;
pub mod error;
pub mod frontend;
pub mod session;

// Re-exports for convenience
pub use actuator::{ActuationStatus, ActuatorMap};
pub use analysis::{Classifier, DecisionWindow};
pub use config::AppConfig;
pub use dataset::{ClassId, ClassSet, DataInstance, Decision, FeatureVector, TrainingSet};
pub use error::{ErrorCode, SessionError};
pub use session::{Session, SessionEvent, SessionMode, TrialRecord};
