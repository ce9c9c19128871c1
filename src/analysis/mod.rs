// Analysis module - per-frame classification and per-trial decisions
//
// Pipeline per frame:   FeatureVector -> Classifier -> DecisionWindow
// Pipeline per trial:   DecisionWindow::stop() -> Decision

pub mod classifier;
pub mod decision;

pub use classifier::{Classifier, Neighbor, SamplePool};
pub use decision::{reduce, DecisionWindow, Reduction, WindowState};
