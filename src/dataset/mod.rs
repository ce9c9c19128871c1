// Dataset module - labeled feature data and its persisted form
//
// This module provides:
// 1. ClassSet / ClassId / Decision: the closed label vocabulary
// 2. FeatureVector / DataInstance: immutable per-frame samples
// 3. TrainingSet: samples grouped by configured class
// 4. persistence: the comma-delimited row format

pub mod instance;
pub mod labels;
pub mod persistence;
pub mod training_set;

pub use instance::{capture, DataInstance, FeatureVector, DEFAULT_BANDS};
pub use labels::{ClassId, ClassSet, Decision, NO_ACTION_LABEL};
pub use persistence::{LoadReport, RejectedRow};
pub use training_set::TrainingSet;
