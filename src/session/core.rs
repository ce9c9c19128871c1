// Session: owns the full pipeline for one operator
//
// frame -> (capture | classify) -> DecisionWindow -> TrialLog + actuation
//
// All state lives here and is mutated through `&mut self`, so a frame and an
// operator event can never interleave. Live front-ends feed frames and events
// from one loop; the CLI replays WAV files through the same calls.

use std::path::Path;

use tokio::sync::broadcast;

use crate::actuator::{ActuationSink, ActuationStatus, ActuatorMap};
use crate::analysis::{reduce, Classifier, DecisionWindow};
use crate::config::AppConfig;
use crate::dataset::persistence;
use crate::dataset::instance::check_dimension;
use crate::dataset::{ClassId, ClassSet, LoadReport, TrainingSet};
use crate::error::{log_actuator_error, ActuatorError, ClassifierError, DatasetError, SessionError};

use super::state::{SessionEvent, SessionMode};
use super::trial_log::{TrialLog, TrialRecord};

/// What a frame did to the session
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Idle with no model; nothing to do
    Ignored,
    /// Appended to the training set
    Captured { class: ClassId, count: usize },
    /// Classified; `recorded` is true if the label entered the trial window
    Classified {
        class: ClassId,
        squared_distance: f32,
        recorded: bool,
    },
}

/// What an event did to the session
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// Mode changed or stayed the same without further effect
    Mode(SessionMode),
    /// Capture cursor moved
    ClassSelected(ClassId),
    /// Model rebuilt from this many samples
    Trained { samples: usize },
    /// Model discarded
    Untrained,
    /// A trial finished and was logged
    TrialCompleted(TrialRecord),
}

/// Operator-facing snapshot of the session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStatus {
    pub mode: SessionMode,
    /// Class the next capture goes to
    pub active_class: String,
    pub active_class_samples: usize,
    pub total_samples: usize,
    pub trained: bool,
    pub trials: usize,
}

impl SessionStatus {
    /// Prompt line for the operator display
    pub fn prompt(&self) -> String {
        match self.mode {
            SessionMode::Collecting => "Now collecting data".to_string(),
            _ if self.trained => "Ready: start a trial to classify".to_string(),
            SessionMode::Capturing(_) => format!(
                "Capturing {} ({} samples)",
                self.active_class, self.active_class_samples
            ),
            SessionMode::Idle => format!(
                "{} selected ({} samples)",
                self.active_class, self.active_class_samples
            ),
        }
    }
}

/// Capture, training, trial and actuation state for one session
pub struct Session {
    classes: ClassSet,
    training_set: TrainingSet,
    classifier: Classifier,
    window: DecisionWindow,
    trial_log: TrialLog,
    actuator_map: ActuatorMap,
    sink: Option<Box<dyn ActuationSink>>,
    mode: SessionMode,
    cursor: ClassId,
}

impl Session {
    /// Create an idle, untrained session with an empty training set
    ///
    /// # Arguments
    /// * `classes` - Configured class vocabulary
    /// * `bands` - Feature vector length every frame must have
    /// * `actuator_map` - Decision to output code table
    pub fn new(classes: ClassSet, bands: usize, actuator_map: ActuatorMap) -> Self {
        let neutral = classes.neutral();
        let cursor = classes.first();
        Self {
            training_set: TrainingSet::new(classes.clone(), bands),
            classes,
            classifier: Classifier::new(),
            window: DecisionWindow::new(neutral),
            trial_log: TrialLog::new(),
            actuator_map,
            sink: None,
            mode: SessionMode::Idle,
            cursor,
        }
    }

    /// Build a session from configuration
    ///
    /// # Errors
    /// `Dataset(InvalidClassSet | UnknownLabel)` if the class list or the
    /// actuator table is invalid.
    pub fn from_config(config: &AppConfig) -> Result<Self, SessionError> {
        let classes = config.classes.class_set()?;
        let actuator_map = ActuatorMap::new(&classes, &config.actuator.codes)?;
        Ok(Self::new(classes, config.frontend.bands, actuator_map))
    }

    /// Attach the actuation sink that finalized trials are sent to
    pub fn with_sink(mut self, sink: Box<dyn ActuationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Replace or remove the actuation sink
    pub fn set_sink(&mut self, sink: Option<Box<dyn ActuationSink>>) {
        self.sink = sink;
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn classes(&self) -> &ClassSet {
        &self.classes
    }

    pub fn bands(&self) -> usize {
        self.training_set.bands()
    }

    /// Class the capture cursor points at
    pub fn active_class(&self) -> ClassId {
        self.cursor
    }

    pub fn training_set(&self) -> &TrainingSet {
        &self.training_set
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn trial_log(&self) -> &TrialLog {
        &self.trial_log
    }

    /// Stream of trials completed after this call
    pub fn subscribe_trials(&self) -> broadcast::Receiver<TrialRecord> {
        self.trial_log.subscribe()
    }

    /// Samples captured for `class`
    pub fn count_for(&self, class: ClassId) -> usize {
        self.training_set.count_for(class)
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            mode: self.mode,
            active_class: self.classes.name(self.cursor).to_string(),
            active_class_samples: self.training_set.count_for(self.cursor),
            total_samples: self.training_set.total(),
            trained: self.classifier.is_trained(),
            trials: self.trial_log.len(),
        }
    }

    /// Apply an operator event
    ///
    /// # Errors
    /// - `InvalidTransition` if the event is not legal in the current mode
    /// - `Classifier(NotTrained)` for `StartTrial` without a model
    /// - `Classifier(EmptyTrainingSet)` for `Train` with no samples
    ///
    /// The session is unchanged when an error is returned.
    pub fn handle(&mut self, event: SessionEvent) -> Result<EventOutcome, SessionError> {
        if !event.allowed_in(self.mode) {
            return Err(self.rejected(event));
        }

        match event {
            SessionEvent::SelectNextClass => {
                self.cursor = self.classes.next(self.cursor);
                if let SessionMode::Capturing(_) = self.mode {
                    self.mode = SessionMode::Capturing(self.cursor);
                }
                tracing::info!(
                    "[Session] Selected class {}",
                    self.classes.name(self.cursor)
                );
                Ok(EventOutcome::ClassSelected(self.cursor))
            }
            SessionEvent::StartCapture => {
                self.mode = SessionMode::Capturing(self.cursor);
                tracing::info!(
                    "[Session] Capturing {}",
                    self.classes.name(self.cursor)
                );
                Ok(EventOutcome::Mode(self.mode))
            }
            SessionEvent::StopCapture => {
                self.mode = SessionMode::Idle;
                Ok(EventOutcome::Mode(self.mode))
            }
            SessionEvent::Train => {
                self.classifier.train(&self.training_set)?;
                self.mode = SessionMode::Idle;
                Ok(EventOutcome::Trained {
                    samples: self.classifier.sample_count(),
                })
            }
            SessionEvent::Untrain => {
                self.classifier.reset();
                tracing::info!("[Session] Model discarded");
                Ok(EventOutcome::Untrained)
            }
            SessionEvent::StartTrial => {
                if !self.classifier.is_trained() {
                    return Err(ClassifierError::NotTrained.into());
                }
                self.window.start();
                self.mode = SessionMode::Collecting;
                tracing::info!("[Session] Trial {} started", self.trial_log.len());
                Ok(EventOutcome::Mode(self.mode))
            }
            SessionEvent::StopTrial => Ok(EventOutcome::TrialCompleted(self.finish_trial())),
        }
    }

    /// Feed one feature vector
    ///
    /// Capturing appends to the training set under the active class.
    /// Collecting classifies and records the label in the trial window.
    /// Idle classifies for display when a model exists.
    ///
    /// # Errors
    /// `Dataset(InvalidDimension)` if the vector length differs from `bands()`.
    pub fn process_frame(&mut self, vector: &[f32]) -> Result<FrameOutcome, SessionError> {
        check_dimension(vector.len(), self.bands())?;

        match self.mode {
            SessionMode::Capturing(class) => {
                let count = self.training_set.capture(class, vector)?;
                Ok(FrameOutcome::Captured { class, count })
            }
            SessionMode::Collecting => {
                let neighbor = self.classifier.classify_detailed(vector)?;
                let recorded = self.window.append(neighbor.label);
                Ok(FrameOutcome::Classified {
                    class: neighbor.label,
                    squared_distance: neighbor.squared_distance,
                    recorded,
                })
            }
            SessionMode::Idle if self.classifier.is_trained() => {
                let neighbor = self.classifier.classify_detailed(vector)?;
                Ok(FrameOutcome::Classified {
                    class: neighbor.label,
                    squared_distance: neighbor.squared_distance,
                    recorded: false,
                })
            }
            SessionMode::Idle => Ok(FrameOutcome::Ignored),
        }
    }

    /// Point the capture cursor at `class` directly
    ///
    /// Same rules as `SelectNextClass`; a capture in progress follows the cursor.
    pub fn select_class(&mut self, class: ClassId) -> Result<(), SessionError> {
        if !SessionEvent::SelectNextClass.allowed_in(self.mode) {
            return Err(self.rejected(SessionEvent::SelectNextClass));
        }
        if !self.classes.contains(class) {
            return Err(DatasetError::UnknownLabel {
                label: format!("#{}", class.index()),
            }
            .into());
        }
        self.cursor = class;
        if let SessionMode::Capturing(_) = self.mode {
            self.mode = SessionMode::Capturing(class);
        }
        Ok(())
    }

    /// Add one labeled sample to both the training set and the live model
    ///
    /// Unlike capture, the sample is usable by the next classification
    /// without retraining. On an untrained session the model is built from
    /// the whole training set, never from this sample alone.
    ///
    /// # Errors
    /// `InvalidTransition` while a trial is collecting; the model is frozen
    /// for the length of a trial.
    pub fn add_sample(&mut self, class: ClassId, vector: &[f32]) -> Result<usize, SessionError> {
        self.ensure_model_mutable()?;
        let count = self.training_set.capture(class, vector)?;
        if self.classifier.is_trained() {
            self.classifier.add_data(vector, class)?;
        } else {
            // No model yet: build it from everything captured so far
            self.classifier.train(&self.training_set)?;
        }
        Ok(count)
    }

    /// Serialize the training set to CSV text
    pub fn save(&self) -> String {
        persistence::save(&self.training_set)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SessionError> {
        persistence::save_to_file(&self.training_set, path)?;
        Ok(())
    }

    /// Append rows from CSV text; the model is not retrained
    pub fn load(&mut self, text: &str) -> LoadReport {
        persistence::load(&mut self.training_set, text)
    }

    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<LoadReport, SessionError> {
        Ok(persistence::load_from_file(&mut self.training_set, path)?)
    }

    /// Load a dataset file and rebuild the model from the result
    ///
    /// # Errors
    /// - `InvalidTransition` while a trial is collecting
    /// - `Dataset(Io)` if the file cannot be read
    /// - `Classifier(EmptyTrainingSet)` if nothing usable was loaded
    pub fn load_and_train<P: AsRef<Path>>(&mut self, path: P) -> Result<LoadReport, SessionError> {
        self.ensure_model_mutable()?;
        let report = self.load_from_file(path)?;
        self.handle(SessionEvent::Train)?;
        Ok(report)
    }

    /// Wait for the sink's queued emissions, if a sink is attached
    pub fn settle_actuation(&mut self) -> Vec<Result<u8, ActuatorError>> {
        self.sink
            .as_mut()
            .map(|sink| sink.settle())
            .unwrap_or_default()
    }

    /// `settle_actuation` for callers running on a tokio runtime
    pub async fn settle_actuation_async(&mut self) -> Vec<Result<u8, ActuatorError>> {
        match self.sink.as_mut() {
            Some(sink) => sink.settle_async().await,
            None => Vec::new(),
        }
    }

    /// Drop every captured sample; the current model is kept
    pub fn reset_training_set(&mut self) {
        self.training_set.clear();
        tracing::info!("[Session] Training set cleared");
    }

    /// Return to a fresh session: no samples, no model, no trial history
    ///
    /// Trial subscribers stay attached and the actuation sink is kept.
    pub fn reset(&mut self) {
        self.training_set.clear();
        self.classifier.reset();
        self.window.clear();
        self.trial_log.restart();
        self.mode = SessionMode::Idle;
        self.cursor = self.classes.first();
        tracing::info!("[Session] Reset");
    }

    fn ensure_model_mutable(&self) -> Result<(), SessionError> {
        if SessionEvent::Train.allowed_in(self.mode) {
            return Ok(());
        }
        Err(self.rejected(SessionEvent::Train))
    }

    fn rejected(&self, event: SessionEvent) -> SessionError {
        let mode = self.mode.describe(&self.classes);
        tracing::warn!("[Session] Rejected {} while {}", event, mode);
        SessionError::InvalidTransition {
            event: event.to_string(),
            mode,
        }
    }

    fn finish_trial(&mut self) -> TrialRecord {
        self.mode = SessionMode::Idle;
        let reduction = self
            .window
            .stop()
            .unwrap_or_else(|| reduce(&[], self.classes.neutral()));

        let actuation = match (self.actuator_map.code_for(reduction.decision), self.sink.as_mut()) {
            (None, _) => ActuationStatus::NotRequired,
            (Some(code), None) => ActuationStatus::NoChannel { code },
            (Some(code), Some(sink)) => match sink.dispatch(code) {
                Ok(receipt) => ActuationStatus::Dispatched(receipt),
                Err(err) => {
                    log_actuator_error(&err, "finish_trial");
                    ActuationStatus::Failed(err)
                }
            },
        };

        let record = self.trial_log.record(
            reduction.decision,
            reduction.tally,
            actuation,
            &self.classes,
        );
        tracing::info!("[Session] {}", record.line());
        record
    }
}

#[cfg(test)]
#[path = "core_tests.rs"]
mod tests;
