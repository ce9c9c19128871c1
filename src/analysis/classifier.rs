// Classifier - nearest-neighbor classification over the labeled sample pool
//
// The model is the flat pool of labeled feature vectors itself. `train`
// copies every sample out of a TrainingSet into a fresh pool, `add_data`
// appends one sample in place, and `classify` returns the label of the
// single closest stored sample (k = 1) under squared Euclidean distance.
//
// The pool sits behind an `Arc` that is replaced whole on retrain. Readers
// that took a `snapshot()` keep the pool they were handed, so nobody ever
// observes a half-built model. `add_data` goes through `Arc::make_mut`,
// which copies the pool first if a snapshot is still alive.

use std::sync::Arc;

use crate::dataset::{ClassId, DataInstance, FeatureVector, TrainingSet};
use crate::error::{log_classifier_error, ClassifierError};

/// The closest stored sample for a query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Label of the winning sample
    pub label: ClassId,
    /// Sum of squared per-band differences to the query (0.0 for an exact match)
    pub squared_distance: f32,
    /// Position of the winning sample in pool iteration order
    pub index: usize,
}

/// Immutable labeled sample pool backing the classifier
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePool {
    bands: usize,
    labels: Vec<ClassId>,
    samples: Vec<FeatureVector>,
}

impl SamplePool {
    fn empty(bands: usize) -> Self {
        Self {
            bands,
            labels: Vec::new(),
            samples: Vec::new(),
        }
    }

    fn from_training_set(set: &TrainingSet) -> Self {
        let mut pool = Self::empty(set.bands());
        for (class, instance) in set.iter() {
            pool.labels.push(class);
            pool.samples.push(instance.measurements.clone());
        }
        pool
    }

    fn push(&mut self, label: ClassId, sample: FeatureVector) {
        self.labels.push(label);
        self.samples.push(sample);
    }

    /// Number of stored samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Feature vector length the pool was built with
    pub fn bands(&self) -> usize {
        self.bands
    }

    /// Linear scan for the closest sample
    ///
    /// Ties keep the first sample encountered. A NaN distance never wins.
    pub fn nearest(&self, query: &[f32]) -> Option<Neighbor> {
        let mut best: Option<Neighbor> = None;

        for (index, (sample, &label)) in self.samples.iter().zip(&self.labels).enumerate() {
            let mut squared_distance = sample.squared_distance(query);
            if squared_distance.is_nan() {
                squared_distance = f32::INFINITY;
            }

            let closer = best.map_or(true, |b| squared_distance < b.squared_distance);
            if closer {
                best = Some(Neighbor {
                    label,
                    squared_distance,
                    index,
                });
            }
        }

        best
    }
}

/// Nearest-neighbor classifier with rebuildable model
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    model: Option<Arc<SamplePool>>,
}

impl Classifier {
    /// Create an untrained classifier
    pub fn new() -> Self {
        Self { model: None }
    }

    /// Whether `classify` can answer
    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    /// Samples in the current model (0 when untrained)
    pub fn sample_count(&self) -> usize {
        self.model.as_ref().map_or(0, |pool| pool.len())
    }

    /// Shareable handle on the current model
    pub fn snapshot(&self) -> Option<Arc<SamplePool>> {
        self.model.clone()
    }

    /// Rebuild the model from every sample in `set`
    ///
    /// The new pool is built completely before it replaces the old one. On
    /// error the previous model, if any, stays in place.
    ///
    /// # Errors
    /// `EmptyTrainingSet` if every class has zero samples.
    pub fn train(&mut self, set: &TrainingSet) -> Result<(), ClassifierError> {
        if set.is_empty() {
            let err = ClassifierError::EmptyTrainingSet;
            log_classifier_error(&err, "train");
            return Err(err);
        }

        let pool = SamplePool::from_training_set(set);
        tracing::info!(
            "[Classifier] Trained on {} samples ({} bands)",
            pool.len(),
            pool.bands()
        );
        self.model = Some(Arc::new(pool));
        Ok(())
    }

    /// Drop the model
    pub fn reset(&mut self) {
        self.model = None;
    }

    /// Append one labeled sample directly into the model
    ///
    /// On an untrained classifier this creates a one-sample model whose band
    /// count is the sample's length.
    ///
    /// # Errors
    /// `InvalidDimension` if the sample length differs from the model's.
    pub fn add_data(&mut self, vector: &[f32], label: ClassId) -> Result<(), ClassifierError> {
        let sample = FeatureVector::from_slice(vector);

        match self.model.as_mut() {
            Some(pool) => {
                if sample.len() != pool.bands() {
                    return Err(ClassifierError::InvalidDimension {
                        expected: pool.bands(),
                        actual: sample.len(),
                    });
                }
                Arc::make_mut(pool).push(label, sample);
            }
            None => {
                let mut pool = SamplePool::empty(sample.len());
                pool.push(label, sample);
                self.model = Some(Arc::new(pool));
            }
        }

        Ok(())
    }

    /// Predict the label of `instance`; its own label is ignored
    pub fn classify(&self, instance: &DataInstance) -> Result<ClassId, ClassifierError> {
        self.classify_detailed(instance.measurements.as_slice())
            .map(|neighbor| neighbor.label)
    }

    /// Predict a label and report the winning distance
    ///
    /// # Errors
    /// * `NotTrained` - no model yet
    /// * `InvalidDimension` - query length differs from the model's
    pub fn classify_detailed(&self, query: &[f32]) -> Result<Neighbor, ClassifierError> {
        let pool = self.model.as_ref().ok_or(ClassifierError::NotTrained)?;

        if query.len() != pool.bands() {
            return Err(ClassifierError::InvalidDimension {
                expected: pool.bands(),
                actual: query.len(),
            });
        }

        pool.nearest(query).ok_or(ClassifierError::NotTrained)
    }
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
