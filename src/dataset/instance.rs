// Feature vectors and labeled data instances

use std::sync::Arc;

use crate::dataset::labels::ClassId;
use crate::error::DatasetError;

/// Default number of spectral bands per frame
pub const DEFAULT_BANDS: usize = 512;

/// Immutable magnitude vector captured from one frame
///
/// Backed by a shared slice so copies handed to the classifier do not
/// duplicate the data. Construction always copies from the caller's buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Arc<[f32]>,
}

impl FeatureVector {
    /// Snapshot a live buffer
    pub fn from_slice(values: &[f32]) -> Self {
        Self {
            values: Arc::from(values),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Sum of squared per-band differences
    ///
    /// Callers must check lengths first; extra bands on either side are ignored.
    pub fn squared_distance(&self, other: &[f32]) -> f32 {
        self.values
            .iter()
            .zip(other)
            .map(|(a, b)| {
                let d = a - b;
                d * d
            })
            .sum()
    }
}

impl From<Vec<f32>> for FeatureVector {
    fn from(values: Vec<f32>) -> Self {
        Self {
            values: Arc::from(values),
        }
    }
}

/// One labeled (or unlabeled query) sample
#[derive(Debug, Clone, PartialEq)]
pub struct DataInstance {
    /// Class the sample belongs to; `None` for classification queries
    pub label: Option<ClassId>,
    pub measurements: FeatureVector,
}

impl DataInstance {
    /// Build an unlabeled query instance
    pub fn query(vector: &[f32], bands: usize) -> Result<Self, DatasetError> {
        capture(None, vector, bands)
    }
}

/// Snapshot the front-end's buffer into a new instance
///
/// # Errors
/// `InvalidDimension` if `vector.len() != bands`.
pub fn capture(
    label: Option<ClassId>,
    vector: &[f32],
    bands: usize,
) -> Result<DataInstance, DatasetError> {
    check_dimension(vector.len(), bands)?;
    Ok(DataInstance {
        label,
        measurements: FeatureVector::from_slice(vector),
    })
}

pub(crate) fn check_dimension(actual: usize, expected: usize) -> Result<(), DatasetError> {
    if actual != expected {
        return Err(DatasetError::InvalidDimension { expected, actual });
    }
    Ok(())
}
