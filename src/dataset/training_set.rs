// TrainingSet - labeled samples grouped by configured class

use crate::dataset::instance::{capture, check_dimension, DataInstance};
use crate::dataset::labels::{ClassId, ClassSet};
use crate::error::DatasetError;

/// Samples collected per class, in configured class order
///
/// Every configured class has an entry from construction on. Insertion
/// order within a class is preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    classes: ClassSet,
    bands: usize,
    entries: Vec<Vec<DataInstance>>,
}

impl TrainingSet {
    /// Create an empty set with one entry per configured class
    pub fn new(classes: ClassSet, bands: usize) -> Self {
        let entries = vec![Vec::new(); classes.len()];
        Self {
            classes,
            bands,
            entries,
        }
    }

    pub fn class_set(&self) -> &ClassSet {
        &self.classes
    }

    /// Feature vector length every instance must have
    pub fn bands(&self) -> usize {
        self.bands
    }

    /// Append an instance under `class`
    ///
    /// The stored copy is labeled with `class` regardless of the label the
    /// instance carried.
    ///
    /// # Errors
    /// * `UnknownLabel` - `class` does not belong to this set
    /// * `InvalidDimension` - instance length differs from `bands`
    pub fn append(&mut self, class: ClassId, instance: DataInstance) -> Result<(), DatasetError> {
        let entry = self
            .entries
            .get_mut(class.index())
            .ok_or_else(|| DatasetError::UnknownLabel {
                label: format!("#{}", class.index()),
            })?;
        check_dimension(instance.measurements.len(), self.bands)?;

        entry.push(DataInstance {
            label: Some(class),
            measurements: instance.measurements,
        });
        Ok(())
    }

    /// Append by label name
    pub fn append_named(&mut self, label: &str, instance: DataInstance) -> Result<(), DatasetError> {
        let class = self.classes.id_of(label)?;
        self.append(class, instance)
    }

    /// Snapshot a live buffer under `class` and return the new count
    pub fn capture(&mut self, class: ClassId, vector: &[f32]) -> Result<usize, DatasetError> {
        let instance = capture(Some(class), vector, self.bands)?;
        self.append(class, instance)?;
        Ok(self.count_for(class))
    }

    /// Number of samples collected for `class`
    pub fn count_for(&self, class: ClassId) -> usize {
        self.entries.get(class.index()).map_or(0, Vec::len)
    }

    /// Samples stored for `class` in insertion order
    pub fn instances(&self, class: ClassId) -> &[DataInstance] {
        self.entries
            .get(class.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total samples across all classes
    pub fn total(&self) -> usize {
        self.entries.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// All samples in configured class order, then insertion order
    pub fn iter(&self) -> impl Iterator<Item = (ClassId, &DataInstance)> + '_ {
        self.classes
            .ids()
            .flat_map(move |id| self.instances(id).iter().map(move |inst| (id, inst)))
    }

    /// Drop every sample, keeping one empty entry per class
    pub fn clear(&mut self) {
        self.entries.iter_mut().for_each(Vec::clear);
    }
}
