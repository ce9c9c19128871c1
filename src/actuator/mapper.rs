// ActuatorMap - decision to output byte table

use std::collections::BTreeMap;

use crate::dataset::{ClassId, ClassSet, Decision};
use crate::error::DatasetError;

/// Explicit class-to-code table
///
/// Only gesture decisions can emit. Neutral, ties and empty trials never do,
/// and a gesture class left out of the table emits nothing either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActuatorMap {
    codes: Vec<Option<u8>>,
}

impl ActuatorMap {
    /// Build the table from configured `{class name -> code}` pairs
    ///
    /// # Errors
    /// * `UnknownLabel` - a name is not a configured class
    /// * `InvalidClassSet` - the neutral class was given a code
    pub fn new(classes: &ClassSet, table: &BTreeMap<String, u8>) -> Result<Self, DatasetError> {
        let mut codes = vec![None; classes.len()];

        for (name, &code) in table {
            let class = classes.id_of(name)?;
            if classes.is_neutral(class) {
                return Err(DatasetError::InvalidClassSet {
                    reason: format!("neutral class {:?} cannot map to a code", name),
                });
            }
            codes[class.index()] = Some(code);
        }

        for class in classes.gesture_ids() {
            if codes[class.index()].is_none() {
                log::warn!(
                    "[ActuatorMap] Class {:?} has no output code; its trials will not actuate",
                    classes.name(class)
                );
            }
        }

        Ok(Self { codes })
    }

    /// Number gesture classes 0, 1, 2, ... in configured order
    pub fn sequential(classes: &ClassSet) -> Self {
        let mut codes = vec![None; classes.len()];
        for (code, class) in classes.gesture_ids().enumerate() {
            codes[class.index()] = u8::try_from(code).ok();
        }
        Self { codes }
    }

    /// Code to emit for a class, if any
    pub fn code_for_class(&self, class: ClassId) -> Option<u8> {
        self.codes.get(class.index()).copied().flatten()
    }

    /// Code to emit for a finalized trial decision
    pub fn code_for(&self, decision: Decision) -> Option<u8> {
        match decision {
            Decision::Gesture(class) => self.code_for_class(class),
            Decision::Neutral | Decision::NoActionDetected => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(pairs: &[(&str, u8)]) -> BTreeMap<String, u8> {
        pairs.iter().map(|(n, c)| (n.to_string(), *c)).collect()
    }

    #[test]
    fn test_default_table() {
        let classes = ClassSet::default();
        let map = ActuatorMap::new(&classes, &table(&[("Scratch", 0), ("Tap", 1)])).unwrap();

        let scratch = classes.id_of("Scratch").unwrap();
        let tap = classes.id_of("Tap").unwrap();
        assert_eq!(map.code_for(Decision::Gesture(scratch)), Some(0));
        assert_eq!(map.code_for(Decision::Gesture(tap)), Some(1));
        assert_eq!(map.code_for(Decision::Neutral), None);
        assert_eq!(map.code_for(Decision::NoActionDetected), None);
    }

    #[test]
    fn test_sequential_matches_default_table() {
        let classes = ClassSet::default();
        let explicit = ActuatorMap::new(&classes, &table(&[("Scratch", 0), ("Tap", 1)])).unwrap();
        assert_eq!(ActuatorMap::sequential(&classes), explicit);
    }

    #[test]
    fn test_unknown_class_rejected() {
        let classes = ClassSet::default();
        let result = ActuatorMap::new(&classes, &table(&[("Knock", 2)]));
        assert!(matches!(result, Err(DatasetError::UnknownLabel { .. })));
    }

    #[test]
    fn test_neutral_code_rejected() {
        let classes = ClassSet::default();
        let result = ActuatorMap::new(&classes, &table(&[("Neutral", 9)]));
        assert!(matches!(result, Err(DatasetError::InvalidClassSet { .. })));
    }

    #[test]
    fn test_unmapped_gesture_emits_nothing() {
        let classes = ClassSet::default();
        let map = ActuatorMap::new(&classes, &table(&[("Tap", 1)])).unwrap();
        let scratch = classes.id_of("Scratch").unwrap();
        assert_eq!(map.code_for(Decision::Gesture(scratch)), None);
    }
}
