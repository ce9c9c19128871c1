// Labels - closed class set and trial decisions
//
// Class names are configured once at startup. Everything downstream refers to
// a class through a `ClassId` index, so label equality is plain value
// equality on the index.

use std::fmt;

use crate::error::DatasetError;

/// Operator-visible string for a trial whose window stayed empty
pub const NO_ACTION_LABEL: &str = "No Action Detected";

/// Default class names used when no configuration is provided
pub const DEFAULT_CLASS_NAMES: [&str; 3] = ["Neutral", "Scratch", "Tap"];

/// Default neutral class name
pub const DEFAULT_NEUTRAL_CLASS: &str = "Neutral";

/// Index of a class inside its `ClassSet`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(usize);

impl ClassId {
    /// Position of the class in configured order
    pub fn index(self) -> usize {
        self.0
    }
}

/// Ordered set of configured class names with one designated neutral class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSet {
    names: Vec<String>,
    neutral: ClassId,
}

impl ClassSet {
    /// Build a class set from configured names
    ///
    /// # Errors
    /// `InvalidClassSet` if the list is empty, a name is empty, duplicated,
    /// contains a delimiter character, or the neutral name is not listed.
    pub fn new<I, S>(names: I, neutral: &str) -> Result<Self, DatasetError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();

        if names.is_empty() {
            return Err(DatasetError::InvalidClassSet {
                reason: "no class names configured".to_string(),
            });
        }

        for (i, name) in names.iter().enumerate() {
            if name.trim().is_empty() || name.trim() != name {
                return Err(DatasetError::InvalidClassSet {
                    reason: format!("class name {:?} is blank or padded", name),
                });
            }
            if name.contains([',', '\n', '\r']) {
                return Err(DatasetError::InvalidClassSet {
                    reason: format!("class name {:?} contains a delimiter", name),
                });
            }
            if names[..i].contains(name) {
                return Err(DatasetError::InvalidClassSet {
                    reason: format!("class name {:?} listed twice", name),
                });
            }
        }

        let neutral = names
            .iter()
            .position(|n| n == neutral)
            .map(ClassId)
            .ok_or_else(|| DatasetError::InvalidClassSet {
                reason: format!("neutral class {:?} is not among the class names", neutral),
            })?;

        Ok(Self { names, neutral })
    }

    /// Number of configured classes
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false for a constructed set; present for API symmetry
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Configured names in order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Class ids in configured order
    pub fn ids(&self) -> impl Iterator<Item = ClassId> + '_ {
        (0..self.names.len()).map(ClassId)
    }

    /// Non-neutral class ids in configured order
    pub fn gesture_ids(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.ids().filter(move |id| *id != self.neutral)
    }

    /// The designated neutral/no-action class
    pub fn neutral(&self) -> ClassId {
        self.neutral
    }

    pub fn is_neutral(&self, id: ClassId) -> bool {
        id == self.neutral
    }

    /// Display name of a class id
    ///
    /// Ids minted by another set with more classes resolve to "?".
    pub fn name(&self, id: ClassId) -> &str {
        self.names.get(id.0).map(String::as_str).unwrap_or("?")
    }

    /// Resolve a label string to its id
    pub fn id_of(&self, label: &str) -> Result<ClassId, DatasetError> {
        self.names
            .iter()
            .position(|n| n == label)
            .map(ClassId)
            .ok_or_else(|| DatasetError::UnknownLabel {
                label: label.to_string(),
            })
    }

    /// Check that an id belongs to this set
    pub fn contains(&self, id: ClassId) -> bool {
        id.0 < self.names.len()
    }

    /// Next class in configured order, wrapping to the first
    pub fn next(&self, id: ClassId) -> ClassId {
        ClassId((id.0 + 1) % self.names.len())
    }

    /// First configured class
    pub fn first(&self) -> ClassId {
        ClassId(0)
    }

    /// Operator-visible string for a trial decision
    pub fn describe(&self, decision: Decision) -> &str {
        match decision {
            Decision::Gesture(id) => self.name(id),
            Decision::Neutral => self.name(self.neutral),
            Decision::NoActionDetected => NO_ACTION_LABEL,
        }
    }
}

impl Default for ClassSet {
    fn default() -> Self {
        Self {
            names: DEFAULT_CLASS_NAMES.iter().map(|n| n.to_string()).collect(),
            neutral: ClassId(0),
        }
    }
}

/// Final outcome of one trial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// A non-neutral class held the unique majority
    Gesture(ClassId),
    /// The vote was tied between gesture classes
    Neutral,
    /// No non-neutral frame was recorded during the trial
    NoActionDetected,
}

impl Decision {
    /// Whether this decision should drive the actuator
    pub fn is_actionable(&self) -> bool {
        matches!(self, Decision::Gesture(_))
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Gesture(id) => write!(f, "Gesture({})", id.0),
            Decision::Neutral => write!(f, "Neutral"),
            Decision::NoActionDetected => write!(f, "{}", NO_ACTION_LABEL),
        }
    }
}
