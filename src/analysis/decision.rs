// DecisionWindow - temporal majority vote over one trial
//
// Per-frame classifications are noisy. During a trial the window records
// every non-neutral label; on stop it reduces them to one decision:
//
// - nothing recorded       -> NoActionDetected
// - unique top count       -> that class
// - top count shared       -> Neutral
//
// A tie is treated as "no confident signal" because firing the actuator on
// the wrong gesture is worse than missing a trial.

use std::collections::BTreeMap;

use crate::dataset::{ClassId, Decision};

/// Collection state of the window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Idle,
    Collecting,
}

/// Result of reducing one trial
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reduction {
    pub decision: Decision,
    /// Votes per non-neutral class, in class order; classes with no votes are absent
    pub tally: Vec<(ClassId, usize)>,
}

/// Majority vote over a label sequence
///
/// Neutral labels are ignored if present.
pub fn reduce(values: &[ClassId], neutral: ClassId) -> Reduction {
    let mut counts: BTreeMap<ClassId, usize> = BTreeMap::new();
    for &label in values.iter().filter(|&&label| label != neutral) {
        *counts.entry(label).or_insert(0) += 1;
    }
    let tally: Vec<(ClassId, usize)> = counts.into_iter().collect();

    let decision = match tally.iter().map(|&(_, count)| count).max() {
        None => Decision::NoActionDetected,
        Some(top) => {
            let mut leaders = tally.iter().filter(|&&(_, count)| count == top);
            match (leaders.next(), leaders.next()) {
                (Some(&(class, _)), None) => Decision::Gesture(class),
                _ => Decision::Neutral,
            }
        }
    };

    log::debug!("[DecisionWindow] tally={:?} decision={}", tally, decision);

    Reduction { decision, tally }
}

/// Accumulates labels between trial start and stop
#[derive(Debug, Clone)]
pub struct DecisionWindow {
    neutral: ClassId,
    state: WindowState,
    values: Vec<ClassId>,
}

impl DecisionWindow {
    /// Create an idle window that ignores `neutral`
    pub fn new(neutral: ClassId) -> Self {
        Self {
            neutral,
            state: WindowState::Idle,
            values: Vec::new(),
        }
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn is_collecting(&self) -> bool {
        self.state == WindowState::Collecting
    }

    /// Labels recorded so far in this trial
    pub fn values(&self) -> &[ClassId] {
        &self.values
    }

    /// Enter `Collecting`
    ///
    /// Returns false (and keeps the current trial) if already collecting.
    pub fn start(&mut self) -> bool {
        if self.is_collecting() {
            return false;
        }
        self.values.clear();
        self.state = WindowState::Collecting;
        true
    }

    /// Record one per-frame classification
    ///
    /// Returns whether the label was recorded. Neutral labels and labels
    /// arriving while idle are dropped.
    pub fn append(&mut self, label: ClassId) -> bool {
        if !self.is_collecting() || label == self.neutral {
            return false;
        }
        self.values.push(label);
        true
    }

    /// Reduce, clear, and return to `Idle`
    ///
    /// Returns `None` if no trial was in progress.
    pub fn stop(&mut self) -> Option<Reduction> {
        if !self.is_collecting() {
            return None;
        }
        let reduction = reduce(&self.values, self.neutral);
        self.values.clear();
        self.state = WindowState::Idle;
        Some(reduction)
    }

    /// Abandon any trial in progress without reducing
    pub fn clear(&mut self) {
        self.values.clear();
        self.state = WindowState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ClassSet;

    struct Labels {
        neutral: ClassId,
        scratch: ClassId,
        tap: ClassId,
    }

    fn labels() -> Labels {
        let classes = ClassSet::default();
        Labels {
            neutral: classes.neutral(),
            scratch: classes.id_of("Scratch").unwrap(),
            tap: classes.id_of("Tap").unwrap(),
        }
    }

    #[test]
    fn test_reduce_empty() {
        let l = labels();
        let reduction = reduce(&[], l.neutral);
        assert_eq!(reduction.decision, Decision::NoActionDetected);
        assert!(reduction.tally.is_empty());
    }

    #[test]
    fn test_reduce_majority() {
        let l = labels();
        let reduction = reduce(&[l.scratch, l.scratch, l.tap], l.neutral);
        assert_eq!(reduction.decision, Decision::Gesture(l.scratch));
        assert_eq!(reduction.tally, vec![(l.scratch, 2), (l.tap, 1)]);
    }

    #[test]
    fn test_reduce_two_way_tie_is_neutral() {
        let l = labels();
        assert_eq!(
            reduce(&[l.scratch, l.tap], l.neutral).decision,
            Decision::Neutral
        );
        assert_eq!(
            reduce(&[l.tap, l.tap, l.scratch, l.scratch], l.neutral).decision,
            Decision::Neutral
        );
    }

    #[test]
    fn test_reduce_ignores_neutral_labels() {
        let l = labels();
        let reduction = reduce(&[l.neutral, l.neutral, l.neutral, l.tap], l.neutral);
        assert_eq!(reduction.decision, Decision::Gesture(l.tap));

        let only_neutral = reduce(&[l.neutral, l.neutral], l.neutral);
        assert_eq!(only_neutral.decision, Decision::NoActionDetected);
    }

    #[test]
    fn test_reduce_many_classes() {
        let classes =
            ClassSet::new(["Neutral", "Scratch", "Tap", "Knock"], "Neutral").unwrap();
        let scratch = classes.id_of("Scratch").unwrap();
        let tap = classes.id_of("Tap").unwrap();
        let knock = classes.id_of("Knock").unwrap();

        let unique = reduce(&[knock, tap, knock, scratch, knock, tap], classes.neutral());
        assert_eq!(unique.decision, Decision::Gesture(knock));

        // Top count shared by two of three classes
        let shared = reduce(&[knock, tap, knock, tap, scratch], classes.neutral());
        assert_eq!(shared.decision, Decision::Neutral);
    }

    #[test]
    fn test_window_excludes_neutral_frames() {
        let l = labels();
        let mut window = DecisionWindow::new(l.neutral);
        assert!(window.start());

        assert!(window.append(l.scratch));
        assert!(window.append(l.scratch));
        assert!(!window.append(l.neutral));
        assert!(window.append(l.tap));

        assert_eq!(window.values(), &[l.scratch, l.scratch, l.tap]);
        let reduction = window.stop().unwrap();
        assert_eq!(reduction.decision, Decision::Gesture(l.scratch));
    }

    #[test]
    fn test_window_clears_after_stop() {
        let l = labels();
        let mut window = DecisionWindow::new(l.neutral);
        window.start();
        window.append(l.tap);
        window.stop();

        assert_eq!(window.state(), WindowState::Idle);
        assert!(window.values().is_empty());

        window.start();
        assert_eq!(window.stop().unwrap().decision, Decision::NoActionDetected);
    }

    #[test]
    fn test_window_ignores_appends_while_idle() {
        let l = labels();
        let mut window = DecisionWindow::new(l.neutral);

        assert!(!window.append(l.tap));
        assert!(window.stop().is_none());
    }

    #[test]
    fn test_double_start_keeps_trial() {
        let l = labels();
        let mut window = DecisionWindow::new(l.neutral);
        window.start();
        window.append(l.tap);

        assert!(!window.start());
        assert_eq!(window.values(), &[l.tap]);
    }
}
