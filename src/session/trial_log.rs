// TrialLog - append-only history of trial decisions
//
// Every completed trial is appended and also published on a broadcast
// channel so an operator display can stream results as they happen.

use tokio::sync::broadcast;

use crate::actuator::ActuationStatus;
use crate::dataset::{ClassId, ClassSet, Decision};

/// Broadcast buffer size for trial subscribers
const TRIAL_CHANNEL_CAPACITY: usize = 64;

/// One completed trial
#[derive(Debug, Clone, PartialEq)]
pub struct TrialRecord {
    /// Zero-based position in the log
    pub index: usize,
    pub decision: Decision,
    /// Operator-visible decision string
    pub label: String,
    /// Votes per non-neutral class
    pub tally: Vec<(ClassId, usize)>,
    pub actuation: ActuationStatus,
}

impl TrialRecord {
    /// Log line in the operator format
    pub fn line(&self) -> String {
        format!("The classification of trial {}: {}", self.index, self.label)
    }
}

/// Append-only trial history
#[derive(Debug)]
pub struct TrialLog {
    entries: Vec<TrialRecord>,
    tx: broadcast::Sender<TrialRecord>,
}

impl TrialLog {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(TRIAL_CHANNEL_CAPACITY);
        Self {
            entries: Vec::new(),
            tx,
        }
    }

    /// Append a trial and publish it
    pub fn record(
        &mut self,
        decision: Decision,
        tally: Vec<(ClassId, usize)>,
        actuation: ActuationStatus,
        classes: &ClassSet,
    ) -> TrialRecord {
        let record = TrialRecord {
            index: self.entries.len(),
            decision,
            label: classes.describe(decision).to_string(),
            tally,
            actuation,
        };
        self.entries.push(record.clone());

        // No subscribers is fine
        let _ = self.tx.send(record.clone());
        record
    }

    pub fn entries(&self) -> &[TrialRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every entry in the operator format, oldest first
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(TrialRecord::line).collect()
    }

    /// Stream of trials recorded after this call
    pub fn subscribe(&self) -> broadcast::Receiver<TrialRecord> {
        self.tx.subscribe()
    }

    /// Start a new history; existing subscribers stay attached
    pub(crate) fn restart(&mut self) {
        self.entries.clear();
    }
}

impl Default for TrialLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_appends_with_index() {
        let classes = ClassSet::default();
        let tap = classes.id_of("Tap").unwrap();
        let mut log = TrialLog::new();

        log.record(
            Decision::Gesture(tap),
            vec![(tap, 3)],
            ActuationStatus::NotRequired,
            &classes,
        );
        log.record(
            Decision::NoActionDetected,
            Vec::new(),
            ActuationStatus::NotRequired,
            &classes,
        );

        assert_eq!(
            log.lines(),
            vec![
                "The classification of trial 0: Tap".to_string(),
                "The classification of trial 1: No Action Detected".to_string(),
            ]
        );
    }

    #[test]
    fn test_subscribers_receive_records() {
        let classes = ClassSet::default();
        let mut log = TrialLog::new();
        let mut rx = log.subscribe();

        log.record(
            Decision::Neutral,
            Vec::new(),
            ActuationStatus::NotRequired,
            &classes,
        );

        let received = rx.try_recv().unwrap();
        assert_eq!(received.label, "Neutral");
        assert_eq!(received.index, 0);
    }
}
