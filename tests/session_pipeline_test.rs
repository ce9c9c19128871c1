//! End-to-end tests for the capture -> train -> trial -> actuation pipeline
//!
//! Feature vectors come from the real spectrum analyzer fed with synthetic
//! tones, so every stage runs exactly as it does behind the CLI.

use std::f32::consts::PI;
use std::time::Duration;

use tokio::runtime::Handle;
use vibration_classifier::actuator::{
    ActuationReceipt, ActuationStatus, ActuatorMap, BlockingActuator, MemoryChannel,
    ScheduledActuator,
};
use vibration_classifier::config::AppConfig;
use vibration_classifier::dataset::{ClassSet, Decision};
use vibration_classifier::error::{DatasetError, ErrorCode};
use vibration_classifier::frontend::SpectrumAnalyzer;
use vibration_classifier::session::{EventOutcome, Session, SessionEvent, TrialRecord};

const BANDS: usize = 64;

fn tone(bin: usize) -> Vec<f32> {
    let frame_size = BANDS * 2;
    (0..frame_size)
        .map(|i| (2.0 * PI * bin as f32 * i as f32 / frame_size as f32).sin())
        .collect()
}

struct Spectra {
    neutral: Vec<f32>,
    scratch: Vec<f32>,
    tap: Vec<f32>,
}

fn spectra() -> Spectra {
    let mut analyzer = SpectrumAnalyzer::new(BANDS).unwrap();
    Spectra {
        neutral: analyzer.analyze(&vec![0.0; BANDS * 2]),
        scratch: analyzer.analyze(&tone(8)),
        tap: analyzer.analyze(&tone(40)),
    }
}

fn config() -> AppConfig {
    let mut config = AppConfig::default();
    config.frontend.bands = BANDS;
    config
}

fn capture(session: &mut Session, class: &str, frame: &[f32], frames: usize) {
    let id = session.classes().id_of(class).unwrap();
    session.select_class(id).unwrap();
    session.handle(SessionEvent::StartCapture).unwrap();
    for _ in 0..frames {
        session.process_frame(frame).unwrap();
    }
    session.handle(SessionEvent::StopCapture).unwrap();
}

fn trained_session(spectra: &Spectra) -> Session {
    let mut session = Session::from_config(&config()).unwrap();
    capture(&mut session, "Neutral", &spectra.neutral, 3);
    capture(&mut session, "Scratch", &spectra.scratch, 3);
    capture(&mut session, "Tap", &spectra.tap, 3);
    session.handle(SessionEvent::Train).unwrap();
    session
}

fn trial(session: &mut Session, frames: &[&[f32]]) -> TrialRecord {
    session.handle(SessionEvent::StartTrial).unwrap();
    for frame in frames {
        session.process_frame(frame).unwrap();
    }
    match session.handle(SessionEvent::StopTrial).unwrap() {
        EventOutcome::TrialCompleted(record) => record,
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[test]
fn test_majority_of_analyzed_frames_wins() {
    let spectra = spectra();
    let mut session = trained_session(&spectra);

    let record = trial(
        &mut session,
        &[&spectra.scratch, &spectra.scratch, &spectra.neutral, &spectra.tap],
    );

    assert_eq!(record.label, "Scratch");
    assert_eq!(record.actuation, ActuationStatus::NoChannel { code: 0 });
}

#[test]
fn test_trial_log_across_trials() {
    let spectra = spectra();
    let mut session = trained_session(&spectra);

    trial(&mut session, &[&spectra.tap, &spectra.tap]);
    trial(&mut session, &[&spectra.tap, &spectra.scratch]);
    trial(&mut session, &[&spectra.neutral]);

    assert_eq!(
        session.trial_log().lines(),
        vec![
            "The classification of trial 0: Tap",
            "The classification of trial 1: Neutral",
            "The classification of trial 2: No Action Detected",
        ]
    );
}

#[test]
fn test_dataset_survives_save_and_reload() {
    let spectra = spectra();
    let session = trained_session(&spectra);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test2.csv");
    session.save_to_file(&path).unwrap();

    let mut reloaded = Session::from_config(&config()).unwrap();
    let report = reloaded.load_and_train(&path).unwrap();

    assert!(report.is_clean());
    assert_eq!(report.loaded, 9);
    let record = trial(&mut reloaded, &[&spectra.tap]);
    assert_eq!(record.decision, reloaded_gesture(&reloaded, "Tap"));
}

fn reloaded_gesture(session: &Session, name: &str) -> Decision {
    Decision::Gesture(session.classes().id_of(name).unwrap())
}

#[test]
fn test_malformed_rows_are_skipped_and_reported() {
    let mut session = Session::new(ClassSet::default(), 2, ActuatorMap::sequential(&ClassSet::default()));
    let text = "0.1,0.2,Tap\n0.1,abc,Tap\n0.3,0.4,Swipe\n0.5,Scratch\n\n0.7,0.8,Scratch\n";

    let report = session.load(text);

    assert_eq!(report.loaded, 2);
    let lines: Vec<usize> = report.rejected.iter().map(|r| r.line).collect();
    assert_eq!(lines, vec![2, 3, 4]);
    assert!(matches!(report.rejected[0].error, DatasetError::MalformedRow { .. }));
    assert!(matches!(report.rejected[1].error, DatasetError::UnknownLabel { .. }));
    assert_eq!(report.rejected[1].error.code(), 1002);
    assert_eq!(session.training_set().total(), 2);
}

#[test]
fn test_blocking_actuation_emits_one_byte_per_gesture_trial() {
    let spectra = spectra();
    let recorder = MemoryChannel::new();
    let mut session = trained_session(&spectra);
    session.set_sink(Some(Box::new(BlockingActuator::new(
        Box::new(recorder.clone()),
        Duration::ZERO,
    ))));

    trial(&mut session, &[&spectra.tap]);
    trial(&mut session, &[&spectra.neutral]);
    trial(&mut session, &[&spectra.scratch, &spectra.scratch]);
    trial(&mut session, &[&spectra.scratch, &spectra.tap]);

    assert_eq!(recorder.written(), vec![1, 0]);
}

#[tokio::test(start_paused = true)]
async fn test_scheduled_actuation_respects_settling_delay() {
    let spectra = spectra();
    let recorder = MemoryChannel::new();
    let mut session = trained_session(&spectra);
    session.set_sink(Some(Box::new(ScheduledActuator::new(
        Box::new(recorder.clone()),
        Duration::from_millis(800),
        Handle::current(),
    ))));

    let record = trial(&mut session, &[&spectra.tap]);
    assert_eq!(
        record.actuation,
        ActuationStatus::Dispatched(ActuationReceipt::Scheduled { code: 1 })
    );

    tokio::time::sleep(Duration::from_millis(799)).await;
    assert!(recorder.written().is_empty());

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(recorder.written(), vec![1]);
}

#[test]
fn test_failed_channel_does_not_block_classification() {
    let spectra = spectra();
    let mut session = trained_session(&spectra);
    session.set_sink(Some(Box::new(BlockingActuator::new(
        Box::new(MemoryChannel::failing()),
        Duration::ZERO,
    ))));

    let first = trial(&mut session, &[&spectra.tap]);
    let second = trial(&mut session, &[&spectra.scratch]);

    assert!(matches!(first.actuation, ActuationStatus::Failed(_)));
    assert!(matches!(second.actuation, ActuationStatus::Failed(_)));
    assert_eq!(second.label, "Scratch");
    assert_eq!(session.trial_log().len(), 2);
}
