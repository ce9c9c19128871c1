use std::f32::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;

const BANDS: usize = 64;
const SAMPLE_RATE: u32 = 8000;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_vibe_cli"))
}

/// Three identical frames of a tone at `bin` (0 = silence)
fn write_tone(path: &Path, bin: usize) {
    let frame_size = BANDS * 2;
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..frame_size * 3 {
        let value = (2.0 * PI * bin as f32 * i as f32 / frame_size as f32).sin() * 0.5;
        writer.write_sample((value * i16::MAX as f32) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

struct Workspace {
    _dir: tempfile::TempDir,
    root: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();

        let config = serde_json::json!({
            "frontend": { "bands": BANDS, "sample_rate": SAMPLE_RATE },
            "dataset": {
                "save_path": root.join("samples.csv"),
                "load_path": root.join("samples.csv")
            }
        });
        fs::write(root.join("config.json"), config.to_string()).unwrap();

        write_tone(&root.join("silence.wav"), 0);
        write_tone(&root.join("scratch.wav"), 6);
        write_tone(&root.join("tap.wav"), 30);

        Self { _dir: dir, root }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn run(&self, args: &[&str]) -> std::process::Output {
        cli()
            .arg("--config")
            .arg(self.path("config.json"))
            .args(args)
            .output()
            .expect("run vibe_cli")
    }

    fn capture_all(&self) {
        for (class, wav) in [
            ("Neutral", "silence.wav"),
            ("Scratch", "scratch.wav"),
            ("Tap", "tap.wav"),
        ] {
            let wav = self.path(wav);
            let output = self.run(&["capture", "--class", class, "--wav", wav.to_str().unwrap()]);
            assert!(
                output.status.success(),
                "capture {} failed: {}",
                class,
                String::from_utf8_lossy(&output.stderr)
            );
        }
    }
}

#[test]
fn capture_writes_dataset_rows() {
    let workspace = Workspace::new();
    workspace.capture_all();

    let dataset = fs::read_to_string(workspace.path("samples.csv")).unwrap();
    let rows: Vec<&str> = dataset.lines().collect();
    assert_eq!(rows.len(), 9);
    assert!(rows.iter().all(|row| row.split(',').count() == BANDS + 1));
    assert!(rows[0].ends_with(",Neutral"));
    assert!(rows[8].ends_with(",Tap"));
}

#[test]
fn trial_prints_log_lines() {
    let workspace = Workspace::new();
    workspace.capture_all();

    let tap = workspace.path("tap.wav");
    let silence = workspace.path("silence.wav");
    let output = workspace.run(&[
        "trial",
        "--wav",
        tap.to_str().unwrap(),
        "--wav",
        silence.to_str().unwrap(),
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(
        stdout.lines().collect::<Vec<_>>(),
        vec![
            "The classification of trial 0: Tap",
            "The classification of trial 1: No Action Detected",
        ]
    );
}

#[test]
fn trial_json_report() {
    let workspace = Workspace::new();
    workspace.capture_all();

    let scratch = workspace.path("scratch.wav");
    let output = workspace.run(&["trial", "--json", "--wav", scratch.to_str().unwrap()]);

    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report[0]["decision"], "Scratch");
    assert_eq!(report[0]["code"], 0);
    assert_eq!(report[0]["actuation"], "no-channel");
}

#[test]
fn trial_writes_codes_to_device() {
    let workspace = Workspace::new();
    workspace.capture_all();

    let device = workspace.path("device.bin");
    fs::write(&device, b"").unwrap();
    let config = serde_json::json!({
        "frontend": { "bands": BANDS, "sample_rate": SAMPLE_RATE },
        "dataset": {
            "save_path": workspace.path("samples.csv"),
            "load_path": workspace.path("samples.csv")
        },
        "actuator": { "device": device, "channel": "file", "settling_delay_ms": 10, "codes": { "Scratch": 0, "Tap": 1 } }
    });
    fs::write(workspace.path("config.json"), config.to_string()).unwrap();

    let tap = workspace.path("tap.wav");
    let scratch = workspace.path("scratch.wav");
    let silence = workspace.path("silence.wav");
    let output = workspace.run(&[
        "trial",
        "--wav",
        tap.to_str().unwrap(),
        "--wav",
        silence.to_str().unwrap(),
        "--wav",
        scratch.to_str().unwrap(),
    ]);

    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(fs::read(&device).unwrap(), vec![1, 0]);
}

#[test]
fn trial_without_dataset_fails() {
    let workspace = Workspace::new();
    let tap = workspace.path("tap.wav");
    let output = workspace.run(&["trial", "--wav", tap.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn inspect_reports_counts_and_bad_rows() {
    let workspace = Workspace::new();
    workspace.capture_all();

    let dataset = workspace.path("samples.csv");
    let mut text = fs::read_to_string(&dataset).unwrap();
    text.push_str("1.0,2.0,Tap\n");
    fs::write(&dataset, text).unwrap();

    let output = workspace.run(&["inspect"]);
    assert_eq!(output.status.code(), Some(2));

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Neutral: 3"));
    assert!(stdout.contains("Scratch: 3"));
    assert!(stdout.contains("Tap: 3"));
    assert!(stdout.contains("line 10"));
}

#[test]
fn init_config_writes_defaults_once() {
    let workspace = Workspace::new();
    let target = workspace.path("nested/vibe_config.json");

    let first = workspace.run(&["init-config", "--output", target.to_str().unwrap()]);
    assert!(first.status.success());

    let written: Value = serde_json::from_str(&fs::read_to_string(&target).unwrap()).unwrap();
    assert_eq!(written["frontend"]["bands"], 512);
    assert_eq!(written["actuator"]["settling_delay_ms"], 800);

    let second = workspace.run(&["init-config", "--output", target.to_str().unwrap()]);
    assert_eq!(second.status.code(), Some(1));
}
