use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use vibration_classifier::actuator::{open_channel, ActuationStatus, ScheduledActuator};
use vibration_classifier::config::{AppConfig, DEFAULT_CONFIG_PATH};
use vibration_classifier::frontend::{SpectrumAnalyzer, WavFrameSource};
use vibration_classifier::session::{Session, SessionEvent, TrialRecord};

#[derive(Parser, Debug)]
#[command(
    name = "vibe_cli",
    about = "Offline capture, training and trial harness for the vibration classifier"
)]
struct Cli {
    /// Configuration file (defaults apply if it is missing)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Append every frame of the given recordings to the dataset under one class
    Capture {
        #[arg(long)]
        class: String,
        /// Recording to capture; repeat for several
        #[arg(long = "wav", required = true)]
        wavs: Vec<PathBuf>,
        /// Dataset file to extend (defaults to the configured save path)
        #[arg(long)]
        dataset: Option<PathBuf>,
    },
    /// Train on a dataset and run one trial per recording
    Trial {
        /// Recording for one trial; repeat for several
        #[arg(long = "wav", required = true)]
        wavs: Vec<PathBuf>,
        /// Dataset to train on (defaults to the configured load path)
        #[arg(long)]
        dataset: Option<PathBuf>,
        /// Device to write codes to (overrides the configured device)
        #[arg(long)]
        device: Option<PathBuf>,
        /// Print a JSON report instead of the trial log
        #[arg(long)]
        json: bool,
    },
    /// Show per-class sample counts and rejected rows of a dataset
    Inspect {
        #[arg(long)]
        dataset: Option<PathBuf>,
    },
    /// Write the default configuration to a file
    InitConfig {
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        output: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = AppConfig::load_from_file(&cli.config);
    match cli.command {
        Commands::Capture {
            class,
            wavs,
            dataset,
        } => {
            let dataset = dataset.unwrap_or_else(|| config.dataset.save_path.clone());
            run_capture(&config, &class, &wavs, &dataset)
        }
        Commands::Trial {
            wavs,
            dataset,
            device,
            json,
        } => {
            let dataset = dataset.unwrap_or_else(|| config.dataset.load_path.clone());
            let device = device.or_else(|| config.actuator.device.clone());
            run_trial(&config, &wavs, &dataset, device.as_deref(), json)
        }
        Commands::Inspect { dataset } => {
            let dataset = dataset.unwrap_or_else(|| config.dataset.load_path.clone());
            run_inspect(&config, &dataset)
        }
        Commands::InitConfig { output } => run_init_config(&output),
    }
}

fn load_spectra(
    config: &AppConfig,
    analyzer: &mut SpectrumAnalyzer,
    wav: &Path,
) -> Result<Vec<Vec<f32>>> {
    let source = WavFrameSource::open(wav, analyzer.frame_size())
        .with_context(|| format!("reading {}", wav.display()))?;
    if let Err(err) = source.require_sample_rate(config.frontend.sample_rate) {
        tracing::warn!("[CLI] {}", err);
    }
    Ok(source.spectra(analyzer))
}

fn run_capture(config: &AppConfig, class: &str, wavs: &[PathBuf], dataset: &Path) -> Result<ExitCode> {
    let mut session = Session::from_config(config)?;
    if dataset.exists() {
        let report = session
            .load_from_file(dataset)
            .with_context(|| format!("loading {}", dataset.display()))?;
        if !report.is_clean() {
            eprintln!(
                "Skipped {} malformed rows in {}",
                report.rejected.len(),
                dataset.display()
            );
        }
    }

    let class_id = session.classes().id_of(class)?;
    session.select_class(class_id)?;

    let mut analyzer = SpectrumAnalyzer::new(config.frontend.bands)?;
    session.handle(SessionEvent::StartCapture)?;
    for wav in wavs {
        for spectrum in load_spectra(config, &mut analyzer, wav)? {
            session.process_frame(&spectrum)?;
        }
    }
    session.handle(SessionEvent::StopCapture)?;

    session
        .save_to_file(dataset)
        .with_context(|| format!("writing {}", dataset.display()))?;
    println!(
        "{}: {} samples ({} total) -> {}",
        class,
        session.count_for(class_id),
        session.training_set().total(),
        dataset.display()
    );
    Ok(ExitCode::from(0))
}

fn run_trial(
    config: &AppConfig,
    wavs: &[PathBuf],
    dataset: &Path,
    device: Option<&Path>,
    json: bool,
) -> Result<ExitCode> {
    let mut session = Session::from_config(config)?;

    // Kept alive until every scheduled emission has settled
    let runtime = match device {
        Some(path) => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_time()
                .build()
                .context("starting actuation runtime")?;
            let channel =
                open_channel(path, config.actuator.channel, &config.actuator.serial)?;
            session.set_sink(Some(Box::new(ScheduledActuator::new(
                channel,
                config.actuator.settling_delay(),
                runtime.handle().clone(),
            ))));
            Some(runtime)
        }
        None => None,
    };

    let report = session
        .load_and_train(dataset)
        .with_context(|| format!("training on {}", dataset.display()))?;
    if !report.is_clean() {
        eprintln!(
            "Skipped {} malformed rows in {}",
            report.rejected.len(),
            dataset.display()
        );
    }

    let mut analyzer = SpectrumAnalyzer::new(config.frontend.bands)?;
    for wav in wavs {
        let spectra = load_spectra(config, &mut analyzer, wav)?;
        session.handle(SessionEvent::StartTrial)?;
        for spectrum in &spectra {
            session.process_frame(spectrum)?;
        }
        session.handle(SessionEvent::StopTrial)?;
    }

    let mut failed = 0;
    for outcome in session.settle_actuation() {
        if let Err(err) = outcome {
            eprintln!("{err}");
            failed += 1;
        }
    }
    drop(runtime);

    let trials = session.trial_log().entries();
    failed += trials
        .iter()
        .filter(|trial| matches!(trial.actuation, ActuationStatus::Failed(_)))
        .count();

    if json {
        let payload: Vec<TrialPayload> = trials
            .iter()
            .map(|trial| TrialPayload::new(&session, trial))
            .collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        for line in session.trial_log().lines() {
            println!("{line}");
        }
    }

    if failed > 0 {
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::from(0))
    }
}

fn run_inspect(config: &AppConfig, dataset: &Path) -> Result<ExitCode> {
    let mut session = Session::from_config(config)?;
    let report = session
        .load_from_file(dataset)
        .with_context(|| format!("loading {}", dataset.display()))?;

    for class in session.classes().ids() {
        println!(
            "{}: {}",
            session.classes().name(class),
            session.count_for(class)
        );
    }
    for rejected in &report.rejected {
        println!("line {}: {}", rejected.line, rejected.error);
    }

    if report.is_clean() {
        Ok(ExitCode::from(0))
    } else {
        Ok(ExitCode::from(2))
    }
}

fn run_init_config(output: &Path) -> Result<ExitCode> {
    if output.exists() {
        return Err(anyhow!("{} already exists", output.display()));
    }
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&AppConfig::default())?;
    fs::write(output, json).with_context(|| format!("writing {}", output.display()))?;
    println!("Wrote {}", output.display());
    Ok(ExitCode::from(0))
}

#[derive(Serialize)]
struct TrialPayload {
    trial: usize,
    decision: String,
    votes: Vec<(String, usize)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<u8>,
    actuation: &'static str,
}

impl TrialPayload {
    fn new(session: &Session, trial: &TrialRecord) -> Self {
        let (code, actuation) = match &trial.actuation {
            ActuationStatus::NotRequired => (None, "none"),
            ActuationStatus::NoChannel { code } => (Some(*code), "no-channel"),
            ActuationStatus::Dispatched(receipt) => (Some(receipt.code()), "dispatched"),
            ActuationStatus::Failed(_) => (None, "failed"),
        };
        Self {
            trial: trial.index,
            decision: trial.label.clone(),
            votes: trial
                .tally
                .iter()
                .map(|&(class, count)| (session.classes().name(class).to_string(), count))
                .collect(),
            code,
            actuation,
        }
    }
}
