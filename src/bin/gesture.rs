//! Gesture CLI - Command-line interface for Synheart Gesture
//!
//! Commands:
//! - replay: Run recorded hand frames through the engine and print its events
//! - validate: Validate hand.frame.v1 records
//! - doctor: Diagnose configuration and model health
//! - config: Print the default configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use synheart_gesture::frame::{FrameAdapter, FrameRecord, FRAME_SCHEMA_VERSION};
use synheart_gesture::types::{ActionReport, EngineEvent};
use synheart_gesture::{
    Classifier, GestureConfig, GestureError, GestureProcessor, TemplateClassifier,
    GESTURE_VERSION, PRODUCER_NAME,
};

/// Gesture - hand gesture recognition and action dispatch
#[derive(Parser)]
#[command(name = "gesture")]
#[command(author = "Synheart AI Inc")]
#[command(version = GESTURE_VERSION)]
#[command(about = "Turn hand landmark streams into gesture actions", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay recorded frames through the engine
    Replay {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Engine configuration file (defaults when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Template model file
        #[arg(long)]
        model: PathBuf,

        /// Report every dispatched action as immediately successful
        #[arg(long)]
        ack_actions: bool,
    },

    /// Validate frame records against hand.frame.v1
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Expected landmarks per hand
        #[arg(long, default_value = "21")]
        landmarks: usize,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and model health
    Doctor {
        /// Check configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Check model file
        #[arg(long)]
        model: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the default engine configuration
    Config,
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one frame per line)
    Ndjson,
    /// JSON array of frames
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one event per line)
    Ndjson,
    /// JSON array of events
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("synheart_gesture={level},gesture={level}").into()),
        )
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), GestureCliError> {
    match cli.command {
        Commands::Replay {
            input,
            output,
            input_format,
            output_format,
            config,
            model,
            ack_actions,
        } => cmd_replay(
            &input,
            &output,
            input_format,
            output_format,
            config.as_deref(),
            &model,
            ack_actions,
        ),

        Commands::Validate {
            input,
            input_format,
            landmarks,
            json,
        } => cmd_validate(&input, input_format, landmarks, json),

        Commands::Doctor {
            config,
            model,
            json,
        } => cmd_doctor(config.as_deref(), model.as_deref(), json),

        Commands::Config => cmd_config(),
    }
}

fn cmd_replay(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    config: Option<&Path>,
    model: &Path,
    ack_actions: bool,
) -> Result<(), GestureCliError> {
    let config = load_config(config)?;
    let model = TemplateClassifier::from_json(&fs::read_to_string(model)?)?;
    let frames = read_frames(input, &input_format)?;

    if frames.is_empty() {
        return Err(GestureCliError::NoFrames);
    }

    info!(frames = frames.len(), "replaying");
    let mut processor = GestureProcessor::new(config, model)?;
    let mut events: Vec<EngineEvent> = Vec::new();

    for frame in &frames {
        let produced = processor.process_frame(frame);
        if ack_actions {
            let reports: Vec<ActionReport> = produced
                .iter()
                .filter_map(EngineEvent::as_action)
                .map(|request| ActionReport::succeeded(request, frame.timestamp))
                .collect();
            events.extend(produced);
            for report in reports {
                events.extend(processor.report_action(report));
            }
        } else {
            events.extend(produced);
        }
    }

    debug!(events = events.len(), state = ?processor.state(), "replay finished");

    let output_data = format_output(&events, &output_format)?;
    if output.to_string_lossy() == "-" {
        let mut stdout = io::stdout();
        write!(stdout, "{}", output_data)?;
        stdout.flush()?;
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_validate(
    input: &Path,
    input_format: InputFormat,
    landmarks: usize,
    json: bool,
) -> Result<(), GestureCliError> {
    let frames = read_frames(input, &input_format)?;
    let results = FrameAdapter::validate_frames(&frames, landmarks);

    let report = ValidationReport {
        total_frames: frames.len(),
        frames_with_hand: frames.iter().filter(|f| f.has_hand()).count(),
        valid_frames: frames.len() - results.len(),
        invalid_frames: results.len(),
        errors: results
            .iter()
            .map(|r| ValidationErrorDetail {
                index: r.index,
                timestamp: r.timestamp.to_rfc3339(),
                error: r.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total frames:     {}", report.total_frames);
        println!("Frames with hand: {}", report.frames_with_hand);
        println!("Valid frames:     {}", report.valid_frames);
        println!("Invalid frames:   {}", report.invalid_frames);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - Frame {} ({}): {}", err.index, err.timestamp, err.error);
            }
        }
    }

    if report.invalid_frames > 0 {
        Err(GestureCliError::ValidationFailed(report.invalid_frames))
    } else {
        Ok(())
    }
}

fn cmd_doctor(
    config: Option<&Path>,
    model: Option<&Path>,
    json: bool,
) -> Result<(), GestureCliError> {
    let mut checks: Vec<DoctorCheck> = vec![
        DoctorCheck::ok("gesture_version", format!("Gesture version {}", GESTURE_VERSION)),
        DoctorCheck::ok("schema_version", format!("Input schema: {}", FRAME_SCHEMA_VERSION)),
    ];

    let loaded_config = match config {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => match GestureConfig::from_json(&content) {
                Ok(config) => {
                    checks.push(DoctorCheck::ok(
                        "config",
                        format!(
                            "Config valid ({} labels, window of {} frames)",
                            config.labels.len(),
                            config.sequence_length
                        ),
                    ));
                    Some(config)
                }
                Err(e) => {
                    checks.push(DoctorCheck::error("config", format!("Invalid config: {}", e)));
                    None
                }
            },
            Err(e) => {
                checks.push(DoctorCheck::error(
                    "config",
                    format!("Cannot read config file: {}", e),
                ));
                None
            }
        },
        None => {
            checks.push(DoctorCheck::ok("config", "Using default configuration".to_string()));
            Some(GestureConfig::default())
        }
    };

    if let Some(path) = model {
        match fs::read_to_string(path) {
            Ok(content) => match TemplateClassifier::from_json(&content) {
                Ok(model) => {
                    checks.push(DoctorCheck::ok(
                        "model",
                        format!("Model valid ({} templates)", model.labels().len()),
                    ));
                    if let Some(config) = &loaded_config {
                        checks.push(model_compatibility(config, &model));
                    }
                }
                Err(e) => checks.push(DoctorCheck::error("model", format!("Invalid model: {}", e))),
            },
            Err(e) => checks.push(DoctorCheck::error(
                "model",
                format!("Cannot read model file: {}", e),
            )),
        }
    } else {
        checks.push(DoctorCheck {
            name: "model".to_string(),
            status: CheckStatus::Warning,
            message: "No model given; replay needs --model".to_string(),
        });
    }

    // Check stdin is available (for piped replay)
    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck::ok("stdin", "stdin is a TTY (interactive mode)".to_string())
    } else {
        DoctorCheck::ok("stdin", "stdin is a pipe (replay from - ready)".to_string())
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: GESTURE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Gesture Doctor Report");
        println!("=====================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(GestureCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_config() -> Result<(), GestureCliError> {
    println!("{}", GestureConfig::default().to_json()?);
    Ok(())
}

// Helper functions

fn read_input(input: &Path) -> Result<String, GestureCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn read_frames(
    input: &Path,
    input_format: &InputFormat,
) -> Result<Vec<FrameRecord>, GestureCliError> {
    let input_data = read_input(input)?;
    let frames = match input_format {
        InputFormat::Ndjson => FrameAdapter::parse_ndjson(&input_data)?,
        InputFormat::Json => FrameAdapter::parse_array(&input_data)?,
    };
    Ok(frames)
}

fn load_config(path: Option<&Path>) -> Result<GestureConfig, GestureCliError> {
    match path {
        Some(path) => Ok(GestureConfig::from_json(&fs::read_to_string(path)?)?),
        None => Ok(GestureConfig::default()),
    }
}

fn model_compatibility(config: &GestureConfig, model: &TemplateClassifier) -> DoctorCheck {
    if model.labels() != config.labels.as_slice() {
        DoctorCheck::error(
            "model_labels",
            format!(
                "Model labels {:?} do not match configured labels {:?}",
                model.labels(),
                config.labels
            ),
        )
    } else if model.feature_len() != config.feature_len() {
        DoctorCheck::error(
            "model_features",
            format!(
                "Model expects {} features, config produces {}",
                model.feature_len(),
                config.feature_len()
            ),
        )
    } else {
        DoctorCheck::ok("model_compatibility", "Model matches configuration".to_string())
    }
}

fn format_output(events: &[EngineEvent], format: &OutputFormat) -> Result<String, GestureCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for event in events {
                lines.push(serde_json::to_string(event)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(events)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(events)?),
    }
}

// Error types

#[derive(Debug)]
enum GestureCliError {
    Io(io::Error),
    Gesture(GestureError),
    Json(serde_json::Error),
    NoFrames,
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for GestureCliError {
    fn from(e: io::Error) -> Self {
        GestureCliError::Io(e)
    }
}

impl From<GestureError> for GestureCliError {
    fn from(e: GestureError) -> Self {
        GestureCliError::Gesture(e)
    }
}

impl From<serde_json::Error> for GestureCliError {
    fn from(e: serde_json::Error) -> Self {
        GestureCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<GestureCliError> for CliError {
    fn from(e: GestureCliError) -> Self {
        match e {
            GestureCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            GestureCliError::Gesture(e) => {
                let (code, hint) = match &e {
                    GestureError::InvalidConfig(_) => {
                        ("CONFIG_ERROR", "Run 'gesture config' for a valid starting point")
                    }
                    GestureError::InvalidModel(_) => {
                        ("MODEL_ERROR", "Run 'gesture doctor --model' for details")
                    }
                    _ => ("PARSE_ERROR", "Ensure input matches the hand.frame.v1 schema"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            GestureCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            GestureCliError::NoFrames => CliError {
                code: "NO_FRAMES".to_string(),
                message: "No frames found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            GestureCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} frames failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            GestureCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_frames: usize,
    frames_with_hand: usize,
    valid_frames: usize,
    invalid_frames: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    timestamp: String,
    error: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

impl DoctorCheck {
    fn ok(name: &str, message: String) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message,
        }
    }

    fn error(name: &str, message: String) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message,
        }
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
