//! NailGuard CLI - Command-line interface for NailGuard
//!
//! Commands:
//! - transform: Process frame observations into reports (batch mode)
//! - run: Process streaming frames from stdin (streaming mode)
//! - validate: Validate raw frame schema
//! - doctor: Diagnose pipeline health and configuration
//! - schema: Print schema information

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use nailguard::pipeline::MonitorProcessor;
use nailguard::schema::{parse_frame, RawFrame, SCHEMA_VERSION};
use nailguard::types::ReportPayload;
use nailguard::{NAILGUARD_VERSION, PRODUCER_NAME};

/// NailGuard - On-device compute engine for webcam behavior monitoring
#[derive(Parser)]
#[command(name = "nailguard")]
#[command(version = NAILGUARD_VERSION)]
#[command(about = "Transform landmark frames into behavior reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform frame observations into reports (batch mode)
    Transform {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Sensitivity threshold in pixels (30-80)
        #[arg(long, default_value = "50")]
        sensitivity: u32,

        /// Load session state from file
        #[arg(long)]
        load_session: Option<PathBuf>,

        /// Save session state to file after processing
        #[arg(long)]
        save_session: Option<PathBuf>,
    },

    /// Process streaming frames from stdin (streaming mode)
    Run {
        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Sensitivity threshold in pixels (30-80)
        #[arg(long, default_value = "50")]
        sensitivity: u32,

        /// Load session state from file
        #[arg(long)]
        load_session: Option<PathBuf>,

        /// Save session state to file on exit
        #[arg(long)]
        save_session: Option<PathBuf>,

        /// Flush output after each report
        #[arg(long, default_value = "true")]
        flush: bool,
    },

    /// Validate raw frame schema
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose pipeline health and configuration
    Doctor {
        /// Check a saved session file
        #[arg(long)]
        session: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,
    },
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
    /// Newline-delimited JSON (one report per line)
    Ndjson,
    /// JSON array of reports
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (frame.raw.v1)
    Input,
    /// Output schema (report payload)
    Output,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

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

fn run(cli: Cli) -> Result<(), GuardCliError> {
    match cli.command {
        Commands::Transform {
            input,
            output,
            input_format,
            output_format,
            sensitivity,
            load_session,
            save_session,
        } => cmd_transform(
            &input,
            &output,
            input_format,
            output_format,
            sensitivity,
            load_session.as_deref(),
            save_session.as_deref(),
        ),

        Commands::Run {
            output_format,
            sensitivity,
            load_session,
            save_session,
            flush,
        } => cmd_run(
            output_format,
            sensitivity,
            load_session.as_deref(),
            save_session.as_deref(),
            flush,
        ),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Doctor { session, json } => cmd_doctor(session.as_deref(), json),

        Commands::Schema { schema_type } => cmd_schema(schema_type),
    }
}

fn read_input(input: &PathBuf) -> Result<String, GuardCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn parse_frames(data: &str, format: InputFormat) -> Result<Vec<RawFrame>, GuardCliError> {
    match format {
        InputFormat::Ndjson => {
            let mut frames = Vec::new();
            for line in data.lines() {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                frames.push(parse_frame(trimmed)?);
            }
            Ok(frames)
        }
        InputFormat::Json => {
            let frames: Vec<RawFrame> = serde_json::from_str(data)?;
            for frame in &frames {
                frame.validate()?;
            }
            Ok(frames)
        }
    }
}

fn cmd_transform(
    input: &PathBuf,
    output: &PathBuf,
    input_format: InputFormat,
    output_format: OutputFormat,
    sensitivity: u32,
    load_session: Option<&std::path::Path>,
    save_session: Option<&std::path::Path>,
) -> Result<(), GuardCliError> {
    let input_data = read_input(input)?;
    let frames = parse_frames(&input_data, input_format)?;

    if frames.is_empty() {
        return Err(GuardCliError::NoFrames);
    }

    let mut processor = MonitorProcessor::new(sensitivity)?;

    if let Some(session_path) = load_session {
        let session_json = fs::read_to_string(session_path)?;
        processor.load_session(&session_json)?;
    }

    let mut reports: Vec<ReportPayload> = Vec::new();
    for frame in &frames {
        let report_json = processor.process(&serde_json::to_string(frame)?)?;
        let report: ReportPayload = serde_json::from_str(&report_json)?;
        reports.push(report);
    }

    if let Some(session_path) = save_session {
        let session_json = processor.save_session()?;
        fs::write(session_path, session_json)?;
    }

    let output_data = format_output(&reports, &output_format)?;

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_run(
    output_format: OutputFormat,
    sensitivity: u32,
    load_session: Option<&std::path::Path>,
    save_session: Option<&std::path::Path>,
    flush: bool,
) -> Result<(), GuardCliError> {
    let mut processor = MonitorProcessor::new(sensitivity)?;

    if let Some(session_path) = load_session {
        let session_json = fs::read_to_string(session_path)?;
        processor.load_session(&session_json)?;
    }

    if atty::is(atty::Stream::Stdin) {
        eprintln!("Reading frames from TTY; pipe NDJSON frames or press Ctrl-D to end");
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        let report_json = processor.process(trimmed)?;

        match output_format {
            OutputFormat::Ndjson | OutputFormat::Json => writeln!(stdout, "{}", report_json)?,
            OutputFormat::JsonPretty => {
                let report: ReportPayload = serde_json::from_str(&report_json)?;
                writeln!(stdout, "{}", serde_json::to_string_pretty(&report)?)?;
            }
        }

        if flush {
            stdout.flush()?;
        }
    }

    if let Some(session_path) = save_session {
        let session_json = processor.save_session()?;
        fs::write(session_path, session_json)?;
    }

    Ok(())
}

fn cmd_validate(
    input: &PathBuf,
    input_format: InputFormat,
    json: bool,
) -> Result<(), GuardCliError> {
    let input_data = read_input(input)?;

    // Parse leniently: collect per-frame errors instead of failing fast
    let raw_items: Vec<String> = match input_format {
        InputFormat::Ndjson => input_data
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect(),
        InputFormat::Json => {
            let values: Vec<serde_json::Value> = serde_json::from_str(&input_data)?;
            values
                .iter()
                .map(serde_json::to_string)
                .collect::<Result<_, _>>()?
        }
    };

    let mut errors: Vec<ValidationErrorDetail> = Vec::new();
    for (index, item) in raw_items.iter().enumerate() {
        if let Err(e) = parse_frame(item) {
            errors.push(ValidationErrorDetail {
                index,
                error: e.to_string(),
            });
        }
    }

    let report = ValidationReport {
        schema_version: SCHEMA_VERSION.to_string(),
        total_frames: raw_items.len(),
        valid_frames: raw_items.len() - errors.len(),
        invalid_frames: errors.len(),
        errors,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Schema:         {}", report.schema_version);
        println!("Total frames:   {}", report.total_frames);
        println!("Valid frames:   {}", report.valid_frames);
        println!("Invalid frames: {}", report.invalid_frames);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - Frame {}: {}", err.index, err.error);
            }
        }
    }

    if report.invalid_frames > 0 {
        Err(GuardCliError::ValidationFailed(report.invalid_frames))
    } else {
        Ok(())
    }
}

fn cmd_doctor(session: Option<&std::path::Path>, json: bool) -> Result<(), GuardCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "nailguard_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("NailGuard version {}", NAILGUARD_VERSION),
    });

    checks.push(DoctorCheck {
        name: "schema_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Input schema: {}", SCHEMA_VERSION),
    });

    if let Some(session_path) = session {
        if session_path.exists() {
            match fs::read_to_string(session_path) {
                Ok(content) => match nailguard::SessionTimer::from_json(&content) {
                    Ok(timer) => {
                        checks.push(DoctorCheck {
                            name: "session".to_string(),
                            status: CheckStatus::Ok,
                            message: format!(
                                "Session file valid ({} attempts recorded)",
                                timer.attempt_count()
                            ),
                        });
                    }
                    Err(e) => {
                        checks.push(DoctorCheck {
                            name: "session".to_string(),
                            status: CheckStatus::Error,
                            message: format!("Invalid session JSON: {}", e),
                        });
                    }
                },
                Err(e) => {
                    checks.push(DoctorCheck {
                        name: "session".to_string(),
                        status: CheckStatus::Error,
                        message: format!("Cannot read session file: {}", e),
                    });
                }
            }
        } else {
            checks.push(DoctorCheck {
                name: "session".to_string(),
                status: CheckStatus::Warning,
                message: "Session file does not exist".to_string(),
            });
        }
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (streaming mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: NAILGUARD_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("NailGuard Doctor Report");
        println!("=======================");
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

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(GuardCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType) -> Result<(), GuardCliError> {
    match schema_type {
        SchemaType::Input => {
            println!("Input Schema: {}", SCHEMA_VERSION);
            println!();
            println!("One frame observation per record:");
            println!();
            println!("- timestamp: capture time (RFC3339)");
            println!("- width, height: frame dimensions in pixels (non-zero)");
            println!("- hand: optional array of exactly 21 normalized points {{x, y}}");
            println!("- face: optional face mesh array of normalized points {{x, y}}");
            println!("- device_id: optional device identifier (default \"unknown\")");
            println!();
            println!("A missing hand or face means nothing was detected in the frame.");
        }
        SchemaType::Output => {
            println!("Output Schema: report payload");
            println!();
            println!("- report_version: Schema version (1.0.0)");
            println!("- producer: {{ name, version, instance_id }}");
            println!("- provenance: {{ source_device_id, observed_at_utc, computed_at_utc }}");
            println!("- frame:");
            println!("  - behavior: none | nail_biting | hair_pulling");
            println!("  - hand_point, mouth_center, hair_anchor: pixel points");
            println!("  - zones: {{ upper, lower }} face rectangles");
            println!("  - target_distance_px: distance to the winning target");
            println!("- session:");
            println!("  - attempt_count, stress_duration_sec, warning_active");
            println!("  - idle_duration_sec, last_behavior_ago_sec");
        }
    }

    Ok(())
}

// Helper functions

fn format_output(
    reports: &[ReportPayload],
    format: &OutputFormat,
) -> Result<String, GuardCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for report in reports {
                lines.push(serde_json::to_string(report)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(reports)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(reports)?),
    }
}

// Error types

#[derive(Debug)]
enum GuardCliError {
    Io(io::Error),
    Monitor(nailguard::MonitorError),
    Json(serde_json::Error),
    NoFrames,
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for GuardCliError {
    fn from(e: io::Error) -> Self {
        GuardCliError::Io(e)
    }
}

impl From<nailguard::MonitorError> for GuardCliError {
    fn from(e: nailguard::MonitorError) -> Self {
        GuardCliError::Monitor(e)
    }
}

impl From<serde_json::Error> for GuardCliError {
    fn from(e: serde_json::Error) -> Self {
        GuardCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<GuardCliError> for CliError {
    fn from(e: GuardCliError) -> Self {
        match e {
            GuardCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            GuardCliError::Monitor(e) => CliError {
                code: "MONITOR_ERROR".to_string(),
                message: e.to_string(),
                hint: Some(format!("Ensure input matches the {} schema", SCHEMA_VERSION)),
            },
            GuardCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            GuardCliError::NoFrames => CliError {
                code: "NO_FRAMES".to_string(),
                message: "No frames found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            GuardCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} frames failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            GuardCliError::DoctorFailed => CliError {
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
    schema_version: String,
    total_frames: usize,
    valid_frames: usize,
    invalid_frames: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
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

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
