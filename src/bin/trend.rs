//! Trend CLI - Command-line interface for Synheart Trend
//!
//! Commands:
//! - aggregate: Turn a sample batch into a chart payload
//! - axis: Print the canonical axis labels for a granularity
//! - validate: Validate sample input
//! - label: Print header date labels
//! - doctor: Diagnose configuration and environment

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use synheart_trend::axis::canonical_axis;
use synheart_trend::labels::{last_updated_label, weekly_date_range_label};
use synheart_trend::schema::{SampleAdapter, SampleBatch, ValidationResult, SCHEMA_VERSION};
use synheart_trend::types::ChartPayload;
use synheart_trend::{
    ChartConfig, ChartProcessor, ChartTimezone, Granularity, Orientation, PRODUCER_NAME,
    TREND_VERSION,
};

/// Trend - On-device aggregation of health samples into chart series
#[derive(Parser)]
#[command(name = "trend")]
#[command(author = "Synheart AI Inc")]
#[command(version = TREND_VERSION)]
#[command(about = "Aggregate health samples into fixed-axis chart series", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Turn a sample batch into a chart payload
    Aggregate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,

        /// Chart granularity; defaults to the configured one
        #[arg(short, long)]
        granularity: Option<GranularityArg>,

        /// Device orientation, used to resolve the `period` granularity
        #[arg(long, default_value = "portrait")]
        orientation: OrientationArg,

        /// Instant the axis ends at (RFC 3339); defaults to now
        #[arg(long)]
        reference: Option<String>,

        /// Chart timezone ("UTC", "local" or "+HH:MM"); overrides the config
        #[arg(long)]
        timezone: Option<String>,

        /// Load configuration from a JSON file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Keep samples outside the chart's trailing window
        #[arg(long)]
        no_window: bool,
    },

    /// Print the canonical axis labels for a granularity
    Axis {
        /// Chart granularity
        #[arg(value_enum)]
        granularity: GranularityArg,

        /// Device orientation, used to resolve the `period` granularity
        #[arg(long, default_value = "portrait")]
        orientation: OrientationArg,

        /// Instant the axis ends at (RFC 3339); defaults to now
        #[arg(long)]
        reference: Option<String>,

        /// Chart timezone ("UTC", "local" or "+HH:MM")
        #[arg(long, default_value = "local")]
        timezone: String,
    },

    /// Validate sample input
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print header date labels
    Label {
        /// Label to print
        #[arg(value_enum)]
        kind: LabelKind,

        /// Instant the label describes (RFC 3339); defaults to now
        #[arg(long)]
        at: Option<String>,

        /// Chart timezone ("UTC", "local" or "+HH:MM")
        #[arg(long, default_value = "local")]
        timezone: String,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Check a configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// A trend.sample_batch.v1 envelope or a JSON array of samples
    Json,
    /// Newline-delimited JSON (one sample per line)
    Ndjson,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact chart payload JSON
    Json,
    /// Pretty-printed chart payload JSON
    JsonPretty,
    /// One "label<TAB>value" line per axis point
    Tsv,
}

#[derive(Clone, Copy, ValueEnum)]
enum GranularityArg {
    Hourly,
    Daily,
    Monthly,
    Quarterly,
    /// Monthly in landscape, quarterly in portrait
    Period,
}

impl GranularityArg {
    fn resolve(self, orientation: OrientationArg) -> Granularity {
        match self {
            GranularityArg::Hourly => Granularity::Hourly,
            GranularityArg::Daily => Granularity::Daily,
            GranularityArg::Monthly => Granularity::Monthly,
            GranularityArg::Quarterly => Granularity::Quarterly,
            GranularityArg::Period => Granularity::for_period_chart(orientation.into()),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
}

impl From<OrientationArg> for Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Orientation::Portrait,
            OrientationArg::Landscape => Orientation::Landscape,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum LabelKind {
    /// Week ending at the instant, e.g. "Jun 3–10, 2020"
    Range,
    /// "last updated on <date>"
    Updated,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

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

fn run(cli: Cli) -> Result<(), TrendCliError> {
    match cli.command {
        Commands::Aggregate {
            input,
            output,
            input_format,
            output_format,
            granularity,
            orientation,
            reference,
            timezone,
            config,
            no_window,
        } => {
            let mut chart_config = match config {
                Some(path) => load_config(&path)?,
                None => ChartConfig::default(),
            };
            if let Some(tz) = timezone {
                chart_config = chart_config.with_timezone(tz.parse()?);
            }
            if no_window {
                chart_config = chart_config.with_query_window(false);
            }

            let granularity = granularity
                .map(|g| g.resolve(orientation))
                .unwrap_or(chart_config.default_granularity);

            cmd_aggregate(
                &input,
                &output,
                input_format,
                output_format,
                granularity,
                parse_reference(reference.as_deref())?,
                chart_config,
            )
        }

        Commands::Axis {
            granularity,
            orientation,
            reference,
            timezone,
        } => {
            let timezone: ChartTimezone = timezone.parse()?;
            let reference = parse_reference(reference.as_deref())?;
            let labels = canonical_axis(granularity.resolve(orientation), &reference, timezone);
            println!("{}", labels.join(" "));
            Ok(())
        }

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Label { kind, at, timezone } => {
            let timezone: ChartTimezone = timezone.parse()?;
            let at = parse_reference(at.as_deref())?;
            let label = match kind {
                LabelKind::Range => weekly_date_range_label(&at, timezone),
                LabelKind::Updated => last_updated_label(&at, timezone),
            };
            println!("{label}");
            Ok(())
        }

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),
    }
}

fn cmd_aggregate(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    granularity: Granularity,
    reference: DateTime<Utc>,
    config: ChartConfig,
) -> Result<(), TrendCliError> {
    let batch = read_batch(input, &input_format)?;

    tracing::info!(
        samples = batch.samples.len(),
        granularity = %granularity,
        reference = %reference,
        "aggregating"
    );

    let processor = ChartProcessor::with_config(config);
    let payload = processor.chart(&batch, granularity, reference);
    let output_data = format_output(&payload, &output_format)?;

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_validate(input: &Path, input_format: InputFormat, json: bool) -> Result<(), TrendCliError> {
    let batch = read_batch(input, &input_format)?;
    let results = SampleAdapter::validate_samples(&batch.samples);

    let report = ValidationReport {
        total_samples: batch.samples.len(),
        valid_samples: batch.samples.len() - results.len(),
        invalid_samples: results.len(),
        errors: results.iter().map(ValidationErrorDetail::from).collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total samples:   {}", report.total_samples);
        println!("Valid samples:   {}", report.valid_samples);
        println!("Invalid samples: {}", report.invalid_samples);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - Sample {}: {}", err.index, err.error);
            }
        }
    }

    if report.invalid_samples > 0 {
        Err(TrendCliError::ValidationFailed(report.invalid_samples))
    } else {
        Ok(())
    }
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), TrendCliError> {
    let mut checks: Vec<DoctorCheck> = vec![
        DoctorCheck {
            name: "trend_version".to_string(),
            status: CheckStatus::Ok,
            message: format!("Trend version {}", TREND_VERSION),
        },
        DoctorCheck {
            name: "schema_version".to_string(),
            status: CheckStatus::Ok,
            message: format!("Input schema: {}", SCHEMA_VERSION),
        },
    ];

    if let Some(config_path) = config {
        let check = if !config_path.exists() {
            DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Config file does not exist".to_string(),
            }
        } else {
            match load_config(config_path) {
                Ok(loaded) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Ok,
                    message: format!(
                        "Config valid (timezone {}, default {}, window {})",
                        loaded.timezone,
                        loaded.default_granularity,
                        if loaded.apply_query_window { "on" } else { "off" }
                    ),
                },
                Err(e) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Invalid config: {}", CliError::from(e).message),
                },
            }
        };
        checks.push(check);
    }

    let now = Utc::now();
    checks.push(DoctorCheck {
        name: "local_timezone".to_string(),
        status: CheckStatus::Ok,
        message: format!(
            "Local offset {}",
            now.with_timezone(&chrono::Local).offset()
        ),
    });

    let stdin_message = if atty::is(atty::Stream::Stdin) {
        "stdin is a TTY (interactive mode)"
    } else {
        "stdin is a pipe (ready for `--input -`)"
    };
    checks.push(DoctorCheck {
        name: "stdin".to_string(),
        status: CheckStatus::Ok,
        message: stdin_message.to_string(),
    });

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: TREND_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Trend Doctor Report");
        println!("===================");
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
        Err(TrendCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn read_input(input: &Path) -> Result<String, TrendCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn read_batch(input: &Path, input_format: &InputFormat) -> Result<SampleBatch, TrendCliError> {
    let input_data = read_input(input)?;
    let batch = match input_format {
        InputFormat::Json => SampleAdapter::parse_any(&input_data)?,
        InputFormat::Ndjson => SampleBatch::new(SampleAdapter::parse_ndjson(&input_data)?),
    };
    Ok(batch)
}

fn load_config(path: &Path) -> Result<ChartConfig, TrendCliError> {
    let json = fs::read_to_string(path)?;
    Ok(ChartConfig::from_json(&json)?)
}

fn parse_reference(reference: Option<&str>) -> Result<DateTime<Utc>, TrendCliError> {
    match reference {
        None => Ok(Utc::now()),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| TrendCliError::ParseError(format!("Invalid reference '{}': {}", s, e))),
    }
}

fn format_output(payload: &ChartPayload, format: &OutputFormat) -> Result<String, TrendCliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(payload)? + "\n"),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(payload)? + "\n"),
        OutputFormat::Tsv => {
            let lines: Vec<String> = payload
                .points
                .iter()
                .map(|p| format!("{}\t{}", p.label, p.value))
                .collect();
            Ok(lines.join("\n") + "\n")
        }
    }
}

// Error types

#[derive(Debug)]
enum TrendCliError {
    Io(io::Error),
    Compute(synheart_trend::ComputeError),
    Json(serde_json::Error),
    ValidationFailed(usize),
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for TrendCliError {
    fn from(e: io::Error) -> Self {
        TrendCliError::Io(e)
    }
}

impl From<synheart_trend::ComputeError> for TrendCliError {
    fn from(e: synheart_trend::ComputeError) -> Self {
        TrendCliError::Compute(e)
    }
}

impl From<serde_json::Error> for TrendCliError {
    fn from(e: serde_json::Error) -> Self {
        TrendCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<TrendCliError> for CliError {
    fn from(e: TrendCliError) -> Self {
        match e {
            TrendCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            TrendCliError::Compute(e) => CliError {
                code: "COMPUTE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check input format, granularity and timezone".to_string()),
            },
            TrendCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Ensure input is valid JSON".to_string()),
            },
            TrendCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} samples failed validation", count),
                hint: Some("Run 'trend validate --json' for details".to_string()),
            },
            TrendCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            TrendCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Use RFC 3339 timestamps, e.g. 2020-06-10T12:00:00Z".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_samples: usize,
    valid_samples: usize,
    invalid_samples: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    error: String,
}

impl From<&ValidationResult> for ValidationErrorDetail {
    fn from(result: &ValidationResult) -> Self {
        Self {
            index: result.index,
            error: result.error.to_string(),
        }
    }
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
