//! Streak CLI - Command-line interface for Synheart Streak
//!
//! Commands:
//! - analyze: Compute streaks, insights, and a continuation estimate for one series
//! - validate: Validate observations (and optionally a goal)
//! - config: Print the engine configuration
//! - doctor: Diagnose configuration and environment

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use synheart_streak::adapter::ObservationAdapter;
use synheart_streak::config::EngineConfig;
use synheart_streak::goal::validate_goal;
use synheart_streak::pipeline::StreakProcessor;
use synheart_streak::types::{GoalDefinition, GoalKind, Observation, StreakReport, Threshold};
use synheart_streak::{StreakError, PRODUCER_NAME, STREAK_VERSION};

/// Streak - Habit streak and goal-achievement engine
#[derive(Parser)]
#[command(name = "streak")]
#[command(author = "Synheart AI Inc")]
#[command(version = STREAK_VERSION)]
#[command(about = "Compute habit streaks and goal achievement from daily metrics", long_about = None)]
struct Cli {
    /// Enable debug logging on stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one observation series against a goal
    Analyze {
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

        #[command(flatten)]
        goal: GoalArgs,

        /// Goal name used in insight messages (defaults to the unit)
        #[arg(long)]
        label: Option<String>,

        /// Load engine configuration from file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate observations and an optional goal
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Goal definition file to validate alongside the observations
        #[arg(long)]
        goal_file: Option<PathBuf>,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the engine configuration as JSON
    Config {
        /// Load and print this configuration instead of the defaults
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Check configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Goal from a file, or built from flags
#[derive(Args)]
struct GoalArgs {
    /// Goal definition JSON file
    #[arg(long, conflicts_with_all = ["kind", "threshold", "low", "high"])]
    goal_file: Option<PathBuf>,

    /// Goal kind
    #[arg(long)]
    kind: Option<KindArg>,

    /// Threshold for minimum, maximum, or target goals
    #[arg(long)]
    threshold: Option<f64>,

    /// Lower bound for range goals
    #[arg(long)]
    low: Option<f64>,

    /// Upper bound for range goals
    #[arg(long)]
    high: Option<f64>,

    /// Display unit
    #[arg(long, default_value = "")]
    unit: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Minimum,
    Maximum,
    Target,
    Range,
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// JSON array of observations
    Json,
    /// Newline-delimited JSON (one observation per line)
    Ndjson,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
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

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), StreakCliError> {
    match cli.command {
        Commands::Analyze {
            input,
            output,
            input_format,
            output_format,
            goal,
            label,
            config,
        } => cmd_analyze(
            &input,
            &output,
            input_format,
            output_format,
            &goal,
            label.as_deref(),
            config.as_deref(),
        ),

        Commands::Validate {
            input,
            input_format,
            goal_file,
            json,
        } => cmd_validate(&input, input_format, goal_file.as_deref(), json),

        Commands::Config { config } => cmd_config(config.as_deref()),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),
    }
}

fn cmd_analyze(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    goal_args: &GoalArgs,
    label: Option<&str>,
    config: Option<&Path>,
) -> Result<(), StreakCliError> {
    let observations = read_observations(input, &input_format)?;
    let goal = goal_args.resolve()?;

    let processor = match config {
        Some(path) => StreakProcessor::from_config_json(&fs::read_to_string(path)?)?,
        None => StreakProcessor::new(),
    };

    tracing::info!(observations = observations.len(), kind = goal.kind.as_str(), "analyzing series");
    let report = processor.analyze(&observations, &goal, label)?;
    let output_data = format_output(&report, &output_format)?;

    if output.to_string_lossy() == "-" {
        println!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_validate(
    input: &Path,
    input_format: InputFormat,
    goal_file: Option<&Path>,
    json: bool,
) -> Result<(), StreakCliError> {
    let observations = read_observations(input, &input_format)?;
    let results = ObservationAdapter::validate_observations(&observations);

    let goal_error = match goal_file {
        Some(path) => {
            let goal: GoalDefinition = serde_json::from_str(&fs::read_to_string(path)?)?;
            validate_goal(&goal).err().map(|e| e.to_string())
        }
        None => None,
    };

    let report = ValidationReport {
        total_observations: observations.len(),
        valid_observations: observations.len() - results.len(),
        invalid_observations: results.len(),
        goal_error,
        errors: results
            .iter()
            .map(|r| ValidationErrorDetail {
                index: r.index,
                date: r.date.to_string(),
                error: r.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total observations:   {}", report.total_observations);
        println!("Valid observations:   {}", report.valid_observations);
        println!("Invalid observations: {}", report.invalid_observations);

        if let Some(err) = &report.goal_error {
            println!("\nGoal: {}", err);
        }

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - {} (index {}): {}", err.date, err.index, err.error);
            }
        }
    }

    if report.invalid_observations > 0 || report.goal_error.is_some() {
        Err(StreakCliError::ValidationFailed(
            report.invalid_observations + usize::from(report.goal_error.is_some()),
        ))
    } else {
        Ok(())
    }
}

fn cmd_config(config: Option<&Path>) -> Result<(), StreakCliError> {
    let config = match config {
        Some(path) => EngineConfig::from_json(&fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };
    println!("{}", config.to_json()?);
    Ok(())
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), StreakCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "streak_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Streak version {}", STREAK_VERSION),
    });

    if let Some(config_path) = config {
        let check = if !config_path.exists() {
            DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Config file does not exist".to_string(),
            }
        } else {
            match fs::read_to_string(config_path) {
                Ok(content) => match EngineConfig::from_json(&content) {
                    Ok(config) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Ok,
                        message: format!(
                            "Config valid ({} milestone checkpoints, trend bonus {})",
                            config.milestone_checkpoints.len(),
                            config.prediction.trend_bonus
                        ),
                    },
                    Err(e) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Error,
                        message: format!("Invalid config: {}", e),
                    },
                },
                Err(e) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Cannot read config file: {}", e),
                },
            }
        };
        checks.push(check);
    }

    let stdin_message = if atty::is(atty::Stream::Stdin) {
        "stdin is a TTY (interactive mode)"
    } else {
        "stdin is a pipe (ready for '-i -')"
    };
    checks.push(DoctorCheck {
        name: "stdin".to_string(),
        status: CheckStatus::Ok,
        message: stdin_message.to_string(),
    });

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: STREAK_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Streak Doctor Report");
        println!("====================");
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
        Err(StreakCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

impl GoalArgs {
    fn resolve(&self) -> Result<GoalDefinition, StreakCliError> {
        if let Some(path) = &self.goal_file {
            return Ok(serde_json::from_str(&fs::read_to_string(path)?)?);
        }

        let kind = self.kind.ok_or(StreakCliError::MissingGoal)?;
        let (kind, threshold) = match kind {
            KindArg::Range => {
                let (Some(low), Some(high)) = (self.low, self.high) else {
                    return Err(StreakCliError::MissingGoal);
                };
                (GoalKind::Range, Threshold::Range { low, high })
            }
            other => {
                let threshold = self.threshold.ok_or(StreakCliError::MissingGoal)?;
                let kind = match other {
                    KindArg::Minimum => GoalKind::Minimum,
                    KindArg::Maximum => GoalKind::Maximum,
                    _ => GoalKind::Target,
                };
                (kind, Threshold::Scalar(threshold))
            }
        };

        Ok(GoalDefinition {
            kind,
            threshold,
            unit: self.unit.clone(),
        })
    }
}

fn read_observations(
    input: &Path,
    input_format: &InputFormat,
) -> Result<Vec<Observation>, StreakCliError> {
    let input_data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let observations = match input_format {
        InputFormat::Json => ObservationAdapter::parse_array(&input_data)?,
        InputFormat::Ndjson => ObservationAdapter::parse_ndjson(&input_data)?,
    };
    Ok(observations)
}

fn format_output(report: &StreakReport, format: &OutputFormat) -> Result<String, StreakCliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(report)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(report)?),
    }
}

// Error types

#[derive(Debug)]
enum StreakCliError {
    Io(io::Error),
    Engine(StreakError),
    Json(serde_json::Error),
    MissingGoal,
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for StreakCliError {
    fn from(e: io::Error) -> Self {
        StreakCliError::Io(e)
    }
}

impl From<StreakError> for StreakCliError {
    fn from(e: StreakError) -> Self {
        StreakCliError::Engine(e)
    }
}

impl From<serde_json::Error> for StreakCliError {
    fn from(e: serde_json::Error) -> Self {
        StreakCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<StreakCliError> for CliError {
    fn from(e: StreakCliError) -> Self {
        match e {
            StreakCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            StreakCliError::Engine(e) if e.is_invalid_argument() => CliError {
                code: "INVALID_ARGUMENT".to_string(),
                message: e.to_string(),
                hint: Some("Run 'streak validate' for details".to_string()),
            },
            StreakCliError::Engine(StreakError::ConfigError(msg)) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: msg,
                hint: Some("Run 'streak config' to see a valid configuration".to_string()),
            },
            StreakCliError::Engine(e) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Observations must be {date, value, source?} records".to_string()),
            },
            StreakCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            StreakCliError::MissingGoal => CliError {
                code: "MISSING_GOAL".to_string(),
                message: "No complete goal definition given".to_string(),
                hint: Some(
                    "Pass --goal-file, or --kind with --threshold (or --low/--high for range)"
                        .to_string(),
                ),
            },
            StreakCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} inputs failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            StreakCliError::DoctorFailed => CliError {
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
    total_observations: usize,
    valid_observations: usize,
    invalid_observations: usize,
    goal_error: Option<String>,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    date: String,
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
