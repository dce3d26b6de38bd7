//! HabitGuard CLI - Command-line interface for the screen time analyzer
//!
//! Commands:
//! - analyze: Analyze a usage CSV export and write reports
//! - classify: Classify a per-category usage vector, optionally against the student policy
//! - train: Train the category model on synthetic data and save it
//! - demo: Analyze the built-in sample (or a generated one)
//! - sample: Write a generated usage CSV
//! - doctor: Diagnose configuration and model health

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use habitguard::category::{
    synthetic_training_set, CategoryClassifier, CategoryUsage, ClassificationResult,
    SoftmaxModel, TrainingParams,
};
use habitguard::config::{AnalyzerConfig, DEFAULT_SEED};
use habitguard::dataset::{Dataset, SAMPLE_CSV};
use habitguard::pipeline::UsageAnalyzer;
use habitguard::policy::{PolicyCheck, PolicyChecker};
use habitguard::report::{self, ReportFormat};
use habitguard::sample::{generate_sample_records, write_csv};
use habitguard::types::AnalysisResult;
use habitguard::{AnalysisError, HABITGUARD_VERSION, PRODUCER_NAME};

/// HabitGuard - Screen time analytics and coaching
#[derive(Parser)]
#[command(name = "habitguard")]
#[command(author = "HabitGuard Team")]
#[command(version = HABITGUARD_VERSION)]
#[command(about = "Analyze screen time exports and generate coaching recommendations", long_about = None)]
struct Cli {
    /// Analyzer configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a usage CSV export
    Analyze {
        /// Input CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Report formats (repeatable)
        #[arg(long, value_enum, default_value = "json")]
        format: Vec<FormatArg>,

        /// Output base name; each format appends its own suffix. Prints to stdout when absent.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// First forecast date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Classify a category usage vector (JSON with *_hours keys)
    Classify {
        /// Usage JSON file (use - for stdin)
        #[arg(long)]
        usage: PathBuf,

        /// Also check the student usage policy
        #[arg(long)]
        policy: bool,

        /// Model file, overrides the configured path
        #[arg(long)]
        model: Option<PathBuf>,
    },

    /// Train the category model on synthetic data
    Train {
        /// Number of synthetic samples
        #[arg(long, default_value = "2000")]
        samples: usize,

        /// Seed for the synthetic data
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,

        /// Gradient descent epochs
        #[arg(long, default_value = "400")]
        epochs: usize,

        /// Where to save the model, overrides the configured path
        #[arg(long)]
        model: Option<PathBuf>,
    },

    /// Analyze the built-in seven-day sample
    Demo {
        /// Generate this many days instead of using the built-in sample
        #[arg(long)]
        days: Option<usize>,

        /// Report format
        #[arg(long, value_enum, default_value = "text")]
        format: FormatArg,
    },

    /// Write a generated usage CSV
    Sample {
        /// Output CSV file (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Number of days
        #[arg(long, default_value = "30")]
        days: usize,

        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
    },

    /// Diagnose configuration and model health
    Doctor {
        /// Also try loading this usage CSV
        #[arg(long)]
        data: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// Pretty-printed JSON document
    Json,
    /// Plain text report
    Text,
    /// Paginated text document
    Paged,
}

impl From<FormatArg> for ReportFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Json => ReportFormat::Json,
            FormatArg::Text => ReportFormat::Text,
            FormatArg::Paged => ReportFormat::Paged,
        }
    }
}

fn main() -> ExitCode {
    init_tracing();
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

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), HabitGuardCliError> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze {
            input,
            format,
            output,
            today,
        } => cmd_analyze(&config, &input, &format, output.as_deref(), today),

        Commands::Classify {
            usage,
            policy,
            model,
        } => cmd_classify(&config, &usage, policy, model),

        Commands::Train {
            samples,
            seed,
            epochs,
            model,
        } => cmd_train(&config, samples, seed, epochs, model),

        Commands::Demo { days, format } => cmd_demo(&config, days, format),

        Commands::Sample { output, days, seed } => cmd_sample(&output, days, seed),

        Commands::Doctor { data, json } => {
            cmd_doctor(&config, cli.config.as_deref(), data.as_deref(), json)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<AnalyzerConfig, HabitGuardCliError> {
    match path {
        Some(path) => {
            let config = AnalyzerConfig::load(path)?;
            info!(path = %path.display(), "Configuration loaded");
            Ok(config)
        }
        None => Ok(AnalyzerConfig::default()),
    }
}

fn cmd_analyze(
    config: &AnalyzerConfig,
    input: &Path,
    formats: &[FormatArg],
    output: Option<&Path>,
    today: Option<NaiveDate>,
) -> Result<(), HabitGuardCliError> {
    let dataset = Dataset::from_path(input)?;
    let analyzer = UsageAnalyzer::new(config.clone());
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let result = analyzer.analyze_at(&dataset, today)?;

    emit_reports(config, &result, formats, output)
}

fn emit_reports(
    config: &AnalyzerConfig,
    result: &AnalysisResult,
    formats: &[FormatArg],
    output: Option<&Path>,
) -> Result<(), HabitGuardCliError> {
    for &format in formats {
        let format = ReportFormat::from(format);
        if format == ReportFormat::Paged && !config.capabilities.paged_report {
            warn!("Paged reports are disabled in the configuration, skipping");
            continue;
        }

        match output {
            Some(base) => {
                let path = report::save_report(result, format, config.page_lines, base)?;
                eprintln!("Report saved to {}", path.display());
            }
            None => {
                let stdout = io::stdout();
                report::write_report(result, format, config.page_lines, stdout.lock())?;
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct ClassifyOutput {
    classification: ClassificationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    policy: Option<PolicyCheck>,
}

fn cmd_classify(
    config: &AnalyzerConfig,
    usage_path: &Path,
    policy: bool,
    model: Option<PathBuf>,
) -> Result<(), HabitGuardCliError> {
    let json = if usage_path.as_os_str() == "-" {
        io::read_to_string(io::stdin())?
    } else {
        fs::read_to_string(usage_path)?
    };
    let usage = CategoryUsage::from_json(&json)?;

    let config = match model {
        Some(path) => config.clone().with_model_path(path),
        None => config.clone(),
    };
    let classifier = CategoryClassifier::from_config(&config);

    let output = ClassifyOutput {
        classification: classifier.predict(&usage),
        policy: policy.then(|| PolicyChecker::check(&usage, true)),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn cmd_train(
    config: &AnalyzerConfig,
    samples: usize,
    seed: u64,
    epochs: usize,
    model: Option<PathBuf>,
) -> Result<(), HabitGuardCliError> {
    if samples == 0 {
        return Err(HabitGuardCliError::InvalidArgument(
            "--samples must be greater than zero".to_string(),
        ));
    }

    let path = model.unwrap_or_else(|| config.model_path.clone());
    let classifier = CategoryClassifier::new(&path, true);

    let (x, y) = synthetic_training_set(samples, seed);
    let params = TrainingParams {
        epochs,
        ..TrainingParams::default()
    };
    let report = classifier.train(&x, &y, params)?;
    classifier.save(&path)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    eprintln!("Model saved to {}", path.display());
    Ok(())
}

fn cmd_demo(
    config: &AnalyzerConfig,
    days: Option<usize>,
    format: FormatArg,
) -> Result<(), HabitGuardCliError> {
    let today = Local::now().date_naive();
    let dataset = match days {
        Some(0) => {
            return Err(HabitGuardCliError::InvalidArgument(
                "--days must be greater than zero".to_string(),
            ))
        }
        Some(days) => {
            Dataset::from_records(generate_sample_records(days, today, config.forecast.seed))
        }
        None => Dataset::from_csv_str(SAMPLE_CSV)?,
    };

    let result = UsageAnalyzer::new(config.clone()).analyze_at(&dataset, today)?;
    emit_reports(config, &result, &[format], None)
}

fn cmd_sample(output: &Path, days: usize, seed: u64) -> Result<(), HabitGuardCliError> {
    let records = generate_sample_records(days, Local::now().date_naive(), seed);

    if output.as_os_str() == "-" {
        write_csv(&records, io::stdout().lock())?;
    } else {
        write_csv(&records, fs::File::create(output)?)?;
        eprintln!("Wrote {} days to {}", records.len(), output.display());
    }
    Ok(())
}

fn cmd_doctor(
    config: &AnalyzerConfig,
    config_path: Option<&Path>,
    data: Option<&Path>,
    json: bool,
) -> Result<(), HabitGuardCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck::ok(
        "version",
        format!("HabitGuard version {}", HABITGUARD_VERSION),
    ));

    checks.push(match config_path {
        Some(path) => DoctorCheck::ok("config", format!("Loaded {}", path.display())),
        None => DoctorCheck::ok("config", "Using built-in defaults".to_string()),
    });

    let caps = &config.capabilities;
    checks.push(DoctorCheck::ok(
        "capabilities",
        format!(
            "trend_fitting={} forecaster={} category_model={} paged_report={}",
            caps.trend_fitting, caps.forecaster, caps.category_model, caps.paged_report
        ),
    ));

    if caps.category_model {
        checks.push(match SoftmaxModel::load(&config.model_path) {
            Ok(Some(_)) => DoctorCheck::ok(
                "category_model",
                format!("Model {} is valid", config.model_path.display()),
            ),
            Ok(None) => DoctorCheck::warning(
                "category_model",
                format!(
                    "Model {} not found, the baseline rule will be used",
                    config.model_path.display()
                ),
            ),
            Err(e) => DoctorCheck::error(
                "category_model",
                format!("Cannot load {}: {}", config.model_path.display(), e),
            ),
        });
    }

    if let Some(path) = data {
        checks.push(match Dataset::from_path(path) {
            Ok(dataset) => {
                let stats = dataset.stats();
                DoctorCheck::ok(
                    "data",
                    format!(
                        "{} usable days ({} invalid, {} duplicate rows)",
                        dataset.len(),
                        stats.invalid_rows,
                        stats.duplicate_rows
                    ),
                )
            }
            Err(e) => DoctorCheck::error("data", format!("Cannot load {}: {}", path.display(), e)),
        });
    }

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: HABITGUARD_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let mut out = io::stdout().lock();
        writeln!(out, "HabitGuard Doctor Report")?;
        writeln!(out, "========================")?;
        writeln!(out, "Producer: {}", report.producer)?;
        writeln!(out, "Version:  {}", report.version)?;
        writeln!(out, "\nChecks:")?;

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            writeln!(out, "  {} {}: {}", status_icon, check.name, check.message)?;
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(HabitGuardCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Error types

#[derive(Debug)]
enum HabitGuardCliError {
    Io(io::Error),
    Analysis(AnalysisError),
    Json(serde_json::Error),
    InvalidArgument(String),
    DoctorFailed,
}

impl From<io::Error> for HabitGuardCliError {
    fn from(e: io::Error) -> Self {
        HabitGuardCliError::Io(e)
    }
}

impl From<AnalysisError> for HabitGuardCliError {
    fn from(e: AnalysisError) -> Self {
        HabitGuardCliError::Analysis(e)
    }
}

impl From<serde_json::Error> for HabitGuardCliError {
    fn from(e: serde_json::Error) -> Self {
        HabitGuardCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(code: &str, message: String, hint: &str) -> Self {
        Self {
            code: code.to_string(),
            message,
            hint: Some(hint.to_string()),
        }
    }
}

impl From<HabitGuardCliError> for CliError {
    fn from(e: HabitGuardCliError) -> Self {
        match e {
            HabitGuardCliError::Io(e) => {
                CliError::new("IO_ERROR", e.to_string(), "Check file paths and permissions")
            }
            HabitGuardCliError::Json(e) => CliError::new(
                "JSON_ERROR",
                e.to_string(),
                "Usage files are JSON objects with keys such as social_media_hours",
            ),
            HabitGuardCliError::InvalidArgument(msg) => {
                CliError::new("INVALID_ARGUMENT", msg, "Run with --help for usage")
            }
            HabitGuardCliError::DoctorFailed => CliError::new(
                "DOCTOR_FAILED",
                "One or more health checks failed".to_string(),
                "Review the doctor report for details",
            ),
            HabitGuardCliError::Analysis(e) => analysis_error(e),
        }
    }
}

fn analysis_error(e: AnalysisError) -> CliError {
    let message = e.to_string();
    match e {
        AnalysisError::Io(_) => {
            CliError::new("IO_ERROR", message, "Check file paths and permissions")
        }
        AnalysisError::Csv(_) => CliError::new("CSV_ERROR", message, "Check the CSV syntax"),
        AnalysisError::MissingColumns(_) => CliError::new(
            "MISSING_COLUMNS",
            message,
            "Required columns: date, totalScreenTime, appCount, dayOfWeek, isWeekend",
        ),
        AnalysisError::EmptyDataset => CliError::new(
            "EMPTY_DATASET",
            message,
            "Ensure the export contains rows with numeric screen time and app counts",
        ),
        AnalysisError::Config(_) => CliError::new(
            "CONFIG_ERROR",
            message,
            "Check the TOML syntax and key names of the config file",
        ),
        AnalysisError::JsonError(_) => CliError::new("JSON_ERROR", message, "Check JSON syntax"),
        AnalysisError::InvalidUsage(_) => CliError::new(
            "INVALID_USAGE",
            message,
            "Category hours must be non-negative numbers",
        ),
        AnalysisError::InvalidTrainingData(_) => CliError::new(
            "TRAINING_ERROR",
            message,
            "Samples need 10 category hours and labels 0-2",
        ),
        AnalysisError::ModelError(_) => CliError::new(
            "MODEL_ERROR",
            message,
            "Retrain with 'habitguard train' to replace the model file",
        ),
        AnalysisError::InsufficientData { .. } | AnalysisError::ForecasterUnavailable => {
            CliError::new("ANALYSIS_ERROR", message, "Provide more days of usage data")
        }
    }
}

// Report types

#[derive(Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(Serialize)]
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

    fn warning(name: &str, message: String) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
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

#[derive(Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
