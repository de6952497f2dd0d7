//! Insights CLI - Command-line interface for Healthlog Insights
//!
//! Commands:
//! - generate: Produce an insight report from an input bundle
//! - validate: Check an input bundle and summarise its contents
//! - rules: Print the rule catalogue
//! - doctor: Diagnose configuration and environment

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use healthlog_insights::analyzers::RULES;
use healthlog_insights::types::parse_flexible_datetime;
use healthlog_insights::{
    InsightConfig, InsightError, InsightInput, InsightReport, InsightsEngine, ENGINE_VERSION,
    PRODUCER_NAME,
};

/// Insights - Rule-based insights for personal health logs
#[derive(Parser)]
#[command(name = "insights")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Turn health log data into ranked insights", long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an insight report from an input bundle
    Generate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Reference time (YYYY-MM-DD or RFC 3339); defaults to the bundle's as_of, then now
        #[arg(long)]
        as_of: Option<String>,

        /// Configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the recent window in days
        #[arg(long)]
        recent_days: Option<i64>,

        /// Override the baseline window in days
        #[arg(long)]
        baseline_days: Option<i64>,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        format: OutputFormat,
    },

    /// Validate an input bundle
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the rule catalogue
    Rules {
        /// Output as JSON
        #[arg(long)]
        json: bool,
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
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
    /// Human-readable summary
    Text,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (warn)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();

    match run(cli.command) {
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

fn run(command: Commands) -> Result<(), InsightsCliError> {
    match command {
        Commands::Generate {
            input,
            output,
            as_of,
            config,
            recent_days,
            baseline_days,
            format,
        } => cmd_generate(
            &input,
            &output,
            as_of.as_deref(),
            config.as_deref(),
            recent_days,
            baseline_days,
            format,
        ),

        Commands::Validate { input, json } => cmd_validate(&input, json),

        Commands::Rules { json } => cmd_rules(json),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),
    }
}

fn cmd_generate(
    input: &Path,
    output: &Path,
    as_of: Option<&str>,
    config: Option<&Path>,
    recent_days: Option<i64>,
    baseline_days: Option<i64>,
    format: OutputFormat,
) -> Result<(), InsightsCliError> {
    let bundle = read_bundle(input)?;

    let mut config = match config {
        Some(path) => InsightConfig::from_json(&fs::read_to_string(path)?)?,
        None => InsightConfig::default(),
    };
    if let Some(days) = recent_days {
        config.windows.recent_days = days;
    }
    if let Some(days) = baseline_days {
        config.windows.baseline_days = days;
    }

    let engine = InsightsEngine::with_config(config)?;

    let as_of: DateTime<Utc> = match as_of {
        Some(s) => parse_flexible_datetime(s)?,
        None => bundle.as_of.unwrap_or_else(Utc::now),
    };
    info!(records = bundle.record_count(), as_of = %as_of, "generating insights");

    let report = engine.generate_from_input(&bundle, as_of);

    let rendered = match format {
        OutputFormat::Json => report.to_json()?,
        OutputFormat::JsonPretty => report.to_json_pretty()?,
        OutputFormat::Text => format_text(&report),
    };

    write_output(output, &rendered)
}

fn cmd_validate(input: &Path, json: bool) -> Result<(), InsightsCliError> {
    let bundle = read_bundle(input)?;
    let problems = check_ranges(&bundle);

    let latest = latest_timestamp(&bundle);
    let earliest = bundle.earliest_timestamp();
    let span_days = match (earliest, latest) {
        (Some(first), Some(last)) => (last - first).num_days(),
        _ => 0,
    };

    let report = ValidationReport {
        total_records: bundle.record_count(),
        health_metrics: bundle.health_metrics.len(),
        workouts: bundle.workouts.len(),
        hydration: bundle.hydration.len(),
        moods: bundle.moods.len(),
        food: bundle.food.len(),
        period_cycles: bundle.period_cycles.as_ref().map(Vec::len),
        earliest,
        latest,
        span_days,
        problems,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total records:  {}", report.total_records);
        println!("Health metrics: {}", report.health_metrics);
        println!("Workouts:       {}", report.workouts);
        println!("Hydration:      {}", report.hydration);
        println!("Moods:          {}", report.moods);
        println!("Food:           {}", report.food);
        match report.period_cycles {
            Some(n) => println!("Period cycles:  {}", n),
            None => println!("Period cycles:  (not tracked)"),
        }
        if let (Some(first), Some(last)) = (report.earliest, report.latest) {
            println!(
                "Data span:      {} to {} ({} days)",
                first.format("%Y-%m-%d"),
                last.format("%Y-%m-%d"),
                report.span_days
            );
        }

        if !report.problems.is_empty() {
            println!("\nProblems:");
            for problem in &report.problems {
                println!("  - {}", problem);
            }
        }
    }

    if report.problems.is_empty() {
        Ok(())
    } else {
        Err(InsightsCliError::ValidationFailed(report.problems.len()))
    }
}

fn cmd_rules(json: bool) -> Result<(), InsightsCliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(RULES)?);
        return Ok(());
    }

    println!("{:<30} {:<10} {:<13} TITLE", "KEY", "SEVERITY", "CATEGORY");
    for rule in RULES {
        println!(
            "{:<30} {:<10} {:<13} {}",
            rule.key,
            rule.severity.as_str(),
            rule.category.as_str(),
            rule.title
        );
    }
    Ok(())
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), InsightsCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "engine_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Healthlog Insights version {}", ENGINE_VERSION),
    });

    checks.push(DoctorCheck {
        name: "rules".to_string(),
        status: CheckStatus::Ok,
        message: format!("{} rules loaded", RULES.len()),
    });

    if let Some(path) = config {
        let check = if !path.exists() {
            DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Config file does not exist".to_string(),
            }
        } else {
            match fs::read_to_string(path) {
                Ok(content) => match InsightConfig::from_json(&content) {
                    Ok(config) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Ok,
                        message: format!(
                            "Config valid (recent {} days, baseline {} days)",
                            config.windows.recent_days, config.windows.baseline_days
                        ),
                    },
                    Err(e) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Error,
                        message: e.to_string(),
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

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (pass --input <file>)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (--input - ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Insights Doctor Report");
        println!("======================");
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
        Err(InsightsCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn read_bundle(input: &Path) -> Result<InsightInput, InsightsCliError> {
    let data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let bundle = InsightInput::from_json(&data)?;
    debug!(records = bundle.record_count(), "input bundle decoded");
    Ok(bundle)
}

fn write_output(output: &Path, rendered: &str) -> Result<(), InsightsCliError> {
    if output.to_string_lossy() == "-" {
        println!("{}", rendered);
    } else {
        fs::write(output, rendered)?;
    }
    Ok(())
}

fn format_text(report: &InsightReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Insight Report ({} days of data, generated {})\n",
        report.days_of_data,
        report.generated_at.to_rfc3339()
    ));

    if report.is_empty() {
        out.push_str("\nNo insights. Everything looks on track.\n");
    }

    for insight in &report.insights {
        out.push_str(&format!(
            "\n[{}] {} ({})\n",
            insight.severity.as_str().to_uppercase(),
            insight.title,
            insight.category.as_str()
        ));
        if !insight.explanation.is_empty() {
            out.push_str(&format!("  {}\n", insight.explanation));
        }
        for factor in &insight.factors {
            out.push_str(&format!("  * {}\n", factor));
        }
        for rec in &insight.recommendations {
            out.push_str(&format!("  -> {}\n", rec));
        }
    }

    if !report.trends.is_empty() {
        out.push_str("\nTrends:\n");
        for trend in &report.trends {
            out.push_str(&format!(
                "  {:<18} {:>8.2} vs {:>8.2} ({:+.1}%, {})\n",
                trend.metric,
                trend.current_average,
                trend.baseline_average,
                trend.percent_change,
                trend.direction.as_str()
            ));
        }
    }

    out
}

fn latest_timestamp(bundle: &InsightInput) -> Option<DateTime<Utc>> {
    let cycles = bundle.period_cycles.as_deref().unwrap_or_default();

    bundle
        .health_metrics
        .iter()
        .map(|m| m.date)
        .chain(bundle.workouts.iter().map(|w| w.date))
        .chain(bundle.hydration.iter().map(|h| h.timestamp))
        .chain(bundle.moods.iter().map(|m| m.timestamp))
        .chain(bundle.food.iter().map(|f| f.timestamp))
        .chain(cycles.iter().map(|c| c.start_date))
        .max()
}

/// Values outside their documented ranges
fn check_ranges(bundle: &InsightInput) -> Vec<String> {
    let in_scale = |v: u8| (1..=10).contains(&v);
    let mut problems = Vec::new();

    for (i, m) in bundle.health_metrics.iter().enumerate() {
        if let Some(s) = m.stress_level.filter(|&s| !in_scale(s)) {
            problems.push(format!("health_metrics[{i}]: stress_level {s} outside 1-10"));
        }
        if let Some(e) = m.energy_level.filter(|&e| !in_scale(e)) {
            problems.push(format!("health_metrics[{i}]: energy_level {e} outside 1-10"));
        }
        if let Some(h) = m.sleep_hours.filter(|&h| !(0.0..=24.0).contains(&h)) {
            problems.push(format!("health_metrics[{i}]: sleep_hours {h} outside 0-24"));
        }
        if let Some(w) = m.weight.filter(|&w| w <= 0.0) {
            problems.push(format!("health_metrics[{i}]: weight {w} is not positive"));
        }
        for (name, &sev) in &m.symptom_severity {
            if sev > 10 {
                problems.push(format!(
                    "health_metrics[{i}]: symptom '{name}' severity {sev} above 10"
                ));
            }
        }
    }
    for (i, m) in bundle.moods.iter().enumerate() {
        if !in_scale(m.intensity) {
            problems.push(format!("moods[{i}]: intensity {} outside 1-10", m.intensity));
        }
    }
    for (i, h) in bundle.hydration.iter().enumerate() {
        if h.amount_ml < 0.0 {
            problems.push(format!("hydration[{i}]: amount_ml {} is negative", h.amount_ml));
        }
    }
    for (i, c) in bundle.period_cycles.iter().flatten().enumerate() {
        if c.end_date.is_some_and(|end| end < c.start_date) {
            problems.push(format!("period_cycles[{i}]: end_date before start_date"));
        }
    }

    problems
}

// Error types

#[derive(Debug)]
enum InsightsCliError {
    Io(io::Error),
    Insight(InsightError),
    Json(serde_json::Error),
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for InsightsCliError {
    fn from(e: io::Error) -> Self {
        InsightsCliError::Io(e)
    }
}

impl From<InsightError> for InsightsCliError {
    fn from(e: InsightError) -> Self {
        InsightsCliError::Insight(e)
    }
}

impl From<serde_json::Error> for InsightsCliError {
    fn from(e: serde_json::Error) -> Self {
        InsightsCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<InsightsCliError> for CliError {
    fn from(e: InsightsCliError) -> Self {
        match e {
            InsightsCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            InsightsCliError::Insight(e) => {
                let (code, hint) = match &e {
                    InsightError::JsonError(_) => {
                        ("PARSE_ERROR", "Run 'insights validate' on the input bundle")
                    }
                    InsightError::InvalidConfig(_) => {
                        ("CONFIG_ERROR", "Run 'insights doctor --config <file>'")
                    }
                    InsightError::DateParseError(_) => {
                        ("DATE_ERROR", "Use YYYY-MM-DD or an RFC 3339 timestamp")
                    }
                    InsightError::InvalidInput(_) => ("INPUT_ERROR", "Check input format"),
                    InsightError::EncodingError(_) => ("ENCODING_ERROR", "Retry with --format json"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            InsightsCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            InsightsCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} values out of range", count),
                hint: Some("Fix the listed records and retry".to_string()),
            },
            InsightsCliError::DoctorFailed => CliError {
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
    total_records: usize,
    health_metrics: usize,
    workouts: usize,
    hydration: usize,
    moods: usize,
    food: usize,
    period_cycles: Option<usize>,
    earliest: Option<DateTime<Utc>>,
    latest: Option<DateTime<Utc>>,
    span_days: i64,
    problems: Vec<String>,
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
