// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use clap::{ArgAction, Parser, ValueEnum};
use plateau_batch::{BatchConfig, DEFAULT_WINDOW_SIZE, OutlierSelection};
use plateau_cli::{CliError, process_file};
use plateau_core::{Constraints, DEFAULT_MIN_SEGMENT_LEN, Penalty, PlateauError};
use plateau_offline::PeltConfig;
use serde::Serialize;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PenaltyArg {
    /// Modified BIC, charging ln(segment length) per segment
    Mbic,
    Bic,
    Aic,
    HannanQuinn,
    /// --penalty-value times ln(n)
    Log,
    /// Fixed --penalty-value
    Manual,
}

#[derive(Parser, Debug)]
#[command(name = "plateau")]
#[command(version)]
#[command(
    about = "Mark changepoints and classify process executions in Krun results files",
    long_about = None
)]
struct Cli {
    /// One or more Krun results files (.json or .json.bz2)
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Trailing samples in which a changepoint means "no steady state"
    #[arg(short = 'w', long = "window", default_value_t = DEFAULT_WINDOW_SIZE)]
    window: usize,

    /// Outlier mapping to exclude before detection: all, common, unique or none
    #[arg(long, default_value_t = OutlierSelection::All)]
    outliers: OutlierSelection,

    #[arg(long, value_enum, default_value = "mbic")]
    penalty: PenaltyArg,

    /// Beta for --penalty manual, multiplier of ln(n) for --penalty log
    #[arg(long, value_name = "VALUE")]
    penalty_value: Option<f64>,

    #[arg(long, default_value_t = DEFAULT_MIN_SEGMENT_LEN)]
    min_segment_len: usize,

    /// Deadline for each execution's detection, in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Worker threads (default: one per core)
    #[arg(short = 'j', long = "jobs")]
    jobs: Option<usize>,

    /// Write outputs here instead of next to each input
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Serialize)]
struct ErrorEnvelope {
    error: ErrorPayload,
}

#[derive(Serialize)]
struct ErrorPayload {
    code: String,
    message: String,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Err(err) = run(cli) {
        emit_structured_error(&err);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = batch_config(&cli)?;
    for file in &cli.files {
        process_file(file, &config, cli.output_dir.as_deref())?;
    }
    Ok(())
}

fn resolve_penalty(penalty: PenaltyArg, value: Option<f64>) -> Result<Penalty, CliError> {
    match (penalty, value) {
        (PenaltyArg::Manual, Some(beta)) => Ok(Penalty::Manual(beta)),
        (PenaltyArg::Log, Some(k)) => Ok(Penalty::LogScaled(k)),
        (PenaltyArg::Manual | PenaltyArg::Log, None) => Err(CliError::invalid_input(format!(
            "--penalty {} requires --penalty-value",
            penalty_name(penalty)
        ))),
        (_, Some(_)) => Err(CliError::invalid_input(format!(
            "--penalty-value is only valid with --penalty manual or log, not {}",
            penalty_name(penalty)
        ))),
        (PenaltyArg::Mbic, None) => Ok(Penalty::Mbic),
        (PenaltyArg::Bic, None) => Ok(Penalty::Bic),
        (PenaltyArg::Aic, None) => Ok(Penalty::Aic),
        (PenaltyArg::HannanQuinn, None) => Ok(Penalty::HannanQuinn),
    }
}

fn penalty_name(penalty: PenaltyArg) -> &'static str {
    match penalty {
        PenaltyArg::Mbic => "mbic",
        PenaltyArg::Bic => "bic",
        PenaltyArg::Aic => "aic",
        PenaltyArg::HannanQuinn => "hannan-quinn",
        PenaltyArg::Log => "log",
        PenaltyArg::Manual => "manual",
    }
}

fn batch_config(cli: &Cli) -> Result<BatchConfig, CliError> {
    if cli.window == 0 {
        return Err(PlateauError::InvalidWindowSize(cli.window).into());
    }
    if cli.jobs == Some(0) {
        return Err(CliError::invalid_input("--jobs must be >= 1"));
    }

    let constraints = Constraints {
        min_segment_len: cli.min_segment_len,
        time_budget_ms: cli.timeout_ms,
    };
    constraints.validate()?;

    Ok(BatchConfig {
        window_size: cli.window,
        pelt: PeltConfig {
            penalty: resolve_penalty(cli.penalty, cli.penalty_value)?,
            ..PeltConfig::default()
        },
        constraints,
        outliers: cli.outliers,
        threads: cli.jobs,
        ..BatchConfig::default()
    })
}

fn emit_structured_error(err: &CliError) {
    let envelope = ErrorEnvelope {
        error: ErrorPayload {
            code: err.code().to_string(),
            message: err.to_string(),
        },
    };

    match serde_json::to_string_pretty(&envelope) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!(
            "{{\"error\":{{\"code\":\"{}\",\"message\":\"{}\"}}}}",
            err.code(),
            err
        ),
    }
}
