//! casebook-experiment - verdict reliability runner
//!
//! Asks every question of an experiment preset several times through the
//! clue pipeline and writes a CSV report of the answers.
//!
//! Usage:
//!   casebook-experiment --case case.toml --preset preset.toml [OPTIONS]
//!
//! Examples:
//!   casebook-experiment --case fire.toml --preset fire_preset.toml
//!   casebook-experiment --case fire.toml --preset fire_preset.toml --runs 10 --out report.csv

use case_rules::{CaseFile, Verdict};
use clap::Parser;
use deduction_core::{
    EvaluationPipeline, EvidenceIndex, ExperimentPreset, ExperimentRunner, GatewayConfig,
    HttpGateway, Result,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// casebook-experiment command-line arguments
#[derive(Parser)]
#[command(name = "casebook-experiment")]
#[command(about = "Measure how reliably the model reproduces expected verdicts")]
#[command(version)]
struct Args {
    /// Case file with the story truth and clues
    #[arg(long)]
    case: PathBuf,

    /// Experiment preset listing questions and expected verdicts
    #[arg(long)]
    preset: PathBuf,

    /// Gateway configuration (defaults apply when omitted)
    #[arg(long)]
    gateway: Option<PathBuf>,

    /// How many times each question is asked
    #[arg(short, long, default_value = "5")]
    runs: usize,

    /// Where the CSV report is written
    #[arg(short, long, default_value = "experiment_results.csv")]
    out: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("deduction_core={}", args.log_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let case = CaseFile::load(&args.case)?;
    let preset = ExperimentPreset::load(&args.preset)?;
    let config = match &args.gateway {
        Some(path) => GatewayConfig::load(path)?,
        None => GatewayConfig::default(),
    };

    info!(
        "Running {} case(s) x {} run(s) against model '{}'",
        preset.cases.len(),
        args.runs,
        config.model
    );

    let gateway = Arc::new(HttpGateway::new(config)?);
    let pipeline = EvaluationPipeline::new(gateway, Arc::new(RwLock::new(EvidenceIndex::new())));
    let report = ExperimentRunner::new(&pipeline)
        .run(&case, &preset, args.runs)
        .await;

    report.write_csv(&args.out)?;

    println!("Verdict              strict    loose");
    for verdict in Verdict::MODEL_EMITTABLE {
        let (Some(strict), Some(loose)) = (
            report.strict_accuracy(verdict),
            report.loose_accuracy(verdict),
        ) else {
            continue;
        };
        println!(
            "{:<20} {:>6.1}%  {:>6.1}%",
            verdict.label(),
            strict * 100.0,
            loose * 100.0
        );
    }
    println!("Report written to {}", args.out.display());

    Ok(())
}
