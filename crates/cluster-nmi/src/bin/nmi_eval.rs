//! NMI Evaluation CLI
//!
//! Scores every model of one clustering technique against item categories and
//! prints `<model>,<score>` per model.
//!
//! # Usage
//!
//! ```bash
//! # Score all k-means models in ./output
//! cargo run -p cluster-nmi --bin nmi-eval -- kmeans data/items.jsonl data/vectors.jsonl
//!
//! # Shannon entropies, observation-count normalization, JSON report
//! cargo run -p cluster-nmi --bin nmi-eval -- kmeans data/items.jsonl data/vectors.jsonl \
//!     --entropy shannon --normalization observation_count --format json --output nmi.json
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cluster_nmi::config::{EntropyFormula, EvalConfig, Normalization};
use cluster_nmi::reports::{self, JsonReport, ReportFormat};
use cluster_nmi::sources::{
    DirectoryModelRepository, ItemSource, JsonlItemSource, JsonlVectorSource, VectorSource,
};
use cluster_nmi::BatchDriver;

/// NMI Evaluation CLI
#[derive(Parser, Debug)]
#[command(name = "nmi-eval")]
#[command(about = "Rank clustering models by normalized mutual information against item categories")]
struct Args {
    /// Clustering technique; selects models whose name starts with it
    technique: String,

    /// Item records with categories (JSON Lines)
    dataset: PathBuf,

    /// Feature vectors aligned with the dataset (JSON Lines)
    vectors: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding model artifacts
    #[arg(short, long)]
    models_dir: Option<PathBuf>,

    /// Model artifact suffix
    #[arg(long)]
    suffix: Option<String>,

    /// Probability denominator: item_count, observation_count
    #[arg(short, long)]
    normalization: Option<Normalization>,

    /// Marginal entropy formula: literal, shannon
    #[arg(short, long)]
    entropy: Option<EntropyFormula>,

    /// Verify item and vector identifiers match position by position
    #[arg(long)]
    strict_alignment: bool,

    /// Score models concurrently
    #[arg(long)]
    parallel_models: bool,

    /// Output format: csv, json
    #[arg(short, long, default_value = "csv")]
    format: ReportFormat,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout carries only report lines.
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let config = build_config(&args)?;
    tracing::info!("Configuration: {:?}", config);

    let items = JsonlItemSource::new(&args.dataset)
        .load_items()
        .context("failed to load dataset")?;
    let vectors = JsonlVectorSource::new(&args.vectors)
        .load_vectors()
        .context("failed to load vectors")?;

    let repository = DirectoryModelRepository::open(&config.models_dir, &config.model_suffix)?;
    let driver = BatchDriver::new(repository, config.settings);
    let report = driver.run(&args.technique, &items, &vectors)?;

    for (model, reason) in report.failed() {
        tracing::warn!("Model {} was not scored: {}", model, reason);
    }

    let output = match args.format {
        ReportFormat::Csv => {
            let mut buf = Vec::new();
            reports::write_csv(&report, &mut buf)?;
            String::from_utf8(buf)?
        }
        ReportFormat::Json => JsonReport::from_batch(&report).to_json_string()?,
    };

    if let Some(path) = args.output {
        let mut file = fs::File::create(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        file.write_all(output.as_bytes())?;
        tracing::info!("Results written to {}", path.display());
    } else {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        lock.write_all(output.as_bytes())?;
        lock.flush()?;
    }

    if let Some((model, score)) = report.best() {
        tracing::info!("Best model: {} ({})", model, reports::format_score(score));
    }

    Ok(())
}

/// Layer command-line overrides on top of the file and environment configuration.
fn build_config(args: &Args) -> anyhow::Result<EvalConfig> {
    let mut config = EvalConfig::load(args.config.as_deref())?;

    if let Some(dir) = &args.models_dir {
        config.models_dir = dir.clone();
    }
    if let Some(suffix) = &args.suffix {
        config.model_suffix = suffix.clone();
    }
    if let Some(normalization) = args.normalization {
        config.settings.normalization = normalization;
    }
    if let Some(entropy) = args.entropy {
        config.settings.entropy = entropy;
    }
    if args.strict_alignment {
        config.settings.strict_alignment = true;
    }
    if args.parallel_models {
        config.settings.parallel_models = true;
    }

    config.validate()?;
    Ok(config)
}
