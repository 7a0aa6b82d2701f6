use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use repkey_analysis::{Alphabet, FrequencyVector, Metric};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for comparing two byte histograms.
#[derive(Parser, Debug)]
#[command(about = "Measure how alike the byte distributions of two files are")]
struct Cli {
    /// Observed file
    first: PathBuf,

    /// Reference file
    second: PathBuf,

    /// Similarity measure, lower is closer for both
    #[arg(short, long, value_enum, default_value_t = MetricArg::Angle)]
    metric: MetricArg,

    /// Debug diagnostics on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MetricArg {
    ChiSquared,
    Angle,
}

impl From<MetricArg> for Metric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::ChiSquared => Metric::ChiSquared,
            MetricArg::Angle => Metric::VectorAngle,
        }
    }
}

fn histogram(path: &Path) -> Result<FrequencyVector> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read input file {}", path.display()))?;
    Ok(FrequencyVector::build(&bytes, Alphabet::default())?)
}

fn main() -> Result<()> {
    let cli: Cli = Cli::parse();
    init_tracing(cli.verbose);

    let first = histogram(&cli.first)?;
    let second = histogram(&cli.second)?;
    tracing::debug!("{} and {} bytes", first.total(), second.total());

    let metric: Metric = cli.metric.into();
    let score = metric
        .score(&first, &second)
        .with_context(|| format!("Cannot compare {} with {}", cli.first.display(), cli.second.display()))?;

    println!("{:?}\t{:?}\t{:.6}", cli.first.display().to_string(), cli.second.display().to_string(), score);

    Ok(())
}

/// Diagnostics go to stderr so stdout stays machine-readable
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}
