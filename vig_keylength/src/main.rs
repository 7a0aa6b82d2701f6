use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use repkey_analysis::{estimate_key_length, text_ic};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the key length estimator.
#[derive(Parser, Debug)]
#[command(about = "Estimate the key length of repeating-key ciphertext by index of coincidence")]
struct Cli {
    /// Path to the input file containing encrypted text
    #[arg(short = 'r', long, help = "Ciphertext file to examine")]
    file: PathBuf,

    /// Lowest key length to try
    #[arg(short = 'm', long, default_value_t = 1)]
    min: usize,

    /// Highest key length to try
    #[arg(short = 'M', long, default_value_t = 20)]
    max: usize,

    /// Print the IC of the whole file instead of the per-length table
    #[arg(short, long)]
    whole: bool,

    /// Debug diagnostics on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli: Cli = Cli::parse();
    init_tracing(cli.verbose);

    let ciphertext: Vec<u8> = std::fs::read(&cli.file)
        .with_context(|| format!("Failed to read input file {}", cli.file.display()))?;
    tracing::info!("Read {} bytes from {}", ciphertext.len(), cli.file.display());

    let mut out = BufWriter::new(std::io::stdout().lock());

    if cli.whole {
        let ic = text_ic(&ciphertext)?;
        tracing::info!("Alphabet of {} size", ic.alphabet_used);
        writeln!(out, "{:.6}\t{}\t{:.6}", ic.ic, ic.alphabet_used, ic.normalized)?;
        return Ok(out.flush()?);
    }

    let report = estimate_key_length(&ciphertext, cli.min..=cli.max)?;

    match report.best() {
        Some(best) => tracing::info!(
            "Best key length {} at average IC {:.6}",
            best.key_length,
            best.average_ic
        ),
        None => tracing::warn!("Text too short for any key length in {}..={}", cli.min, cli.max),
    }

    // Tab-separated for plotting: key length, average IC
    for score in &report.scores {
        writeln!(out, "{}\t{:.6}", score.key_length, score.average_ic)?;
    }
    out.flush()?;

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
