use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use repkey_analysis::{find_repeats_with, LogMonitor};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the Kasiski examination.
#[derive(Parser, Debug)]
#[command(about = "Find repeated substrings and the distances between their recurrences")]
struct Cli {
    /// Path to the input file containing encrypted text
    #[arg(short = 'r', long, help = "Ciphertext file to examine")]
    file: PathBuf,

    /// Substring length
    #[arg(short = 'n', long, default_value_t = 4)]
    length: usize,

    /// Largest key length in the divisor tally on stderr
    #[arg(short = 'k', long, default_value_t = 20)]
    max_key: usize,

    /// Debug diagnostics on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli: Cli = Cli::parse();
    init_tracing(cli.verbose);

    let ciphertext: Vec<u8> = std::fs::read(&cli.file)
        .with_context(|| format!("Failed to read input file {}", cli.file.display()))?;
    tracing::info!("Read {} bytes, substring length {}", ciphertext.len(), cli.length);

    let report = find_repeats_with(&ciphertext, cli.length, &LogMonitor::new(10_000))?;

    let mut out = BufWriter::new(std::io::stdout().lock());
    for record in &report.records {
        let distances: Vec<String> = record.distances.iter().map(|d| d.to_string()).collect();
        writeln!(
            out,
            "{}:{}\t{}",
            record.start_offset,
            record.substring_length,
            distances.join(" ")
        )?;
    }
    out.flush()?;

    match report.distance_gcd() {
        Some(g) => tracing::info!("GCD of all distances: {}", g),
        None => tracing::info!("No repeated substrings of length {}", cli.length),
    }
    for (key_length, support) in report.length_tally(cli.max_key).iter().take(5) {
        tracing::info!("key length {} divides {} distances", key_length, support);
    }

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
