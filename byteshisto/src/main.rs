use std::io::{BufWriter, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use repkey_analysis::{Alphabet, FrequencyVector};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the byte histogram.
#[derive(Parser, Debug)]
#[command(about = "Count byte values; the output can be loaded back as a reference corpus")]
struct Cli {
    /// Input file, stdin when absent
    #[arg(short = 'r', long)]
    file: Option<PathBuf>,

    /// Also list values that never occur
    #[arg(short, long)]
    all: bool,

    /// Debug diagnostics on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli: Cli = Cli::parse();
    init_tracing(cli.verbose);

    let bytes: Vec<u8> = match &cli.file {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("Failed to read input file {}", path.display()))?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .lock()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    let histogram = FrequencyVector::build(&bytes, Alphabet::default())?;
    tracing::debug!("Sum of squares {}", histogram.sum_of_squares());

    let mut out = BufWriter::new(std::io::stdout().lock());
    writeln!(out, "# Total bytes: {}", histogram.total())?;
    if histogram.total() > 0 {
        for (value, &count) in histogram.counts().iter().enumerate() {
            if count == 0 && !cli.all {
                continue;
            }
            writeln!(out, "{}\t{}\t{:.6}", value, count, histogram.proportion(value)?)?;
        }
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
