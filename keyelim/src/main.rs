use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use repkey_analysis::utils::format_slash_list;
use repkey_analysis::{Alphabet, Combiner, KeyElimination};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the key elimination attack.
#[derive(Parser, Debug)]
#[command(about = "Locate a known plaintext fragment in repeating-key ciphertext and recover the key")]
struct Cli {
    /// Path to the input file containing encrypted text
    #[arg(short = 'r', long, help = "Ciphertext file to examine")]
    file: PathBuf,

    /// Assumed key length
    #[arg(short = 'l', long, default_value_t = 4)]
    key_length: usize,

    /// Known plaintext, must be longer than the key
    #[arg(short = 's', long)]
    fragment: String,

    /// Key was applied with xor instead of addition
    #[arg(short = 'x', long)]
    xor: bool,

    /// Alphabet size for subtraction
    #[arg(short = 'N', long, default_value_t = 256)]
    alphabet: usize,

    /// Debug diagnostics on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli: Cli = Cli::parse();
    init_tracing(cli.verbose);

    let ciphertext: Vec<u8> = std::fs::read(&cli.file)
        .with_context(|| format!("Failed to read input file {}", cli.file.display()))?;

    let combiner = if cli.xor { Combiner::Xor } else { Combiner::Subtract };
    tracing::info!(
        "Read {} bytes, key length {}, {:?}",
        ciphertext.len(),
        cli.key_length,
        combiner
    );

    let report = KeyElimination::new(cli.key_length, combiner)
        .with_alphabet(Alphabet::new(cli.alphabet)?)
        .run(&ciphertext, cli.fragment.as_bytes())?;

    tracing::debug!("Needle {}", hex::encode(&report.needle));
    if report.matches.is_empty() {
        tracing::info!("Fragment not found");
    } else {
        tracing::info!("{} candidate positions", report.matches.len());
    }

    let mut out = BufWriter::new(std::io::stdout().lock());
    for m in &report.matches {
        writeln!(
            out,
            "{}\t{:?}\t{}",
            m.offset,
            String::from_utf8_lossy(&m.key),
            format_slash_list(&m.key)
        )?;
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
