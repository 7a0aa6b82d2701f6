use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use num_traits::ToPrimitive;
use repkey_analysis::{
    Alphabet, CorpusRegistry, ExhaustiveSearch, KeySpace, Metric, ReferenceCorpus, SearchMonitor,
};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the exhaustive key search.
#[derive(Parser, Debug)]
#[command(about = "Score every combination of candidate key bytes against a reference corpus")]
struct Cli {
    /// Path to the input file containing encrypted text
    #[arg(short = 'r', long, help = "Ciphertext file to examine")]
    file: PathBuf,

    /// Alphabet size
    #[arg(short = 'N', long, default_value_t = 256)]
    alphabet: usize,

    /// Built-in reference corpus (php or english)
    #[arg(short = 't', long, default_value = "php")]
    corpus: String,

    /// Histogram file to use as reference instead of a built-in corpus
    #[arg(long)]
    corpus_file: Option<PathBuf>,

    /// Similarity measure
    #[arg(short, long, value_enum, default_value_t = MetricArg::Angle)]
    metric: MetricArg,

    /// Length of the ranked table
    #[arg(short = 'n', long, default_value_t = 10)]
    top: usize,

    /// Disable the progress bar
    #[arg(short, long)]
    quiet: bool,

    /// Debug diagnostics on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Candidate values per key position, e.g. 101/127/134 2/9
    #[arg(required = true, value_name = "KEYBYTES")]
    positions: Vec<String>,
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

/// Drives an indicatif bar from the search's progress reports
struct BarMonitor {
    bar: ProgressBar,
}

impl SearchMonitor for BarMonitor {
    fn on_progress(&self, checked: u64, best_score: Option<f64>) {
        self.bar.set_position(checked);
        self.bar.tick();
        if let Some(score) = best_score {
            self.bar.set_message(format!("min {:.4}", score));
        }
    }
}

/// A bar when the key count fits in `u64`, a spinner with a running count otherwise
fn progress_bar(quiet: bool, space: &KeySpace) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    match space.combination_count().to_u64() {
        Some(total) => {
            let bar = ProgressBar::new(total);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{bar:40.cyan/blue} {pos}/{len} keys {msg} [{elapsed_precise}]")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        }
        None => {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner} {pos} keys {msg} [{elapsed_precise}]")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner
        }
    }
}

fn main() -> Result<()> {
    let cli: Cli = Cli::parse();
    init_tracing(cli.verbose);

    let ciphertext: Vec<u8> = std::fs::read(&cli.file)
        .with_context(|| format!("Failed to read input file {}", cli.file.display()))?;
    tracing::info!("Read {} bytes", ciphertext.len());

    let alphabet = Alphabet::new(cli.alphabet)?;
    let space = KeySpace::parse(&cli.positions)?;

    let loaded;
    let corpus: &ReferenceCorpus = match &cli.corpus_file {
        Some(path) => {
            loaded = ReferenceCorpus::from_count_file(path.display().to_string(), path)
                .with_context(|| format!("Failed to load corpus {}", path.display()))?;
            &loaded
        }
        None => CorpusRegistry::builtin().get(&cli.corpus)?,
    };

    let monitor = BarMonitor {
        bar: progress_bar(cli.quiet, &space),
    };

    let outcome = ExhaustiveSearch::new(corpus, alphabet)
        .with_metric(cli.metric.into())
        .with_top_n(cli.top)
        .run(&ciphertext, &space, &monitor)?;
    monitor.bar.finish_and_clear();

    tracing::info!("{} of {} keys checked", outcome.checked, outcome.total);

    let mut out = BufWriter::new(std::io::stdout().lock());
    if let Some(best) = &outcome.best {
        writeln!(out, "Best key at {:.6}:", best.score)?;
        for &b in best.key.bytes() {
            if b.is_ascii_graphic() {
                writeln!(out, "\t{}\t{}", b, b as char)?;
            } else {
                writeln!(out, "\t{}", b)?;
            }
        }
    }
    for scored in &outcome.ranked {
        writeln!(out, "{:.4}\t{}", scored.score, scored.key)?;
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
