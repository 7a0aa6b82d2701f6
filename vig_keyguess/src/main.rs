use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use repkey_analysis::search::ColumnScorer;
use repkey_analysis::{Alphabet, CorpusRegistry, GreedySearch, Metric, ReferenceCorpus};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the greedy per-column key guesser.
#[derive(Parser, Debug)]
#[command(about = "Rank the most likely offsets for each key column")]
struct Cli {
    /// Path to the input file containing encrypted text
    #[arg(short = 'r', long, help = "Ciphertext file to examine")]
    file: PathBuf,

    /// Assumed key length
    #[arg(short = 'l', long, default_value_t = 1)]
    key_length: usize,

    /// Alphabet size
    #[arg(short = 'N', long, default_value_t = 256)]
    alphabet: usize,

    /// Offsets kept per column
    #[arg(short = 'k', long, default_value_t = 4)]
    top: usize,

    /// How decoded columns are judged
    #[arg(short, long, value_enum, default_value_t = Scoring::Plausible)]
    scoring: Scoring,

    /// Built-in reference corpus for the similarity scorings
    #[arg(short = 't', long, default_value = "php")]
    corpus: String,

    /// Histogram file to use as reference instead of a built-in corpus
    #[arg(long)]
    corpus_file: Option<PathBuf>,

    /// Debug diagnostics on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Scoring {
    /// Count of printable bytes
    Plausible,
    /// Chi-squared against the corpus
    ChiSquared,
    /// Vector angle against the corpus
    Angle,
}

fn main() -> Result<()> {
    let cli: Cli = Cli::parse();
    init_tracing(cli.verbose);

    let ciphertext: Vec<u8> = std::fs::read(&cli.file)
        .with_context(|| format!("Failed to read input file {}", cli.file.display()))?;
    tracing::info!("Read {} bytes, assumed key length {}", ciphertext.len(), cli.key_length);

    let alphabet = Alphabet::new(cli.alphabet)?;
    let loaded;
    let corpus: &ReferenceCorpus = match &cli.corpus_file {
        Some(path) => {
            loaded = ReferenceCorpus::from_count_file(path.display().to_string(), path)
                .with_context(|| format!("Failed to load corpus {}", path.display()))?;
            &loaded
        }
        None => CorpusRegistry::builtin().get(&cli.corpus)?,
    };

    let scorer = match cli.scoring {
        Scoring::Plausible => ColumnScorer::Plausible,
        Scoring::ChiSquared => ColumnScorer::Similarity { metric: Metric::ChiSquared, corpus },
        Scoring::Angle => ColumnScorer::Similarity { metric: Metric::VectorAngle, corpus },
    };

    let report = GreedySearch::new(cli.key_length, alphabet)
        .with_top_k(cli.top)
        .with_scorer(scorer)
        .run(&ciphertext)?;

    let mut out = BufWriter::new(std::io::stdout().lock());

    for column in &report.columns {
        write!(out, "column {}\t{}", column.column, column.length)?;
        for candidate in &column.candidates {
            write!(out, "\t{}:{}", format_score(candidate.score), display_byte(candidate.offset))?;
        }
        writeln!(out)?;
    }

    for key in &report.keys {
        if key.is_printable() {
            writeln!(out, "{:?}", String::from_utf8_lossy(key.bytes()))?;
        }
        writeln!(out, "{}", key.slash_list())?;
    }

    let specs: Vec<String> = report.columns.iter().map(|c| c.candidate_spec()).collect();
    writeln!(out, "{}", specs.join(" "))?;

    // keyguess decodes by adding, so it wants the additive inverses
    let inverses: Vec<String> = report
        .columns
        .iter()
        .map(|c| {
            c.candidates
                .iter()
                .map(|k| alphabet.sub(0, k.offset).to_string())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect();
    writeln!(out, "{}", inverses.join(" "))?;
    out.flush()?;

    Ok(())
}

fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{}", score)
    } else {
        format!("{:.4}", score)
    }
}

/// Printable offsets are shown as characters
fn display_byte(b: u8) -> String {
    if b.is_ascii_graphic() {
        format!("'{}'", b as char)
    } else {
        b.to_string()
    }
}

/// Diagnostics go to stderr so stdout stays machine-readable
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}
