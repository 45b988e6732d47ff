//! nerprep command-line tool
//!
//! Reads NEEL and CoNLL corpora and prints normalized token/tag sequences as
//! JSON lines, plus small reports over tag files and word vector tables.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nerprep_core::{
    ConllConfig, EntityCounts, EntityTag, NeelConfig, TokenizerKind, WordVectors, accuracy,
    conll_sentences, neel_sentences,
};
use serde::Serialize;
use tracing::{Level, info, warn};

/// CLI arguments
#[derive(Parser)]
#[command(name = "nerprep")]
#[command(about = "Normalize NEEL and CoNLL named-entity corpora")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Explicit log level, overrides -v
    #[arg(long, global = true, env = "NERPREP_LOG")]
    log_level: Option<Level>,

    /// Print reports as JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a NEEL annotation table with its tweet texts
    Neel {
        /// Gold-standard annotation TSV
        #[arg(short, long)]
        annotations: PathBuf,
        /// Tweet text CSV
        #[arg(short, long)]
        texts: PathBuf,
        /// Emit one flat record instead of one record per tweet
        #[arg(long)]
        flat: bool,
        /// Tokenizer for the tweet texts
        #[arg(long, env = "NERPREP_TOKENIZER", default_value_t = TokenizerKind::Treebank)]
        tokenizer: TokenizerKind,
        /// Keep raw labels exactly as written
        #[arg(long)]
        no_label_corrections: bool,
    },
    /// Segment a CoNLL file into sentences
    Conll {
        file: PathBuf,
        /// Emit one flat record instead of one record per sentence
        #[arg(long)]
        flat: bool,
        /// Drop a final sentence that is not followed by a blank line
        #[arg(long)]
        drop_unterminated: bool,
    },
    /// Count the normalized entity tags of a CoNLL file
    Count { file: PathBuf },
    /// Accuracy between two files holding one label per line
    Accuracy {
        expected: PathBuf,
        predicted: PathBuf,
    },
    /// Look up words in a word vector file
    Vector {
        file: PathBuf,
        #[arg(required = true)]
        words: Vec<String>,
    },
}

#[derive(Serialize)]
struct SentenceRecord<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    doc_id: Option<&'a str>,
    tokens: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pos: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chunks: Option<&'a [String]>,
    tags: &'a [EntityTag],
}

#[derive(Serialize)]
struct VectorRecord<'a> {
    word: &'a str,
    found: bool,
    vector: &'a [f32],
}

fn init_logging(cli: &Cli) {
    let level = cli.log_level.unwrap_or(match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    });
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn read_labels(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut labels = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() {
            labels.push(line.to_string());
        }
    }
    Ok(labels)
}

fn run(cli: Cli) -> Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match cli.command {
        Commands::Neel {
            annotations,
            texts,
            flat,
            tokenizer,
            no_label_corrections,
        } => {
            let config = NeelConfig::new()
                .with_tokenizer(tokenizer)
                .with_label_corrections(!no_label_corrections);
            let corpus = neel_sentences(&annotations, &texts, &config)
                .context("failed to reconcile NEEL corpus")?;

            if flat {
                write_json(&mut out, &corpus.flatten())?;
            } else {
                for (doc_id, sentence) in corpus.doc_ids.iter().zip(&corpus.sentences) {
                    let record = SentenceRecord {
                        doc_id: Some(doc_id),
                        tokens: sentence.tokens(),
                        pos: None,
                        chunks: None,
                        tags: sentence.tags(),
                    };
                    write_json(&mut out, &record)?;
                }
                write_json(
                    &mut out,
                    &serde_json::json!({ "unknown_ids": corpus.unknown_ids }),
                )?;
            }

            if !corpus.unknown_ids.is_empty() {
                warn!(
                    count = corpus.unknown_ids.len(),
                    "some annotations had no tweet text"
                );
            }
        }
        Commands::Conll {
            file,
            flat,
            drop_unterminated,
        } => {
            let config = ConllConfig::new().with_flush_trailing(!drop_unterminated);
            let corpus = conll_sentences(&file, &config)
                .with_context(|| format!("failed to read {}", file.display()))?;

            if flat {
                write_json(&mut out, &corpus.flatten())?;
            } else {
                for sentence in &corpus.sentences {
                    let record = SentenceRecord {
                        doc_id: None,
                        tokens: sentence.tokens(),
                        pos: Some(sentence.pos()),
                        chunks: Some(sentence.chunks()),
                        tags: sentence.tags(),
                    };
                    write_json(&mut out, &record)?;
                }
            }
            info!(sentences = corpus.len(), "wrote CoNLL sentences");
        }
        Commands::Count { file } => {
            let corpus = conll_sentences(&file, &ConllConfig::default())
                .with_context(|| format!("failed to read {}", file.display()))?;
            let counts = EntityCounts::from_tags(&corpus.flatten().tags);
            info!(total = counts.total(), "counted entity tags");

            if cli.json {
                write_json(&mut out, &counts)?;
            } else {
                writeln!(out, "{counts}")?;
            }
        }
        Commands::Accuracy {
            expected,
            predicted,
        } => {
            let expected = read_labels(&expected)?;
            let predicted = read_labels(&predicted)?;
            let report = accuracy(&expected, &predicted)?;

            if cli.json {
                write_json(
                    &mut out,
                    &serde_json::json!({
                        "correct": report.correct,
                        "total": report.total,
                        "ratio": report.ratio(),
                        "percentage": report.percentage(),
                    }),
                )?;
            } else {
                writeln!(out, "{report}")?;
            }
        }
        Commands::Vector { file, words } => {
            let vectors = WordVectors::load(&file)
                .with_context(|| format!("failed to load vectors from {}", file.display()))?;

            for word in &words {
                let vector = vectors.lookup(word);
                if cli.json {
                    let record = VectorRecord {
                        word,
                        found: vectors.contains(word),
                        vector: &vector,
                    };
                    write_json(&mut out, &record)?;
                } else {
                    let components: Vec<String> = vector.iter().map(f32::to_string).collect();
                    writeln!(out, "{} {}", word, components.join(" "))?;
                }
            }
        }
    }

    out.flush()?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    if let Err(e) = run(cli) {
        eprintln!("nerprep failed: {e:#}");
        std::process::exit(1);
    }
}
