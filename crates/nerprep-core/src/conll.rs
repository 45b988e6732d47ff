//! CoNLL-2003 style corpus segmentation.
//!
//! Each non-blank line carries `token POS chunk entity`; blank lines end a
//! sentence. Entity tags are normalized to [`EntityTag`] on the way in.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::ConllConfig;
use crate::error::{NerprepError, Result};
use crate::sentence::{ConllSentence, flatten};
use crate::tags::EntityTag;

/// Number of whitespace-separated fields on a token line.
const FIELDS_PER_LINE: usize = 4;

/// Sentences read from a CoNLL file, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConllCorpus {
    pub sentences: Vec<ConllSentence>,
}

/// The four parallel sentence-grouped columns of a corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConllColumns {
    pub tokens: Vec<Vec<String>>,
    pub pos: Vec<Vec<String>>,
    pub chunks: Vec<Vec<String>>,
    pub tags: Vec<Vec<EntityTag>>,
}

/// A corpus de-nested into flat parallel sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConllWords {
    pub words: Vec<String>,
    pub pos: Vec<String>,
    pub chunks: Vec<String>,
    pub tags: Vec<EntityTag>,
}

impl ConllCorpus {
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Split the corpus into four parallel lists of sentences.
    pub fn into_columns(self) -> ConllColumns {
        let mut columns = ConllColumns::default();
        for sentence in self.sentences {
            columns.tokens.push(sentence.tokens().to_vec());
            columns.pos.push(sentence.pos().to_vec());
            columns.chunks.push(sentence.chunks().to_vec());
            columns.tags.push(sentence.tags().to_vec());
        }
        columns
    }

    /// De-nest every column into a single flat sequence.
    pub fn flatten(&self) -> ConllWords {
        let tokens: Vec<&[String]> = self.sentences.iter().map(ConllSentence::tokens).collect();
        let pos: Vec<&[String]> = self.sentences.iter().map(ConllSentence::pos).collect();
        let chunks: Vec<&[String]> = self.sentences.iter().map(ConllSentence::chunks).collect();
        let tags: Vec<&[EntityTag]> = self.sentences.iter().map(ConllSentence::tags).collect();

        ConllWords {
            words: flatten(&tokens),
            pos: flatten(&pos),
            chunks: flatten(&chunks),
            tags: flatten(&tags),
        }
    }
}

/// Accumulator for the sentence currently being read.
#[derive(Debug, Default)]
struct SentenceBuffer {
    tokens: Vec<String>,
    pos: Vec<String>,
    chunks: Vec<String>,
    tags: Vec<EntityTag>,
}

impl SentenceBuffer {
    fn push(&mut self, token: &str, pos: &str, chunk: &str, raw_tag: &str) {
        self.tokens.push(token.to_string());
        self.pos.push(pos.to_string());
        self.chunks.push(chunk.to_string());
        self.tags.push(EntityTag::from_conll(raw_tag));
    }

    fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Move a non-empty buffer into `out`, leaving the buffer empty.
    fn flush_into(&mut self, out: &mut Vec<ConllSentence>) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        let buffer = std::mem::take(self);
        out.push(ConllSentence::new(
            buffer.tokens,
            buffer.pos,
            buffer.chunks,
            buffer.tags,
        )?);
        Ok(())
    }
}

/// Segment CoNLL lines from `reader` into sentences.
///
/// # Errors
///
/// Returns `NerprepError::MalformedLine` for a non-blank line that does not
/// have exactly four fields, and `NerprepError::Io` if reading fails.
pub fn segment<R: BufRead>(reader: R, config: &ConllConfig) -> Result<ConllCorpus> {
    let mut sentences = Vec::new();
    let mut buffer = SentenceBuffer::default();
    let mut dropped_markers = 0usize;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();

        if line.is_empty() {
            buffer.flush_into(&mut sentences)?;
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        let [token, pos, chunk, raw_tag] = fields[..] else {
            return Err(NerprepError::malformed(
                idx + 1,
                format!(
                    "expected {FIELDS_PER_LINE} fields, found {}",
                    fields.len()
                ),
            ));
        };

        if token == config.docstart_marker {
            dropped_markers += 1;
            continue;
        }
        buffer.push(token, pos, chunk, raw_tag);
    }

    if !buffer.is_empty() {
        if config.flush_trailing {
            buffer.flush_into(&mut sentences)?;
        } else {
            debug!(
                tokens = buffer.tokens.len(),
                "dropping unterminated final sentence"
            );
        }
    }

    debug!(dropped_markers, "skipped document boundary markers");
    Ok(ConllCorpus { sentences })
}

/// Read a CoNLL file into sentences.
pub fn conll_sentences<P: AsRef<Path>>(path: P, config: &ConllConfig) -> Result<ConllCorpus> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let corpus = segment(BufReader::new(file), config)?;
    info!(
        path = %path.display(),
        sentences = corpus.len(),
        "loaded CoNLL corpus"
    );
    Ok(corpus)
}

/// Read a CoNLL file into flat word-level sequences.
pub fn conll_words<P: AsRef<Path>>(path: P, config: &ConllConfig) -> Result<ConllWords> {
    Ok(conll_sentences(path, config)?.flatten())
}
