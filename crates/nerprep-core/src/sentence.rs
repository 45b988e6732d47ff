//! Sentence types shared by both corpora, and the flatteners that de-nest
//! sentence-grouped sequences.

use serde::Serialize;

use crate::error::{NerprepError, Result};
use crate::tags::EntityTag;

/// Tokens with one normalized entity tag per token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaggedSentence {
    tokens: Vec<String>,
    tags: Vec<EntityTag>,
}

impl TaggedSentence {
    /// Build a sentence, checking that both sequences have the same length.
    pub fn new(tokens: Vec<String>, tags: Vec<EntityTag>) -> Result<Self> {
        ensure_same_len("tags", tokens.len(), tags.len())?;
        Ok(Self { tokens, tags })
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn tags(&self) -> &[EntityTag] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<EntityTag>) {
        (self.tokens, self.tags)
    }
}

/// One CoNLL sentence: tokens with parallel POS, chunk and entity columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConllSentence {
    tokens: Vec<String>,
    pos: Vec<String>,
    chunks: Vec<String>,
    tags: Vec<EntityTag>,
}

impl ConllSentence {
    /// Build a sentence, checking that all four columns have the same length.
    pub fn new(
        tokens: Vec<String>,
        pos: Vec<String>,
        chunks: Vec<String>,
        tags: Vec<EntityTag>,
    ) -> Result<Self> {
        ensure_same_len("POS tags", tokens.len(), pos.len())?;
        ensure_same_len("chunk tags", tokens.len(), chunks.len())?;
        ensure_same_len("entity tags", tokens.len(), tags.len())?;
        Ok(Self {
            tokens,
            pos,
            chunks,
            tags,
        })
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn pos(&self) -> &[String] {
        &self.pos
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    pub fn tags(&self) -> &[EntityTag] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

fn ensure_same_len(column: &str, tokens: usize, other: usize) -> Result<()> {
    if tokens == other {
        Ok(())
    } else {
        Err(NerprepError::InvariantViolation(format!(
            "sentence has {tokens} tokens but {other} {column}"
        )))
    }
}

/// Concatenate sentence-level sequences into one flat sequence.
///
/// Order is preserved: sentences in input order, items in sentence order.
pub fn flatten<T, S>(sentences: &[S]) -> Vec<T>
where
    T: Clone,
    S: AsRef<[T]>,
{
    let total = sentences.iter().map(|s| s.as_ref().len()).sum();
    let mut flat = Vec::with_capacity(total);
    for sentence in sentences {
        flat.extend_from_slice(sentence.as_ref());
    }
    flat
}
