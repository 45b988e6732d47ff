//! # Reader Configuration
//!
//! Option structs for the corpus readers, built with `with_*` setters on top
//! of their defaults.

use crate::tokenizer::TokenizerKind;

/// Token marking a document boundary in CoNLL files.
pub const DOCSTART_MARKER: &str = "-DOCSTART-";

/// Configuration for the NEEL reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeelConfig {
    /// Tokenizer used for the document text
    pub tokenizer: TokenizerKind,
    /// Whether to repair known-malformed raw labels before normalizing
    pub correct_labels: bool,
}

impl Default for NeelConfig {
    fn default() -> Self {
        Self {
            tokenizer: TokenizerKind::Treebank,
            correct_labels: true,
        }
    }
}

impl NeelConfig {
    /// Create a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tokenizer.
    pub fn with_tokenizer(mut self, tokenizer: TokenizerKind) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    /// Enable or disable the raw label corrections.
    pub fn with_label_corrections(mut self, enabled: bool) -> Self {
        self.correct_labels = enabled;
        self
    }
}

/// Configuration for the CoNLL segmenter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConllConfig {
    /// Emit a final sentence that is not followed by a blank line
    pub flush_trailing: bool,
    /// Token lines with this token are dropped
    pub docstart_marker: String,
}

impl Default for ConllConfig {
    fn default() -> Self {
        Self {
            flush_trailing: true,
            docstart_marker: DOCSTART_MARKER.to_string(),
        }
    }
}

impl ConllConfig {
    /// Create a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep or drop an unterminated final sentence.
    pub fn with_flush_trailing(mut self, enabled: bool) -> Self {
        self.flush_trailing = enabled;
        self
    }

    /// Set the document boundary marker token.
    pub fn with_docstart_marker(mut self, marker: impl Into<String>) -> Self {
        self.docstart_marker = marker.into();
        self
    }
}
