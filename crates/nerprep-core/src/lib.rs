//! # nerprep Core
//!
//! Turns two named-entity corpora into uniform token and tag sequences:
//! the tweet-based NEEL span annotations and CoNLL-2003 style token-per-line
//! files. Also provides one-hot tag encoding, GloVe-style word vector lookup
//! and simple accuracy/count reports.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::collections::HashMap;
//! use nerprep_core::{Annotation, EntityTag, TreebankTokenizer, reconcile};
//!
//! let texts = HashMap::from([("1".to_string(), "Barack Obama visited Paris".to_string())]);
//! let annotations = [
//!     Annotation::new("1", 0, 13, "Person"),
//!     Annotation::new("1", 21, 26, "Location"),
//! ];
//!
//! let tokenizer = TreebankTokenizer::new().unwrap();
//! let corpus = reconcile(&annotations, &texts, &tokenizer).unwrap();
//!
//! assert_eq!(corpus.sentences[0].tokens(), ["Barack", "Obama", "visited", "Paris"]);
//! assert_eq!(corpus.sentences[0].tags()[3], EntityTag::Location);
//! ```
pub mod config;
pub mod conll;
pub mod encoding;
pub mod error;
pub mod neel;
pub mod report;
pub mod sentence;
pub mod tags;
pub mod tokenizer;
pub mod vectors;

// Re-export primary API
pub use config::{ConllConfig, DOCSTART_MARKER, NeelConfig};
pub use conll::{ConllColumns, ConllCorpus, ConllWords, conll_sentences, conll_words, segment};
pub use encoding::{OneHot, decode, decode_all, encode, one_hot};
pub use error::{NerprepError, Result};
pub use neel::{
    Annotation, NeelCorpus, NeelWords, Reconciler, neel_sentences, neel_words, read_annotations,
    read_annotations_file, read_texts, read_texts_file, reconcile,
};
pub use report::{AccuracyReport, EntityCounts, accuracy, entity_count};
pub use sentence::{ConllSentence, TaggedSentence, flatten};
pub use tags::{EntityTag, correct_neel_label};
pub use tokenizer::{BertTokenizer, Token, TokenizerKind, TreebankTokenizer, WordTokenizer};
pub use vectors::WordVectors;
