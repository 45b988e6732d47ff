use thiserror::Error;

/// Errors that can occur while reading and normalizing corpora.
#[derive(Debug, Error)]
pub enum NerprepError {
    /// An input file could not be opened or read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A delimited table could not be decoded.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A source line does not have the expected shape.
    #[error("malformed input at line {line}: {reason}")]
    MalformedLine {
        /// 1-based line (or record) number.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// A tokenizer pattern failed to compile (should not happen with static patterns).
    #[error("regex compilation error: {0}")]
    Regex(#[from] regex::Error),

    /// Parallel sequences that must share a length do not.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An operation that divides by the input length received nothing.
    #[error("input is empty")]
    EmptyInput,

    /// Two sequences compared position by position differ in length.
    #[error("length mismatch: expected {expected} items, got {actual}")]
    LengthMismatch {
        /// Length of the reference sequence.
        expected: usize,
        /// Length of the compared sequence.
        actual: usize,
    },

    /// A key that the caller relied on is absent from a table.
    #[error("key not found: {0:?}")]
    MissingKey(String),

    /// The external tokenizer rejected its input.
    #[error("tokenizer error: {0}")]
    Tokenizer(String),
}

impl NerprepError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        NerprepError::MalformedLine {
            line,
            reason: reason.into(),
        }
    }
}

/// Result type alias for nerprep operations.
pub type Result<T> = std::result::Result<T, NerprepError>;
