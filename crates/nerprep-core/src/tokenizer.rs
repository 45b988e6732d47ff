//! # Word Tokenizers
//!
//! Splits raw text into word tokens that keep their byte offsets into the
//! source string. Offsets are what lets annotation spans be mapped onto
//! token positions instead of being matched by token text.
//!
//! Two implementations are provided behind [`WordTokenizer`]:
//! - [`TreebankTokenizer`]: regex-driven, Penn Treebank style (splits
//!   punctuation and English clitics such as `n't` and `'s`).
//! - [`BertTokenizer`]: adapter over the BERT pre-tokenizer of the
//!   `tokenizers` crate (whitespace + every punctuation character).

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use regex::Regex;
use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::{OffsetReferential, OffsetType, PreTokenizedString, PreTokenizer};

use crate::error::{NerprepError, Result};

/// A token extracted from text with positional information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The token text, always a substring of the source
    pub text: String,
    /// Start byte position in the original string
    pub start: usize,
    /// End byte position in the original string (exclusive)
    pub end: usize,
    /// Token index in the sequence
    pub index: usize,
}

impl Token {
    /// Check whether this token shares at least one byte with `range`.
    pub fn overlaps(&self, range: &Range<usize>) -> bool {
        self.start < range.end && self.end > range.start
    }
}

/// Anything that can split text into offset-carrying word tokens.
pub trait WordTokenizer {
    /// Tokenize `text`, returning tokens in source order.
    fn tokenize(&self, text: &str) -> Result<Vec<Token>>;

    /// Tokenize and keep only the token strings.
    fn words(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.tokenize(text)?.into_iter().map(|t| t.text).collect())
    }
}

/// Ellipsis, dashes, numbers with separators, words (with inner hyphens or
/// apostrophes), then any other single non-space character.
const TOKEN_PATTERN: &str = r"\.\.\.|--|\d+(?:[.,:]\d+)+|[\p{L}\p{M}\p{N}_]+(?:['’\-][\p{L}\p{M}\p{N}_]+)*|\S";

/// Clitics split off the end of a word after an apostrophe.
const CLITICS: &[&str] = &["s", "re", "ve", "ll", "d", "m"];

/// Penn Treebank style tokenizer.
#[derive(Debug, Clone)]
pub struct TreebankTokenizer {
    re_token: Regex,
}

impl TreebankTokenizer {
    /// Create a new tokenizer instance.
    ///
    /// # Errors
    ///
    /// Returns `NerprepError::Regex` if the token pattern fails to compile
    /// (should never happen with the static pattern defined here).
    pub fn new() -> Result<Self> {
        Ok(Self {
            re_token: Regex::new(TOKEN_PATTERN)?,
        })
    }

    /// Split a matched word into its stem and an optional clitic suffix,
    /// returning the byte position where the clitic starts.
    fn clitic_split(word: &str) -> Option<usize> {
        let lower = word.to_lowercase();
        if lower.len() == word.len() && lower.len() > 3 && lower.ends_with("n't") {
            return Some(word.len() - 3);
        }

        let (apostrophe, quote) = word
            .char_indices()
            .filter(|(_, c)| *c == '\'' || *c == '’')
            .last()?;
        if apostrophe == 0 {
            return None;
        }
        let suffix = &word[apostrophe + quote.len_utf8()..];
        if CLITICS.iter().any(|c| suffix.eq_ignore_ascii_case(c)) {
            Some(apostrophe)
        } else {
            None
        }
    }
}

impl WordTokenizer for TreebankTokenizer {
    /// Tokenize text into a sequence of tokens.
    ///
    /// # Examples
    /// ```
    /// use nerprep_core::tokenizer::{TreebankTokenizer, WordTokenizer};
    ///
    /// let tokenizer = TreebankTokenizer::new().unwrap();
    /// let words = tokenizer.words("Obama didn't visit Paris.").unwrap();
    /// assert_eq!(words, ["Obama", "did", "n't", "visit", "Paris", "."]);
    /// ```
    fn tokenize(&self, text: &str) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        for m in self.re_token.find_iter(text) {
            let word = m.as_str();
            let pieces = match Self::clitic_split(word) {
                Some(split) => vec![m.start()..m.start() + split, m.start() + split..m.end()],
                None => vec![m.range()],
            };

            for range in pieces {
                tokens.push(Token {
                    text: text[range.clone()].to_string(),
                    start: range.start,
                    end: range.end,
                    index: tokens.len(),
                });
            }
        }

        Ok(tokens)
    }
}

/// Adapter over the `tokenizers` BERT pre-tokenizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct BertTokenizer;

impl WordTokenizer for BertTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>> {
        let mut pretokenized = PreTokenizedString::from(text);
        BertPreTokenizer
            .pre_tokenize(&mut pretokenized)
            .map_err(|e| NerprepError::Tokenizer(e.to_string()))?;

        Ok(pretokenized
            .get_splits(OffsetReferential::Original, OffsetType::Byte)
            .into_iter()
            .enumerate()
            .map(|(index, (piece, (start, end), _))| Token {
                text: piece.to_string(),
                start,
                end,
                index,
            })
            .collect())
    }
}

/// Which tokenizer implementation to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenizerKind {
    #[default]
    Treebank,
    Bert,
}

impl TokenizerKind {
    /// Construct the selected tokenizer.
    pub fn build(self) -> Result<Box<dyn WordTokenizer>> {
        Ok(match self {
            TokenizerKind::Treebank => Box::new(TreebankTokenizer::new()?),
            TokenizerKind::Bert => Box::new(BertTokenizer),
        })
    }
}

impl fmt::Display for TokenizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenizerKind::Treebank => write!(f, "treebank"),
            TokenizerKind::Bert => write!(f, "bert"),
        }
    }
}

impl FromStr for TokenizerKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "treebank" => Ok(TokenizerKind::Treebank),
            "bert" => Ok(TokenizerKind::Bert),
            other => Err(format!("unknown tokenizer {other:?} (expected treebank or bert)")),
        }
    }
}

/// Convert a character offset into a byte offset of `text`.
///
/// Offsets past the end clamp to `text.len()`, matching slice semantics of
/// character-indexed strings.
pub fn byte_offset(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map_or(text.len(), |(byte, _)| byte)
}

/// Indices of the tokens that overlap the byte range `span`.
pub fn tokens_in_span(tokens: &[Token], span: Range<usize>) -> Range<usize> {
    if span.start >= span.end {
        return 0..0;
    }
    let first = tokens.partition_point(|t| t.end <= span.start);
    let overlapping = tokens[first..]
        .iter()
        .take_while(|t| t.overlaps(&span))
        .count();
    first..first + overlapping
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        TreebankTokenizer::new().unwrap().words(text).unwrap()
    }

    #[test]
    fn test_tokenize_basic() {
        let tokenizer = TreebankTokenizer::new().unwrap();
        let tokens = tokenizer.tokenize("Barack Obama visited Paris").unwrap();

        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0].text, "Barack");
        assert_eq!(tokens[0].start, 0);
        assert_eq!(tokens[0].end, 6);
        assert_eq!(tokens[3].text, "Paris");
        assert_eq!(tokens[3].start, 21);
        assert_eq!(tokens[3].index, 3);
    }

    #[test]
    fn test_tokenize_punctuation() {
        assert_eq!(
            words("Hello, world! (really)"),
            ["Hello", ",", "world", "!", "(", "really", ")"]
        );
        assert_eq!(words("wait... what"), ["wait", "...", "what"]);
        assert_eq!(words("#NBA @user"), ["#", "NBA", "@", "user"]);
    }

    #[test]
    fn test_tokenize_clitics() {
        assert_eq!(words("I can't go"), ["I", "ca", "n't", "go"]);
        assert_eq!(words("John's car"), ["John", "'s", "car"]);
        assert_eq!(words("we'll see"), ["we", "'ll", "see"]);
        assert_eq!(words("rock'n'roll"), ["rock'n'roll"]);
    }

    #[test]
    fn test_tokenize_numbers_and_hyphens() {
        assert_eq!(words("cost 1,000.50 now"), ["cost", "1,000.50", "now"]);
        assert_eq!(words("a well-known fact"), ["a", "well-known", "fact"]);
    }

    #[test]
    fn test_tokenize_unicode_offsets() {
        let text = "Zoë met José";
        let tokens = TreebankTokenizer::new().unwrap().tokenize(text).unwrap();
        assert_eq!(tokens.len(), 3);
        for token in &tokens {
            assert_eq!(&text[token.start..token.end], token.text);
        }
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(words("").is_empty());
        assert!(words("   \t ").is_empty());
    }

    #[test]
    fn test_bert_tokenizer() {
        let tokens = BertTokenizer.tokenize("Hello, world").unwrap();
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["Hello", ",", "world"]);
        assert_eq!(tokens[2].start, 7);
        assert_eq!(tokens[2].end, 12);
    }

    #[test]
    fn test_tokenizer_kind() {
        assert_eq!("bert".parse::<TokenizerKind>(), Ok(TokenizerKind::Bert));
        assert_eq!("Treebank".parse::<TokenizerKind>(), Ok(TokenizerKind::Treebank));
        assert!("nltk".parse::<TokenizerKind>().is_err());
        assert_eq!(TokenizerKind::default().to_string(), "treebank");

        let tokenizer = TokenizerKind::Bert.build().unwrap();
        assert_eq!(tokenizer.words("a b").unwrap(), ["a", "b"]);
    }

    #[test]
    fn test_byte_offset() {
        let text = "né à Paris";
        assert_eq!(byte_offset(text, 0), 0);
        assert_eq!(byte_offset(text, 2), 3);
        assert_eq!(byte_offset(text, 5), 7);
        assert_eq!(byte_offset(text, 100), text.len());
    }

    #[test]
    fn test_token_overlaps() {
        let token = Token {
            text: "Obama".to_string(),
            start: 7,
            end: 12,
            index: 1,
        };
        assert!(token.overlaps(&(0..8)));
        assert!(token.overlaps(&(11..20)));
        assert!(!token.overlaps(&(0..7)));
        assert!(!token.overlaps(&(12..20)));
    }

    #[test]
    fn test_tokens_in_span() {
        let tokens = TreebankTokenizer::new()
            .unwrap()
            .tokenize("Barack Obama visited Paris")
            .unwrap();

        assert_eq!(tokens_in_span(&tokens, 0..13), 0..2);
        assert_eq!(tokens_in_span(&tokens, 21..26), 3..4);
        assert_eq!(tokens_in_span(&tokens, 8..10), 1..2);
        assert_eq!(tokens_in_span(&tokens, 6..7), 1..1);
        assert_eq!(tokens_in_span(&tokens, 10..10), 0..0);
        assert_eq!(tokens_in_span(&tokens, 30..40), 4..4);
    }
}
