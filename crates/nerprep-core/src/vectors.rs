//! # Word Vector Lookup
//!
//! Loads GloVe-style text files (`word v1 v2 ... vN` per line) into memory
//! and resolves single-word lookups with a zero-vector fallback.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{NerprepError, Result};

/// Read-only table of word vectors.
///
/// The fallback dimension is fixed when the table is built: it is the
/// dimension of the first vector read, or the one passed to
/// [`WordVectors::with_dimension`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordVectors {
    table: HashMap<String, Vec<f32>>,
    dimension: usize,
}

impl WordVectors {
    /// Wrap an existing table with an explicit fallback dimension.
    pub fn with_dimension(table: HashMap<String, Vec<f32>>, dimension: usize) -> Self {
        Self { table, dimension }
    }

    /// Load a vector file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let vectors = Self::from_reader(BufReader::new(File::open(path)?))?;
        info!(
            path = %path.display(),
            words = vectors.len(),
            dimension = vectors.dimension,
            "loaded word vectors"
        );
        Ok(vectors)
    }

    /// Parse vectors from any buffered reader.
    ///
    /// Words are stored exactly as written. Blank lines are skipped; rows
    /// whose dimension differs from the first row are kept unchanged.
    ///
    /// # Errors
    ///
    /// Returns `NerprepError::MalformedLine` if a component is not a number.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut table = HashMap::new();
        let mut dimension = None;
        let mut ragged = 0usize;

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let mut fields = line.split_whitespace();
            let Some(word) = fields.next() else {
                continue;
            };

            let vector = fields
                .map(|v| {
                    v.parse::<f32>().map_err(|_| {
                        NerprepError::malformed(idx + 1, format!("invalid component {v:?} for {word:?}"))
                    })
                })
                .collect::<Result<Vec<f32>>>()?;

            match dimension {
                None => dimension = Some(vector.len()),
                Some(dim) if dim != vector.len() => ragged += 1,
                Some(_) => {}
            }
            table.insert(word.to_string(), vector);
        }

        if ragged > 0 {
            debug!(ragged, "rows differ in dimension from the first row");
        }

        Ok(Self {
            table,
            dimension: dimension.unwrap_or(0),
        })
    }

    /// Dimension of the zero vector returned for unknown words.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Exact-key access, without lowercasing or fallback.
    pub fn get(&self, word: &str) -> Option<&[f32]> {
        self.table.get(word).map(Vec::as_slice)
    }

    /// Check whether the lowercase form of `word` is in the table.
    pub fn contains(&self, word: &str) -> bool {
        self.table.contains_key(&word.to_lowercase())
    }

    /// Vector for the lowercase form of `word`, or zeros when it is unknown.
    ///
    /// # Examples
    /// ```
    /// use std::collections::HashMap;
    /// use nerprep_core::vectors::WordVectors;
    ///
    /// let table = HashMap::from([("paris".to_string(), vec![0.5, -0.5])]);
    /// let vectors = WordVectors::with_dimension(table, 2);
    ///
    /// assert_eq!(vectors.lookup("Paris").as_ref(), [0.5, -0.5]);
    /// assert_eq!(vectors.lookup("London").as_ref(), [0.0, 0.0]);
    /// ```
    pub fn lookup(&self, word: &str) -> Cow<'_, [f32]> {
        match self.table.get(&word.to_lowercase()) {
            Some(vector) => Cow::Borrowed(vector),
            None => Cow::Owned(vec![0.0; self.dimension]),
        }
    }

    /// Dimension of the vector stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `NerprepError::MissingKey` if `key` is not in the table.
    pub fn dimension_of(&self, key: &str) -> Result<usize> {
        self.table
            .get(key)
            .map(Vec::len)
            .ok_or_else(|| NerprepError::MissingKey(key.to_string()))
    }
}
