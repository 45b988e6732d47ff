//! # NEEL Corpus Reconciliation
//!
//! The NEEL corpus ships as two tables: a gold-standard TSV of entity spans
//! given as character offsets into a tweet, and a CSV holding the tweet
//! texts. Reconciliation joins the two, tokenizes each tweet and tags every
//! token covered by an annotated span.
//!
//! Tags are assigned by position: a span's character range is converted to a
//! byte range and only tokens overlapping that range are tagged. A word that
//! repeats elsewhere in the tweet keeps its own tag.

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::NeelConfig;
use crate::error::{NerprepError, Result};
use crate::sentence::{TaggedSentence, flatten};
use crate::tags::{EntityTag, correct_neel_label};
use crate::tokenizer::{Token, WordTokenizer, byte_offset, tokens_in_span};

/// Number of columns in the gold-standard annotation table.
const ANNOTATION_COLUMNS: usize = 6;

/// Character wrapping the values of the text table.
const TEXT_QUOTE: u8 = b'|';

/// One row of the gold-standard annotation table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub doc_id: String,
    /// Start character offset (inclusive)
    pub start: usize,
    /// End character offset (exclusive)
    pub end: usize,
    pub uri: String,
    pub confidence: Option<f32>,
    /// Entity type as written in the table
    pub label: String,
}

impl Annotation {
    /// Build an annotation with no URI or confidence.
    pub fn new(
        doc_id: impl Into<String>,
        start: usize,
        end: usize,
        label: impl Into<String>,
    ) -> Self {
        Self {
            doc_id: doc_id.into(),
            start,
            end,
            uri: String::new(),
            confidence: None,
            label: label.into(),
        }
    }
}

/// Reconciled documents in first-seen order, plus the ids with no text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NeelCorpus {
    pub doc_ids: Vec<String>,
    pub sentences: Vec<TaggedSentence>,
    pub unknown_ids: BTreeSet<String>,
}

/// A NEEL corpus de-nested into flat sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NeelWords {
    pub words: Vec<String>,
    pub tags: Vec<EntityTag>,
    pub unknown_ids: BTreeSet<String>,
}

impl NeelCorpus {
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Split into per-document token lists, tag lists and the unknown ids.
    pub fn into_parts(self) -> (Vec<Vec<String>>, Vec<Vec<EntityTag>>, BTreeSet<String>) {
        let (tokens, tags) = self
            .sentences
            .into_iter()
            .map(TaggedSentence::into_parts)
            .unzip();
        (tokens, tags, self.unknown_ids)
    }

    /// De-nest the documents into flat word and tag sequences.
    pub fn flatten(&self) -> NeelWords {
        let tokens: Vec<&[String]> = self.sentences.iter().map(TaggedSentence::tokens).collect();
        let tags: Vec<&[EntityTag]> = self.sentences.iter().map(TaggedSentence::tags).collect();
        NeelWords {
            words: flatten(&tokens),
            tags: flatten(&tags),
            unknown_ids: self.unknown_ids.clone(),
        }
    }
}

/// Parse the tab-separated annotation table.
///
/// Columns: document id, start, end, URI, confidence, entity type.
pub fn read_annotations<R: Read>(reader: R) -> Result<Vec<Annotation>> {
    let mut csv = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let mut annotations = Vec::new();
    for record in csv.records() {
        let record = record?;
        let line = record.position().map_or(annotations.len() + 1, |p| p.line() as usize);

        if record.len() < ANNOTATION_COLUMNS {
            return Err(NerprepError::malformed(
                line,
                format!(
                    "expected {ANNOTATION_COLUMNS} tab-separated columns, found {}",
                    record.len()
                ),
            ));
        }

        let offset = |idx: usize, name: &str| -> Result<usize> {
            record[idx].trim().parse().map_err(|_| {
                NerprepError::malformed(line, format!("invalid {name} offset {:?}", &record[idx]))
            })
        };

        annotations.push(Annotation {
            doc_id: record[0].trim().to_string(),
            start: offset(1, "start")?,
            end: offset(2, "end")?,
            uri: record[3].trim().to_string(),
            confidence: record[4].trim().parse().ok(),
            label: record[5].trim().to_string(),
        });
    }

    debug!(annotations = annotations.len(), "parsed annotation table");
    Ok(annotations)
}

/// Parse the comma-separated text table into a map from document id to text.
///
/// Values may be wrapped in `|`, which is removed. A later row for the same
/// id replaces an earlier one.
pub fn read_texts<R: Read>(reader: R) -> Result<HashMap<String, String>> {
    let mut csv = csv::ReaderBuilder::new()
        .delimiter(b',')
        .quote(TEXT_QUOTE)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut texts = HashMap::new();
    for record in csv.records() {
        let record = record?;
        if record.len() < 2 {
            let line = record.position().map_or(texts.len() + 1, |p| p.line() as usize);
            return Err(NerprepError::malformed(
                line,
                format!("expected an id and a text, found {} columns", record.len()),
            ));
        }

        // Unquoted commas inside the text split it into extra columns.
        let text = record.iter().skip(1).collect::<Vec<_>>().join(",");
        texts.insert(
            record[0].trim().trim_matches('|').to_string(),
            strip_quotes(&text),
        );
    }

    debug!(texts = texts.len(), "parsed text table");
    Ok(texts)
}

/// Read the annotation table from a file.
pub fn read_annotations_file<P: AsRef<Path>>(path: P) -> Result<Vec<Annotation>> {
    read_annotations(File::open(path)?)
}

/// Read the text table from a file.
pub fn read_texts_file<P: AsRef<Path>>(path: P) -> Result<HashMap<String, String>> {
    read_texts(File::open(path)?)
}

/// Span offsets count from the first character inside the quotes, so
/// surrounding whitespace is kept.
fn strip_quotes(value: &str) -> String {
    value.trim_matches('|').to_string()
}

/// Per-document reconciliation state.
struct Document {
    id: String,
    tokens: Vec<Token>,
    tags: Vec<EntityTag>,
}

/// Joins annotations with their texts one span at a time.
pub struct Reconciler<'a> {
    texts: &'a HashMap<String, String>,
    tokenizer: &'a dyn WordTokenizer,
    correct_labels: bool,
    documents: Vec<Document>,
    positions: HashMap<String, usize>,
    unknown_ids: BTreeSet<String>,
}

impl<'a> Reconciler<'a> {
    pub fn new(texts: &'a HashMap<String, String>, tokenizer: &'a dyn WordTokenizer) -> Self {
        Self {
            texts,
            tokenizer,
            correct_labels: true,
            documents: Vec::new(),
            positions: HashMap::new(),
            unknown_ids: BTreeSet::new(),
        }
    }

    /// Enable or disable the raw label corrections.
    pub fn with_label_corrections(mut self, enabled: bool) -> Self {
        self.correct_labels = enabled;
        self
    }

    /// Apply one annotation span.
    ///
    /// An annotation whose document has no text is recorded as unknown and
    /// otherwise ignored.
    pub fn apply(&mut self, annotation: &Annotation) -> Result<()> {
        let texts = self.texts;
        let Some(text) = texts.get(&annotation.doc_id) else {
            if self.unknown_ids.insert(annotation.doc_id.clone()) {
                debug!(doc_id = %annotation.doc_id, "annotation refers to unknown document");
            }
            return Ok(());
        };

        let position = match self.positions.get(&annotation.doc_id) {
            Some(&position) => position,
            None => {
                let tokens = self.tokenizer.tokenize(text)?;
                let tags = vec![EntityTag::Outside; tokens.len()];
                self.documents.push(Document {
                    id: annotation.doc_id.clone(),
                    tokens,
                    tags,
                });
                self.positions
                    .insert(annotation.doc_id.clone(), self.documents.len() - 1);
                self.documents.len() - 1
            }
        };

        let raw = if self.correct_labels {
            correct_neel_label(&annotation.label)
        } else {
            annotation.label.as_str()
        };
        let tag = EntityTag::from_neel(raw);

        let span = byte_offset(text, annotation.start)..byte_offset(text, annotation.end);
        let document = &mut self.documents[position];
        let covered = tokens_in_span(&document.tokens, span);
        if covered.is_empty() {
            debug!(
                doc_id = %annotation.doc_id,
                start = annotation.start,
                end = annotation.end,
                "annotation span covers no token"
            );
        }
        document.tags[covered].fill(tag);

        Ok(())
    }

    /// Finish reconciliation, emitting documents in first-seen order.
    pub fn finish(self) -> Result<NeelCorpus> {
        let mut corpus = NeelCorpus {
            unknown_ids: self.unknown_ids,
            ..NeelCorpus::default()
        };

        for document in self.documents {
            let tokens = document.tokens.into_iter().map(|t| t.text).collect();
            corpus.sentences.push(TaggedSentence::new(tokens, document.tags)?);
            corpus.doc_ids.push(document.id);
        }

        if !corpus.unknown_ids.is_empty() {
            warn!(
                unknown = corpus.unknown_ids.len(),
                "annotations reference documents missing from the text table"
            );
        }
        Ok(corpus)
    }
}

/// Reconcile annotations with document texts.
pub fn reconcile(
    annotations: &[Annotation],
    texts: &HashMap<String, String>,
    tokenizer: &dyn WordTokenizer,
) -> Result<NeelCorpus> {
    let mut reconciler = Reconciler::new(texts, tokenizer);
    for annotation in annotations {
        reconciler.apply(annotation)?;
    }
    reconciler.finish()
}

/// Read both NEEL tables from disk and reconcile them.
///
/// # Arguments
/// * `gs_path` - The gold-standard annotation TSV
/// * `text_path` - The tweet text CSV
pub fn neel_sentences<P: AsRef<Path>, Q: AsRef<Path>>(
    gs_path: P,
    text_path: Q,
    config: &NeelConfig,
) -> Result<NeelCorpus> {
    let annotations = read_annotations_file(gs_path)?;
    let texts = read_texts_file(text_path)?;
    let tokenizer = config.tokenizer.build()?;

    let mut reconciler = Reconciler::new(&texts, tokenizer.as_ref())
        .with_label_corrections(config.correct_labels);
    for annotation in &annotations {
        reconciler.apply(annotation)?;
    }
    let corpus = reconciler.finish()?;

    info!(
        annotations = annotations.len(),
        documents = corpus.len(),
        unknown = corpus.unknown_ids.len(),
        tokenizer = %config.tokenizer,
        "reconciled NEEL corpus"
    );
    Ok(corpus)
}

/// Read both NEEL tables and return flat word-level sequences.
pub fn neel_words<P: AsRef<Path>, Q: AsRef<Path>>(
    gs_path: P,
    text_path: Q,
    config: &NeelConfig,
) -> Result<NeelWords> {
    Ok(neel_sentences(gs_path, text_path, config)?.flatten())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::TreebankTokenizer;

    fn texts(rows: &[(&str, &str)]) -> HashMap<String, String> {
        rows.iter()
            .map(|(id, text)| (id.to_string(), text.to_string()))
            .collect()
    }

    fn run(annotations: &[Annotation], texts: &HashMap<String, String>) -> NeelCorpus {
        let tokenizer = TreebankTokenizer::new().unwrap();
        reconcile(annotations, texts, &tokenizer).unwrap()
    }

    #[test]
    fn test_reconcile_example() {
        let texts = texts(&[("1", "Barack Obama visited Paris")]);
        let annotations = [
            Annotation::new("1", 0, 13, "Person"),
            Annotation::new("1", 21, 26, "Location"),
        ];

        let corpus = run(&annotations, &texts);
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.doc_ids, ["1"]);
        assert_eq!(
            corpus.sentences[0].tokens(),
            ["Barack", "Obama", "visited", "Paris"]
        );
        assert_eq!(
            corpus.sentences[0].tags(),
            [
                EntityTag::Person,
                EntityTag::Person,
                EntityTag::Outside,
                EntityTag::Location,
            ]
        );
        assert!(corpus.unknown_ids.is_empty());
    }

    #[test]
    fn test_span_order_does_not_matter() {
        let texts = texts(&[("1", "Barack Obama visited Paris")]);
        let annotations = [
            Annotation::new("1", 21, 26, "Location"),
            Annotation::new("1", 0, 13, "Person"),
        ];
        let corpus = run(&annotations, &texts);
        assert_eq!(
            corpus.sentences[0].tags(),
            [
                EntityTag::Person,
                EntityTag::Person,
                EntityTag::Outside,
                EntityTag::Location,
            ]
        );
    }

    #[test]
    fn test_repeated_word_outside_span_stays_outside() {
        let texts = texts(&[("7", "Paris Hilton landed in Paris")]);
        let annotations = [Annotation::new("7", 0, 12, "Person")];

        let corpus = run(&annotations, &texts);
        assert_eq!(
            corpus.sentences[0].tags(),
            [
                EntityTag::Person,
                EntityTag::Person,
                EntityTag::Outside,
                EntityTag::Outside,
                EntityTag::Outside,
            ]
        );
    }

    #[test]
    fn test_unknown_document_is_collected() {
        let texts = texts(&[("1", "Hello London")]);
        let annotations = [
            Annotation::new("404", 0, 5, "Person"),
            Annotation::new("1", 6, 12, "Location"),
            Annotation::new("404", 6, 9, "Person"),
        ];

        let corpus = run(&annotations, &texts);
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.doc_ids, ["1"]);
        assert_eq!(corpus.unknown_ids.iter().collect::<Vec<_>>(), ["404"]);
    }

    #[test]
    fn test_documents_in_first_seen_order() {
        let texts = texts(&[("a", "Apple"), ("b", "Berlin"), ("c", "Carl")]);
        let annotations = [
            Annotation::new("c", 0, 4, "Character"),
            Annotation::new("a", 0, 5, "Organization"),
            Annotation::new("c", 0, 4, "Character"),
        ];

        let corpus = run(&annotations, &texts);
        assert_eq!(corpus.doc_ids, ["c", "a"]);
        assert_eq!(corpus.sentences[0].tags(), [EntityTag::Person]);
        assert_eq!(corpus.sentences[1].tags(), [EntityTag::Organization]);
    }

    #[test]
    fn test_label_correction() {
        let texts = texts(&[("1", "Acme rocks")]);
        let annotations = [Annotation::new("1", 0, 4, "Organization373937812812615000")];

        assert_eq!(
            run(&annotations, &texts).sentences[0].tags()[0],
            EntityTag::Organization
        );

        let tokenizer = TreebankTokenizer::new().unwrap();
        let mut reconciler = Reconciler::new(&texts, &tokenizer).with_label_corrections(false);
        reconciler.apply(&annotations[0]).unwrap();
        let corpus = reconciler.finish().unwrap();
        assert_eq!(corpus.sentences[0].tags()[0], EntityTag::Misc);
    }

    #[test]
    fn test_unmapped_label_becomes_misc() {
        let texts = texts(&[("1", "I love Nutella")]);
        let annotations = [Annotation::new("1", 7, 14, "Product")];
        let corpus = run(&annotations, &texts);
        assert_eq!(
            corpus.sentences[0].tags(),
            [EntityTag::Outside, EntityTag::Outside, EntityTag::Misc]
        );
    }

    #[test]
    fn test_character_offsets_with_non_ascii_text() {
        // "Café" is 4 characters but 5 bytes.
        let texts = texts(&[("1", "Café in Zürich")]);
        let annotations = [Annotation::new("1", 8, 14, "Location")];
        let corpus = run(&annotations, &texts);
        assert_eq!(corpus.sentences[0].tokens(), ["Café", "in", "Zürich"]);
        assert_eq!(
            corpus.sentences[0].tags(),
            [EntityTag::Outside, EntityTag::Outside, EntityTag::Location]
        );
    }

    #[test]
    fn test_span_past_end_is_clamped() {
        let texts = texts(&[("1", "see Rome")]);
        let annotations = [Annotation::new("1", 4, 400, "Location")];
        let corpus = run(&annotations, &texts);
        assert_eq!(
            corpus.sentences[0].tags(),
            [EntityTag::Outside, EntityTag::Location]
        );
    }

    #[test]
    fn test_document_with_empty_span_is_still_emitted() {
        let texts = texts(&[("1", "nothing here")]);
        let annotations = [Annotation::new("1", 5, 5, "Person")];
        let corpus = run(&annotations, &texts);
        assert_eq!(corpus.len(), 1);
        assert!(corpus.sentences[0].tags().iter().all(|t| !t.is_entity()));
    }

    #[test]
    fn test_flatten_and_parts() {
        let texts = texts(&[("1", "Hello London"), ("2", "Bye Tokyo")]);
        let annotations = [
            Annotation::new("1", 6, 12, "Location"),
            Annotation::new("2", 4, 9, "Location"),
            Annotation::new("3", 0, 1, "Person"),
        ];
        let corpus = run(&annotations, &texts);

        let words = corpus.flatten();
        assert_eq!(words.words, ["Hello", "London", "Bye", "Tokyo"]);
        assert_eq!(words.tags.len(), 4);
        assert!(words.unknown_ids.contains("3"));

        let (tokens, tags, unknown) = corpus.into_parts();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tags[1], [EntityTag::Outside, EntityTag::Location]);
        assert_eq!(unknown.len(), 1);
    }

    #[test]
    fn test_read_annotations() {
        let input = "\
100\t0\t5\thttp://dbpedia.org/resource/Obama\t0.9\tPerson
100\t10\t15\tNIL\t\tLocation
";
        let annotations = read_annotations(input.as_bytes()).unwrap();
        assert_eq!(annotations.len(), 2);
        assert_eq!(annotations[0].doc_id, "100");
        assert_eq!(annotations[0].start, 0);
        assert_eq!(annotations[0].end, 5);
        assert_eq!(annotations[0].confidence, Some(0.9));
        assert_eq!(annotations[1].label, "Location");
        assert_eq!(annotations[1].confidence, None);
    }

    #[test]
    fn test_read_annotations_rejects_bad_rows() {
        let short = "100\t0\t5\tPerson\n";
        assert!(matches!(
            read_annotations(short.as_bytes()),
            Err(NerprepError::MalformedLine { line: 1, .. })
        ));

        let bad_offset = "100\tzero\t5\tNIL\t1\tPerson\n";
        let err = read_annotations(bad_offset.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("start"));
    }

    #[test]
    fn test_read_texts_strips_pipes() {
        let input = "\
|100|,|Barack Obama visited Paris|
|101|,|Hello, world|
102,plain text
";
        let texts = read_texts(input.as_bytes()).unwrap();
        assert_eq!(texts.len(), 3);
        assert_eq!(texts["100"], "Barack Obama visited Paris");
        assert_eq!(texts["101"], "Hello, world");
        assert_eq!(texts["102"], "plain text");
    }

    #[test]
    fn test_read_texts_rejoins_unquoted_commas() {
        let input = "7,one, two, three\n";
        let texts = read_texts(input.as_bytes()).unwrap();
        assert_eq!(texts["7"], "one, two, three");
    }

    #[test]
    fn test_read_texts_keeps_leading_whitespace() {
        let texts = read_texts("|1|,|   Obama in Paris|\n".as_bytes()).unwrap();
        assert_eq!(texts["1"], "   Obama in Paris");

        let corpus = run(&[Annotation::new("1", 3, 8, "Person")], &texts);
        assert_eq!(corpus.sentences[0].tokens(), ["Obama", "in", "Paris"]);
        assert_eq!(
            corpus.sentences[0].tags(),
            [EntityTag::Person, EntityTag::Outside, EntityTag::Outside]
        );
    }
}
