//! Accuracy and per-class counts over tag sequences.

use std::fmt;

use serde::Serialize;
use tracing::info;

use crate::error::{NerprepError, Result};
use crate::tags::EntityTag;

/// Positional agreement between an expected and a predicted sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccuracyReport {
    pub correct: usize,
    pub total: usize,
}

impl AccuracyReport {
    /// Fraction of matching positions in `[0.0, 1.0]`.
    pub fn ratio(&self) -> f64 {
        self.correct as f64 / self.total as f64
    }

    pub fn percentage(&self) -> f64 {
        self.ratio() * 100.0
    }
}

impl fmt::Display for AccuracyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "accuracy = {} / {} = {:.6}",
            self.correct,
            self.total,
            self.ratio()
        )
    }
}

/// Compare two sequences position by position.
///
/// # Errors
///
/// Returns `NerprepError::EmptyInput` when `expected` is empty and
/// `NerprepError::LengthMismatch` when the lengths differ.
pub fn accuracy<T: PartialEq>(expected: &[T], predicted: &[T]) -> Result<AccuracyReport> {
    if expected.is_empty() {
        return Err(NerprepError::EmptyInput);
    }
    if expected.len() != predicted.len() {
        return Err(NerprepError::LengthMismatch {
            expected: expected.len(),
            actual: predicted.len(),
        });
    }

    let correct = expected
        .iter()
        .zip(predicted)
        .filter(|(e, p)| e == p)
        .count();
    let report = AccuracyReport {
        correct,
        total: expected.len(),
    };
    info!(
        correct = report.correct,
        total = report.total,
        percentage = report.percentage(),
        "computed accuracy"
    );
    Ok(report)
}

/// Number of occurrences of each of the five tags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EntityCounts {
    #[serde(rename = "ORG")]
    pub organization: usize,
    #[serde(rename = "PER")]
    pub person: usize,
    #[serde(rename = "LOC")]
    pub location: usize,
    #[serde(rename = "MISC")]
    pub misc: usize,
    #[serde(rename = "O")]
    pub outside: usize,
}

impl EntityCounts {
    /// Count of a single tag.
    pub fn get(&self, tag: EntityTag) -> usize {
        match tag {
            EntityTag::Organization => self.organization,
            EntityTag::Person => self.person,
            EntityTag::Location => self.location,
            EntityTag::Misc => self.misc,
            EntityTag::Outside => self.outside,
        }
    }

    fn add(&mut self, tag: EntityTag) {
        let slot = match tag {
            EntityTag::Organization => &mut self.organization,
            EntityTag::Person => &mut self.person,
            EntityTag::Location => &mut self.location,
            EntityTag::Misc => &mut self.misc,
            EntityTag::Outside => &mut self.outside,
        };
        *slot += 1;
    }

    /// Sum over all five tags.
    pub fn total(&self) -> usize {
        self.organization + self.person + self.location + self.misc + self.outside
    }

    /// Count already-normalized tags.
    pub fn from_tags(tags: &[EntityTag]) -> Self {
        let mut counts = Self::default();
        for tag in tags {
            counts.add(*tag);
        }
        counts
    }
}

/// Display order of the report lines.
const REPORT_ORDER: [EntityTag; EntityTag::NUM_TAGS] = [
    EntityTag::Organization,
    EntityTag::Person,
    EntityTag::Location,
    EntityTag::Misc,
    EntityTag::Outside,
];

impl fmt::Display for EntityCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tag) in REPORT_ORDER.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", tag, self.get(*tag))?;
        }
        Ok(())
    }
}

/// Count the five labels in a sequence of label strings.
///
/// Strings that are not exactly one of `PER`, `LOC`, `ORG`, `MISC` or `O`
/// are ignored.
pub fn entity_count<S: AsRef<str>>(labels: &[S]) -> EntityCounts {
    let tags: Vec<EntityTag> = labels
        .iter()
        .filter_map(|label| label.as_ref().parse().ok())
        .collect();
    let ignored = labels.len() - tags.len();
    let counts = EntityCounts::from_tags(&tags);
    info!(
        org = counts.organization,
        per = counts.person,
        loc = counts.location,
        misc = counts.misc,
        outside = counts.outside,
        ignored,
        "counted entity labels"
    );
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy() {
        let expected = ["PER", "O", "LOC", "O"];
        let predicted = ["PER", "O", "ORG", "O"];
        let report = accuracy(&expected, &predicted).unwrap();

        assert_eq!(report.correct, 3);
        assert_eq!(report.total, 4);
        assert_eq!(report.ratio(), 0.75);
        assert_eq!(report.percentage(), 75.0);
        assert_eq!(report.to_string(), "accuracy = 3 / 4 = 0.750000");
    }

    #[test]
    fn test_accuracy_on_tags() {
        let expected = [EntityTag::Person, EntityTag::Outside];
        let report = accuracy(&expected, &expected).unwrap();
        assert_eq!(report.ratio(), 1.0);
    }

    #[test]
    fn test_accuracy_empty_is_error() {
        let empty: [EntityTag; 0] = [];
        assert!(matches!(
            accuracy(&empty, &empty),
            Err(NerprepError::EmptyInput)
        ));
    }

    #[test]
    fn test_accuracy_length_mismatch() {
        let err = accuracy(&["O", "O"], &["O"]).unwrap_err();
        assert!(matches!(
            err,
            NerprepError::LengthMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_entity_count() {
        let counts = entity_count(&["ORG", "ORG", "PER", "O"]);
        assert_eq!(counts.organization, 2);
        assert_eq!(counts.person, 1);
        assert_eq!(counts.location, 0);
        assert_eq!(counts.misc, 0);
        assert_eq!(counts.outside, 1);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn test_entity_count_ignores_unknown_labels() {
        let labels = vec!["B-PER".to_string(), "per".to_string(), "MISC".to_string()];
        let counts = entity_count(&labels);
        assert_eq!(counts.misc, 1);
        assert_eq!(counts.total(), 1);
    }

    #[test]
    fn test_entity_count_display() {
        let counts = entity_count(&["ORG", "ORG", "PER", "O"]);
        assert_eq!(counts.to_string(), "ORG: 2\nPER: 1\nLOC: 0\nMISC: 0\nO: 1");
    }

    #[test]
    fn test_counts_from_tags() {
        let counts = EntityCounts::from_tags(&[EntityTag::Location, EntityTag::Location]);
        assert_eq!(counts.get(EntityTag::Location), 2);
        assert_eq!(counts.get(EntityTag::Person), 0);
    }

    #[test]
    fn test_counts_serialize_with_short_labels() {
        let counts = entity_count(&["LOC"]);
        let json = serde_json::to_value(counts).unwrap();
        assert_eq!(json["LOC"], 1);
        assert_eq!(json["O"], 0);
    }
}
