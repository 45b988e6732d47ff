//! # Entity Tag Schema
//!
//! Defines the fixed 5-class label set shared by every corpus and the
//! normalizers that map each corpus' raw vocabulary onto it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Raw NEEL label values known to be malformed in the published annotation
/// table, paired with the value they were meant to carry.
const NEEL_LABEL_CORRECTIONS: &[(&str, &str)] =
    &[("Organization373937812812615000", "Organization")];

/// Normalized entity tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityTag {
    #[serde(rename = "PER")]
    Person,
    #[serde(rename = "LOC")]
    Location,
    #[serde(rename = "ORG")]
    Organization,
    #[serde(rename = "MISC")]
    Misc,
    #[serde(rename = "O")]
    Outside,
}

impl EntityTag {
    /// Total number of distinct tags.
    pub const NUM_TAGS: usize = 5;

    /// Get all tags in one-hot order.
    pub fn all_tags() -> &'static [EntityTag] {
        &[
            EntityTag::Person,
            EntityTag::Location,
            EntityTag::Organization,
            EntityTag::Misc,
            EntityTag::Outside,
        ]
    }

    /// Get the tag's position in the one-hot layout `[PER, LOC, ORG, MISC, O]`.
    pub fn index(&self) -> usize {
        match self {
            EntityTag::Person => 0,
            EntityTag::Location => 1,
            EntityTag::Organization => 2,
            EntityTag::Misc => 3,
            EntityTag::Outside => 4,
        }
    }

    /// Get tag from index.
    pub fn from_index(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(EntityTag::Person),
            1 => Some(EntityTag::Location),
            2 => Some(EntityTag::Organization),
            3 => Some(EntityTag::Misc),
            4 => Some(EntityTag::Outside),
            _ => None,
        }
    }

    /// Short label as written in corpora and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityTag::Person => "PER",
            EntityTag::Location => "LOC",
            EntityTag::Organization => "ORG",
            EntityTag::Misc => "MISC",
            EntityTag::Outside => "O",
        }
    }

    /// Check if this tag marks part of an entity.
    pub fn is_entity(&self) -> bool {
        !matches!(self, EntityTag::Outside)
    }

    /// Normalize a raw NEEL entity type. Unknown types become `MISC`.
    ///
    /// Malformed values are not repaired here, see [`correct_neel_label`].
    pub fn from_neel(raw: &str) -> Self {
        match raw {
            "Character" | "Person" => EntityTag::Person,
            "Location" => EntityTag::Location,
            "Organization" => EntityTag::Organization,
            _ => EntityTag::Misc,
        }
    }

    /// Normalize a raw CoNLL IOB tag. Anything unrecognized becomes `O`.
    pub fn from_conll(raw: &str) -> Self {
        match raw {
            "I-ORG" | "B-ORG" => EntityTag::Organization,
            "I-LOC" | "B-LOC" => EntityTag::Location,
            "I-MISC" | "B-MISC" => EntityTag::Misc,
            "I-PER" | "B-PER" => EntityTag::Person,
            _ => EntityTag::Outside,
        }
    }
}

/// Replace a known-malformed NEEL label with its intended value.
pub fn correct_neel_label(raw: &str) -> &str {
    NEEL_LABEL_CORRECTIONS
        .iter()
        .find(|(bad, _)| *bad == raw)
        .map_or(raw, |(_, good)| *good)
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a string that is not one of the five labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTag(pub String);

impl fmt::Display for UnknownTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown entity tag {:?}", self.0)
    }
}

impl std::error::Error for UnknownTag {}

impl FromStr for EntityTag {
    type Err = UnknownTag;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "PER" => Ok(EntityTag::Person),
            "LOC" => Ok(EntityTag::Location),
            "ORG" => Ok(EntityTag::Organization),
            "MISC" => Ok(EntityTag::Misc),
            "O" => Ok(EntityTag::Outside),
            other => Err(UnknownTag(other.to_string())),
        }
    }
}
