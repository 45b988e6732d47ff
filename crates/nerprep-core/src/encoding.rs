//! One-hot encoding of entity tags in the fixed `[PER, LOC, ORG, MISC, O]`
//! layout.

use crate::tags::EntityTag;

/// A one-hot row, indexed by [`EntityTag::index`].
pub type OneHot = [f32; EntityTag::NUM_TAGS];

/// One-hot encode a single tag.
pub fn one_hot(tag: EntityTag) -> OneHot {
    let mut row = [0.0; EntityTag::NUM_TAGS];
    row[tag.index()] = 1.0;
    row
}

/// One-hot encode a tag sequence, one row per tag.
pub fn encode(tags: &[EntityTag]) -> Vec<OneHot> {
    tags.iter().copied().map(one_hot).collect()
}

/// Decode a score row to the tag at its maximum.
///
/// Ties go to the lowest index. A NaN counts as the maximum, so the first
/// NaN wins. Returns `None` for an empty row or when the maximum sits past
/// the five tag positions.
pub fn decode(scores: &[f32]) -> Option<EntityTag> {
    if let Some(idx) = scores.iter().position(|s| s.is_nan()) {
        return EntityTag::from_index(idx);
    }

    let mut best: Option<(usize, f32)> = None;
    for (idx, &score) in scores.iter().enumerate() {
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((idx, score));
        }
    }
    best.and_then(|(idx, _)| EntityTag::from_index(idx))
}

/// Decode every row, skipping rows that do not decode to a tag.
pub fn decode_all<R: AsRef<[f32]>>(rows: &[R]) -> Vec<EntityTag> {
    rows.iter().filter_map(|row| decode(row.as_ref())).collect()
}
