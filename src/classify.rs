//! Field content classification
//!
//! Classifies string-coerced scalars into a small set of content kinds and
//! tallies them across one field of a table. Rules are evaluated in a fixed
//! order and the first match wins, so `http://x.com/a.mp4` is a url and
//! never a file path.

use crate::melt::Row;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

static URL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^https?://").unwrap());

static BOOLEAN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(true|false)$").unwrap());

static NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").unwrap());

// Emoji_Component covers the joiners, variation selectors and skin tones
// that glue multi-codepoint emoji together.
static EMOJI_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[\p{Emoji}\p{Emoji_Presentation}\p{Extended_Pictographic}\p{Emoji_Component}]+$",
    )
    .unwrap()
});

static PATH_PREFIX_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(/|\./|[a-zA-Z]:\\)").unwrap());

static EXTENSION_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.[a-zA-Z0-9]{2,4}$").unwrap());

const LONG_STRING_CHARS: usize = 100;

/// Content kind of a single scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    Url,
    Boolean,
    Number,
    Emoji,
    FilePath,
    LongString,
    String,
}

/// Classify an already trimmed string; empty input is absent, not a kind
pub fn classify(value: &str) -> Option<FieldKind> {
    if value.is_empty() {
        return None;
    }

    let kind = if URL_REGEX.is_match(value) {
        FieldKind::Url
    } else if BOOLEAN_REGEX.is_match(value) {
        FieldKind::Boolean
    } else if NUMBER_REGEX.is_match(value) {
        FieldKind::Number
    } else if EMOJI_REGEX.is_match(value) {
        FieldKind::Emoji
    } else if PATH_PREFIX_REGEX.is_match(value) || EXTENSION_REGEX.is_match(value) {
        FieldKind::FilePath
    } else if value.chars().count() > LONG_STRING_CHARS {
        FieldKind::LongString
    } else {
        FieldKind::String
    };

    Some(kind)
}

/// Per-kind occurrence counts for one field
///
/// `other` is kept for output compatibility; every non-empty value lands in
/// one of the seven kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldCounts {
    pub string: usize,
    pub boolean: usize,
    pub number: usize,
    pub url: usize,
    pub emoji: usize,
    pub file_path: usize,
    pub long_string: usize,
    pub other: usize,
}

impl FieldCounts {
    pub fn add(&mut self, kind: FieldKind) {
        let slot = match kind {
            FieldKind::Url => &mut self.url,
            FieldKind::Boolean => &mut self.boolean,
            FieldKind::Number => &mut self.number,
            FieldKind::Emoji => &mut self.emoji,
            FieldKind::FilePath => &mut self.file_path,
            FieldKind::LongString => &mut self.long_string,
            FieldKind::String => &mut self.string,
        };
        *slot += 1;
    }

    pub fn total(&self) -> usize {
        self.string
            + self.boolean
            + self.number
            + self.url
            + self.emoji
            + self.file_path
            + self.long_string
            + self.other
    }
}

/// Coerce a JSON value to the string form the classifier sees
///
/// Null yields `None`; containers are rendered as compact JSON, though
/// `classify_field` counts them as strings without classifying that text.
pub fn coerce_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Tally content kinds of `field` across `rows`, skipping absent and empty values
pub fn classify_field(rows: &[Row], field: &str) -> FieldCounts {
    let mut counts = FieldCounts::default();

    for row in rows {
        let value = match row.get(field) {
            Some(Value::Array(items)) if items.is_empty() => continue,
            // Containers are opaque text to the analyzer
            Some(Value::Object(_) | Value::Array(_)) => {
                counts.add(FieldKind::String);
                continue;
            }
            Some(value) => value,
            None => continue,
        };
        let Some(text) = coerce_scalar(value) else {
            continue;
        };
        if let Some(kind) = classify(&text) {
            counts.add(kind);
        }
    }

    counts
}
