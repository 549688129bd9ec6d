//! Centralized filename handling for the `{base}_{YYYYMMDD_HHMMSS}.png` convention.
//!
//! Prompts and generated images are joined by base name. A prompt file
//! `prompts/sunset.txt` has base name `sunset`; every generation of it lands in
//! `outputs/` as `sunset_20240102_090000.png`. This module owns both directions
//! of that mapping so the writer, the gallery, and `view-prompt` agree on it.
//!
//! ## Display Titles
//!
//! Underscores and dashes in base names become spaces and each word is
//! capitalized:
//! - `vayu_bench` → "Vayu Bench"
//! - `misty-forest-dawn` → "Misty Forest Dawn"

use chrono::NaiveDateTime;

/// `chrono` format string for the timestamp component.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Extension of every generated image.
pub const OUTPUT_EXTENSION: &str = "png";

/// Extension of every prompt file.
pub const PROMPT_EXTENSION: &str = "txt";

/// Length of `_YYYYMMDD_HHMMSS`.
const SUFFIX_LEN: usize = 16;

/// Result of parsing a generated image filename like `sunset_20240102_090000.png`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedOutputName {
    /// Text before the timestamp suffix (the candidate prompt base name).
    pub base_name: String,
    /// Generation time encoded in the filename.
    pub timestamp: NaiveDateTime,
}

impl ParsedOutputName {
    /// Calendar date of the generation as `YYYY-MM-DD`.
    pub fn date(&self) -> String {
        self.timestamp.format("%Y-%m-%d").to_string()
    }
}

/// Build the output filename for a generation at `timestamp`.
pub fn output_filename(base_name: &str, timestamp: NaiveDateTime) -> String {
    format!(
        "{}_{}.{}",
        base_name,
        timestamp.format(TIMESTAMP_FORMAT),
        OUTPUT_EXTENSION
    )
}

/// Parse a generated image filename.
///
/// Returns `None` unless the name ends in `_YYYYMMDD_HHMMSS.png` with a real
/// calendar date and time, preceded by a non-empty base name.
///
/// - `"sunset_20240102_090000.png"` → base=`sunset`, 2024-01-02 09:00:00
/// - `"golden_hour_20240102_090000.png"` → base=`golden_hour`
/// - `"sunset.png"` → `None`
/// - `"sunset_20241399_090000.png"` → `None` (month 13)
pub fn parse_output_name(filename: &str) -> Option<ParsedOutputName> {
    let ext_start = filename.len().checked_sub(OUTPUT_EXTENSION.len() + 1)?;
    if !filename.is_char_boundary(ext_start) {
        return None;
    }
    let (stem, ext) = filename.split_at(ext_start);
    if !ext
        .strip_prefix('.')
        .is_some_and(|e| e.eq_ignore_ascii_case(OUTPUT_EXTENSION))
    {
        return None;
    }
    if stem.len() <= SUFFIX_LEN || !stem.is_char_boundary(stem.len() - SUFFIX_LEN) {
        return None;
    }
    let (base, suffix) = stem.split_at(stem.len() - SUFFIX_LEN);
    let digits = suffix.strip_prefix('_')?;
    if !is_timestamp_shaped(digits) {
        return None;
    }
    let timestamp = NaiveDateTime::parse_from_str(digits, TIMESTAMP_FORMAT).ok()?;
    Some(ParsedOutputName {
        base_name: base.to_string(),
        timestamp,
    })
}

/// `YYYYMMDD_HHMMSS`: eight digits, underscore, six digits.
fn is_timestamp_shaped(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 15
        && bytes[8] == b'_'
        && bytes[..8].iter().all(u8::is_ascii_digit)
        && bytes[9..].iter().all(u8::is_ascii_digit)
}

/// Human-readable title for a base name.
pub fn display_title(base_name: &str) -> String {
    base_name
        .split(['_', '-', ' '])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Derive a base name from free-form prompt text.
///
/// Takes the first three words, lowercases them, keeps at most ten characters
/// of each, drops anything that is not alphanumeric, and joins with `-`.
/// Falls back to `"image"` when nothing survives.
pub fn base_name_from_prompt(prompt: &str) -> String {
    let name = prompt
        .split_whitespace()
        .take(3)
        .map(|w| {
            w.to_lowercase()
                .chars()
                .take(10)
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
        })
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if name.is_empty() {
        "image".to_string()
    } else {
        name
    }
}

/// Normalize a user-supplied base name: drop a trailing `.png`/`.txt` and
/// replace spaces with dashes.
pub fn normalize_base_name(name: &str) -> String {
    let trimmed = name.trim();
    let stem = trimmed
        .strip_suffix(".png")
        .or_else(|| trimmed.strip_suffix(".txt"))
        .unwrap_or(trimmed);
    stem.replace(' ', "-")
}
