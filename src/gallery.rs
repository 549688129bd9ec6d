//! Prompt/image association.
//!
//! Pure functions from the repository's listings to a [`Gallery`]: every
//! generated image whose `_YYYYMMDD_HHMMSS.png` suffix strips down to a known
//! prompt base name joins that prompt's entry; everything else is collected as
//! uncaptioned and shown without prompt text.
//!
//! ## Ordering
//!
//! - Inside an entry, images are newest first.
//! - Entries with images are ordered by their newest image, newest first
//!   (base name breaks ties); prompts that were never generated follow,
//!   alphabetically.
//! - Uncaptioned images are newest first; files without a timestamp come last,
//!   by filename.

use crate::naming::{self, ParsedOutputName};
use crate::prompt::Prompt;
use crate::repository::{Repository, RepositoryError};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Number of images suggested when a lookup misses.
const RECENT_SUGGESTIONS: usize = 10;

/// One generated image file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryImage {
    pub filename: String,
    pub timestamp: NaiveDateTime,
}

impl GalleryImage {
    /// Generation date as `YYYY-MM-DD`.
    pub fn date(&self) -> String {
        self.timestamp.format("%Y-%m-%d").to_string()
    }
}

/// A prompt and every image generated from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryEntry {
    pub base_name: String,
    pub title: String,
    pub prompt_text: String,
    /// Newest first.
    pub images: Vec<GalleryImage>,
}

impl GalleryEntry {
    pub fn latest(&self) -> Option<&GalleryImage> {
        self.images.first()
    }
}

/// An image no prompt claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UncaptionedImage {
    pub filename: String,
    pub title: String,
    pub timestamp: Option<NaiveDateTime>,
}

impl UncaptionedImage {
    pub fn date(&self) -> Option<String> {
        self.timestamp.map(|t| t.format("%Y-%m-%d").to_string())
    }
}

/// Everything the gallery page shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Gallery {
    pub entries: Vec<GalleryEntry>,
    pub uncaptioned: Vec<UncaptionedImage>,
}

impl Gallery {
    /// Images associated with a prompt.
    pub fn matched_image_count(&self) -> usize {
        self.entries.iter().map(|e| e.images.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.uncaptioned.is_empty()
    }
}

/// Read both listings from `repo` and associate them.
pub fn collect(repo: &impl Repository) -> Result<Gallery, RepositoryError> {
    let prompts = repo.list_prompts()?;
    let outputs = repo.list_outputs()?;
    Ok(build_gallery(prompts, &outputs))
}

/// Associate image filenames with prompts by base name.
pub fn build_gallery(prompts: Vec<Prompt>, outputs: &[String]) -> Gallery {
    let mut by_name: BTreeMap<String, GalleryEntry> = BTreeMap::new();
    for prompt in prompts {
        by_name
            .entry(prompt.base_name.clone())
            .or_insert_with(|| GalleryEntry {
                title: naming::display_title(&prompt.base_name),
                base_name: prompt.base_name,
                prompt_text: prompt.text,
                images: Vec::new(),
            });
    }

    let mut uncaptioned = Vec::new();
    for filename in outputs {
        let parsed = naming::parse_output_name(filename);
        let owner = parsed
            .as_ref()
            .and_then(|p| by_name.get_mut(&p.base_name).map(|entry| (entry, p.timestamp)));
        match owner {
            Some((entry, timestamp)) => entry.images.push(GalleryImage {
                filename: filename.clone(),
                timestamp,
            }),
            None => {
                tracing::debug!(filename = %filename, "image matches no prompt");
                uncaptioned.push(uncaptioned_image(filename, parsed));
            }
        }
    }

    let mut entries: Vec<GalleryEntry> = by_name.into_values().collect();
    for entry in &mut entries {
        entry
            .images
            .sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(a.filename.cmp(&b.filename)));
    }
    // BTreeMap order is alphabetical and the sort is stable, so ties and
    // never-generated prompts stay alphabetical.
    entries.sort_by_key(|e| (e.latest().is_none(), Reverse(e.latest().map(|i| i.timestamp))));

    uncaptioned.sort_by(|a, b| {
        (a.timestamp.is_none(), Reverse(a.timestamp), &a.filename).cmp(&(
            b.timestamp.is_none(),
            Reverse(b.timestamp),
            &b.filename,
        ))
    });

    Gallery {
        entries,
        uncaptioned,
    }
}

fn uncaptioned_image(filename: &str, parsed: Option<ParsedOutputName>) -> UncaptionedImage {
    match parsed {
        Some(p) => UncaptionedImage {
            filename: filename.to_string(),
            title: naming::display_title(&p.base_name),
            timestamp: Some(p.timestamp),
        },
        None => {
            let stem = filename.rsplit_once('.').map_or(filename, |(s, _)| s);
            UncaptionedImage {
                filename: filename.to_string(),
                title: naming::display_title(stem),
                timestamp: None,
            }
        }
    }
}

// ============================================================================
// Prompt lookup for a single image
// ============================================================================

/// Outcome of looking up the prompt behind an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PromptLookup {
    /// The image exists and its prompt was found.
    Found { image: String, prompt: Prompt },
    /// The image exists but no prompt claims it.
    NoPrompt { image: String },
    /// No image matched the query; `recent` lists the newest filenames.
    ImageNotFound { query: String, recent: Vec<String> },
}

/// Find an image by exact filename, falling back to the first filename that
/// contains `query` case-insensitively, and resolve its prompt.
pub fn lookup_prompt(
    repo: &impl Repository,
    query: &str,
) -> Result<PromptLookup, RepositoryError> {
    let outputs = repo.list_outputs()?;
    let needle = query.to_lowercase();
    let image = outputs
        .iter()
        .find(|name| name.as_str() == query)
        .or_else(|| outputs.iter().find(|name| name.to_lowercase().contains(&needle)));

    let Some(image) = image else {
        let mut recent: Vec<(Option<NaiveDateTime>, String)> = outputs
            .into_iter()
            .map(|name| (naming::parse_output_name(&name).map(|p| p.timestamp), name))
            .collect();
        recent.sort_by(|a, b| b.cmp(a));
        return Ok(PromptLookup::ImageNotFound {
            query: query.to_string(),
            recent: recent
                .into_iter()
                .take(RECENT_SUGGESTIONS)
                .map(|(_, name)| name)
                .collect(),
        });
    };

    let prompt = match naming::parse_output_name(image) {
        Some(parsed) => repo
            .list_prompts()?
            .into_iter()
            .find(|p| p.base_name == parsed.base_name),
        None => None,
    };

    Ok(match prompt {
        Some(prompt) => PromptLookup::Found {
            image: image.clone(),
            prompt,
        },
        None => PromptLookup::NoPrompt {
            image: image.clone(),
        },
    })
}
