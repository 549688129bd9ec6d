//! # prompt2image
//!
//! Turns plain-text prompt files into images with Google's Gemini image model
//! and publishes them as a single static HTML gallery.
//!
//! # Architecture: Two Workflows
//!
//! ```text
//! generate   prompts/sunset.txt  →  Gemini  →  outputs/sunset_20240102_090000.png
//! gallery    prompts/ + outputs/            →  docs/index.html
//! ```
//!
//! The filesystem is the only shared state. A prompt's file stem is its base
//! name; every image generated from it carries that base name plus a
//! `_YYYYMMDD_HHMMSS` suffix, and the gallery joins the two sides on it. There
//! is no database and no manifest, so deleting an output or editing a prompt
//! is reflected in the next gallery build.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`prompt`] | Reading and saving prompt files |
//! | [`client`] | `ImageGenerator` trait and the Gemini `generateContent` client |
//! | [`imaging`] | Format sniffing, PNG normalization, dimensions |
//! | [`writer`] | Atomic, collision-free timestamped output files |
//! | [`repository`] | `Repository` trait and the directory-backed implementation |
//! | [`gallery`] | Matching images to prompts, ordering, `view-prompt` lookup |
//! | [`render`] | Maud HTML page and atomic page write |
//! | [`workflow`] | The end-to-end operations behind each subcommand |
//! | [`config`] | `prompt2image.toml` loading, merging, validation, CSS colors |
//! | [`naming`] | The `{base}_{YYYYMMDD_HHMMSS}.png` filename convention |
//! | [`output`] | CLI output formatting, text and JSON |
//! | [`error`] | Crate-level error, categories and exit codes |
//!
//! # Design Decisions
//!
//! ## Seams for Testing
//!
//! The two side effects that are awkward in tests sit behind traits:
//! [`client::ImageGenerator`] for the network and [`repository::Repository`]
//! for directory listing. The workflow takes both as parameters, so the full
//! generate and gallery paths run against stubs without an API key.
//!
//! ## Writes Are Atomic
//!
//! Images and the gallery page are staged in a temp file in the destination
//! directory and renamed into place. A failed generation leaves no partial
//! PNG; a failed gallery build leaves the previous page. Image names are
//! claimed with a no-clobber rename, so two runs in the same second get
//! consecutive timestamps instead of overwriting each other.
//!
//! ## Deterministic Gallery
//!
//! The page contains no build time or random ids. Rebuilding with unchanged
//! inputs yields byte-identical HTML, which keeps diffs of a committed
//! `docs/` directory meaningful.

pub mod client;
pub mod config;
pub mod error;
pub mod gallery;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod prompt;
pub mod render;
pub mod repository;
pub mod workflow;
pub mod writer;

#[cfg(test)]
pub(crate) mod test_helpers;
