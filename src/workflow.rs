//! End-to-end operations behind the CLI subcommands.
//!
//! ```text
//! generate   prompts/x.txt ─▶ ImageGenerator ─▶ ensure_png ─▶ outputs/x_{ts}.png
//! new        "text" ─▶ prompts/{name}.txt ─▶ generate
//! gallery    Repository ─▶ gallery::collect ─▶ render_page ─▶ docs/index.html
//! ```
//!
//! The generator and repository are passed in, so every operation here runs
//! against stubs in tests.

use crate::client::{self, ImageGenerator};
use crate::config::Config;
use crate::error::Result;
use crate::gallery;
use crate::imaging::{self, Dimensions};
use crate::naming;
use crate::prompt::{self, PromptError};
use crate::render::{self, ImageLinks};
use crate::repository::Repository;
use crate::writer::OutputWriter;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Result of one successful generation.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub base_name: String,
    pub prompt_path: PathBuf,
    pub output_path: PathBuf,
    pub dimensions: Dimensions,
    pub model: String,
    pub elapsed_ms: u64,
}

/// Generate one image from a prompt file.
///
/// Reads the prompt, sends its trimmed text to `generator`, normalizes the
/// answer to PNG and writes it under a fresh timestamped name. Nothing is
/// written unless every earlier step succeeded.
pub async fn generate_from_file(
    prompt_path: &Path,
    generator: &dyn ImageGenerator,
    writer: &OutputWriter,
) -> Result<GenerationOutcome> {
    let prompt = prompt::read_prompt(prompt_path)?;
    if prompt.body().is_empty() {
        return Err(PromptError::Empty(prompt_path.to_path_buf()).into());
    }

    tracing::info!(base_name = %prompt.base_name, model = generator.model(), "generating image");
    let image = generator.generate(prompt.body()).await?;
    tracing::debug!(
        mime_type = %image.mime_type,
        bytes = image.data.len(),
        elapsed = ?image.duration,
        "image received"
    );

    let png = imaging::ensure_png(image.data)?;
    let dimensions = imaging::dimensions(&png)?;
    let output_path = writer.write(&prompt.base_name, &png)?;

    Ok(GenerationOutcome {
        base_name: prompt.base_name,
        prompt_path: prompt_path.to_path_buf(),
        output_path,
        dimensions,
        model: image.model,
        elapsed_ms: client::elapsed_ms(image.duration),
    })
}

/// Save `text` as a new prompt file and generate from it.
///
/// The base name is `name` (normalized) when given, otherwise derived from
/// the first words of the prompt. An existing prompt file of that name is
/// replaced.
pub async fn generate_inline(
    text: &str,
    name: Option<&str>,
    prompts_dir: &Path,
    generator: &dyn ImageGenerator,
    writer: &OutputWriter,
) -> Result<GenerationOutcome> {
    let base_name = name
        .map(naming::normalize_base_name)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| naming::base_name_from_prompt(text));

    if text.trim().is_empty() {
        let path = prompts_dir.join(format!("{}.{}", base_name, naming::PROMPT_EXTENSION));
        return Err(PromptError::Empty(path).into());
    }

    let path = prompt::save_prompt(prompts_dir, &base_name, text)?;
    tracing::info!(path = %path.display(), "prompt saved");
    generate_from_file(&path, generator, writer).await
}

/// Summary of a gallery build.
#[derive(Debug, Clone, Serialize)]
pub struct GalleryReport {
    pub path: PathBuf,
    pub prompts: usize,
    pub images: usize,
    pub uncaptioned: usize,
}

/// Build the gallery page from `repo` and write it to `config.paths.gallery`.
pub fn publish_gallery(repo: &impl Repository, config: &Config) -> Result<GalleryReport> {
    let gallery = gallery::collect(repo)?;
    let links = ImageLinks::from_config(
        &config.gallery,
        &config.paths.gallery,
        &config.paths.outputs_dir,
    )?;
    let html = render::render_page(&gallery, &config.gallery, &config.colors, &links);
    render::write_page(&config.paths.gallery, &html.into_string())?;

    Ok(GalleryReport {
        path: config.paths.gallery.clone(),
        prompts: gallery.entries.len(),
        images: gallery.matched_image_count(),
        uncaptioned: gallery.uncaptioned.len(),
    })
}
