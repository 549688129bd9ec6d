//! Gallery page rendering.
//!
//! Turns a [`Gallery`] into one self-contained HTML document and writes it
//! atomically to the configured destination.
//!
//! ## Page Layout
//!
//! - **Header**: configured title and subtitle
//! - **Prompt cards**: one per prompt, in gallery order. A card shows the
//!   newest image (every image with `gallery.show_all`), the generation date,
//!   the display title, the prompt text behind a `<details>` toggle, and a
//!   download link for each image. Prompts that were never generated get a
//!   placeholder instead of an image.
//! - **Uncaptioned**: images no prompt claims, each with a download link.
//!
//! ## CSS
//!
//! `static/gallery.css` is embedded at compile time and prefixed with the
//! color custom properties generated from config, so the document has no
//! external assets besides the images themselves.
//!
//! ## Determinism
//!
//! Nothing time-dependent is rendered: the same gallery and config always
//! produce byte-identical HTML.

use crate::config::{self, ColorConfig, GalleryConfig};
use crate::gallery::{Gallery, GalleryEntry, GalleryImage, UncaptionedImage};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error(transparent)]
    Repository(#[from] crate::repository::RepositoryError),
    #[error("failed to write gallery {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// No relative link leads from the gallery page to the outputs directory.
    #[error(
        "cannot link {gallery} to {outputs}; set gallery.image_base_url or move them onto one volume"
    )]
    Unlinkable { gallery: PathBuf, outputs: PathBuf },
}

const CSS_STATIC: &str = include_str!("../static/gallery.css");

/// Where image links point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageLinks {
    base: String,
}

impl ImageLinks {
    /// Links relative from the page's directory to the outputs directory.
    ///
    /// Either path may be relative to the working directory or contain `..`;
    /// both are made absolute before the link is computed.
    pub fn relative(gallery_file: &Path, outputs_dir: &Path) -> Result<Self, GalleryError> {
        let from = absolute(gallery_file.parent().unwrap_or(Path::new("")))?;
        let to = absolute(outputs_dir)?;
        let base = relative_path(&from, &to).ok_or_else(|| GalleryError::Unlinkable {
            gallery: gallery_file.to_path_buf(),
            outputs: outputs_dir.to_path_buf(),
        })?;
        Ok(Self { base })
    }

    /// Links under an absolute URL prefix.
    pub fn absolute(base_url: &str) -> Self {
        Self {
            base: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Pick absolute links when `base_url` is configured, relative otherwise.
    pub fn from_config(
        gallery: &GalleryConfig,
        gallery_file: &Path,
        outputs_dir: &Path,
    ) -> Result<Self, GalleryError> {
        match &gallery.image_base_url {
            Some(url) => Ok(Self::absolute(url)),
            None => Self::relative(gallery_file, outputs_dir),
        }
    }

    pub fn href(&self, filename: &str) -> String {
        let encoded = encode_path_segment(filename);
        if self.base.is_empty() {
            encoded
        } else {
            format!("{}/{}", self.base, encoded)
        }
    }
}

fn absolute(path: &Path) -> Result<PathBuf, GalleryError> {
    let path = if path.as_os_str().is_empty() {
        Path::new(".")
    } else {
        path
    };
    std::path::absolute(path).map_err(|source| GalleryError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Relative path from absolute directory `from` to absolute `to`,
/// `/`-separated.
///
/// `"/repo/docs"` → `"/repo/outputs"` gives `"../outputs"`. `..` components
/// are resolved lexically. `None` when the two paths share no root, as with
/// different Windows drives.
fn relative_path(from: &Path, to: &Path) -> Option<String> {
    let from = normalized(from);
    let to = normalized(to);
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();
    if from[common..]
        .iter()
        .chain(&to[common..])
        .any(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
    {
        return None;
    }

    let ups = std::iter::repeat_n("..".to_string(), from.len() - common);
    let downs = to[common..]
        .iter()
        .map(|c| c.as_os_str().to_string_lossy().into_owned());
    Some(ups.chain(downs).collect::<Vec<_>>().join("/"))
}

/// Components of an absolute path with `.` dropped and `..` applied.
fn normalized(path: &Path) -> Vec<Component<'_>> {
    let mut out = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.last(), Some(Component::Normal(_))) {
                    out.pop();
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Percent-encode everything outside the URL unreserved set.
fn encode_path_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

/// Render the full gallery document.
pub fn render_page(
    gallery: &Gallery,
    settings: &GalleryConfig,
    colors: &ColorConfig,
    links: &ImageLinks,
) -> Markup {
    let css = format!("{}\n\n{}", config::generate_color_css(colors), CSS_STATIC);

    let content = html! {
        div.container {
            header.site-header {
                h1 { (settings.title) }
                @if !settings.subtitle.is_empty() {
                    p.subtitle { (settings.subtitle) }
                }
            }
            main {
                @if gallery.entries.is_empty() && gallery.uncaptioned.is_empty() {
                    p.empty { "No prompts yet." }
                }
                @if !gallery.entries.is_empty() {
                    section.gallery {
                        @for entry in &gallery.entries {
                            (render_entry(entry, settings.show_all, links))
                        }
                    }
                }
                @if !gallery.uncaptioned.is_empty() {
                    h2.section-title { "Uncaptioned" }
                    section.gallery.uncaptioned {
                        @for image in &gallery.uncaptioned {
                            (render_uncaptioned(image, links))
                        }
                    }
                }
            }
        }
    };

    base_document(&settings.title, &css, content)
}

fn base_document(title: &str, css: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(css)) }
            }
            body {
                (content)
            }
        }
    }
}

fn render_entry(entry: &GalleryEntry, show_all: bool, links: &ImageLinks) -> Markup {
    let shown = if show_all {
        &entry.images[..]
    } else {
        &entry.images[..entry.images.len().min(1)]
    };

    html! {
        article.card id={ "prompt-" (entry.base_name) } {
            @if shown.is_empty() {
                div.card-placeholder { "Not generated yet" }
            }
            @for image in shown {
                a href=(links.href(&image.filename)) {
                    img.card-image src=(links.href(&image.filename)) alt=(entry.title) loading="lazy";
                }
            }
            div.card-content {
                h3.card-title { (entry.title) }
                div.card-meta {
                    @match entry.latest() {
                        Some(latest) => {
                            "Generated: " (latest.date())
                            @if entry.images.len() > 1 {
                                " · " (entry.images.len()) " images"
                            }
                        }
                        None => { "No images" }
                    }
                }
                @if !entry.images.is_empty() {
                    ul.image-list {
                        @for image in &entry.images {
                            (render_download(image, links))
                        }
                    }
                }
                details.prompt {
                    summary { "View prompt" }
                    pre.prompt-text { (entry.prompt_text.trim()) }
                }
            }
        }
    }
}

fn render_download(image: &GalleryImage, links: &ImageLinks) -> Markup {
    html! {
        li {
            time datetime=(image.timestamp.format("%Y-%m-%dT%H:%M:%S")) {
                (image.timestamp.format("%Y-%m-%d %H:%M:%S"))
            }
            a.btn href=(links.href(&image.filename)) download { "Download" }
        }
    }
}

fn render_uncaptioned(image: &UncaptionedImage, links: &ImageLinks) -> Markup {
    let href = links.href(&image.filename);
    html! {
        article.card {
            a href=(href) {
                img.card-image src=(href) alt=(image.title) loading="lazy";
            }
            div.card-content {
                h3.card-title { (image.title) }
                div.card-meta {
                    @match image.date() {
                        Some(date) => { "Generated: " (date) }
                        None => { (image.filename) }
                    }
                }
                a.btn href=(href) download { "Download" }
            }
        }
    }
}

/// Write `html` to `path`, replacing any previous file atomically.
///
/// The document is staged in a temp file beside `path`; a failure before the
/// final rename leaves the previous page untouched.
pub fn write_page(path: &Path, html: &str) -> Result<(), GalleryError> {
    let io_err = |source| GalleryError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(io_err)?;

    let mut staged = NamedTempFile::new_in(dir).map_err(io_err)?;
    staged.write_all(html.as_bytes()).map_err(io_err)?;
    staged.as_file().sync_all().map_err(io_err)?;
    staged.persist(path).map_err(|e| io_err(e.error))?;
    tracing::info!(path = %path.display(), bytes = html.len(), "gallery written");
    Ok(())
}
