//! CLI output formatting for every subcommand.
//!
//! # Output Format
//!
//! ## Generate / New
//!
//! ```text
//! Generated sunset
//!     Output: outputs/sunset_20240102_090000.png
//!     Size: 5504x3072
//!     Model: gemini-3-pro-image-preview (41.2s)
//! ```
//!
//! ## Gallery
//!
//! ```text
//! Gallery → docs/index.html
//!     3 prompts, 5 images, 1 uncaptioned
//! ```
//!
//! ## View prompt
//!
//! ```text
//! sunset_20240102_090000.png → sunset
//!
//! A red sunset over a calm sea, painted in oils.
//! ```
//!
//! # Architecture
//!
//! Each subcommand has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Paths are shown
//! relative to the project root when they live under it. With `--json` the
//! same results are serialized with `serde_json` instead.

use crate::gallery::PromptLookup;
use crate::workflow::{GalleryReport, GenerationOutcome};
use serde::Serialize;
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Show `path` relative to `root` when it is inside it.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn plural(n: usize, one: &str, many: &str) -> String {
    format!("{} {}", n, if n == 1 { one } else { many })
}

// ============================================================================
// Generate
// ============================================================================

/// Announced on stderr before the request; generation is slow.
pub fn format_generation_notice(model: &str) -> String {
    format!("Generating with {model}, this usually takes 30-60 seconds...")
}

pub fn print_generation_notice(model: &str) {
    eprintln!("{}", format_generation_notice(model));
}

pub fn format_generate_output(outcome: &GenerationOutcome, root: &Path) -> Vec<String> {
    vec![
        format!("Generated {}", outcome.base_name),
        format!(
            "{}Output: {}",
            indent(1),
            display_path(&outcome.output_path, root)
        ),
        format!("{}Size: {}", indent(1), outcome.dimensions),
        format!(
            "{}Model: {} ({:.1}s)",
            indent(1),
            outcome.model,
            outcome.elapsed_ms as f64 / 1000.0
        ),
    ]
}

pub fn print_generate_output(outcome: &GenerationOutcome, root: &Path) {
    for line in format_generate_output(outcome, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Gallery
// ============================================================================

pub fn format_gallery_output(report: &GalleryReport, root: &Path) -> Vec<String> {
    vec![
        format!("Gallery → {}", display_path(&report.path, root)),
        format!(
            "{}{}, {}, {} uncaptioned",
            indent(1),
            plural(report.prompts, "prompt", "prompts"),
            plural(report.images, "image", "images"),
            report.uncaptioned
        ),
    ]
}

pub fn print_gallery_output(report: &GalleryReport, root: &Path) {
    for line in format_gallery_output(report, root) {
        println!("{}", line);
    }
}

// ============================================================================
// View prompt
// ============================================================================

pub fn format_view_prompt(lookup: &PromptLookup) -> Vec<String> {
    match lookup {
        PromptLookup::Found { image, prompt } => {
            let mut lines = vec![format!("{} → {}", image, prompt.base_name), String::new()];
            lines.extend(prompt.text.trim_end().lines().map(str::to_string));
            lines
        }
        PromptLookup::NoPrompt { image } => {
            vec![image.clone(), format!("{}No matching prompt file", indent(1))]
        }
        PromptLookup::ImageNotFound { query, recent } => {
            let mut lines = vec![format!("No image matching '{}'", query)];
            if !recent.is_empty() {
                lines.push(String::new());
                lines.push("Recent images".to_string());
                lines.extend(recent.iter().map(|name| format!("{}{}", indent(1), name)));
            }
            lines
        }
    }
}

pub fn print_view_prompt(lookup: &PromptLookup) {
    for line in format_view_prompt(lookup) {
        println!("{}", line);
    }
}

// ============================================================================
// JSON
// ============================================================================

pub fn format_json(value: &impl Serialize) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

pub fn print_json(value: &impl Serialize) -> Result<(), serde_json::Error> {
    println!("{}", format_json(value)?);
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Dimensions;
    use crate::test_helpers::prompt;
    use std::path::PathBuf;

    fn outcome() -> GenerationOutcome {
        GenerationOutcome {
            base_name: "sunset".to_string(),
            prompt_path: PathBuf::from("/repo/prompts/sunset.txt"),
            output_path: PathBuf::from("/repo/outputs/sunset_20240102_090000.png"),
            dimensions: Dimensions {
                width: 5504,
                height: 3072,
            },
            model: "gemini-3-pro-image-preview".to_string(),
            elapsed_ms: 41_234,
        }
    }

    #[test]
    fn display_path_inside_root() {
        assert_eq!(
            display_path(Path::new("/repo/docs/index.html"), Path::new("/repo")),
            "docs/index.html"
        );
    }

    #[test]
    fn display_path_outside_root() {
        assert_eq!(
            display_path(Path::new("/elsewhere/a.png"), Path::new("/repo")),
            "/elsewhere/a.png"
        );
    }

    #[test]
    fn generation_notice_names_model() {
        assert_eq!(
            format_generation_notice("gemini-3-pro-image-preview"),
            "Generating with gemini-3-pro-image-preview, this usually takes 30-60 seconds..."
        );
    }

    #[test]
    fn generate_output() {
        let lines = format_generate_output(&outcome(), Path::new("/repo"));
        assert_eq!(
            lines,
            vec![
                "Generated sunset",
                "    Output: outputs/sunset_20240102_090000.png",
                "    Size: 5504x3072",
                "    Model: gemini-3-pro-image-preview (41.2s)",
            ]
        );
    }

    #[test]
    fn gallery_output_pluralizes() {
        let report = GalleryReport {
            path: PathBuf::from("/repo/docs/index.html"),
            prompts: 1,
            images: 5,
            uncaptioned: 0,
        };
        let lines = format_gallery_output(&report, Path::new("/repo"));
        assert_eq!(
            lines,
            vec![
                "Gallery → docs/index.html",
                "    1 prompt, 5 images, 0 uncaptioned"
            ]
        );
    }

    #[test]
    fn view_prompt_found() {
        let lookup = PromptLookup::Found {
            image: "sunset_20240102_090000.png".to_string(),
            prompt: prompt("sunset", "A red sunset\nover the sea\n"),
        };
        assert_eq!(
            format_view_prompt(&lookup),
            vec![
                "sunset_20240102_090000.png → sunset",
                "",
                "A red sunset",
                "over the sea"
            ]
        );
    }

    #[test]
    fn view_prompt_without_prompt() {
        let lookup = PromptLookup::NoPrompt {
            image: "stray.png".to_string(),
        };
        assert_eq!(
            format_view_prompt(&lookup),
            vec!["stray.png", "    No matching prompt file"]
        );
    }

    #[test]
    fn view_prompt_not_found_lists_recent() {
        let lookup = PromptLookup::ImageNotFound {
            query: "moon".to_string(),
            recent: vec!["a.png".to_string(), "b.png".to_string()],
        };
        assert_eq!(
            format_view_prompt(&lookup),
            vec!["No image matching 'moon'", "", "Recent images", "    a.png", "    b.png"]
        );
    }

    #[test]
    fn view_prompt_not_found_without_images() {
        let lookup = PromptLookup::ImageNotFound {
            query: "moon".to_string(),
            recent: vec![],
        };
        assert_eq!(format_view_prompt(&lookup), vec!["No image matching 'moon'"]);
    }

    #[test]
    fn json_lookup_is_tagged() {
        let lookup = PromptLookup::NoPrompt {
            image: "stray.png".to_string(),
        };
        let json: serde_json::Value =
            serde_json::from_str(&format_json(&lookup).unwrap()).unwrap();
        assert_eq!(json["status"], "no_prompt");
        assert_eq!(json["image"], "stray.png");
    }

    #[test]
    fn json_generation_outcome() {
        let json: serde_json::Value =
            serde_json::from_str(&format_json(&outcome()).unwrap()).unwrap();
        assert_eq!(json["base_name"], "sunset");
        assert_eq!(json["dimensions"]["width"], 5504);
        assert_eq!(json["elapsed_ms"], 41_234);
    }
}
