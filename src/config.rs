//! Project configuration module.
//!
//! Handles loading, validating, and merging `prompt2image.toml`. Stock defaults
//! are overridden by the user's file in the project root; command-line flags
//! override the resulting paths afterwards.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [paths]
//! prompts_dir = "prompts"        # One prompt per *.txt file
//! outputs_dir = "outputs"        # Generated {base}_{YYYYMMDD_HHMMSS}.png files
//! gallery = "docs/index.html"    # Rendered gallery document
//!
//! [generation]
//! model = "gemini-3-pro-image-preview"
//! aspect_ratio = "16:9"
//! image_size = "4K"              # 1K, 2K or 4K
//! timeout_secs = 180
//! api_key_env = "GEMINI_API_KEY"
//!
//! [gallery]
//! title = "AI Generated Images Gallery"
//! subtitle = "Generated with Gemini 3 Pro Image"
//! show_all = false               # Every generation per card, not just the newest
//! # image_base_url = "https://example.com/outputs"
//!
//! [colors.light]
//! background = "#f5f5f7"
//! ...
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Name of the config file looked up in the project root.
pub const CONFIG_FILE: &str = "prompt2image.toml";

const IMAGE_SIZES: &[&str] = &["1K", "2K", "4K"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Project configuration loaded from `prompt2image.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory layout.
    pub paths: PathsConfig,
    /// Remote generation settings.
    pub generation: GenerationConfig,
    /// Gallery page content.
    pub gallery: GalleryConfig,
    /// Gallery color schemes for light and dark modes.
    pub colors: ColorConfig,
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let generation = &self.generation;
        if generation.model.trim().is_empty() {
            return Err(ConfigError::Validation(
                "generation.model must not be empty".into(),
            ));
        }
        if generation.api_key_env.trim().is_empty() {
            return Err(ConfigError::Validation(
                "generation.api_key_env must not be empty".into(),
            ));
        }
        if generation.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "generation.timeout_secs must be non-zero".into(),
            ));
        }
        if !is_aspect_ratio(&generation.aspect_ratio) {
            return Err(ConfigError::Validation(format!(
                "generation.aspect_ratio must look like W:H, got {:?}",
                generation.aspect_ratio
            )));
        }
        if !IMAGE_SIZES.contains(&generation.image_size.as_str()) {
            return Err(ConfigError::Validation(format!(
                "generation.image_size must be one of {}, got {:?}",
                IMAGE_SIZES.join(", "),
                generation.image_size
            )));
        }
        Ok(())
    }

    /// Resolve every configured path against the project root.
    ///
    /// Absolute paths are kept as they are.
    pub fn resolve_paths(&mut self, root: &Path) {
        for path in [
            &mut self.paths.prompts_dir,
            &mut self.paths.outputs_dir,
            &mut self.paths.gallery,
        ] {
            if path.is_relative() {
                *path = root.join(&*path);
            }
        }
    }
}

fn is_aspect_ratio(value: &str) -> bool {
    match value.split_once(':') {
        Some((w, h)) => matches!(
            (w.parse::<u32>(), h.parse::<u32>()),
            (Ok(w), Ok(h)) if w > 0 && h > 0
        ),
        None => false,
    }
}

/// Directory layout shared by the generation and gallery commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Directory holding `*.txt` prompt files.
    pub prompts_dir: PathBuf,
    /// Directory receiving generated PNG files.
    pub outputs_dir: PathBuf,
    /// Destination of the rendered gallery document.
    pub gallery: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            prompts_dir: PathBuf::from("prompts"),
            outputs_dir: PathBuf::from("outputs"),
            gallery: PathBuf::from("docs/index.html"),
        }
    }
}

/// Remote image generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Gemini model identifier.
    pub model: String,
    /// Requested aspect ratio as `W:H`.
    pub aspect_ratio: String,
    /// Requested resolution tier (`1K`, `2K`, `4K`; uppercase K).
    pub image_size: String,
    /// Request timeout in seconds. Expiry is reported as an API failure.
    pub timeout_secs: u64,
    /// Environment variable holding the API key.
    pub api_key_env: String,
}

impl GenerationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gemini-3-pro-image-preview".to_string(),
            aspect_ratio: "16:9".to_string(),
            image_size: "4K".to_string(),
            timeout_secs: 180,
            api_key_env: "GEMINI_API_KEY".to_string(),
        }
    }
}

/// Gallery page content settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Page heading and `<title>`.
    pub title: String,
    /// Line under the heading.
    pub subtitle: String,
    /// Show every generation in a card instead of only the newest.
    pub show_all: bool,
    /// Absolute URL prefix for image links. When absent, links are relative
    /// from the gallery document to the outputs directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base_url: Option<String>,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            title: "AI Generated Images Gallery".to_string(),
            subtitle: "Generated with Gemini 3 Pro Image".to_string(),
            show_all: false,
            image_base_url: None,
        }
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Light mode color scheme.
    pub light: ColorScheme,
    /// Dark mode color scheme.
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    /// Page background.
    pub background: String,
    /// Card background.
    pub card: String,
    /// Primary text color.
    pub text: String,
    /// Secondary text (dates, subtitle).
    pub text_muted: String,
    /// Buttons and links.
    pub accent: String,
    /// Buttons and links on hover.
    pub accent_hover: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#f5f5f7".to_string(),
            card: "#ffffff".to_string(),
            text: "#1d1d1f".to_string(),
            text_muted: "#6e6e73".to_string(),
            accent: "#667eea".to_string(),
            accent_hover: "#5568d3".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#111114".to_string(),
            card: "#1c1c21".to_string(),
            text: "#f2f2f5".to_string(),
            text_muted: "#9a9aa3".to_string(),
            accent: "#8b9cf4".to_string(),
            accent_hover: "#a5b3f7".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(Config::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `prompt2image.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Config, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `prompt2image.toml` in the project root.
///
/// Merges user values on top of stock defaults, rejects unknown keys, and
/// validates the result. Paths are left relative; see [`Config::resolve_paths`].
pub fn load_config(root: &Path) -> Result<Config, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `prompt2image.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# prompt2image configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Directory layout (relative paths are resolved against the project root)
# ---------------------------------------------------------------------------
[paths]
# One prompt per *.txt file; the file stem is the prompt's base name.
prompts_dir = "prompts"

# Generated images, named {base_name}_{YYYYMMDD_HHMMSS}.png.
outputs_dir = "outputs"

# The rendered gallery document (serve its directory as a static site).
gallery = "docs/index.html"

# ---------------------------------------------------------------------------
# Remote generation
# ---------------------------------------------------------------------------
[generation]
model = "gemini-3-pro-image-preview"

# Width:height of the generated image.
aspect_ratio = "16:9"

# Resolution tier: 1K, 2K or 4K (uppercase K).
image_size = "4K"

# Seconds to wait for the service. Generation typically takes 30-60 seconds.
timeout_secs = 180

# Environment variable that holds the API key.
api_key_env = "GEMINI_API_KEY"

# ---------------------------------------------------------------------------
# Gallery page
# ---------------------------------------------------------------------------
[gallery]
title = "AI Generated Images Gallery"
subtitle = "Generated with Gemini 3 Pro Image"

# Show every generation of a prompt instead of only the newest one.
show_all = false

# Absolute URL prefix for image links. When unset, links are relative from
# the gallery document to the outputs directory.
# image_base_url = "https://example.com/outputs"

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#f5f5f7"
card = "#ffffff"
text = "#1d1d1f"
text_muted = "#6e6e73"
accent = "#667eea"
accent_hover = "#5568d3"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#111114"
card = "#1c1c21"
text = "#f2f2f5"
text_muted = "#9a9aa3"
accent = "#8b9cf4"
accent_hover = "#a5b3f7"
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-card: {light_card};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-accent: {light_accent};
    --color-accent-hover: {light_accent_hover};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-card: {dark_card};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-accent: {dark_accent};
        --color-accent-hover: {dark_accent_hover};
    }}
}}"#,
        light_bg = colors.light.background,
        light_card = colors.light.card,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_accent = colors.light.accent,
        light_accent_hover = colors.light.accent_hover,
        dark_bg = colors.dark.background,
        dark_card = colors.dark.card,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_accent = colors.dark.accent,
        dark_accent_hover = colors.dark.accent_hover,
    )
}
