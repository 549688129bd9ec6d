//! Prompt files.
//!
//! A prompt is a UTF-8 text file; its stem is the base name that every image
//! generated from it carries.

use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("prompt file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read prompt {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("prompt file has no usable file name: {0}")]
    InvalidName(PathBuf),
    #[error("prompt file is empty: {0}")]
    Empty(PathBuf),
}

/// A prompt's base name and full text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prompt {
    pub base_name: String,
    pub text: String,
}

impl Prompt {
    /// Text as sent to the generation service: surrounding whitespace removed.
    pub fn body(&self) -> &str {
        self.text.trim()
    }
}

/// Read a prompt file.
///
/// Returns the file's full text. Fails with [`PromptError::NotFound`] when the
/// path does not exist and [`PromptError::Io`] on any other read failure,
/// including content that is not valid UTF-8.
pub fn read_prompt(path: &Path) -> Result<Prompt, PromptError> {
    let base_name = base_name_of(path)?;
    let text = fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            PromptError::NotFound(path.to_path_buf())
        } else {
            PromptError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    Ok(Prompt { base_name, text })
}

/// Write `text` as `{dir}/{base_name}.txt`, creating `dir` if needed.
pub fn save_prompt(dir: &Path, base_name: &str, text: &str) -> Result<PathBuf, PromptError> {
    let path = dir.join(format!("{}.{}", base_name, crate::naming::PROMPT_EXTENSION));
    let io_err = |source| PromptError::Io {
        path: path.clone(),
        source,
    };
    fs::create_dir_all(dir).map_err(io_err)?;
    fs::write(&path, text).map_err(io_err)?;
    Ok(path)
}

fn base_name_of(path: &Path) -> Result<String, PromptError> {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| PromptError::InvalidName(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn reads_full_text_and_base_name() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sunset.txt");
        fs::write(&path, "  A red sunset\nover the sea\n").unwrap();

        let prompt = read_prompt(&path).unwrap();
        assert_eq!(prompt.base_name, "sunset");
        assert_eq!(prompt.text, "  A red sunset\nover the sea\n");
        assert_eq!(prompt.body(), "A red sunset\nover the sea");
    }

    #[test]
    fn base_name_keeps_inner_dots_and_underscores() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("vayu_bench.v2.txt");
        fs::write(&path, "x").unwrap();
        assert_eq!(read_prompt(&path).unwrap().base_name, "vayu_bench.v2");
    }

    #[test]
    fn missing_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let result = read_prompt(&tmp.path().join("nope.txt"));
        assert!(matches!(result, Err(PromptError::NotFound(_))));
    }

    #[test]
    fn invalid_utf8_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("binary.txt");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();
        assert!(matches!(read_prompt(&path), Err(PromptError::Io { .. })));
    }

    #[test]
    fn directory_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("folder.txt");
        fs::create_dir(&dir).unwrap();
        assert!(matches!(read_prompt(&dir), Err(PromptError::Io { .. })));
    }

    #[test]
    fn save_creates_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("prompts");
        let path = save_prompt(&dir, "a-lighthouse-at", "A lighthouse at dusk").unwrap();
        assert_eq!(path, dir.join("a-lighthouse-at.txt"));
        let prompt = read_prompt(&path).unwrap();
        assert_eq!(prompt.base_name, "a-lighthouse-at");
        assert_eq!(prompt.text, "A lighthouse at dusk");
    }
}
