//! Directory discovery for the gallery.
//!
//! [`Repository`] hides where prompts and outputs come from so the matching
//! logic in [`crate::gallery`] can run against in-memory data. The disk-backed
//! [`FsRepository`] treats a missing directory as empty.

use crate::naming::{OUTPUT_EXTENSION, PROMPT_EXTENSION};
use crate::prompt::{self, Prompt};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("failed to list {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Source of prompts and generated image filenames.
pub trait Repository {
    /// All prompts, sorted by base name.
    fn list_prompts(&self) -> Result<Vec<Prompt>, RepositoryError>;

    /// All generated image filenames (no directory), sorted.
    fn list_outputs(&self) -> Result<Vec<String>, RepositoryError>;
}

/// Prompts and outputs read from two directories on disk.
#[derive(Debug, Clone)]
pub struct FsRepository {
    prompts_dir: PathBuf,
    outputs_dir: PathBuf,
}

impl FsRepository {
    pub fn new(prompts_dir: impl Into<PathBuf>, outputs_dir: impl Into<PathBuf>) -> Self {
        Self {
            prompts_dir: prompts_dir.into(),
            outputs_dir: outputs_dir.into(),
        }
    }

    pub fn prompts_dir(&self) -> &Path {
        &self.prompts_dir
    }

    pub fn outputs_dir(&self) -> &Path {
        &self.outputs_dir
    }
}

impl Repository for FsRepository {
    fn list_prompts(&self) -> Result<Vec<Prompt>, RepositoryError> {
        let mut prompts = Vec::new();
        for path in files_with_extension(&self.prompts_dir, PROMPT_EXTENSION)? {
            match prompt::read_prompt(&path) {
                Ok(p) => prompts.push(p),
                Err(e) => tracing::warn!("skipping unreadable prompt: {e}"),
            }
        }
        prompts.sort_by(|a, b| a.base_name.cmp(&b.base_name));
        Ok(prompts)
    }

    fn list_outputs(&self) -> Result<Vec<String>, RepositoryError> {
        let mut names: Vec<String> = files_with_extension(&self.outputs_dir, OUTPUT_EXTENSION)?
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        names.sort();
        Ok(names)
    }
}

/// Regular, non-hidden files directly inside `dir` with the given extension
/// (case-insensitive). A missing directory yields an empty list.
fn files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, RepositoryError> {
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "directory missing, treating as empty");
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|source| RepositoryError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() || entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.into_path();
        let matches = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case(extension))
            .unwrap_or(false);
        if matches {
            files.push(path);
        }
    }
    Ok(files)
}
