//! Output writer: persists generated PNGs under timestamped names.
//!
//! The timestamp is taken when the file is written, not when the prompt was
//! read, and the write is atomic: bytes go to a temporary file in the output
//! directory which is then persisted without clobbering. If the name for the
//! current second is already taken, the timestamp advances one second at a
//! time until a free name is found, so every write yields a distinct
//! `{base}_{YYYYMMDD_HHMMSS}.png`.

use crate::naming;
use chrono::{Local, NaiveDateTime, TimeDelta};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Upper bound on timestamp bumps before giving up.
const MAX_NAME_ATTEMPTS: u32 = 600;

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no free output name for {base_name} in {dir}")]
    NameExhausted { base_name: String, dir: PathBuf },
}

/// Writes generated images into one output directory.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    dir: PathBuf,
}

impl OutputWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `data` as `{base_name}_{now}.png` and return the written path.
    pub fn write(&self, base_name: &str, data: &[u8]) -> Result<PathBuf, WriteError> {
        self.write_at(base_name, data, Local::now().naive_local())
    }

    /// Write `data` named after `timestamp` (or the next free second).
    pub fn write_at(
        &self,
        base_name: &str,
        data: &[u8],
        timestamp: NaiveDateTime,
    ) -> Result<PathBuf, WriteError> {
        fs::create_dir_all(&self.dir).map_err(|source| WriteError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut staged = self.stage(data)?;
        let mut when = timestamp;
        for _ in 0..MAX_NAME_ATTEMPTS {
            let path = self.dir.join(naming::output_filename(base_name, when));
            match staged.persist_noclobber(&path) {
                Ok(_) => {
                    tracing::info!(path = %path.display(), bytes = data.len(), "image written");
                    return Ok(path);
                }
                Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                    tracing::debug!(path = %path.display(), "output name taken, advancing timestamp");
                    staged = e.file;
                    when += TimeDelta::seconds(1);
                }
                Err(e) => {
                    return Err(WriteError::Io {
                        path,
                        source: e.error,
                    });
                }
            }
        }
        Err(WriteError::NameExhausted {
            base_name: base_name.to_string(),
            dir: self.dir.clone(),
        })
    }

    /// Write the bytes to a hidden temp file next to their final location.
    fn stage(&self, data: &[u8]) -> Result<NamedTempFile, WriteError> {
        let io_err = |source| WriteError::Io {
            path: self.dir.clone(),
            source,
        };
        let mut file = tempfile::Builder::new()
            .prefix(".prompt2image-")
            .suffix(".tmp")
            .tempfile_in(&self.dir)
            .map_err(io_err)?;
        file.write_all(data).map_err(io_err)?;
        file.as_file().sync_all().map_err(io_err)?;
        Ok(file)
    }
}
