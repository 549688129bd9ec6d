//! Crate-level error type.
//!
//! Each module owns its error enum; [`Error`] wraps them so the CLI can map
//! any failure to a category and an exit code.

use crate::client::ClientError;
use crate::config::ConfigError;
use crate::imaging::ImagingError;
use crate::prompt::PromptError;
use crate::render::GalleryError;
use crate::repository::RepositoryError;
use crate::writer::WriteError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Prompt(#[from] PromptError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Imaging(#[from] ImagingError),
    #[error(transparent)]
    Write(#[from] WriteError),
    #[error(transparent)]
    Gallery(#[from] GalleryError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// The environment variable holding the API key is unset or blank.
    #[error("{0} is not set; export your Gemini API key to generate images")]
    MissingCredential(String),
    #[error("failed to start async runtime: {0}")]
    Runtime(std::io::Error),
    /// No generated image matches a `view-prompt` query.
    #[error("no image matching '{0}'")]
    ImageNotFound(String),
}

impl From<RepositoryError> for Error {
    fn from(err: RepositoryError) -> Self {
        Self::Gallery(GalleryError::Repository(err))
    }
}

/// Broad failure class, used for exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    Auth,
    Api,
    Io,
    Config,
}

impl ErrorCategory {
    pub fn exit_code(self) -> u8 {
        match self {
            Self::NotFound => 2,
            Self::Auth => 3,
            Self::Api => 4,
            Self::Io => 5,
            Self::Config => 6,
        }
    }
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Prompt(PromptError::Io { .. }) => ErrorCategory::Io,
            Self::Prompt(_) | Self::ImageNotFound(_) => ErrorCategory::NotFound,
            Self::Client(ClientError::Auth(_)) | Self::MissingCredential(_) => ErrorCategory::Auth,
            Self::Client(_) | Self::Imaging(_) => ErrorCategory::Api,
            Self::Write(_) | Self::Gallery(_) | Self::Json(_) | Self::Runtime(_) => {
                ErrorCategory::Io
            }
            Self::Config(_) => ErrorCategory::Config,
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.category().exit_code()
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn prompt_errors() {
        let missing: Error = PromptError::NotFound(PathBuf::from("p.txt")).into();
        assert_eq!(missing.category(), ErrorCategory::NotFound);

        let empty: Error = PromptError::Empty(PathBuf::from("p.txt")).into();
        assert_eq!(empty.category(), ErrorCategory::NotFound);

        let io: Error = PromptError::Io {
            path: PathBuf::from("p.txt"),
            source: std::io::Error::other("denied"),
        }
        .into();
        assert_eq!(io.category(), ErrorCategory::Io);
    }

    #[test]
    fn client_errors() {
        let auth: Error = ClientError::Auth("bad key".into()).into();
        assert_eq!(auth.category(), ErrorCategory::Auth);

        let api: Error = ClientError::Api {
            status: 500,
            message: "boom".into(),
        }
        .into();
        assert_eq!(api.category(), ErrorCategory::Api);

        let timeout: Error = ClientError::Timeout(Duration::from_secs(180)).into();
        assert_eq!(timeout.category(), ErrorCategory::Api);

        let blocked: Error = ClientError::Blocked("SAFETY".into()).into();
        assert_eq!(blocked.category(), ErrorCategory::Api);
    }

    #[test]
    fn missing_credential_is_auth() {
        let err = Error::MissingCredential("GEMINI_API_KEY".into());
        assert_eq!(err.category(), ErrorCategory::Auth);
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn write_and_config_errors() {
        let write: Error = WriteError::NameExhausted {
            base_name: "a".into(),
            dir: PathBuf::from("outputs"),
        }
        .into();
        assert_eq!(write.category(), ErrorCategory::Io);

        let config: Error = ConfigError::Validation("bad".into()).into();
        assert_eq!(config.category(), ErrorCategory::Config);
    }

    #[test]
    fn exit_codes_are_distinct_and_nonzero() {
        let codes = [
            ErrorCategory::NotFound,
            ErrorCategory::Auth,
            ErrorCategory::Api,
            ErrorCategory::Io,
            ErrorCategory::Config,
        ]
        .map(ErrorCategory::exit_code);
        assert_eq!(codes, [2, 3, 4, 5, 6]);
    }

    #[test]
    fn display_is_transparent() {
        let err: Error = PromptError::NotFound(PathBuf::from("prompts/x.txt")).into();
        assert_eq!(err.to_string(), "prompt file not found: prompts/x.txt");
    }
}
