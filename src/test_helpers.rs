//! Shared test utilities for the prompt2image test suite.
//!
//! Provides fixture builders and fakes for the two seams the workflow is built
//! around: [`InMemoryRepository`] stands in for the prompt/output directories
//! and [`StubGenerator`] for the remote image service.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let repo = InMemoryRepository::new()
//!     .with_prompt("sunset", "A red sunset")
//!     .with_output("sunset_20240101_120000.png");
//! let gallery = gallery::collect(&repo).unwrap();
//!
//! let generator = StubGenerator::image(png_bytes(8, 4));
//! let outcome = generate_from_file(&path, &generator, &writer).await.unwrap();
//! assert_eq!(generator.calls(), 1);
//! ```

use async_trait::async_trait;
use image::ImageFormat;
use std::sync::Mutex;
use std::time::Duration;

use crate::client::{ClientError, GeneratedImage, ImageGenerator};
use crate::prompt::Prompt;
use crate::repository::{Repository, RepositoryError};

// =========================================================================
// Fixtures
// =========================================================================

pub fn prompt(base_name: &str, text: &str) -> Prompt {
    Prompt {
        base_name: base_name.to_string(),
        text: text.to_string(),
    }
}

/// A valid PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    crate::imaging::tests::encoded_image(width, height, ImageFormat::Png)
}

// =========================================================================
// In-memory repository
// =========================================================================

#[derive(Debug, Default)]
pub struct InMemoryRepository {
    prompts: Vec<Prompt>,
    outputs: Vec<String>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prompt(mut self, base_name: &str, text: &str) -> Self {
        self.prompts.push(prompt(base_name, text));
        self
    }

    pub fn with_output(mut self, filename: &str) -> Self {
        self.outputs.push(filename.to_string());
        self
    }
}

impl Repository for InMemoryRepository {
    fn list_prompts(&self) -> Result<Vec<Prompt>, RepositoryError> {
        let mut prompts = self.prompts.clone();
        prompts.sort_by(|a, b| a.base_name.cmp(&b.base_name));
        Ok(prompts)
    }

    fn list_outputs(&self) -> Result<Vec<String>, RepositoryError> {
        let mut outputs = self.outputs.clone();
        outputs.sort();
        Ok(outputs)
    }
}

// =========================================================================
// Stub generator
// =========================================================================

enum StubResponse {
    Image(Vec<u8>),
    Api { status: u16, message: String },
}

/// Records every prompt it receives and answers with a canned response.
pub struct StubGenerator {
    response: StubResponse,
    received: Mutex<Vec<String>>,
}

impl StubGenerator {
    /// Always answers with `data`.
    pub fn image(data: Vec<u8>) -> Self {
        Self::new(StubResponse::Image(data))
    }

    /// Always fails with an API error.
    pub fn failing_api(status: u16, message: &str) -> Self {
        Self::new(StubResponse::Api {
            status,
            message: message.to_string(),
        })
    }

    fn new(response: StubResponse) -> Self {
        Self {
            response,
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.received.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageGenerator for StubGenerator {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ClientError> {
        self.received.lock().unwrap().push(prompt.to_string());
        match &self.response {
            StubResponse::Image(data) => Ok(GeneratedImage {
                data: data.clone(),
                mime_type: "image/png".to_string(),
                model: self.model().to_string(),
                duration: Duration::from_millis(5),
            }),
            StubResponse::Api { status, message } => Err(ClientError::Api {
                status: *status,
                message: message.clone(),
            }),
        }
    }

    fn model(&self) -> &str {
        "stub-model"
    }
}
