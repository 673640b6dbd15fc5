// Resume text extraction
// Full PDF parser first, lightweight Tj/TJ scanner as a fallback, plain text passthrough.
// CPU-bound parsing runs inside tokio::task::spawn_blocking.

pub mod extractor;
pub mod full_text;
pub mod handlers;
pub mod operators;
pub mod scanner;
pub mod streams;
pub mod unescape;
pub mod upload;

use serde::Serialize;
use thiserror::Error;

pub use extractor::{ExtractionPolicy, PdfTextExtractor};
pub use scanner::LightweightScanner;

/// Failures inside a single extraction stage. Never surfaced to clients:
/// the orchestrator logs them and degrades to an empty result.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("extraction capability unavailable: {0}")]
    Unavailable(String),

    #[error("PDF parse error: {0}")]
    Parse(String),

    #[error("stream inflate error: {0}")]
    Inflate(String),

    #[error("blocking task failed: {0}")]
    Join(String),
}

/// Which path produced the returned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSource {
    FullParser,
    LightweightScanner,
    PlainText,
    /// Nothing recoverable. The text is empty.
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionOutcome {
    pub text: String,
    pub source: TextSource,
}

impl ExtractionOutcome {
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            source: TextSource::None,
        }
    }
}
