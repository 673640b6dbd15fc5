//! Extraction orchestrator: full parser first, lightweight scanner when the
//! result is too short.
//!
//! `extract` never fails. Every stage error is logged and treated as an empty
//! result; an empty outcome means nothing could be recovered.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::extraction::full_text::{full_parser, FullTextBackend};
use crate::extraction::scanner::LightweightScanner;
use crate::extraction::{ExtractError, ExtractionOutcome, TextSource};

/// Full-parser results shorter than this trigger the scanner.
pub const DEFAULT_FALLBACK_MIN_CHARS: usize = 40;
/// Pages read by the full parser.
pub const DEFAULT_MAX_PAGES: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionPolicy {
    pub fallback_min_chars: usize,
    pub max_pages: usize,
}

impl Default for ExtractionPolicy {
    fn default() -> Self {
        Self {
            fallback_min_chars: DEFAULT_FALLBACK_MIN_CHARS,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

#[derive(Clone)]
pub struct PdfTextExtractor {
    policy: ExtractionPolicy,
    full_parser: Option<Arc<dyn FullTextBackend>>,
    scanner: LightweightScanner,
}

impl PdfTextExtractor {
    pub fn new(
        policy: ExtractionPolicy,
        full_parser: Option<Arc<dyn FullTextBackend>>,
        scanner: LightweightScanner,
    ) -> Self {
        Self {
            policy,
            full_parser,
            scanner,
        }
    }

    /// Uses the process-wide full parser (if available) and the default Flate scanner.
    pub fn with_default_capabilities(policy: ExtractionPolicy) -> Self {
        Self::new(policy, full_parser(), LightweightScanner::default())
    }

    pub fn policy(&self) -> ExtractionPolicy {
        self.policy
    }

    pub async fn extract(&self, bytes: Bytes) -> ExtractionOutcome {
        let full_text = match self.run_full_parser(bytes.clone()).await {
            Ok(text) => text,
            Err(ExtractError::Unavailable(reason)) => {
                debug!("Full parser skipped: {reason}");
                String::new()
            }
            Err(e) => {
                warn!("Full parser failed, falling back: {e}");
                String::new()
            }
        };

        let full_chars = full_text.chars().count();
        if full_chars >= self.policy.fallback_min_chars {
            return ExtractionOutcome {
                text: full_text,
                source: TextSource::FullParser,
            };
        }

        debug!(
            full_chars,
            threshold = self.policy.fallback_min_chars,
            "Full parser result too short, running lightweight scanner"
        );
        let scanned = match self.run_scanner(bytes).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Lightweight scanner failed: {e}");
                String::new()
            }
        };

        if !scanned.is_empty() {
            ExtractionOutcome {
                text: scanned,
                source: TextSource::LightweightScanner,
            }
        } else if !full_text.is_empty() {
            ExtractionOutcome {
                text: full_text,
                source: TextSource::FullParser,
            }
        } else {
            ExtractionOutcome::empty()
        }
    }

    async fn run_full_parser(&self, bytes: Bytes) -> Result<String, ExtractError> {
        let backend = self
            .full_parser
            .as_ref()
            .ok_or_else(|| ExtractError::Unavailable("no full parser configured".to_string()))?;
        backend.extract(bytes, self.policy.max_pages).await
    }

    async fn run_scanner(&self, bytes: Bytes) -> Result<String, ExtractError> {
        let scanner = self.scanner.clone();
        tokio::task::spawn_blocking(move || scanner.scan(&bytes))
            .await
            .map_err(|e| ExtractError::Join(e.to_string()))
    }
}
