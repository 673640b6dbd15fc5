use std::sync::Arc;

use crate::config::Config;
use crate::extraction::PdfTextExtractor;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Full parser + lightweight scanner, built once at startup.
    pub extractor: Arc<PdfTextExtractor>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let extractor = PdfTextExtractor::with_default_capabilities(config.extraction_policy());
        Self {
            config,
            extractor: Arc::new(extractor),
        }
    }
}
