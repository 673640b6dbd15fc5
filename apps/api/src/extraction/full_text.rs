//! Full PDF parser capability, the first extraction attempt.
//!
//! The parser is optional: it is compiled in through the `full-parser` feature
//! (backed by `pdf-extract`). Availability is resolved once per process by
//! [`full_parser`]; later calls return the cached handle, or `None` when the
//! capability is missing.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use once_cell::sync::OnceCell;
use tracing::info;

use crate::extraction::ExtractError;

/// A complete PDF text extractor. Implement this to swap the first-attempt
/// parser without touching the orchestrator.
#[async_trait]
pub trait FullTextBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns the text of the first `max_pages` pages, one page per line group.
    async fn extract(&self, bytes: Bytes, max_pages: usize) -> Result<String, ExtractError>;
}

static FULL_PARSER: OnceCell<Option<Arc<dyn FullTextBackend>>> = OnceCell::new();

/// Returns the process-wide full parser, initialising it on first use.
///
/// Initialisation runs at most once, including when it resolves to `None`.
pub fn full_parser() -> Option<Arc<dyn FullTextBackend>> {
    FULL_PARSER.get_or_init(load_full_parser).clone()
}

fn load_full_parser() -> Option<Arc<dyn FullTextBackend>> {
    #[cfg(feature = "full-parser")]
    {
        let backend: Arc<dyn FullTextBackend> = Arc::new(PdfExtractBackend);
        info!("Full PDF parser loaded ({})", backend.name());
        Some(backend)
    }
    #[cfg(not(feature = "full-parser"))]
    {
        info!("Full PDF parser not compiled in; using lightweight scanner only");
        None
    }
}

/// Joins per-page text the way pages are presented to the user: one block per
/// page, separated by a newline, outer whitespace trimmed.
pub fn join_pages<I, S>(pages: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    pages
        .into_iter()
        .map(|p| p.as_ref().trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Joins the first `max_pages` pages and drops the rest.
pub fn join_first_pages<S: AsRef<str>>(pages: &[S], max_pages: usize) -> String {
    join_pages(pages.iter().take(max_pages))
}

// ────────────────────────────────────────────────────────────────────────────
// pdf-extract backend
// ────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "full-parser")]
pub struct PdfExtractBackend;

#[cfg(feature = "full-parser")]
#[async_trait]
impl FullTextBackend for PdfExtractBackend {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    async fn extract(&self, bytes: Bytes, max_pages: usize) -> Result<String, ExtractError> {
        // pdf-extract is synchronous and panics on some malformed inputs;
        // a panic surfaces here as a JoinError. It decodes every page before
        // returning, so `max_pages` bounds the output and not the parsing work.
        tokio::task::spawn_blocking(move || {
            let pages = pdf_extract::extract_text_from_mem_by_pages(&bytes)
                .map_err(|e| ExtractError::Parse(format!("{e:?}")))?;
            Ok::<_, ExtractError>(join_first_pages(&pages, max_pages))
        })
        .await
        .map_err(|e| ExtractError::Join(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_parser_initialises_once() {
        let first = full_parser();
        let second = full_parser();
        match (first, second) {
            (Some(a), Some(b)) => assert!(Arc::ptr_eq(&a, &b)),
            (None, None) => {}
            _ => panic!("capability changed between calls"),
        }
    }

    #[test]
    fn test_join_pages_trims() {
        let pages = vec!["  Page one  \n", "Page two\n\n", ""];
        assert_eq!(join_pages(pages), "Page one\nPage two");
    }

    #[test]
    fn test_join_first_pages_drops_pages_past_bound() {
        let pages = ["Experience", "Education", "References"];
        assert_eq!(join_first_pages(&pages, 2), "Experience\nEducation");
        assert_eq!(join_first_pages(&pages, 20), "Experience\nEducation\nReferences");
        assert_eq!(join_first_pages(&pages, 0), "");
    }

    #[cfg(feature = "full-parser")]
    #[tokio::test]
    async fn test_pdf_extract_rejects_garbage() {
        let result = PdfExtractBackend
            .extract(Bytes::from_static(b"not a pdf"), 20)
            .await;
        assert!(result.is_err());
    }

    #[cfg(feature = "full-parser")]
    #[tokio::test]
    async fn test_pdf_extract_empty_buffer_is_error() {
        let result = PdfExtractBackend.extract(Bytes::new(), 20).await;
        assert!(result.is_err());
    }
}
