//! Lightweight scanner, the fallback when the full parser yields too little.
//!
//! Works directly on the raw bytes:
//! 1. Decode the whole buffer as latin1 and collect `Tj`/`TJ` strings (uncompressed content).
//! 2. Inflate each `/FlateDecode` stream in file order and collect its strings.
//! 3. Join pieces with newlines and normalise whitespace.
//!
//! A stream that fails to inflate contributes nothing; scanning moves on to the next one.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::extraction::operators::collect_show_strings;
use crate::extraction::streams::{FlateInflater, StreamInflater, StreamLocator};

static SPACE_BEFORE_NEWLINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+\n").expect("space-before-newline pattern is valid"));

static BLANK_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("blank-run pattern is valid"));

#[derive(Clone)]
pub struct LightweightScanner {
    inflater: Option<Arc<dyn StreamInflater>>,
}

impl Default for LightweightScanner {
    fn default() -> Self {
        Self::new(Some(Arc::new(FlateInflater)))
    }
}

impl LightweightScanner {
    /// With `inflater = None` only uncompressed content is scanned.
    pub fn new(inflater: Option<Arc<dyn StreamInflater>>) -> Self {
        Self { inflater }
    }

    pub fn scan(&self, bytes: &[u8]) -> String {
        let mut pieces = Vec::new();
        collect_show_strings(&latin1(bytes), &mut pieces);

        if let Some(inflater) = &self.inflater {
            for record in StreamLocator::new(bytes).filter(|r| r.has_flate) {
                match inflater.inflate(record.data(bytes)) {
                    Ok(inflated) => collect_show_strings(&latin1(&inflated), &mut pieces),
                    Err(e) => debug!(offset = record.data_start, "Skipping stream: {e}"),
                }
            }
        }

        normalize_text(&pieces.join("\n"))
    }
}

/// One char per byte. PDF syntax is ASCII, so structural tokens survive intact.
pub fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Replaces every whitespace run ending in a newline with a single newline,
/// collapses three or more newlines into a blank line, and trims the result.
///
/// The whitespace run includes earlier newlines, so blank lines left by empty
/// pieces or escaped `\n\n` sequences disappear.
pub fn normalize_text(raw: &str) -> String {
    let stripped = SPACE_BEFORE_NEWLINE_RE.replace_all(raw, "\n");
    BLANK_RUN_RE
        .replace_all(&stripped, "\n\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::ExtractError;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn zlib(data: &[u8]) -> Vec<u8> {
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    fn flate_object(num: u32, content: &[u8]) -> Vec<u8> {
        let body = zlib(content);
        let mut obj = format!(
            "{num} 0 obj\n<< /Length {} /Filter /FlateDecode >>\nstream\n",
            body.len()
        )
        .into_bytes();
        obj.extend_from_slice(&body);
        obj.extend_from_slice(b"\nendstream\nendobj\n");
        obj
    }

    fn pdf_with_streams(streams: &[&[u8]]) -> Vec<u8> {
        let mut pdf = b"%PDF-1.4\n".to_vec();
        for (i, content) in streams.iter().enumerate() {
            pdf.extend(flate_object(i as u32 + 1, content));
        }
        pdf.extend_from_slice(b"trailer\n<< >>\n%%EOF\n");
        pdf
    }

    /// Fails on the first call, then delegates to `FlateInflater`.
    struct FailFirst {
        calls: AtomicUsize,
    }

    impl StreamInflater for FailFirst {
        fn inflate(&self, data: &[u8]) -> Result<Vec<u8>, ExtractError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(ExtractError::Inflate("simulated failure".to_string()));
            }
            FlateInflater.inflate(data)
        }
    }

    #[test]
    fn test_uncompressed_show_string() {
        let pdf = b"%PDF-1.4\n1 0 obj\n<< /Length 30 >>\nstream\nBT (Hello World) Tj ET\nendstream\nendobj\n";
        assert_eq!(LightweightScanner::default().scan(pdf), "Hello World");
    }

    #[test]
    fn test_uncompressed_array() {
        let pdf = b"BT [(Foo)-250(Bar)] TJ ET";
        assert_eq!(LightweightScanner::default().scan(pdf), "FooBar");
    }

    #[test]
    fn test_escaped_parentheses() {
        let pdf = br"BT (A \(test\) B) Tj ET";
        assert_eq!(LightweightScanner::default().scan(pdf), "A (test) B");
    }

    #[test]
    fn test_flate_stream_is_inflated() {
        let pdf = pdf_with_streams(&[b"BT /F1 11 Tf (Jane Doe) Tj ET"]);
        assert_eq!(LightweightScanner::default().scan(&pdf), "Jane Doe");
    }

    #[test]
    fn test_stream_without_filter_is_not_inflated() {
        let body = zlib(b"(Hidden) Tj");
        let mut pdf = b"1 0 obj\n<< /Length 9 >>\nstream\n".to_vec();
        pdf.extend_from_slice(&body);
        pdf.extend_from_slice(b"\nendstream\nendobj\n");
        assert_eq!(LightweightScanner::default().scan(&pdf), "");
    }

    #[test]
    fn test_without_inflater_only_uncompressed_content() {
        let mut pdf = b"BT (Visible) Tj ET\n".to_vec();
        pdf.extend(flate_object(1, b"(Compressed) Tj"));
        assert_eq!(LightweightScanner::new(None).scan(&pdf), "Visible");
        assert_eq!(
            LightweightScanner::default().scan(&pdf),
            "Visible\nCompressed"
        );
    }

    #[test]
    fn test_failed_stream_does_not_abort_scan() {
        let pdf = pdf_with_streams(&[b"(First) Tj", b"(Second) Tj", b"[(Th)(ird)] TJ"]);
        let scanner = LightweightScanner::new(Some(Arc::new(FailFirst {
            calls: AtomicUsize::new(0),
        })));
        assert_eq!(scanner.scan(&pdf), "Second\nThird");
    }

    #[test]
    fn test_corrupt_stream_is_skipped() {
        let mut pdf = b"1 0 obj\n<< /Filter /FlateDecode >>\nstream\n\xff\xff\xff\xff\nendstream\nendobj\n"
            .to_vec();
        pdf.extend(flate_object(2, b"(After corruption) Tj"));
        assert_eq!(LightweightScanner::default().scan(&pdf), "After corruption");
    }

    #[test]
    fn test_streams_scanned_in_file_order() {
        let mut pdf = b"BT (Header) Tj ET\n".to_vec();
        pdf.extend(flate_object(1, b"(Experience) Tj"));
        pdf.extend(flate_object(2, b"(Education) Tj"));
        assert_eq!(
            LightweightScanner::default().scan(&pdf),
            "Header\nExperience\nEducation"
        );
    }

    #[test]
    fn test_empty_buffer_yields_empty_text() {
        assert_eq!(LightweightScanner::default().scan(b""), "");
    }

    #[test]
    fn test_scan_is_repeatable() {
        let pdf = pdf_with_streams(&[b"(Skills) Tj [(Rust)20( and Go)] TJ"]);
        let scanner = LightweightScanner::default();
        let first = scanner.scan(&pdf);
        assert_eq!(first, "Skills\nRust and Go");
        assert_eq!(scanner.scan(&pdf), first);
    }

    #[test]
    fn test_latin1_keeps_high_bytes() {
        assert_eq!(latin1(b"caf\xe9"), "café");
    }

    #[test]
    fn test_normalize_collapses_blank_runs() {
        assert_eq!(normalize_text("a\n\n\n\nb"), "a\nb");
        assert_eq!(normalize_text("a\n\nb"), "a\nb");
        assert_eq!(normalize_text("a  \t\nb"), "a\nb");
        assert_eq!(normalize_text("a \r\n \nb"), "a\nb");
        assert_eq!(normalize_text("\n\n  a\n"), "a");
        assert_eq!(normalize_text("a\n  b"), "a\n  b");
    }

    #[test]
    fn test_empty_show_string_leaves_no_blank_line() {
        let scanner = LightweightScanner::new(None);
        assert_eq!(scanner.scan(b"(a) Tj () Tj (b) Tj"), "a\nb");
    }

    #[test]
    fn test_escaped_newlines_survive_normalization() {
        let pdf = br"(Line one\nLine two) Tj";
        assert_eq!(
            LightweightScanner::default().scan(pdf),
            "Line one\nLine two"
        );
        assert_eq!(
            LightweightScanner::new(None).scan(br"(a\n\n\nb) Tj"),
            "a\nb"
        );
    }
}
