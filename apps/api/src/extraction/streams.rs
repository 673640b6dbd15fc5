//! Content stream locator and Flate inflation.
//!
//! Streams are found by scanning forward for a `stream` keyword followed by an
//! end-of-line, then the next `endstream`. No xref table or object parsing is
//! involved, so damaged files still yield whatever streams can be found.

use std::io::Read;

use flate2::read::{DeflateDecoder, ZlibDecoder};
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use tracing::debug;

use crate::extraction::ExtractError;

const STREAM_KEYWORD: &[u8] = b"stream";
const ENDSTREAM_KEYWORD: &[u8] = b"endstream";

/// How far before the `stream` keyword the dictionary is searched for a filter.
pub const FILTER_LOOKBEHIND: usize = 800;

/// Upper bound on the inflated size of a single stream.
pub const MAX_INFLATED_BYTES: u64 = 64 * 1024 * 1024;

static FLATE_FILTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/Filter\s*/FlateDecode").expect("filter pattern is valid"));

/// A stream body located in the raw buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamRecord {
    pub data_start: usize,
    pub data_end: usize,
    pub has_flate: bool,
}

impl StreamRecord {
    pub fn data<'a>(&self, bytes: &'a [u8]) -> &'a [u8] {
        &bytes[self.data_start..self.data_end]
    }
}

/// Iterates over the stream bodies of a PDF buffer in file order.
///
/// Iteration stops at the first `stream` keyword without a matching `endstream`.
pub struct StreamLocator<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> StreamLocator<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Finds the next `stream` keyword that opens a body and returns the
    /// keyword offset and the offset of the first data byte.
    fn next_marker(&self, from: usize) -> Option<(usize, usize)> {
        let mut search = from;
        while let Some(at) = find(self.bytes, STREAM_KEYWORD, search) {
            search = at + STREAM_KEYWORD.len();
            if at >= 3 && &self.bytes[at - 3..at] == b"end" {
                continue;
            }
            let rest = &self.bytes[search..];
            if rest.starts_with(b"\r\n") {
                return Some((at, search + 2));
            }
            if rest.starts_with(b"\n") {
                return Some((at, search + 1));
            }
        }
        None
    }
}

impl Iterator for StreamLocator<'_> {
    type Item = StreamRecord;

    fn next(&mut self) -> Option<StreamRecord> {
        let (keyword_at, data_start) = self.next_marker(self.pos)?;
        let data_end = find(self.bytes, ENDSTREAM_KEYWORD, data_start)?;

        let header_start = keyword_at.saturating_sub(FILTER_LOOKBEHIND);
        let has_flate = FLATE_FILTER_RE.is_match(&self.bytes[header_start..keyword_at]);

        self.pos = data_end + ENDSTREAM_KEYWORD.len();
        Some(StreamRecord {
            data_start,
            data_end,
            has_flate,
        })
    }
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| i + from)
}

// ────────────────────────────────────────────────────────────────────────────
// Inflation
// ────────────────────────────────────────────────────────────────────────────

/// Decompresses a Flate-encoded stream body.
///
/// The scanner holds an `Option<Arc<dyn StreamInflater>>`; without one the
/// compressed-stream pass is skipped.
pub trait StreamInflater: Send + Sync {
    fn inflate(&self, data: &[u8]) -> Result<Vec<u8>, ExtractError>;
}

/// Default inflater backed by `flate2`.
///
/// Tries zlib first, then raw deflate. Output decoded before a corrupt block is
/// returned rather than discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlateInflater;

impl StreamInflater for FlateInflater {
    fn inflate(&self, data: &[u8]) -> Result<Vec<u8>, ExtractError> {
        match read_limited(ZlibDecoder::new(data)) {
            Ok(out) => return Ok(out),
            Err((partial, e)) if !partial.is_empty() => {
                debug!(
                    "zlib inflate recovered {} bytes before error: {e}",
                    partial.len()
                );
                return Ok(partial);
            }
            Err((_, e)) => debug!("zlib inflate failed ({e}), trying raw deflate"),
        }

        match read_limited(DeflateDecoder::new(data)) {
            Ok(out) => Ok(out),
            Err((partial, _)) if !partial.is_empty() => Ok(partial),
            Err((_, e)) => Err(ExtractError::Inflate(e.to_string())),
        }
    }
}

fn read_limited<R: Read>(reader: R) -> Result<Vec<u8>, (Vec<u8>, std::io::Error)> {
    let mut out = Vec::new();
    match reader.take(MAX_INFLATED_BYTES).read_to_end(&mut out) {
        Ok(_) => Ok(out),
        Err(e) => Err((out, e)),
    }
}
