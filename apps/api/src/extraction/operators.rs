//! Text-showing operator matcher for decoded content.
//!
//! Recognises the two literal-string text operators:
//! - `(string) Tj` shows one string.
//! - `[(a) -250 (b)] TJ` shows an array of strings with kerning numbers in between.
//!
//! This is a pattern scan, not a content-stream interpreter. Text positioning,
//! font encodings and hex strings are ignored.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::extraction::unescape::unescape_literal;

/// A parenthesised literal. A backslash escapes the next character, so `\)` never closes it.
const LITERAL: &str = r"\((?:\\.|[^\\()])*\)";

static LITERAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("(?s){LITERAL}")).expect("literal pattern is valid"));

static SHOW_STRING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?s)({LITERAL})\s*Tj")).expect("Tj pattern is valid")
});

// Array body: literals, or any non-bracket character. Stray parentheses from
// unbalanced or nested literals pass through so inner literals are still found.
static SHOW_ARRAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?s)\[((?:{LITERAL}|[^\[\]])*)\]\s*TJ"))
        .expect("TJ pattern is valid")
});

/// One matched operator, located by its byte span in the scanned text.
#[derive(Debug)]
struct ShowMatch {
    start: usize,
    end: usize,
    text: Option<String>,
}

/// Appends the text of every `Tj` and `TJ` operator in `content` to `pieces`,
/// in the order the operators appear.
///
/// A `Tj` always contributes a piece (possibly empty). A `TJ` contributes its
/// strings concatenated without separators, and nothing when the array holds no text.
pub fn collect_show_strings(content: &str, pieces: &mut Vec<String>) {
    let mut matches: Vec<ShowMatch> = SHOW_STRING_RE
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let literal = caps.get(1)?;
            Some(ShowMatch {
                start: whole.start(),
                end: whole.end(),
                text: Some(unescape_literal(literal.as_str())),
            })
        })
        .collect();

    matches.extend(SHOW_ARRAY_RE.captures_iter(content).filter_map(|caps| {
        let whole = caps.get(0)?;
        let body = caps.get(1)?;
        let joined: String = LITERAL_RE
            .find_iter(body.as_str())
            .map(|lit| unescape_literal(lit.as_str()))
            .collect();
        Some(ShowMatch {
            start: whole.start(),
            end: whole.end(),
            text: (!joined.is_empty()).then_some(joined),
        })
    }));

    matches.sort_by_key(|m| m.start);

    let mut consumed = 0;
    for m in matches {
        if m.start < consumed {
            continue;
        }
        consumed = m.end;
        if let Some(text) = m.text {
            pieces.push(text);
        }
    }
}
