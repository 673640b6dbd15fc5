use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::extraction::{PdfTextExtractor, TextSource};

/// PDFs yielding fewer characters than this are reported as unreadable.
pub const MIN_READABLE_CHARS: usize = 10;

pub const UNREADABLE_PDF_WARNING: &str =
    "Could not read text from this PDF. Try uploading it again, or re-save it as a text-based PDF.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Pdf,
    Text,
}

impl FileKind {
    /// Only the extension decides: `.pdf` (any case) is a PDF, everything else is text.
    pub fn from_file_name(file_name: &str) -> Self {
        let ext = file_name.rsplit('.').next().unwrap_or_default();
        if ext.eq_ignore_ascii_case("pdf") {
            FileKind::Pdf
        } else {
            FileKind::Text
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadText {
    pub file_name: String,
    pub kind: FileKind,
    pub text: String,
    pub source: TextSource,
    pub char_count: usize,
    pub readable: bool,
    pub warning: Option<String>,
}

/// Turns an uploaded resume into editable text.
pub async fn read_upload_as_text(
    extractor: &PdfTextExtractor,
    file_name: &str,
    bytes: Bytes,
) -> UploadText {
    let kind = FileKind::from_file_name(file_name);
    let size = bytes.len();

    let (text, source) = match kind {
        FileKind::Pdf => {
            let outcome = extractor.extract(bytes).await;
            (outcome.text, outcome.source)
        }
        FileKind::Text => (
            String::from_utf8_lossy(&bytes).into_owned(),
            TextSource::PlainText,
        ),
    };

    let char_count = text.chars().count();
    let readable = kind == FileKind::Text || char_count >= MIN_READABLE_CHARS;
    info!(
        bytes = size,
        chars = char_count,
        source = ?source,
        readable,
        "Upload converted to text"
    );

    UploadText {
        file_name: file_name.to_string(),
        kind,
        text,
        source,
        char_count,
        readable,
        warning: (!readable).then(|| UNREADABLE_PDF_WARNING.to_string()),
    }
}
