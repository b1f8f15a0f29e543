//! Upload validation — which résumé files are accepted and how they are read.

const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "txt"];

/// How an uploaded file's bytes are turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    /// Word documents. Only the Office Open XML package format is readable.
    Word,
    PlainText,
}

impl DocumentKind {
    pub fn from_filename(filename: &str) -> Self {
        let lower = filename.to_lowercase();
        if lower.ends_with(".pdf") {
            DocumentKind::Pdf
        } else if lower.ends_with(".docx") || lower.ends_with(".doc") {
            DocumentKind::Word
        } else {
            DocumentKind::PlainText
        }
    }
}

/// True when the filename has an extension (text after the last `.`) in the allow list.
pub fn is_allowed_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
        None => false,
    }
}
