//! Text extraction — turns an uploaded résumé into plain text.
//!
//! Extraction never fails the request: an unreadable file is logged and
//! contributes empty text, which later scores as a candidate with no skills.

use std::io::{Cursor, Read};
use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;

use anyhow::{anyhow, Context, Result};
use regex::{Captures, Regex};
use tracing::error;

use crate::screening::files::DocumentKind;

const DOCX_BODY_PART: &str = "word/document.xml";

/// Extracts the text of an uploaded file, dispatching on its extension.
/// Returns an empty string when the file cannot be read.
pub fn extract_text(filename: &str, bytes: &[u8]) -> String {
    match DocumentKind::from_filename(filename) {
        DocumentKind::Pdf => extract_pdf(bytes).unwrap_or_else(|e| {
            error!("Error reading PDF file {filename}: {e:#}");
            String::new()
        }),
        DocumentKind::Word => extract_docx(bytes).unwrap_or_else(|e| {
            error!("Error reading Word file {filename}: {e:#}");
            String::new()
        }),
        DocumentKind::PlainText => decode_utf8(bytes).unwrap_or_else(|e| {
            error!("Error decoding file {filename}: {e:#}");
            String::new()
        }),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String> {
    // pdf-extract panics on some malformed inputs instead of returning an error.
    match panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes))) {
        Ok(result) => result.map_err(|e| anyhow!("{e}")),
        Err(_) => Err(anyhow!("PDF parser panicked")),
    }
}

fn decode_utf8(bytes: &[u8]) -> Result<String> {
    let text = std::str::from_utf8(bytes).context("file is not valid UTF-8")?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text).to_string())
}

fn extract_docx(bytes: &[u8]) -> Result<String> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).context("not an Office Open XML package")?;
    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY_PART)
        .with_context(|| format!("package has no {DOCX_BODY_PART}"))?
        .read_to_string(&mut xml)
        .context("document body is not valid UTF-8")?;
    Ok(docx_paragraphs(&xml).join("\n"))
}

fn paragraph_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<w:p(?:\s[^>]*?)?(?:/>|>(.*?)</w:p>)").expect("paragraph regex is valid")
    })
}

fn run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<w:t(?:\s[^>]*)?>(.*?)</w:t>|<w:(tab)\s*/>|<w:(br|cr)(?:\s[^>]*)?/>")
            .expect("run regex is valid")
    })
}

fn entity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"&(#x[0-9a-fA-F]+|#[0-9]+|lt|gt|amp|quot|apos);").expect("entity regex is valid")
    })
}

/// One string per `<w:p>` in document order.
fn docx_paragraphs(xml: &str) -> Vec<String> {
    paragraph_re()
        .captures_iter(xml)
        .map(|para| {
            let body = para.get(1).map(|m| m.as_str()).unwrap_or_default();
            let mut text = String::new();
            for run in run_re().captures_iter(body) {
                if let Some(t) = run.get(1) {
                    text.push_str(&decode_entities(t.as_str()));
                } else if run.get(2).is_some() {
                    text.push('\t');
                } else {
                    text.push('\n');
                }
            }
            text
        })
        .collect()
}

fn decode_entities(raw: &str) -> String {
    entity_re()
        .replace_all(raw, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .unwrap_or_else(|| entity[1..].parse::<u32>())
                    .ok()
                    .and_then(char::from_u32),
            };
            decoded.map(String::from).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
