//! Multi-format text extraction (plain text, PDF, DOCX).
//!
//! Dispatch is by lower-cased file extension onto a [`Format`] variant.
//! Binary formats are cargo features (`pdf`, `docx`); when one is not
//! compiled in, its extension still maps to a [`Format`] but extraction
//! fails with [`ExtractError::UnsupportedFormat`] and the extension is left
//! out of [`supported_formats`].

use std::path::Path;

use crate::encoding::{self, TextEncoding};
use crate::error::ExtractError;

/// Extensions read as plain text, in the order they are reported.
pub const PLAIN_TEXT_EXTENSIONS: [&str; 6] = [".txt", ".md", ".py", ".js", ".html", ".css"];
pub const PDF_EXTENSION: &str = ".pdf";
pub const DOCX_EXTENSION: &str = ".docx";

/// Maximum decompressed bytes to read from a single ZIP entry (zip-bomb protection).
#[cfg(feature = "docx")]
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Handler selected for a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    PlainText,
    Pdf,
    Docx,
}

impl Format {
    /// Map a lower-cased extension (with leading dot) to its handler.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext {
            PDF_EXTENSION => Some(Format::Pdf),
            DOCX_EXTENSION => Some(Format::Docx),
            e if PLAIN_TEXT_EXTENSIONS.contains(&e) => Some(Format::PlainText),
            _ => None,
        }
    }

    /// Whether the parser for this format was compiled in.
    pub fn is_available(self) -> bool {
        match self {
            Format::PlainText => true,
            Format::Pdf => cfg!(feature = "pdf"),
            Format::Docx => cfg!(feature = "docx"),
        }
    }
}

/// Extensions that [`extract_text`] can handle in this build.
pub fn supported_formats() -> Vec<&'static str> {
    let mut formats = PLAIN_TEXT_EXTENSIONS.to_vec();
    if Format::Pdf.is_available() {
        formats.push(PDF_EXTENSION);
    }
    if Format::Docx.is_available() {
        formats.push(DOCX_EXTENSION);
    }
    formats
}

/// Lower-cased extension of `path` including the leading dot, or `""`.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Read `path` and extract its text according to its extension.
pub fn extract_text(path: &Path, encodings: &[TextEncoding]) -> Result<String, ExtractError> {
    let ext = extension_of(path);
    let format = Format::from_extension(&ext)
        .filter(|f| f.is_available())
        .ok_or(ExtractError::UnsupportedFormat(ext))?;
    let bytes = std::fs::read(path)?;
    extract_bytes(&bytes, format, encodings)
}

/// Extract text from in-memory file content of a known format.
pub fn extract_bytes(
    bytes: &[u8],
    format: Format,
    encodings: &[TextEncoding],
) -> Result<String, ExtractError> {
    match format {
        Format::PlainText => extract_plain(bytes, encodings),
        Format::Pdf => extract_pdf(bytes),
        Format::Docx => extract_docx(bytes),
    }
}

fn extract_plain(bytes: &[u8], encodings: &[TextEncoding]) -> Result<String, ExtractError> {
    match encoding::decode_first(bytes, encodings) {
        Some((text, _)) => Ok(encoding::normalize_newlines(&text)),
        None => Err(ExtractError::UndecodableText {
            tried: encodings
                .iter()
                .map(|e| e.name())
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}

#[cfg(feature = "pdf")]
fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| ExtractError::Pdf(e.to_string()))?;
    Ok(pages.join("\n").trim().to_string())
}

#[cfg(not(feature = "pdf"))]
fn extract_pdf(_bytes: &[u8]) -> Result<String, ExtractError> {
    Err(ExtractError::UnsupportedFormat(PDF_EXTENSION.to_string()))
}

#[cfg(feature = "docx")]
fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    use std::io::Read;

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| ExtractError::Ooxml(e.to_string()))?;
    let entry = archive
        .by_name("word/document.xml")
        .map_err(|_| ExtractError::Ooxml("word/document.xml not found".to_string()))?;
    let mut doc_xml = Vec::new();
    entry
        .take(MAX_XML_ENTRY_BYTES)
        .read_to_end(&mut doc_xml)
        .map_err(|e| ExtractError::Ooxml(e.to_string()))?;
    if doc_xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(ExtractError::Ooxml(
            "word/document.xml exceeds size limit".to_string(),
        ));
    }
    let paragraphs = body_paragraphs(&doc_xml)?;
    Ok(paragraphs.join("\n").trim().to_string())
}

#[cfg(not(feature = "docx"))]
fn extract_docx(_bytes: &[u8]) -> Result<String, ExtractError> {
    Err(ExtractError::UnsupportedFormat(DOCX_EXTENSION.to_string()))
}

/// Text of each top-level `w:p`, with `w:tab` as `\t` and `w:br`/`w:cr` as
/// `\n`. Paragraphs in tables, text boxes, and `mc:Fallback` content are
/// skipped; a text box anchored mid-paragraph does not split its host.
#[cfg(feature = "docx")]
fn body_paragraphs(xml: &[u8]) -> Result<Vec<String>, ExtractError> {
    use quick_xml::events::Event;

    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    // Open tbl / txbxContent / Fallback elements.
    let mut skip_depth = 0usize;
    let mut para_depth = 0usize;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"tbl" | b"txbxContent" | b"Fallback" => skip_depth += 1,
                b"p" if skip_depth == 0 => {
                    if para_depth == 0 {
                        current.clear();
                    }
                    para_depth += 1;
                }
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) if skip_depth == 0 => match e.local_name().as_ref() {
                b"p" if para_depth == 0 => paragraphs.push(String::new()),
                b"tab" if para_depth > 0 => current.push('\t'),
                b"br" | b"cr" if para_depth > 0 => current.push('\n'),
                _ => {}
            },
            Ok(Event::Text(te)) if in_text && para_depth > 0 && skip_depth == 0 => {
                let text = te
                    .unescape()
                    .map_err(|e| ExtractError::Ooxml(e.to_string()))?;
                current.push_str(&text);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"tbl" | b"txbxContent" | b"Fallback" => {
                    skip_depth = skip_depth.saturating_sub(1)
                }
                b"p" if skip_depth == 0 && para_depth > 0 => {
                    para_depth -= 1;
                    if para_depth == 0 {
                        paragraphs.push(std::mem::take(&mut current));
                    }
                }
                b"t" => in_text = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::Ooxml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(paragraphs)
}
