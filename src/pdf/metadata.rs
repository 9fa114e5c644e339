//! PDF metadata extraction

use std::path::Path;
use lopdf::{Document, Object};
use crate::error::{Error, Result};
use crate::pdf::io::open_protected_document;

/// Count pages by reading the Count field from the root Pages dictionary
fn count_pages_from_catalog(doc: &Document) -> Result<usize> {
    let pages_id = doc.catalog()?.get(b"Pages")?.as_reference()?;
    let count = doc.get_dictionary(pages_id)?.get(b"Count")?.as_i64()?;
    Ok(count.max(0) as usize)
}

/// PDF metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfMetadata {
    /// Number of pages in the PDF
    pub page_count: usize,
    /// PDF version from the file header, e.g. "1.5"
    pub version: String,
    /// Whether the file is password protected
    pub encrypted: bool,
    /// Document title (if present)
    pub title: Option<String>,
    /// Document author (if present)
    pub author: Option<String>,
}

/// Extract metadata from a PDF file
///
/// Encrypted files are read without a password: the page tree holds no
/// strings, so the page count is still exact, but the title and author are
/// left out since they are stored encrypted.
pub fn extract_metadata(path: &Path) -> Result<PdfMetadata> {
    let doc = open_protected_document(path)?;
    let encrypted = doc.is_encrypted();

    // Fall back to walking the tree when the Count field is missing
    let page_count = count_pages_from_catalog(&doc).unwrap_or_else(|_| doc.get_pages().len());

    let (title, author) = if encrypted {
        (None, None)
    } else {
        (info_string(&doc, b"Title"), info_string(&doc, b"Author"))
    };

    Ok(PdfMetadata {
        page_count,
        version: doc.version.clone(),
        encrypted,
        title,
        author,
    })
}

/// Read a text entry from the trailer's Info dictionary
fn info_string(doc: &Document, key: &[u8]) -> Option<String> {
    let info = match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_dictionary(*id).ok()?,
        Object::Dictionary(dict) => dict,
        _ => return None,
    };
    let bytes = info.get(key).ok()?.as_str().ok()?;
    String::from_utf8(bytes.to_vec()).ok()
}

/// Count the number of pages in a PDF file
///
/// This is a quick operation that reads the Count field from the Pages dictionary.
pub fn count_pages(path: &Path) -> Result<usize> {
    let doc = open_protected_document(path)?;
    let page_count = count_pages_from_catalog(&doc)?;

    if page_count == 0 {
        return Err(Error::EmptyPdf(path.to_path_buf()));
    }

    Ok(page_count)
}
