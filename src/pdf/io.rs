//! Opening source documents and writing output documents

use std::io::Write;
use std::path::Path;
use lopdf::Document;
use tempfile::NamedTempFile;
use tracing::debug;
use crate::error::{Error, Result};

/// Trailer key that marks a file as encrypted
const ENCRYPT_KEY: &[u8] = b"/Encrypt";

/// Same-length stand-in for [`ENCRYPT_KEY`], so no byte offset moves
const HELD_ENCRYPT_KEY: &[u8] = b"/EncHeld";

/// Load a PDF, tagging any failure with its path
pub fn open_document(path: &Path) -> Result<Document> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), objects = doc.objects.len(), "opened document");
    Ok(doc)
}

/// Load a PDF without decrypting it
///
/// lopdf only parses the objects of an encrypted file when the empty user
/// password opens it, and keeps nothing but the encryption dictionary
/// otherwise. Here the trailer's `/Encrypt` key is renamed before parsing
/// and restored afterwards, so every object is loaded still encrypted and
/// [`Document::decrypt`] can unlock it later. Unencrypted files load the
/// same as with [`open_document`].
pub fn open_protected_document(path: &Path) -> Result<Document> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let read_error = |source: lopdf::Error| Error::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut bytes = std::fs::read(path)?;
    let Some(pos) = find_encrypt_key(&bytes) else {
        return Document::load_mem(&bytes).map_err(read_error);
    };
    let key = pos..pos + ENCRYPT_KEY.len();

    bytes[key.clone()].copy_from_slice(HELD_ENCRYPT_KEY);
    let mut doc = Document::load_mem(&bytes).map_err(read_error)?;

    match doc.trailer.remove(&HELD_ENCRYPT_KEY[1..]) {
        Some(encrypt) => doc.trailer.set("Encrypt", encrypt),
        None => {
            // The match was not the trailer's key; load the file untouched
            bytes[key].copy_from_slice(ENCRYPT_KEY);
            doc = Document::load_mem(&bytes).map_err(read_error)?;
        }
    }

    debug!(
        path = %path.display(),
        objects = doc.objects.len(),
        encrypted = doc.is_encrypted(),
        "opened protected document"
    );
    Ok(doc)
}

/// Offset of the last `/Encrypt` name in the file, which belongs to the
/// trailer since it is written after every object
fn find_encrypt_key(bytes: &[u8]) -> Option<usize> {
    bytes
        .windows(ENCRYPT_KEY.len() + 1)
        .rposition(|w| w.starts_with(ENCRYPT_KEY) && !w[ENCRYPT_KEY.len()].is_ascii_alphanumeric())
}

/// Serialize a document to bytes
fn to_bytes(doc: &mut Document) -> std::result::Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

/// Write a document to `output_path` in one step
///
/// The document is serialized in memory and written to a temporary file in
/// the destination directory, which is then renamed over the destination.
/// On failure the destination is left as it was.
pub fn write_document(doc: &mut Document, output_path: &Path) -> Result<()> {
    let write_error = |source: Box<dyn std::error::Error + Send + Sync>| Error::Write {
        path: output_path.to_path_buf(),
        source,
    };

    let bytes = to_bytes(doc).map_err(write_error)?;

    let dir = match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| write_error(e.into()))?;
    temp.write_all(&bytes).map_err(|e| write_error(e.into()))?;
    temp.as_file().sync_all().map_err(|e| write_error(e.into()))?;
    temp.persist(output_path).map_err(|e| write_error(e.error.into()))?;

    debug!(path = %output_path.display(), bytes = bytes.len(), "wrote document");
    Ok(())
}
