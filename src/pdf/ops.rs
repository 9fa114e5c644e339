//! The document operations: merge, split, watermark, encrypt and decrypt
//!
//! Every operation opens its own documents, builds one output document and
//! writes it with a single call. Any failure aborts before the write, so the
//! destination is never left half-written.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use chrono::Utc;
use lopdf::encryption::{EncryptionState, EncryptionVersion, Permissions};
use lopdf::{Document, Object, StringFormat};
use tracing::{info, warn};
use crate::error::{Error, Result};
use crate::pdf::assemble::PageAssembler;
use crate::pdf::io::{open_document, open_protected_document, write_document};
use crate::pdf::overlay::{overlay_page, render_text_page};
use crate::range::PageSelector;

/// RC4 key length used for password protection
const KEY_LENGTH: usize = 128;

/// Asked whether an existing output file may be replaced
///
/// Implemented for any `FnMut(&Path) -> bool` closure.
pub trait ConfirmOverwrite {
    fn confirm_overwrite(&mut self, path: &Path) -> bool;
}

impl<F> ConfirmOverwrite for F
where
    F: FnMut(&Path) -> bool,
{
    fn confirm_overwrite(&mut self, path: &Path) -> bool {
        self(path)
    }
}

/// Always allows overwriting; for non-interactive callers
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOverwrite;

impl ConfirmOverwrite for AlwaysOverwrite {
    fn confirm_overwrite(&mut self, _path: &Path) -> bool {
        true
    }
}

/// Options for merging PDFs
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Input PDF file paths in the order they should be merged
    pub input_paths: Vec<PathBuf>,
    /// Output PDF file path
    pub output_path: PathBuf,
}

/// Merge multiple PDF files into a single PDF
///
/// Needs at least two inputs. If the output already exists, `confirm` is
/// asked first; declining fails with [`Error::OverwriteDeclined`] and
/// nothing is written. Pages appear in input order, each document's pages in
/// their original order.
///
/// # Example
///
/// ```no_run
/// use pdf_edit::pdf::{merge_pdfs, AlwaysOverwrite, MergeOptions};
/// use std::path::PathBuf;
///
/// let options = MergeOptions {
///     input_paths: vec![
///         PathBuf::from("1. first.pdf"),
///         PathBuf::from("2. second.pdf"),
///     ],
///     output_path: PathBuf::from("merged.pdf"),
/// };
///
/// merge_pdfs(&options, &mut AlwaysOverwrite).expect("Failed to merge");
/// ```
pub fn merge_pdfs<C>(options: &MergeOptions, confirm: &mut C) -> Result<()>
where
    C: ConfirmOverwrite + ?Sized,
{
    if options.input_paths.len() < 2 {
        return Err(Error::NotEnoughInputs(options.input_paths.len()));
    }

    let output = &options.output_path;
    if output.exists() && !confirm.confirm_overwrite(output) {
        warn!(path = %output.display(), "overwrite declined");
        return Err(Error::OverwriteDeclined(output.clone()));
    }

    let mut assembler = PageAssembler::new();
    for path in &options.input_paths {
        assembler.append_all(open_document(path)?)?;
    }

    let pages = assembler.page_count();
    let mut merged = assembler.finish();
    write_document(&mut merged, output)?;

    info!(
        inputs = options.input_paths.len(),
        pages,
        output = %output.display(),
        "merged documents"
    );
    Ok(())
}

/// Copy the pages selected by `page_range` (e.g. `"1-3, 5, 7"`) into a new PDF
///
/// Pages are written in the order the range lists them, repeats included.
/// See [`PageSelector::parse`] for the accepted syntax and errors.
pub fn split_pdf(input_path: &Path, page_range: &str, output_path: &Path) -> Result<()> {
    let doc = open_document(input_path)?;

    let total_pages = doc.get_pages().len();
    if total_pages == 0 {
        return Err(Error::EmptyPdf(input_path.to_path_buf()));
    }

    let selector = PageSelector::parse(page_range, total_pages)?;

    let mut assembler = PageAssembler::new();
    assembler.append_pages(doc, selector.indices())?;
    let mut split = assembler.finish();
    write_document(&mut split, output_path)?;

    info!(
        input = %input_path.display(),
        range = page_range,
        units = selector.units().len(),
        pages = selector.len(),
        of = selector.total_pages(),
        output = %output_path.display(),
        "split document"
    );
    Ok(())
}

/// Stamp `watermark_text` in small type at the bottom left of every page
///
/// Each page gets its own freshly rendered overlay page merged on top of it;
/// page count and order are unchanged.
pub fn add_watermark(input_path: &Path, watermark_text: &str, output_path: &Path) -> Result<()> {
    if watermark_text.is_empty() {
        return Err(Error::EmptyWatermarkText);
    }

    let mut doc = open_document(input_path)?;

    let page_ids: Vec<_> = doc.get_pages().into_values().collect();
    for &page_id in &page_ids {
        let overlay = Document::load_mem(&render_text_page(watermark_text)?)?;
        overlay_page(&mut doc, page_id, &overlay)?;
    }

    // Drop the overlay documents' own catalogs and page trees
    doc.prune_objects();
    doc.compress();
    write_document(&mut doc, output_path)?;

    info!(
        input = %input_path.display(),
        pages = page_ids.len(),
        output = %output_path.display(),
        "added watermark"
    );
    Ok(())
}

/// Copy every page into a new PDF protected by `password`
///
/// The password serves as both user and owner password, with all
/// permissions granted.
pub fn encrypt_pdf(input_path: &Path, password: &str, output_path: &Path) -> Result<()> {
    if password.is_empty() {
        return Err(Error::EmptyPassword);
    }

    let doc = open_document(input_path)?;

    let mut assembler = PageAssembler::new();
    assembler.append_all(doc)?;
    let pages = assembler.page_count();
    let mut encrypted = assembler.finish();

    let id = file_identifier(output_path);
    encrypted.trailer.set(
        "ID",
        Object::Array(vec![
            Object::String(id.clone(), StringFormat::Hexadecimal),
            Object::String(id, StringFormat::Hexadecimal),
        ]),
    );

    let version = EncryptionVersion::V2 {
        document: &encrypted,
        owner_password: password,
        user_password: password,
        key_length: KEY_LENGTH,
        permissions: Permissions::all(),
    };
    let state = EncryptionState::try_from(version)?;
    encrypted.encrypt(&state)?;

    write_document(&mut encrypted, output_path)?;

    info!(
        input = %input_path.display(),
        pages,
        output = %output_path.display(),
        "encrypted document"
    );
    Ok(())
}

/// Unlock a password-protected PDF and copy its pages into an unprotected one
///
/// A wrong password surfaces as the [`Error::Pdf`] lopdf reports; an input
/// without password protection fails with [`Error::NotEncrypted`].
pub fn decrypt_pdf(input_path: &Path, password: &str, output_path: &Path) -> Result<()> {
    if password.is_empty() {
        return Err(Error::EmptyPassword);
    }

    let mut doc = open_protected_document(input_path)?;
    if !doc.is_encrypted() {
        return Err(Error::NotEncrypted(input_path.to_path_buf()));
    }
    doc.decrypt(password)?;

    let mut assembler = PageAssembler::new();
    assembler.append_all(doc)?;
    let pages = assembler.page_count();
    let mut decrypted = assembler.finish();
    write_document(&mut decrypted, output_path)?;

    info!(
        input = %input_path.display(),
        pages,
        output = %output_path.display(),
        "decrypted document"
    );
    Ok(())
}

/// 16-byte file identifier, unique per output path and time of creation
fn file_identifier(output_path: &Path) -> Vec<u8> {
    let mut hasher = DefaultHasher::new();
    output_path.hash(&mut hasher);
    Utc::now().timestamp_nanos_opt().unwrap_or_default().hash(&mut hasher);
    let first = hasher.finish();

    std::process::id().hash(&mut hasher);
    let second = hasher.finish();

    [first.to_be_bytes(), second.to_be_bytes()].concat()
}
