//! PDF manipulation module

pub mod assemble;
pub mod io;
pub mod metadata;
pub mod ops;
pub mod overlay;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used items
pub use assemble::PageAssembler;
pub use metadata::{count_pages, extract_metadata, PdfMetadata};
pub use ops::{
    add_watermark, decrypt_pdf, encrypt_pdf, merge_pdfs, split_pdf,
    AlwaysOverwrite, ConfirmOverwrite, MergeOptions,
};
pub use overlay::{overlay_page, render_text_page};
