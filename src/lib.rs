//! PDF Edit Library
//!
//! A cross-platform library for everyday PDF edits.
//! This library provides functionality to:
//! - Merge multiple PDF files
//! - Split out pages by range expression ("1-3, 5, 7")
//! - Stamp a text watermark on every page
//! - Add or remove password protection
//! - Extract metadata (page counts, etc.)
//!
//! # Example
//!
//! ```no_run
//! use pdf_edit::pdf::{merge_pdfs, split_pdf, AlwaysOverwrite, MergeOptions};
//! use std::path::{Path, PathBuf};
//!
//! let options = MergeOptions {
//!     input_paths: vec![
//!         PathBuf::from("1. intro.pdf"),
//!         PathBuf::from("2. advanced.pdf"),
//!     ],
//!     output_path: PathBuf::from("merged.pdf"),
//! };
//!
//! merge_pdfs(&options, &mut AlwaysOverwrite).expect("Failed to merge PDFs");
//! split_pdf(Path::new("merged.pdf"), "1-3, 5", Path::new("excerpt.pdf"))
//!     .expect("Failed to split PDF");
//! ```

pub mod error;
pub mod pdf;
pub mod range;

// Re-export commonly used items
pub use error::{Error, Result};
pub use range::{resolve_page_range, PageSelector, PageUnit};
