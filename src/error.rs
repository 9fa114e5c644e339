//! Error types for the PDF edit library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the PDF edit library
#[derive(Error, Debug)]
pub enum Error {
    /// PDF processing error surfaced by lopdf (corrupt file, wrong password, ...)
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Merge needs at least two inputs
    #[error("Need at least two files to merge, got {0}")]
    NotEnoughInputs(usize),

    /// Watermark text was empty
    #[error("Watermark text must not be empty")]
    EmptyWatermarkText,

    /// Password was empty
    #[error("Password must not be empty")]
    EmptyPassword,

    /// Output exists and the caller declined to overwrite it
    #[error("Cancelled: {} already exists", .0.display())]
    OverwriteDeclined(PathBuf),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// A source document could not be opened or parsed
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    /// The output document could not be written
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Range unit with bounds out of order or outside the document
    #[error("Invalid page range: {0}")]
    InvalidRange(String),

    /// Single page outside the document
    #[error("Page number out of range: {page} (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    /// Range unit that is not a number or `a-b` pair
    #[error("Malformed page range: {0:?}")]
    MalformedRange(String),

    /// Invalid PDF (no pages)
    #[error("PDF has no pages: {}", .0.display())]
    EmptyPdf(PathBuf),

    /// Decrypt was asked for a file without password protection
    #[error("PDF is not encrypted: {}", .0.display())]
    NotEncrypted(PathBuf),
}

impl Error {
    /// True when the operation was cancelled rather than failed.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::OverwriteDeclined(_))
    }

    /// True for page-range validation failures.
    pub fn is_range_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidRange(_) | Error::PageOutOfRange { .. } | Error::MalformedRange(_)
        )
    }
}
