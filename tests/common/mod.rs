//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use lopdf::Document;

#[path = "../../src/pdf/testing.rs"]
mod samples;

/// Write a PDF whose pages each draw the label `"{prefix}{n}"`
///
/// MediaBox and Resources are inherited from the page tree node.
pub fn create_test_pdf(path: &Path, prefix: &str, num_pages: usize) {
    samples::inheriting_sample_document(prefix, num_pages)
        .save(path)
        .expect("Failed to write test PDF");
}

/// Create a test PDF inside `dir` and return its path
pub fn fixture(dir: &Path, name: &str, prefix: &str, num_pages: usize) -> PathBuf {
    let path = dir.join(name);
    create_test_pdf(&path, prefix, num_pages);
    path
}

/// The first string drawn on each page, in page order
pub fn page_labels(path: &Path) -> Vec<String> {
    let doc = Document::load(path).expect("Failed to load PDF");
    samples::page_labels(&doc)
}
