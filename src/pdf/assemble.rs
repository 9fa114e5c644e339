//! Assembling an output document from pages of source documents
//!
//! Follows the lopdf merge example: every source document is renumbered
//! past the objects already collected, then a fresh page tree and catalog
//! are built over the selected pages.

use std::collections::BTreeMap;
use lopdf::{Dictionary, Document, Object, ObjectId};
use crate::error::{Error, Result};

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Collects pages from source documents into a new page sequence
///
/// ```no_run
/// use pdf_edit::pdf::PageAssembler;
/// use lopdf::Document;
///
/// let mut assembler = PageAssembler::new();
/// assembler.append_all(Document::load("a.pdf").unwrap()).unwrap();
/// assembler.append_all(Document::load("b.pdf").unwrap()).unwrap();
/// let mut merged = assembler.finish();
/// merged.save("merged.pdf").unwrap();
/// ```
#[derive(Debug)]
pub struct PageAssembler {
    objects: BTreeMap<ObjectId, Object>,
    pages: Vec<ObjectId>,
    next_id: u32,
}

impl PageAssembler {
    pub fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
            pages: Vec::new(),
            next_id: 1,
        }
    }

    /// Number of pages collected so far
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Append every page of `doc`, in document order
    pub fn append_all(&mut self, doc: Document) -> Result<()> {
        let count = doc.get_pages().len();
        self.append_pages(doc, 0..count)
    }

    /// Append the pages of `doc` at the given zero-based indices, in the
    /// order given. An index may repeat; each occurrence becomes its own
    /// page object sharing the source page's content and resources.
    ///
    /// An index past the last page fails with [`Error::PageOutOfRange`].
    pub fn append_pages<I>(&mut self, mut doc: Document, indices: I) -> Result<()>
    where
        I: IntoIterator<Item = usize>,
    {
        // Renumber objects in this document to avoid conflicts
        doc.renumber_objects_with(self.next_id);
        self.next_id = doc.max_id + 1;

        let source_pages: Vec<ObjectId> = doc.get_pages().into_values().collect();

        let mut copies = Vec::new();
        for index in indices {
            let page_id = source_pages.get(index).copied().ok_or(Error::PageOutOfRange {
                page: index + 1,
                total: source_pages.len(),
            })?;
            copies.push(flatten_page(&doc, page_id)?);
        }

        self.objects.extend(doc.objects);

        for page in copies {
            let id = (self.next_id, 0);
            self.next_id += 1;
            self.objects.insert(id, Object::Dictionary(page));
            self.pages.push(id);
        }

        Ok(())
    }

    /// Build the output document: a single flat page tree over the collected
    /// pages. Objects no longer reachable from the new catalog are dropped.
    pub fn finish(self) -> Document {
        let mut doc = Document::with_version("1.5");

        doc.objects.extend(self.objects);

        // new_object_id() must hand out ids above everything just added
        doc.max_id = self.next_id - 1;

        let pages_id = doc.new_object_id();

        let kids: Vec<Object> = self.pages.iter().map(|&id| Object::Reference(id)).collect();

        let mut pages_object = Dictionary::new();
        pages_object.set("Type", Object::Name(b"Pages".to_vec()));
        pages_object.set("Count", Object::Integer(self.pages.len() as i64));
        pages_object.set("Kids", Object::Array(kids));

        let catalog_id = doc.new_object_id();
        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));

        doc.objects.insert(catalog_id, Object::Dictionary(catalog));
        doc.objects.insert(pages_id, Object::Dictionary(pages_object));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        for &page_id in &self.pages {
            if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(page_id) {
                dict.set("Parent", Object::Reference(pages_id));
            }
        }

        doc.prune_objects();
        doc.compress();
        doc
    }
}

impl Default for PageAssembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy a page dictionary with its inherited attributes made explicit
fn flatten_page(doc: &Document, page_id: ObjectId) -> Result<Dictionary> {
    let mut page = doc.get_dictionary(page_id)?.clone();

    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    while let Some(parent_id) = parent {
        let Ok(node) = doc.get_dictionary(parent_id) else {
            break;
        };
        for key in INHERITABLE_KEYS {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key, value.clone());
                }
            }
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    page.remove(b"Parent");
    Ok(page)
}
