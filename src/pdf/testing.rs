//! Fixture documents shared by the unit tests and `tests/common`
//!
//! Only lopdf is used here, so the integration tests can include this file
//! as their own module.

use lopdf::content::{Content, Operation};
use lopdf::encryption::{EncryptionState, EncryptionVersion, Permissions};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};

/// Build a document whose pages each draw a label `"{prefix}{n}"`
///
/// Every page carries its own MediaBox and Resources.
pub fn sample_document(prefix: &str, num_pages: usize) -> Document {
    build_sample(prefix, num_pages, false)
}

/// Like [`sample_document`], but the pages inherit MediaBox and Resources
/// from the page tree node
pub fn inheriting_sample_document(prefix: &str, num_pages: usize) -> Document {
    build_sample(prefix, num_pages, true)
}

/// [`sample_document`] protected by `password` (RC4, 128-bit)
pub fn encrypted_sample_document(prefix: &str, num_pages: usize, password: &str) -> Document {
    let mut doc = sample_document(prefix, num_pages);

    let id = Object::String(b"0123456789abcdef".to_vec(), StringFormat::Hexadecimal);
    doc.trailer.set("ID", Object::Array(vec![id.clone(), id]));

    let version = EncryptionVersion::V2 {
        document: &doc,
        owner_password: password,
        user_password: password,
        key_length: 128,
        permissions: Permissions::all(),
    };
    let state = EncryptionState::try_from(version).unwrap();
    doc.encrypt(&state).unwrap();
    doc
}

fn build_sample(prefix: &str, num_pages: usize, inherit: bool) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Courier".to_vec())),
    ]));
    let resources = Dictionary::from_iter(vec![(
        "Font",
        Object::Dictionary(Dictionary::from_iter(vec![("F1", Object::Reference(font_id))])),
    )]);
    let media_box = Object::Array(vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(612),
        Object::Integer(792),
    ]);

    let mut page_ids = Vec::new();
    for i in 0..num_pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
                Operation::new("Td", vec![Object::Integer(100), Object::Integer(700)]),
                Operation::new("Tj", vec![Object::string_literal(format!("{}{}", prefix, i + 1))]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));

        let mut page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Contents", Object::Reference(content_id)),
        ]);
        if !inherit {
            page.set("MediaBox", media_box.clone());
            page.set("Resources", Object::Dictionary(resources.clone()));
        }
        page_ids.push(doc.add_object(page));
    }

    let mut pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(num_pages as i64)),
        ("Kids", Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect())),
    ]);
    if inherit {
        pages.set("MediaBox", media_box);
        pages.set("Resources", Object::Dictionary(resources));
    }
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    doc
}

/// Serialized form of [`sample_document`]
pub fn sample_pdf_bytes(prefix: &str, num_pages: usize) -> Vec<u8> {
    let mut buffer = Vec::new();
    sample_document(prefix, num_pages).save_to(&mut buffer).unwrap();
    buffer
}

/// Every string shown with `Tj` on a page, in content order
pub fn page_strings(doc: &Document, page_id: ObjectId) -> Vec<String> {
    let bytes = doc.get_page_content(page_id).unwrap();
    Content::decode(&bytes)
        .unwrap()
        .operations
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| op.operands.first())
        .filter_map(|o| o.as_str().ok())
        .map(|s| String::from_utf8_lossy(s).into_owned())
        .collect()
}

/// The label drawn first on every page, in page order
pub fn page_labels(doc: &Document) -> Vec<String> {
    doc.get_pages()
        .values()
        .map(|&id| page_strings(doc, id).into_iter().next().unwrap_or_default())
        .collect()
}
