//! Text overlay rendering and page-content merging using lopdf
//!
//! A watermark is produced in two steps: [`render_text_page`] draws the text
//! on a standalone one-page PDF, and [`overlay_page`] stamps that page on top
//! of a page of another document.

use std::collections::HashMap;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use crate::error::Result;

/// US Letter page size in points
pub const LETTER: (i64, i64) = (612, 792);

/// Where overlay text is drawn: bottom-left region of the page
pub const TEXT_ORIGIN: (i64, i64) = (100, 100);

/// Overlay font size in points
pub const FONT_SIZE: i64 = 12;

/// Prefix for the Form XObject names added to stamped pages
const XOBJECT_PREFIX: &str = "Overlay";

/// Render `text` onto a single Letter page and return the serialized PDF
///
/// The text is set in Helvetica at [`TEXT_ORIGIN`]; characters outside
/// WinAnsi are replaced with `?`.
pub fn render_text_page(text: &str) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(helvetica_font());

    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(FONT_SIZE)]),
            Operation::new(
                "Td",
                vec![Object::Integer(TEXT_ORIGIN.0), Object::Integer(TEXT_ORIGIN.1)],
            ),
            Operation::new("Tj", vec![Object::string_literal(encode_win_ansi(text))]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));

    let mut fonts = Dictionary::new();
    fonts.set("F1", Object::Reference(font_id));
    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(fonts));

    let mut page = Dictionary::new();
    page.set("Type", Object::Name(b"Page".to_vec()));
    page.set("Parent", Object::Reference(pages_id));
    page.set("MediaBox", letter_box());
    page.set("Resources", Object::Dictionary(resources));
    page.set("Contents", Object::Reference(content_id));
    let page_id = doc.add_object(Object::Dictionary(page));

    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Count", Object::Integer(1));
    pages.set("Kids", Object::Array(vec![Object::Reference(page_id)]));
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(Object::Dictionary(catalog));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

/// Helvetica (one of the 14 standard PDF fonts, so nothing to embed)
fn helvetica_font() -> Dictionary {
    let mut font = Dictionary::new();
    font.set("Type", Object::Name(b"Font".to_vec()));
    font.set("Subtype", Object::Name(b"Type1".to_vec()));
    font.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
    font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
    font
}

fn letter_box() -> Object {
    Object::Array(vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(LETTER.0),
        Object::Integer(LETTER.1),
    ])
}

/// Map text to single-byte WinAnsi codes
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7e | 0xa0..=0xff => c as u8,
            _ => b'?',
        })
        .collect()
}

/// Stamp the first page of `overlay` on top of page `page_id` of `doc`
///
/// The overlay page becomes a Form XObject with its own resources, so its
/// resource names never clash with the page's. The page's existing content
/// is wrapped in `q`/`Q` before the XObject is drawn, which keeps any
/// transformation the page leaves active from moving the overlay.
pub fn overlay_page(doc: &mut Document, page_id: ObjectId, overlay: &Document) -> Result<()> {
    let Some(&overlay_page_id) = overlay.get_pages().values().next() else {
        return Ok(());
    };

    // Import all overlay objects past the end of the target's id space
    let id_offset = doc.max_id;
    let id_map: HashMap<ObjectId, ObjectId> = overlay
        .objects
        .keys()
        .map(|&old_id| (old_id, (old_id.0 + id_offset, old_id.1)))
        .collect();

    for (old_id, object) in overlay.objects.iter() {
        doc.objects.insert(id_map[old_id], renumber_object_references(object, &id_map));
    }
    doc.max_id = overlay.max_id + id_offset;

    let overlay_dict = overlay.get_dictionary(overlay_page_id)?;
    let resources = match overlay_dict.get(b"Resources") {
        Ok(res) => renumber_object_references(res, &id_map),
        Err(_) => Object::Dictionary(Dictionary::new()),
    };
    let bbox = overlay_dict.get(b"MediaBox").cloned().unwrap_or_else(|_| letter_box());
    let content = overlay.get_page_content(overlay_page_id)?;

    let mut xobject_dict = Dictionary::new();
    xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
    xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    xobject_dict.set("FormType", Object::Integer(1));
    xobject_dict.set("BBox", bbox);
    xobject_dict.set("Resources", resources);
    let xobject_id = doc.add_object(Stream::new(xobject_dict, content));

    let name = add_xobject_to_page_resources(doc, page_id, xobject_id)?;

    let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let invoke = format!("\nQ\nq\n/{} Do\nQ\n", name);
    let invoke_id = doc.add_object(Stream::new(Dictionary::new(), invoke.into_bytes()));

    prepend_content_to_page(doc, page_id, save_id)?;
    append_content_to_page(doc, page_id, invoke_id)?;

    Ok(())
}

/// Renumber all object references in an object
fn renumber_object_references(object: &Object, id_map: &HashMap<ObjectId, ObjectId>) -> Object {
    match object {
        Object::Reference(old_id) => Object::Reference(*id_map.get(old_id).unwrap_or(old_id)),
        Object::Array(arr) => {
            Object::Array(arr.iter().map(|obj| renumber_object_references(obj, id_map)).collect())
        }
        Object::Dictionary(dict) => Object::Dictionary(renumber_dictionary(dict, id_map)),
        Object::Stream(stream) => {
            let mut new_stream = stream.clone();
            new_stream.dict = renumber_dictionary(&stream.dict, id_map);
            Object::Stream(new_stream)
        }
        _ => object.clone(),
    }
}

fn renumber_dictionary(dict: &Dictionary, id_map: &HashMap<ObjectId, ObjectId>) -> Dictionary {
    let mut new_dict = Dictionary::new();
    for (key, value) in dict.iter() {
        new_dict.set(key.clone(), renumber_object_references(value, id_map));
    }
    new_dict
}

/// The resources a page uses: its own, a referenced dictionary, or the
/// nearest ancestor's
fn effective_resources(doc: &Document, page_id: ObjectId) -> Dictionary {
    let mut node_id = Some(page_id);
    while let Some(id) = node_id {
        let Ok(node) = doc.get_dictionary(id) else {
            break;
        };
        match node.get(b"Resources") {
            Ok(Object::Dictionary(dict)) => return dict.clone(),
            Ok(Object::Reference(res_id)) => {
                return doc.get_dictionary(*res_id).cloned().unwrap_or_default();
            }
            _ => {}
        }
        node_id = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
    Dictionary::new()
}

/// Register `xobject_id` in the page's own Resources under a fresh name
/// and return that name
fn add_xobject_to_page_resources(doc: &mut Document, page_id: ObjectId, xobject_id: ObjectId) -> Result<String> {
    let mut resources = effective_resources(doc, page_id);

    let mut xobjects = match resources.get(b"XObject") {
        Ok(Object::Dictionary(xo)) => xo.clone(),
        Ok(Object::Reference(xo_id)) => doc.get_dictionary(*xo_id).cloned().unwrap_or_default(),
        _ => Dictionary::new(),
    };

    let name = (0..)
        .map(|n| format!("{}{}", XOBJECT_PREFIX, n))
        .find(|candidate| !xobjects.has(candidate.as_bytes()))
        .unwrap_or_else(|| XOBJECT_PREFIX.to_string());

    xobjects.set(name.as_bytes(), Object::Reference(xobject_id));
    resources.set("XObject", Object::Dictionary(xobjects));

    // The page gets its own copy so shared resource dictionaries stay untouched
    doc.get_dictionary_mut(page_id)?
        .set("Resources", Object::Dictionary(resources));

    Ok(name)
}

/// Insert a content stream before the page's existing content
fn prepend_content_to_page(doc: &mut Document, page_id: ObjectId, new_content_id: ObjectId) -> Result<()> {
    let page_dict = doc.get_dictionary_mut(page_id)?;

    let contents = match page_dict.get(b"Contents").ok().cloned() {
        Some(Object::Reference(content_id)) => {
            vec![Object::Reference(new_content_id), Object::Reference(content_id)]
        }
        Some(Object::Array(mut content_array)) => {
            content_array.insert(0, Object::Reference(new_content_id));
            content_array
        }
        _ => vec![Object::Reference(new_content_id)],
    };
    page_dict.set("Contents", Object::Array(contents));

    Ok(())
}

/// Append a content stream after the page's existing content, so it is
/// drawn on top
fn append_content_to_page(doc: &mut Document, page_id: ObjectId, new_content_id: ObjectId) -> Result<()> {
    let page_dict = doc.get_dictionary_mut(page_id)?;

    let contents = match page_dict.get(b"Contents").ok().cloned() {
        Some(Object::Reference(content_id)) => {
            vec![Object::Reference(content_id), Object::Reference(new_content_id)]
        }
        Some(Object::Array(mut content_array)) => {
            content_array.push(Object::Reference(new_content_id));
            content_array
        }
        _ => vec![Object::Reference(new_content_id)],
    };
    page_dict.set("Contents", Object::Array(contents));

    Ok(())
}
