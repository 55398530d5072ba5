//! Page tree and page attribute helpers

use crate::constants::{DEFAULT_PAGE_DIMENSIONS, MAX_INHERITANCE_DEPTH};
use crate::types::{MergeError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Page attributes a page may inherit from its `/Pages` ancestors.
const INHERITABLE_KEYS: [&[u8]; 3] = [b"Resources", b"MediaBox", b"Rotate"];

// =============================================================================
// Object Resolution
// =============================================================================

/// Follow indirect references until a direct object is reached.
pub fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Result<&'a Object> {
    let mut current = obj;
    for _ in 0..MAX_INHERITANCE_DEPTH {
        match current {
            Object::Reference(id) => current = doc.get_object(*id)?,
            _ => return Ok(current),
        }
    }
    Err(MergeError::UnreadableDocument(
        "reference chain is too deep".to_string(),
    ))
}

/// Look up a page attribute, walking up the `/Parent` chain for inherited values.
pub fn inherited_attribute(
    doc: &Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<Object>> {
    let mut node = doc.get_dictionary(page_id)?;
    for _ in 0..MAX_INHERITANCE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Ok(Some(value.clone()));
        }
        match node.get(b"Parent").and_then(|parent| parent.as_reference()) {
            Ok(parent_id) => node = doc.get_dictionary(parent_id)?,
            Err(_) => return Ok(None),
        }
    }
    Ok(None)
}

/// Copy inheritable attributes onto the page so it no longer depends on its ancestors.
pub fn flatten_inherited(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let mut inherited = Vec::new();
    {
        let page = doc.get_dictionary(page_id)?;
        for key in INHERITABLE_KEYS {
            if !page.has(key) {
                if let Some(value) = inherited_attribute(doc, page_id, key)? {
                    inherited.push((key, value));
                }
            }
        }
    }

    let page = doc.get_dictionary_mut(page_id)?;
    for (key, value) in inherited {
        page.set(key, value);
    }
    Ok(())
}

/// A detached copy of the page's effective resource dictionary.
///
/// Sub-dictionaries held by reference stay references; callers that modify
/// one must resolve and copy it first.
pub fn page_resources(doc: &Document, page_id: ObjectId) -> Result<Dictionary> {
    match inherited_attribute(doc, page_id, b"Resources")? {
        Some(resources) => Ok(resolve(doc, &resources)?.as_dict()?.clone()),
        None => Ok(Dictionary::new()),
    }
}

// =============================================================================
// Page Geometry
// =============================================================================

/// Effective MediaBox of a page as `[llx, lly, urx, ury]`.
pub fn page_box(doc: &Document, page_id: ObjectId) -> Result<[f32; 4]> {
    let Some(media_box) = inherited_attribute(doc, page_id, b"MediaBox")? else {
        return Ok([0.0, 0.0, DEFAULT_PAGE_DIMENSIONS.0, DEFAULT_PAGE_DIMENSIONS.1]);
    };

    let values = resolve(doc, &media_box)?.as_array()?;
    if values.len() != 4 {
        return Err(MergeError::UnreadableDocument(format!(
            "MediaBox has {} entries, expected 4",
            values.len()
        )));
    }

    let mut corners = [0.0f32; 4];
    for (slot, value) in corners.iter_mut().zip(values) {
        *slot = resolve(doc, value)
            .ok()
            .and_then(extract_number)
            .ok_or_else(|| {
                MergeError::UnreadableDocument("MediaBox entry is not a number".to_string())
            })?;
    }

    Ok([
        corners[0].min(corners[2]),
        corners[1].min(corners[3]),
        corners[0].max(corners[2]),
        corners[1].max(corners[3]),
    ])
}

/// Page dimensions (width, height) in points
pub fn page_size(doc: &Document, page_id: ObjectId) -> Result<(f32, f32)> {
    let [llx, lly, urx, ury] = page_box(doc, page_id)?;
    Ok((urx - llx, ury - lly))
}

/// `[0 0 width height]`
pub fn media_box(width: f32, height: f32) -> Object {
    Object::Array(vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Real(width),
        Object::Real(height),
    ])
}

/// Extract numeric value from a PDF object
pub fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

// =============================================================================
// Page Tree
// =============================================================================

/// Object ID of the root `/Pages` node.
pub fn pages_root_id(doc: &Document) -> Result<ObjectId> {
    let catalog_id = doc.trailer.get(b"Root")?.as_reference()?;
    let catalog = doc.get_dictionary(catalog_id)?;
    Ok(catalog.get(b"Pages")?.as_reference()?)
}

/// Replace the page tree with a single-level `/Kids` list in the given order.
pub fn set_page_tree(doc: &mut Document, pages_id: ObjectId, kids: &[ObjectId]) -> Result<()> {
    for &kid in kids {
        doc.get_dictionary_mut(kid)?
            .set("Parent", Object::Reference(pages_id));
    }

    let pages = doc.get_dictionary_mut(pages_id)?;
    pages.set(
        "Kids",
        Object::Array(kids.iter().map(|&id| Object::Reference(id)).collect()),
    );
    pages.set("Count", Object::Integer(kids.len() as i64));
    Ok(())
}

/// Build a document holding exactly one page.
pub fn build_single_page_document(
    width: f32,
    height: f32,
    resources: Dictionary,
    content: Vec<u8>,
) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let content_id = doc.add_object(Stream::new(Dictionary::new(), content));
    let page_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(pages_id)),
        ("MediaBox", media_box(width, height)),
        ("Resources", Object::Dictionary(resources)),
        ("Contents", Object::Reference(content_id)),
    ]));

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(vec![Object::Reference(page_id)])),
        ("Count", Object::Integer(1)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    doc
}

// =============================================================================
// Content Streams
// =============================================================================

/// References to the page's content streams, in painting order.
pub fn content_references(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>> {
    let page = doc.get_dictionary(page_id)?;
    match page.get(b"Contents") {
        Err(_) => Ok(Vec::new()), // No content = blank page
        Ok(Object::Array(items)) => Ok(items.clone()),
        Ok(Object::Reference(id)) => match doc.get_object(*id)? {
            Object::Array(items) => Ok(items.clone()),
            _ => Ok(vec![Object::Reference(*id)]),
        },
        Ok(_) => Err(MergeError::UnreadableDocument(
            "page /Contents is neither a stream reference nor an array".to_string(),
        )),
    }
}

/// Surround a page's content streams with a `prefix` and a `suffix` stream.
pub fn wrap_contents(
    doc: &mut Document,
    page_id: ObjectId,
    prefix: &[u8],
    suffix: &[u8],
) -> Result<()> {
    let existing = content_references(doc, page_id)?;

    let prefix_id = doc.add_object(Stream::new(Dictionary::new(), prefix.to_vec()));
    let suffix_id = doc.add_object(Stream::new(Dictionary::new(), suffix.to_vec()));

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(prefix_id));
    contents.extend(existing);
    contents.push(Object::Reference(suffix_id));

    doc.get_dictionary_mut(page_id)?
        .set("Contents", Object::Array(contents));
    Ok(())
}
