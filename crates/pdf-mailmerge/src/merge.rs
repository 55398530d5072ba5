//! Compositing overlay pages onto content pages

use crate::constants::{OVERLAY_XOBJECT_PREFIX, PAGE_SIZE_TOLERANCE};
use crate::render::{create_page_xobject, page_resources, page_size, resolve, wrap_contents};
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashMap;

/// Paint the first page of `overlay` on top of page `page_id` of `doc`.
///
/// The page's own content is wrapped in `q … Q` so its graphics state cannot
/// leak into the overlay, and its resources are copied before being changed,
/// so dictionaries shared with other pages are never modified.
pub fn merge_overlay(doc: &mut Document, page_id: ObjectId, overlay: &Document) -> Result<()> {
    let overlay_page_id = overlay.get_pages().values().next().copied().ok_or_else(|| {
        MergeError::UnreadableDocument("overlay document has no pages".to_string())
    })?;

    let page_dims = page_size(doc, page_id)?;
    let overlay_dims = page_size(overlay, overlay_page_id)?;
    if (page_dims.0 - overlay_dims.0).abs() > PAGE_SIZE_TOLERANCE
        || (page_dims.1 - overlay_dims.1).abs() > PAGE_SIZE_TOLERANCE
    {
        return Err(MergeError::GeometryMismatch {
            page: page_dims,
            overlay: overlay_dims,
        });
    }

    let mut cache: HashMap<ObjectId, ObjectId> = HashMap::new();
    let xobject_id = create_page_xobject(doc, overlay, overlay_page_id, &mut cache)?;

    let mut resources = page_resources(doc, page_id)?;
    let mut xobjects = match resources.get(b"XObject") {
        Ok(obj) => resolve(doc, obj)?.as_dict()?.clone(),
        Err(_) => Dictionary::new(),
    };
    let name = unused_name(&xobjects, OVERLAY_XOBJECT_PREFIX);
    xobjects.set(name.as_bytes(), Object::Reference(xobject_id));
    resources.set("XObject", Object::Dictionary(xobjects));

    doc.get_dictionary_mut(page_id)?
        .set("Resources", Object::Dictionary(resources));

    let suffix = format!("\nQ\nq /{} Do Q\n", name);
    wrap_contents(doc, page_id, b"q\n", suffix.as_bytes())
}

/// First `{prefix}{n}` not already used as a key in `dict`.
fn unused_name(dict: &Dictionary, prefix: &str) -> String {
    (0u32..)
        .map(|n| format!("{}{}", prefix, n))
        .find(|name| !dict.has(name.as_bytes()))
        .unwrap_or_else(|| prefix.to_string())
}
