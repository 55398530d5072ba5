//! Page geometry normalization
//!
//! Every page of the template is uniformly scaled to fit the target size and
//! its MediaBox is set to exactly that size. This is the only stage that
//! changes geometry; everything downstream assumes `target` dimensions.

use crate::constants::{GEOMETRY_EPSILON, STALE_PAGE_BOXES};
use crate::render::{
    flatten_inherited, media_box, page_box, pages_root_id, set_page_tree, wrap_contents,
};
use crate::types::*;
use log::{debug, warn};
use lopdf::{Document, ObjectId};

/// Uniform scale that fits a `(width, height)` page inside `target`.
pub fn fit_scale(page: (f32, f32), target: PageSize) -> f32 {
    (target.width / page.0).min(target.height / page.1)
}

/// Rescale every page of `template` to `target`, returning a new document.
///
/// Page count and order are preserved. The page tree is flattened and
/// inherited attributes are copied onto each page.
pub fn normalize(template: &Document, target: PageSize) -> Result<Document> {
    let mut doc = template.clone();

    let pages = doc.get_pages();
    if pages.is_empty() {
        warn!("Template has no pages");
    }

    let root_id = pages_root_id(&doc).map_err(|e| {
        MergeError::UnreadableDocument(format!("Template has no usable page tree: {}", e))
    })?;

    let mut page_ids: Vec<ObjectId> = Vec::with_capacity(pages.len());
    for (number, page_id) in pages {
        flatten_inherited(&mut doc, page_id)?;
        let scale = normalize_page(&mut doc, page_id, target).map_err(|e| match e {
            MergeError::UnreadableDocument(reason) => {
                MergeError::UnreadableDocument(format!("Page {}: {}", number, reason))
            }
            other => other,
        })?;
        debug!("Normalized page {} (scale {:.4})", number, scale);
        page_ids.push(page_id);
    }

    set_page_tree(&mut doc, root_id, &page_ids)?;
    doc.prune_objects();

    Ok(doc)
}

/// Scale one page in place. Returns the applied scale.
fn normalize_page(doc: &mut Document, page_id: ObjectId, target: PageSize) -> Result<f32> {
    let [llx, lly, urx, ury] = page_box(doc, page_id)?;
    let (width, height) = (urx - llx, ury - lly);
    if !(width > 0.0 && height > 0.0) {
        return Err(MergeError::UnreadableDocument(format!(
            "degenerate MediaBox {}x{}",
            width, height
        )));
    }

    let scale = fit_scale((width, height), target);
    let unscaled = (scale - 1.0).abs() < GEOMETRY_EPSILON;
    let box_matches = [llx, lly, urx - target.width, ury - target.height]
        .iter()
        .all(|d| d.abs() < GEOMETRY_EPSILON);

    if unscaled && box_matches {
        return Ok(1.0);
    }

    // Scale only; the content origin stays where it was
    if !unscaled {
        let prefix = format!("q {} 0 0 {} 0 0 cm\n", scale, scale);
        wrap_contents(doc, page_id, prefix.as_bytes(), b"\nQ\n")?;
    }

    let page = doc.get_dictionary_mut(page_id)?;
    page.set("MediaBox", media_box(target.width, target.height));
    for key in STALE_PAGE_BOXES {
        page.remove(key);
    }

    Ok(scale)
}
