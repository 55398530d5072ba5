//! Per-record page subsetting

use crate::render::{flatten_inherited, pages_root_id, set_page_tree};
use crate::types::*;
use log::debug;
use lopdf::{Document, ObjectId};
use std::collections::HashSet;

/// Keep only the page numbers that exist in a document of `page_count` pages,
/// preserving order and repeats.
pub fn in_range_pages(page_numbers: &[u32], page_count: usize) -> Vec<u32> {
    page_numbers
        .iter()
        .copied()
        .filter(|&n| n >= 1 && n as usize <= page_count)
        .collect()
}

/// Build a new document from the listed 1-based pages of `doc`, in list order.
///
/// Out-of-range numbers are skipped. A page listed more than once becomes a
/// separate page object each time, sharing its content streams, so later
/// per-page changes stay local to one occurrence.
pub fn select_pages(doc: &Document, page_numbers: &[u32]) -> Result<Document> {
    let mut output = doc.clone();
    let pages = output.get_pages();
    let root_id = pages_root_id(&output)?;

    let mut seen: HashSet<ObjectId> = HashSet::new();
    let mut kids = Vec::with_capacity(page_numbers.len());

    for &number in page_numbers {
        let Some(&page_id) = pages.get(&number) else {
            debug!(
                "Skipping page {} (document has {} pages)",
                number,
                pages.len()
            );
            continue;
        };

        if seen.insert(page_id) {
            flatten_inherited(&mut output, page_id)?;
            kids.push(page_id);
        } else {
            let copy = output.get_dictionary(page_id)?.clone();
            kids.push(output.add_object(copy));
        }
    }

    set_page_tree(&mut output, root_id, &kids)?;
    output.prune_objects();

    Ok(output)
}
