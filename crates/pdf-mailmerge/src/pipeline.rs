//! Per-record merge pipeline
//!
//! This module orchestrates the whole run:
//! 1. Normalize the template once
//! 2. For each record: resolve pages, select them, bind tags
//! 3. Render one overlay per original page number and merge it onto every
//!    subset page that came from that page
//! 4. Collect documents and record-scoped failures in record order

use crate::binder::{bind_tags, group_by_page, resolve_pages};
use crate::merge::merge_overlay;
use crate::normalize::normalize;
use crate::options::{FailurePolicy, MergeOptions};
use crate::overlay::{OverlayStyle, render_overlay};
use crate::subset::{in_range_pages, select_pages};
use crate::types::*;
use log::{debug, info, warn};
use lopdf::{Document, ObjectId};
use std::collections::BTreeMap;

/// One record's finished document.
#[derive(Debug)]
pub struct MergedDocument {
    /// 1-based position of the record in the input
    pub index: usize,
    /// Template pages the document was built from, in output order
    pub source_pages: Vec<u32>,
    pub document: Document,
    /// Placements left out because their fields were unusable, indexed by
    /// position in the input placement list
    pub skipped_placements: Vec<MergeError>,
}

/// A record that could not be produced.
#[derive(Debug)]
pub struct RecordFailure {
    /// 1-based position of the record in the input
    pub index: usize,
    pub error: MergeError,
}

/// Result of a merge run, in record order.
#[derive(Debug, Default)]
pub struct MergeOutcome {
    pub documents: Vec<MergedDocument>,
    pub failures: Vec<RecordFailure>,
}

impl MergeOutcome {
    pub fn into_documents(self) -> Vec<Document> {
        self.documents.into_iter().map(|d| d.document).collect()
    }
}

/// Produce one document per record from `template`.
///
/// Template problems are returned immediately. Record problems follow
/// [`MergeOptions::failure_policy`].
pub fn run(
    template: &Document,
    records: &[Record],
    placements: &[TextPlacement],
    options: &MergeOptions,
) -> Result<MergeOutcome> {
    options.validate()?;

    if options.overlay.color.is_white() {
        warn!("Overlay text color is white; merged text will be invisible on white pages");
    }

    let target = options.page_size();
    let normalized = normalize(template, target)?;
    let page_count = normalized.get_pages().len();

    info!(
        "Merging {} records into a {}-page template ({:.1}x{:.1} pt)",
        records.len(),
        page_count,
        target.width,
        target.height
    );

    let mut outcome = MergeOutcome::default();
    for (offset, record) in records.iter().enumerate() {
        let index = offset + 1;
        match merge_record(
            &normalized,
            page_count,
            record,
            placements,
            target,
            &options.overlay,
        ) {
            Ok((document, source_pages, skipped_placements)) => {
                outcome.documents.push(MergedDocument {
                    index,
                    source_pages,
                    document,
                    skipped_placements,
                });
            }
            Err(e) => {
                let error = MergeError::RecordBinding {
                    record: index,
                    reason: e.to_string(),
                };
                match options.failure_policy {
                    FailurePolicy::AbortBatch => return Err(error),
                    FailurePolicy::SkipRecord => {
                        warn!("Skipping record {}: {}", index, e);
                        outcome.failures.push(RecordFailure { index, error });
                    }
                }
            }
        }
    }

    info!(
        "Merged {} documents ({} failed)",
        outcome.documents.len(),
        outcome.failures.len()
    );

    Ok(outcome)
}

/// Run the pipeline on the blocking thread pool.
pub async fn run_merge(
    template: Document,
    records: Vec<Record>,
    placements: Vec<TextPlacement>,
    options: MergeOptions,
) -> Result<MergeOutcome> {
    tokio::task::spawn_blocking(move || run(&template, &records, &placements, &options)).await?
}

fn merge_record(
    normalized: &Document,
    page_count: usize,
    record: &Record,
    placements: &[TextPlacement],
    target: PageSize,
    style: &OverlayStyle,
) -> Result<(Document, Vec<u32>, Vec<MergeError>)> {
    let page_numbers = resolve_pages(record, page_count);
    let source_pages = in_range_pages(&page_numbers, page_count);
    debug!(
        "Record {}: pages {:?} -> {:?}",
        record, page_numbers, source_pages
    );

    let mut document = select_pages(normalized, &source_pages)?;
    let page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();
    if page_ids.len() != source_pages.len() {
        return Err(MergeError::UnreadableDocument(format!(
            "subset has {} pages, expected {}",
            page_ids.len(),
            source_pages.len()
        )));
    }

    let groups = group_by_page(bind_tags(placements, &page_numbers, record));

    let mut overlays: BTreeMap<u32, Document> = BTreeMap::new();
    let mut skipped = Vec::new();
    for (page_number, group) in &groups {
        if !source_pages.contains(page_number) {
            continue;
        }
        let (indices, tags): (Vec<usize>, Vec<TextPlacement>) = group
            .iter()
            .map(|bound| (bound.index, bound.placement.clone()))
            .unzip();
        let rendered = render_overlay(&tags, target, style)?;
        debug!(
            "Rendered {} placements for page {}",
            tags.len() - rendered.skipped.len(),
            page_number
        );
        // Report skips by their position in the input list
        skipped.extend(rendered.skipped.into_iter().map(|e| match e {
            MergeError::InvalidPlacement { index, reason } => MergeError::InvalidPlacement {
                index: indices.get(index).copied().unwrap_or(index),
                reason,
            },
            other => other,
        }));
        overlays.insert(*page_number, rendered.document);
    }

    for (page_id, source) in page_ids.iter().zip(&source_pages) {
        if let Some(overlay) = overlays.get(source) {
            merge_overlay(&mut document, *page_id, overlay)?;
        }
    }

    Ok((document, source_pages, skipped))
}
