//! Binding records to pages and tags

use crate::types::{Record, TextPlacement};
use std::collections::{BTreeMap, HashSet};

/// Pages requested by a record, in the order listed.
///
/// The record's `Pages` field is split on commas; tokens that are not
/// positive integers are dropped. Without a `Pages` value every page
/// `1..=page_count` is included.
pub fn resolve_pages(record: &Record, page_count: usize) -> Vec<u32> {
    match record.pages_field() {
        Some(value) => parse_page_list(value),
        None => (1..=page_count as u32).collect(),
    }
}

fn parse_page_list(value: &str) -> Vec<u32> {
    value
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|token| token.parse::<u32>().ok())
        .filter(|&n| n >= 1)
        .collect()
}

/// A placement with its tag resolved against one record.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundPlacement {
    /// Position of the placement in the input list
    pub index: usize,
    pub placement: TextPlacement,
}

/// Placements on the given pages, with each tag replaced by the record's value.
///
/// Membership is by page number, not position. The shared `placements`
/// slice is left untouched.
pub fn bind_tags(
    placements: &[TextPlacement],
    page_numbers: &[u32],
    record: &Record,
) -> Vec<BoundPlacement> {
    let wanted: HashSet<u32> = page_numbers.iter().copied().collect();

    placements
        .iter()
        .enumerate()
        .filter(|(_, p)| wanted.contains(&p.page_number))
        .map(|(index, p)| BoundPlacement {
            index,
            placement: TextPlacement {
                text: record.resolve(&p.text).to_string(),
                ..p.clone()
            },
        })
        .collect()
}

/// Group placements by original page number, keeping their relative order.
pub fn group_by_page(placements: Vec<BoundPlacement>) -> BTreeMap<u32, Vec<BoundPlacement>> {
    let mut groups: BTreeMap<u32, Vec<BoundPlacement>> = BTreeMap::new();
    for bound in placements {
        groups
            .entry(bound.placement.page_number)
            .or_default()
            .push(bound);
    }
    groups
}
