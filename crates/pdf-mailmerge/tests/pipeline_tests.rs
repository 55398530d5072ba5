mod common;

use common::*;
use lopdf::{Document, Object};
use pdf_mailmerge::*;

fn record(fields: &[(&str, &str)]) -> Record {
    fields.iter().map(|&(k, v)| (k, v)).collect()
}

fn placements() -> Vec<TextPlacement> {
    vec![
        TextPlacement::new(1, 100.0, 100.0, "Name"),
        TextPlacement::new(2, 100.0, 200.0, "City"),
        TextPlacement::new(3, 50.0, 50.0, "Name"),
    ]
}

/// Three A4 pages where page 2 has an unusable `/Contents` entry. The page
/// already has the target size, so only merging onto it fails.
fn template_with_broken_page() -> Document {
    let a4 = PageSize::a4();
    let mut doc = create_test_pdf(3, a4.width, a4.height);
    let broken = page_ids(&doc)[1];
    doc.get_dictionary_mut(broken)
        .unwrap()
        .set("Contents", Object::Integer(5));
    doc
}

#[test]
fn test_each_record_gets_its_pages_and_values() {
    let template = letter_pdf(3);
    let records = vec![
        record(&[("Name", "Alice"), ("City", "Paris"), ("Pages", "1,3")]),
        record(&[("Name", "Bob"), ("City", "Rome")]),
    ];

    let outcome = run(&template, &records, &placements(), &MergeOptions::default()).unwrap();
    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.documents.len(), 2);

    let alice = &outcome.documents[0];
    assert_eq!(alice.index, 1);
    assert_eq!(alice.source_pages, vec![1, 3]);
    let ids = page_ids(&alice.document);
    assert_eq!(ids.len(), 2);
    assert!(page_content(&alice.document, ids[0]).contains("% page 1"));
    assert!(page_content(&alice.document, ids[1]).contains("% page 3"));
    assert_eq!(overlay_texts(&alice.document, ids[0]), vec!["Alice"]);
    assert_eq!(overlay_texts(&alice.document, ids[1]), vec!["Alice"]);

    let bob = &outcome.documents[1];
    assert_eq!(bob.index, 2);
    let ids = page_ids(&bob.document);
    assert_eq!(ids.len(), 3);
    assert_eq!(overlay_texts(&bob.document, ids[0]), vec!["Bob"]);
    assert_eq!(overlay_texts(&bob.document, ids[1]), vec!["Rome"]);
    assert_eq!(overlay_texts(&bob.document, ids[2]), vec!["Bob"]);
}

#[test]
fn test_output_pages_have_target_size() {
    let outcome = run(
        &letter_pdf(2),
        &[record(&[("Name", "Alice")])],
        &placements(),
        &MergeOptions::default(),
    )
    .unwrap();

    let target = PageSize::a4();
    let doc = &outcome.documents[0].document;
    for id in page_ids(doc) {
        let [_, _, urx, ury] = media_box(doc, id);
        assert!((urx - target.width).abs() < 0.01);
        assert!((ury - target.height).abs() < 0.01);
    }
}

#[test]
fn test_repeated_page_is_tagged_every_time() {
    let outcome = run(
        &letter_pdf(3),
        &[record(&[("Name", "Carol"), ("Pages", "1,1")])],
        &placements(),
        &MergeOptions::default(),
    )
    .unwrap();

    let doc = &outcome.documents[0].document;
    let ids = page_ids(doc);
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
    assert_eq!(overlay_texts(doc, ids[0]), vec!["Carol"]);
    assert_eq!(overlay_texts(doc, ids[1]), vec!["Carol"]);
}

#[test]
fn test_missing_field_renders_empty_text() {
    let outcome = run(
        &letter_pdf(1),
        &[record(&[("Other", "x")])],
        &placements(),
        &MergeOptions::default(),
    )
    .unwrap();

    let doc = &outcome.documents[0].document;
    assert_eq!(overlay_texts(doc, page_ids(doc)[0]), vec![""]);
}

#[test]
fn test_pages_out_of_range_give_empty_document() {
    let outcome = run(
        &letter_pdf(2),
        &[record(&[("Name", "Dan"), ("Pages", "7,9")])],
        &placements(),
        &MergeOptions::default(),
    )
    .unwrap();

    assert_eq!(outcome.documents.len(), 1);
    assert!(outcome.documents[0].source_pages.is_empty());
    assert!(outcome.documents[0].document.get_pages().is_empty());
}

#[test]
fn test_invalid_placement_is_reported_per_document() {
    let mut tags = placements();
    tags.push(TextPlacement::new(1, f32::INFINITY, 0.0, "Name"));

    let outcome = run(
        &letter_pdf(1),
        &[record(&[("Name", "Eve")])],
        &tags,
        &MergeOptions::default(),
    )
    .unwrap();

    let merged = &outcome.documents[0];
    assert_eq!(merged.skipped_placements.len(), 1);
    assert_eq!(
        overlay_texts(&merged.document, page_ids(&merged.document)[0]),
        vec!["Eve"]
    );
}

#[test]
fn test_failing_record_is_skipped_by_default() {
    let records = vec![
        record(&[("Name", "A"), ("Pages", "1")]),
        record(&[("City", "B"), ("Pages", "2")]),
        record(&[("Name", "C"), ("Pages", "3")]),
    ];

    let outcome = run(
        &template_with_broken_page(),
        &records,
        &placements(),
        &MergeOptions::default(),
    )
    .unwrap();

    let produced: Vec<usize> = outcome.documents.iter().map(|d| d.index).collect();
    assert_eq!(produced, vec![1, 3]);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].index, 2);
    assert!(matches!(
        outcome.failures[0].error,
        MergeError::RecordBinding { record: 2, .. }
    ));
}

#[test]
fn test_abort_policy_stops_the_batch() {
    let records = vec![
        record(&[("Name", "A"), ("Pages", "1")]),
        record(&[("City", "B"), ("Pages", "2")]),
    ];
    let options = MergeOptions {
        failure_policy: FailurePolicy::AbortBatch,
        ..MergeOptions::default()
    };

    let result = run(&template_with_broken_page(), &records, &placements(), &options);
    assert!(matches!(
        result,
        Err(MergeError::RecordBinding { record: 2, .. })
    ));
}

#[test]
fn test_invalid_options_are_rejected() {
    let mut options = MergeOptions::default();
    options.overlay.font_size = 0.0;

    let result = run(&letter_pdf(1), &[], &placements(), &options);
    assert!(matches!(result, Err(MergeError::Config(_))));
}

#[test]
fn test_no_records_gives_empty_outcome() {
    let outcome = run(&letter_pdf(2), &[], &placements(), &MergeOptions::default()).unwrap();
    assert!(outcome.documents.is_empty());
    assert!(outcome.failures.is_empty());
}

#[tokio::test]
async fn test_run_merge_on_blocking_pool() {
    let outcome = run_merge(
        letter_pdf(2),
        vec![record(&[("Name", "Alice")])],
        placements(),
        MergeOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(outcome.into_documents().len(), 1);
}

#[test]
fn test_alice_and_bob_scenario() {
    let records = vec![
        record(&[("Name", "Alice"), ("Pages", "1,2")]),
        record(&[("Name", "Bob")]),
    ];
    let tags = vec![TextPlacement::new(1, 10.0, 10.0, "Name")];

    let docs = run(&letter_pdf(3), &records, &tags, &MergeOptions::default())
        .unwrap()
        .into_documents();
    assert_eq!(docs.len(), 2);

    let alice = page_ids(&docs[0]);
    assert_eq!(alice.len(), 2);
    assert_eq!(overlay_texts(&docs[0], alice[0]), vec!["Alice"]);
    assert!(overlay_texts(&docs[0], alice[1]).is_empty());

    let bob = page_ids(&docs[1]);
    assert_eq!(bob.len(), 3);
    assert_eq!(overlay_texts(&docs[1], bob[0]), vec!["Bob"]);
    assert!(overlay_texts(&docs[1], bob[2]).is_empty());
}

#[test]
fn test_skipped_placements_keep_their_input_index() {
    let tags = vec![
        TextPlacement::new(1, 10.0, 10.0, "Name"),
        TextPlacement::new(1, f32::NAN, 10.0, "Name"),
        TextPlacement::new(2, 10.0, 10.0, "Name"),
        TextPlacement::new(2, 10.0, f32::INFINITY, "Name"),
    ];

    let outcome = run(
        &letter_pdf(2),
        &[record(&[("Name", "Zed")])],
        &tags,
        &MergeOptions::default(),
    )
    .unwrap();

    let indices: Vec<usize> = outcome.documents[0]
        .skipped_placements
        .iter()
        .map(|e| match e {
            MergeError::InvalidPlacement { index, .. } => *index,
            other => panic!("unexpected error {:?}", other),
        })
        .collect();
    assert_eq!(indices, vec![1, 3]);
}
