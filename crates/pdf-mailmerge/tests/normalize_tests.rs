mod common;

use common::*;
use lopdf::Object;
use pdf_mailmerge::*;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 0.01
}

#[test]
fn test_fit_scale_is_min_of_axis_ratios() {
    let a4 = PageSize::a4();
    let scale = fit_scale((612.0, 792.0), a4);
    assert!(approx(scale, a4.width / 612.0));

    let wide = fit_scale((1000.0, 200.0), a4);
    assert!(approx(wide, a4.width / 1000.0));

    let tall = fit_scale((100.0, 2000.0), a4);
    assert!(approx(tall, a4.height / 2000.0));
}

#[test]
fn test_normalize_sets_target_geometry_and_keeps_order() {
    let template = letter_pdf(3);
    let target = PageSize::a4();

    let normalized = normalize(&template, target).unwrap();
    let ids = page_ids(&normalized);
    assert_eq!(ids.len(), 3);

    let scale = fit_scale((612.0, 792.0), target);
    for (i, &id) in ids.iter().enumerate() {
        let [llx, lly, urx, ury] = media_box(&normalized, id);
        assert_eq!((llx, lly), (0.0, 0.0));
        assert!(approx(urx, target.width));
        assert!(approx(ury, target.height));

        let content = page_content(&normalized, id);
        assert!(content.starts_with(&format!("q {} 0 0 {} 0 0 cm", scale, scale)));
        assert!(content.contains(&format!("% page {}", i + 1)));
        assert!(content.trim_end().ends_with('Q'));
    }
}

#[test]
fn test_scaled_content_never_exceeds_target() {
    let target = PageSize::a4();
    for (w, h) in [(612.0, 792.0), (1190.0, 1684.0), (100.0, 100.0), (842.0, 595.0)] {
        let scale = fit_scale((w, h), target);
        assert!(w * scale <= target.width + 0.01, "{}x{}", w, h);
        assert!(h * scale <= target.height + 0.01, "{}x{}", w, h);
        assert!(approx(w * scale, target.width) || approx(h * scale, target.height));
    }
}

#[test]
fn test_normalize_is_idempotent() {
    let target = PageSize::a4();
    let once = normalize(&letter_pdf(2), target).unwrap();
    let twice = normalize(&once, target).unwrap();

    let first = page_ids(&once);
    let second = page_ids(&twice);
    assert_eq!(first.len(), second.len());
    for (&a, &b) in first.iter().zip(&second) {
        assert_eq!(media_box(&once, a), media_box(&twice, b));
        assert_eq!(page_content(&once, a), page_content(&twice, b));
    }
}

#[test]
fn test_matching_pages_are_untouched() {
    let target = PageSize::a4();
    let template = create_test_pdf(1, target.width, target.height);

    let normalized = normalize(&template, target).unwrap();
    let id = page_ids(&normalized)[0];
    assert_eq!(page_content(&normalized, id), "% page 1\n");
}

#[test]
fn test_inherited_media_box_is_used() {
    let mut template = letter_pdf(2);
    for id in page_ids(&template) {
        template
            .get_dictionary_mut(id)
            .unwrap()
            .remove(b"MediaBox");
    }
    let catalog_id = template
        .trailer
        .get(b"Root")
        .unwrap()
        .as_reference()
        .unwrap();
    let pages_id = template
        .get_dictionary(catalog_id)
        .unwrap()
        .get(b"Pages")
        .unwrap()
        .as_reference()
        .unwrap();
    template.get_dictionary_mut(pages_id).unwrap().set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(612),
            Object::Integer(792),
        ]),
    );

    let target = PageSize::a4();
    let normalized = normalize(&template, target).unwrap();
    for id in page_ids(&normalized) {
        let [_, _, urx, ury] = media_box(&normalized, id);
        assert!(approx(urx, target.width));
        assert!(approx(ury, target.height));
        assert!(page_content(&normalized, id).starts_with("q "));
    }
}

#[test]
fn test_stale_crop_box_is_removed() {
    let mut template = letter_pdf(1);
    let id = page_ids(&template)[0];
    template.get_dictionary_mut(id).unwrap().set(
        "CropBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(612),
            Object::Integer(792),
        ]),
    );

    let normalized = normalize(&template, PageSize::a4()).unwrap();
    let id = page_ids(&normalized)[0];
    assert!(!normalized.get_dictionary(id).unwrap().has(b"CropBox"));
}

#[test]
fn test_degenerate_page_is_unreadable() {
    let template = create_test_pdf(1, 0.0, 792.0);
    match normalize(&template, PageSize::a4()) {
        Err(MergeError::UnreadableDocument(msg)) => assert!(msg.contains("Page 1")),
        other => panic!("Expected UnreadableDocument, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_garbage_bytes_are_unreadable() {
    let result = load_template_bytes(b"this is not a pdf");
    assert!(matches!(result, Err(MergeError::UnreadableDocument(_))));
}

#[test]
fn test_landscape_target() {
    let target = PageSize::from_paper(PaperSize::A4, Orientation::Landscape);
    assert!(target.width > target.height);

    let normalized = normalize(&letter_pdf(1), target).unwrap();
    let [_, _, urx, ury] = media_box(&normalized, page_ids(&normalized)[0]);
    assert!(approx(urx, target.width));
    assert!(approx(ury, target.height));
}

#[test]
fn test_offset_media_box_is_scaled_without_translation() {
    let mut template = letter_pdf(1);
    let id = page_ids(&template)[0];
    template.get_dictionary_mut(id).unwrap().set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(100),
            Object::Integer(100),
            Object::Integer(712),
            Object::Integer(892),
        ]),
    );

    let target = PageSize::a4();
    let normalized = normalize(&template, target).unwrap();
    let id = page_ids(&normalized)[0];

    let [llx, lly, urx, ury] = media_box(&normalized, id);
    assert_eq!((llx, lly), (0.0, 0.0));
    assert!(approx(urx, target.width));
    assert!(approx(ury, target.height));

    let scale = fit_scale((612.0, 792.0), target);
    let content = page_content(&normalized, id);
    assert!(content.starts_with(&format!("q {} 0 0 {} 0 0 cm\n", scale, scale)));
}
