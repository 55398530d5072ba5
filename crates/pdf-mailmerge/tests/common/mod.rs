#![allow(dead_code)]

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Build a document of `num_pages` pages of `width` x `height` points.
/// Page N's content stream is `% page N`, so pages can be told apart.
pub fn create_test_pdf(num_pages: usize, width: f32, height: f32) -> Document {
    let mut doc = Document::with_version("1.7");

    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for n in 1..=num_pages {
        let content = format!("% page {}\n", n).into_bytes();
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content));

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(width),
                    Object::Real(height),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));

    doc.trailer.set("Root", catalog_id);

    doc
}

/// US Letter test document
pub fn letter_pdf(num_pages: usize) -> Document {
    create_test_pdf(num_pages, 612.0, 792.0)
}

pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

pub fn number(obj: &Object) -> f32 {
    match obj {
        Object::Integer(i) => *i as f32,
        Object::Real(r) => *r,
        other => panic!("not a number: {:?}", other),
    }
}

/// `[llx, lly, urx, ury]` stored directly on the page
pub fn media_box(doc: &Document, page_id: ObjectId) -> [f32; 4] {
    let arr = doc
        .get_dictionary(page_id)
        .unwrap()
        .get(b"MediaBox")
        .unwrap()
        .as_array()
        .unwrap();
    [number(&arr[0]), number(&arr[1]), number(&arr[2]), number(&arr[3])]
}

/// All content stream bytes of a page, concatenated
pub fn page_content(doc: &Document, page_id: ObjectId) -> String {
    String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned()
}

/// Strings shown with `Tj` in a content stream
pub fn shown_strings(content: &[u8]) -> Vec<String> {
    Content::decode(content)
        .unwrap()
        .operations
        .into_iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| match op.operands.first() {
            Some(Object::String(bytes, _)) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        })
        .collect()
}

/// Text drawn by every overlay XObject merged onto a page
pub fn overlay_texts(doc: &Document, page_id: ObjectId) -> Vec<String> {
    let page = doc.get_dictionary(page_id).unwrap();
    let Ok(resources) = page.get(b"Resources").and_then(|r| r.as_dict()) else {
        return Vec::new();
    };
    let Ok(xobjects) = resources.get(b"XObject").and_then(|x| x.as_dict()) else {
        return Vec::new();
    };

    let mut texts = Vec::new();
    for (name, obj) in xobjects.iter() {
        if !name.starts_with(b"Ovl") {
            continue;
        }
        let stream = doc
            .get_object(obj.as_reference().unwrap())
            .unwrap()
            .as_stream()
            .unwrap();
        texts.extend(shown_strings(&stream.content));
    }
    texts
}
