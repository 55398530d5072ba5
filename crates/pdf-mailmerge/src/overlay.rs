//! Text overlay rendering
//!
//! Placements use a top-left origin with y growing downward; PDF uses a
//! bottom-left origin. For each placement on a page of height `H`:
//!
//! ```text
//! y_pdf = max(H - y, 0) - baseline_offset
//! x_pdf = x                       if x + width <= W
//!       = W - width               otherwise (flush with the right edge)
//! ```

use crate::constants::{
    FALLBACK_GLYPH_WIDTH, HELVETICA_WIDTHS, OVERLAY_BASELINE_OFFSET, OVERLAY_FONT_RESOURCE,
    OVERLAY_FONT_SIZE,
};
use crate::render::build_single_page_document;
use crate::types::*;
use log::warn;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object};
use serde::{Deserialize, Serialize};

/// Font size, baseline offset and fill color for overlay text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    pub font_size: f32,
    pub baseline_offset: f32,
    pub color: TextColor,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            font_size: OVERLAY_FONT_SIZE,
            baseline_offset: OVERLAY_BASELINE_OFFSET,
            color: TextColor::default(),
        }
    }
}

/// Text positioned in PDF user space (bottom-left origin).
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedText {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub text: String,
}

/// A rendered overlay page and the placements that could not be drawn.
#[derive(Debug)]
pub struct RenderedOverlay {
    pub document: Document,
    pub skipped: Vec<MergeError>,
}

/// Rendered width of `text` in Helvetica at `font_size`.
pub fn text_width(text: &str, font_size: f32) -> f32 {
    let units: u32 = encode_win_ansi(text)
        .into_iter()
        .map(|b| glyph_width(b) as u32)
        .sum();
    units as f32 * font_size / 1000.0
}

fn glyph_width(code: u8) -> u16 {
    match code {
        32..=126 => HELVETICA_WIDTHS[(code - 32) as usize],
        _ => FALLBACK_GLYPH_WIDTH,
    }
}

/// Compute where a placement's text is drawn on a page of size `page`.
pub fn position_text(
    placement: &TextPlacement,
    page: PageSize,
    style: &OverlayStyle,
) -> std::result::Result<PositionedText, String> {
    placement.validate()?;

    let inverted_y = (page.height - placement.y).max(0.0);
    let width = text_width(&placement.text, style.font_size);
    let x = if placement.x + width > page.width {
        page.width - width
    } else {
        placement.x
    };

    Ok(PositionedText {
        x,
        y: inverted_y - style.baseline_offset,
        width,
        text: placement.text.clone(),
    })
}

/// Draw all placements for one page onto a blank page of size `page`.
///
/// Placements with unusable coordinates are left out and reported in
/// [`RenderedOverlay::skipped`], indexed by their position in `placements`.
pub fn render_overlay(
    placements: &[TextPlacement],
    page: PageSize,
    style: &OverlayStyle,
) -> Result<RenderedOverlay> {
    let mut skipped = Vec::new();
    let mut operations = vec![
        Operation::new("q", vec![]),
        Operation::new(
            "rg",
            vec![
                Object::Real(style.color.r),
                Object::Real(style.color.g),
                Object::Real(style.color.b),
            ],
        ),
    ];

    for (index, placement) in placements.iter().enumerate() {
        let positioned = match position_text(placement, page, style) {
            Ok(positioned) => positioned,
            Err(reason) => {
                warn!(
                    "Skipping placement on page {}: {}",
                    placement.page_number, reason
                );
                skipped.push(MergeError::InvalidPlacement { index, reason });
                continue;
            }
        };

        operations.extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![
                    Object::Name(OVERLAY_FONT_RESOURCE.as_bytes().to_vec()),
                    Object::Real(style.font_size),
                ],
            ),
            Operation::new(
                "Td",
                vec![Object::Real(positioned.x), Object::Real(positioned.y)],
            ),
            Operation::new(
                "Tj",
                vec![Object::string_literal(encode_win_ansi(&positioned.text))],
            ),
            Operation::new("ET", vec![]),
        ]);
    }
    operations.push(Operation::new("Q", vec![]));

    let content = Content { operations }.encode()?;
    let document = build_single_page_document(page.width, page.height, font_resources(), content);

    Ok(RenderedOverlay { document, skipped })
}

/// Resources holding the standard Helvetica font under [`OVERLAY_FONT_RESOURCE`].
fn font_resources() -> Dictionary {
    let font = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
        ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
    ]);

    let mut fonts = Dictionary::new();
    fonts.set(OVERLAY_FONT_RESOURCE, Object::Dictionary(font));

    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(fonts));
    resources
}

/// Encode text as WinAnsi bytes; unmappable characters become `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            _ => b'?',
        })
        .collect()
}
