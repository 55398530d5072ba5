//! Shared constants for template merging
//!
//! This module centralizes magic numbers and constants used throughout
//! the merge pipeline.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4; // ≈ 2.83465

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

// =============================================================================
// Page Geometry
// =============================================================================

/// Fallback page width in points when a page has no MediaBox (US Letter)
pub const DEFAULT_PAGE_WIDTH_PT: f32 = 612.0;

/// Fallback page height in points (US Letter)
pub const DEFAULT_PAGE_HEIGHT_PT: f32 = 792.0;

/// Fallback page dimensions as tuple (width, height)
pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (DEFAULT_PAGE_WIDTH_PT, DEFAULT_PAGE_HEIGHT_PT);

/// Tolerance when comparing scale factors and box coordinates
pub const GEOMETRY_EPSILON: f32 = 1e-4;

/// Tolerance when comparing overlay and content page sizes (points)
pub const PAGE_SIZE_TOLERANCE: f32 = 0.01;

/// Maximum `/Parent` hops followed when resolving inherited page attributes
pub const MAX_INHERITANCE_DEPTH: usize = 32;

/// Page boxes that become stale once a page is rescaled
pub const STALE_PAGE_BOXES: [&[u8]; 4] = [b"CropBox", b"BleedBox", b"TrimBox", b"ArtBox"];

// =============================================================================
// Overlay Text
// =============================================================================

/// Font size used for tag text (points)
pub const OVERLAY_FONT_SIZE: f32 = 12.0;

/// Downward shift from the tag's top-left anchor to the text baseline (points)
pub const OVERLAY_BASELINE_OFFSET: f32 = 15.0;

/// Resource name of the overlay font inside the overlay page
pub const OVERLAY_FONT_RESOURCE: &str = "F1";

/// Base name for overlay XObjects placed on content pages
pub const OVERLAY_XOBJECT_PREFIX: &str = "Ovl";

/// Helvetica advance widths (1000 units/em) for WinAnsi codes 32..=126
pub const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, //
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, //
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, //
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, //
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, //
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Width used for codes outside the table
pub const FALLBACK_GLYPH_WIDTH: u16 = 556;

// =============================================================================
// Records and Output
// =============================================================================

/// Reserved record field listing the 1-based template pages to include,
/// comma-separated. A naming convention, not a schema requirement.
pub const PAGES_FIELD: &str = "Pages";

/// Default prefix for per-record output files (`output_file_1.pdf`, ...)
pub const DEFAULT_OUTPUT_PREFIX: &str = "output_file_";
