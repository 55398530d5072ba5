use crate::constants::{PAGES_FIELD, mm_to_pt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("Unreadable document: {0}")]
    UnreadableDocument(String),
    #[error("Invalid placement #{index}: {reason}")]
    InvalidPlacement { index: usize, reason: String },
    #[error("Record {record}: {reason}")]
    RecordBinding { record: usize, reason: String },
    #[error("Overlay is {overlay:?} pt but page is {page:?} pt")]
    GeometryMismatch { page: (f32, f32), overlay: (f32, f32) },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, MergeError>;

/// Paper orientation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Orientation {
    /// Portrait: height > width
    #[default]
    Portrait,
    /// Landscape: width > height
    Landscape,
}

/// Standard paper sizes
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PaperSize {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Custom { width_mm: f32, height_mm: f32 },
}

impl PaperSize {
    /// Get base dimensions (always portrait for standard sizes)
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PaperSize::A3 => (297.0, 420.0),
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::A5 => (148.0, 210.0),
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::Legal => (215.9, 355.6),
            PaperSize::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        }
    }

    /// Get dimensions with orientation applied
    pub fn dimensions_with_orientation(self, orientation: Orientation) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

/// Target page geometry in points. Every normalized page has exactly this size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn from_paper(paper: PaperSize, orientation: Orientation) -> Self {
        let (w, h) = paper.dimensions_with_orientation(orientation);
        Self::new(mm_to_pt(w), mm_to_pt(h))
    }

    /// ISO A4 portrait, the default target.
    pub fn a4() -> Self {
        Self::from_paper(PaperSize::A4, Orientation::Portrait)
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::a4()
    }
}

/// RGB fill color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl TextColor {
    pub const BLACK: TextColor = TextColor::rgb(0.0, 0.0, 0.0);
    pub const WHITE: TextColor = TextColor::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn is_white(&self) -> bool {
        self.r >= 1.0 && self.g >= 1.0 && self.b >= 1.0
    }

    pub fn is_valid(&self) -> bool {
        [self.r, self.g, self.b]
            .iter()
            .all(|c| (0.0..=1.0).contains(c))
    }
}

impl Default for TextColor {
    fn default() -> Self {
        Self::BLACK
    }
}

impl FromStr for TextColor {
    type Err = MergeError;

    /// Accepts `black`, `white` or a `#rrggbb` hex triplet.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "black" => return Ok(Self::BLACK),
            "white" => return Ok(Self::WHITE),
            _ => {}
        }

        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(MergeError::Config(format!("Unknown color '{}'", s)));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|_| MergeError::Config(format!("Unknown color '{}'", s)))
        };
        Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

/// A single tag to render: page (1-based, original template numbering),
/// top-left-origin coordinates in points, and the tag key or literal text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextPlacement {
    pub page_number: u32,
    pub x: f32,
    pub y: f32,
    pub text: String,
}

impl TextPlacement {
    pub fn new(page_number: u32, x: f32, y: f32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            x,
            y,
            text: text.into(),
        }
    }

    /// Check the fields the overlay step depends on.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.page_number == 0 {
            return Err("pageNumber must be 1 or greater".to_string());
        }
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(format!(
                "coordinates ({}, {}) are not finite numbers",
                self.x, self.y
            ));
        }
        Ok(())
    }
}

/// One row of tabular input: field name to value.
///
/// Keys are trimmed on insertion; values are kept verbatim. The `Pages`
/// field is only a naming convention (see [`PAGES_FIELD`]): it selects the
/// template pages for the record but otherwise behaves like any other field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.fields
            .insert(key.as_ref().trim().to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Value for a tag key, or the empty string when the record has no such field.
    pub fn resolve(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    /// The raw `Pages` value, if present and not blank.
    pub fn pages_field(&self) -> Option<&str> {
        self.get(PAGES_FIELD).filter(|v| !v.trim().is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {:?}", key, value)?;
        }
        f.write_str("}")
    }
}
