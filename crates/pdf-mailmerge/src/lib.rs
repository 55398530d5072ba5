pub mod binder;
mod constants;
pub mod io;
pub mod merge;
pub mod normalize;
mod options;
pub mod overlay;
pub mod pipeline;
pub mod placements;
pub mod records;
pub mod render;
pub mod subset;
mod types;

pub use binder::{BoundPlacement, bind_tags, group_by_page, resolve_pages};
pub use constants::{DEFAULT_OUTPUT_PREFIX, PAGES_FIELD};
pub use io::{Manifest, load_pdf, load_template_bytes, save_pdf, write_outputs};
pub use merge::merge_overlay;
pub use normalize::{fit_scale, normalize};
pub use options::*;
pub use overlay::{OverlayStyle, render_overlay, text_width};
pub use pipeline::{MergeOutcome, MergedDocument, RecordFailure, run, run_merge};
pub use placements::{ParsedPlacements, load_placements, parse_placements};
pub use records::{load_records, read_records};
pub use subset::{in_range_pages, select_pages};
pub use types::*;
