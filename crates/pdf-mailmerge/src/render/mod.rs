//! Low-level PDF object handling shared by the pipeline stages
//!
//! This module handles all lopdf-specific plumbing:
//! - Resolving inherited page attributes and page geometry
//! - Rebuilding page trees and wrapping content streams
//! - Creating XObjects from pages and deep copying PDF objects

mod page;
mod xobject;

pub use page::*;
pub use xobject::{copy_object_deep, create_page_xobject};
