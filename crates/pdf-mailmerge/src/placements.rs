//! Reading tag placements from JSON
//!
//! The input is an array of `{ "pageNumber", "x", "y", "text" }` objects.
//! Elements that do not fit that shape are rejected one by one instead of
//! failing the whole list.

use crate::types::{MergeError, Result, TextPlacement};
use log::warn;
use std::path::Path;

/// Placements accepted from the input, plus one error per rejected element.
#[derive(Debug, Default)]
pub struct ParsedPlacements {
    pub placements: Vec<TextPlacement>,
    pub rejected: Vec<MergeError>,
}

pub fn parse_placements(json: &str) -> Result<ParsedPlacements> {
    let values: Vec<serde_json::Value> = serde_json::from_str(json)?;

    let mut parsed = ParsedPlacements::default();
    for (index, value) in values.into_iter().enumerate() {
        let checked = serde_json::from_value::<TextPlacement>(value)
            .map_err(|e| e.to_string())
            .and_then(|placement| placement.validate().map(|_| placement));

        match checked {
            Ok(placement) => parsed.placements.push(placement),
            Err(reason) => {
                warn!("Rejecting placement #{}: {}", index, reason);
                parsed
                    .rejected
                    .push(MergeError::InvalidPlacement { index, reason });
            }
        }
    }
    Ok(parsed)
}

pub async fn load_placements(path: impl AsRef<Path>) -> Result<ParsedPlacements> {
    let json = tokio::fs::read_to_string(path).await?;
    tokio::task::spawn_blocking(move || parse_placements(&json)).await?
}
