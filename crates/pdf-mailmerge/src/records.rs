//! Reading records from CSV

use crate::types::{Record, Result};
use std::io::Read;
use std::path::Path;

/// Read CSV with a header row into records. Header names are trimmed.
///
/// Short rows are accepted; fields they lack are simply absent from the record.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        records.push(headers.iter().zip(row.iter()).collect::<Record>());
    }
    Ok(records)
}

pub async fn load_records(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let path = path.as_ref().to_owned();

    let contents = tokio::fs::read(&path).await?;

    // CSV parsing is CPU-bound, spawn blocking
    let records =
        tokio::task::spawn_blocking(move || read_records(contents.as_slice())).await??;

    log::debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}
