//! Document I/O and output manifests

use crate::pipeline::MergeOutcome;
use crate::types::*;
use lopdf::Document;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Parse template bytes. Any parse failure is an [`MergeError::UnreadableDocument`].
pub fn load_template_bytes(bytes: &[u8]) -> Result<Document> {
    Document::load_mem(bytes).map_err(|e| MergeError::UnreadableDocument(e.to_string()))
}

/// Load a PDF document from disk
pub async fn load_pdf(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::fs::read(&path).await?;
    let doc = tokio::task::spawn_blocking(move || load_template_bytes(&bytes))
        .await?
        .map_err(|e| match e {
            MergeError::UnreadableDocument(reason) => {
                MergeError::UnreadableDocument(format!("{}: {}", path.display(), reason))
            }
            other => other,
        })?;
    Ok(doc)
}

/// Serialize a document to PDF bytes
pub fn to_bytes(mut doc: Document) -> Result<Vec<u8>> {
    let mut writer = Vec::new();
    doc.save_to(&mut writer)?;
    Ok(writer)
}

/// Save a document to disk
pub async fn save_pdf(doc: Document, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::task::spawn_blocking(move || to_bytes(doc)).await??;
    tokio::fs::write(&path, bytes).await?;
    Ok(())
}

/// File name for the record at 1-based `index`, e.g. `output_file_3.pdf`.
pub fn output_file_name(prefix: &str, index: usize) -> String {
    format!("{}{}.pdf", prefix, index)
}

/// Summary of a run, as handed back to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Manifest {
    pub message: String,
    pub files: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FailureEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureEntry {
    pub record: usize,
    pub error: String,
}

/// Write every merged document into `dir` and describe the result.
///
/// `Manifest::files` holds absolute paths.
pub async fn write_outputs(
    outcome: MergeOutcome,
    dir: impl AsRef<Path>,
    prefix: &str,
) -> Result<Manifest> {
    tokio::fs::create_dir_all(dir.as_ref()).await?;
    // Manifest paths are absolute regardless of how `dir` was given
    let dir = tokio::fs::canonicalize(dir.as_ref()).await?;

    let mut files = Vec::with_capacity(outcome.documents.len());
    for merged in outcome.documents {
        let path = dir.join(output_file_name(prefix, merged.index));
        save_pdf(merged.document, &path).await?;
        log::debug!("Wrote {}", path.display());
        files.push(path);
    }

    let failures: Vec<FailureEntry> = outcome
        .failures
        .into_iter()
        .map(|f| FailureEntry {
            record: f.index,
            error: f.error.to_string(),
        })
        .collect();

    let message = if failures.is_empty() {
        "PDFs processed successfully".to_string()
    } else {
        format!(
            "PDFs processed with {} failed record(s)",
            failures.len()
        )
    };

    Ok(Manifest {
        message,
        files,
        failures,
    })
}
