use crate::constants::DEFAULT_OUTPUT_PREFIX;
use crate::overlay::OverlayStyle;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// What to do when one record cannot be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// Report the record as failed and continue with the next one
    #[default]
    SkipRecord,
    /// Stop the whole batch at the first failing record
    AbortBatch,
}

/// Merge configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    // Target geometry
    pub paper_size: PaperSize,
    pub orientation: Orientation,

    // Overlay text
    pub overlay: OverlayStyle,

    // Batch behaviour
    pub failure_policy: FailurePolicy,

    // Output naming
    pub output_prefix: String,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::A4,
            orientation: Orientation::Portrait,
            overlay: OverlayStyle::default(),
            failure_policy: FailurePolicy::SkipRecord,
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
        }
    }
}

impl MergeOptions {
    /// Load options from JSON file
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| MergeError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| MergeError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Target page size in points
    pub fn page_size(&self) -> PageSize {
        PageSize::from_paper(self.paper_size, self.orientation)
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        let (width_mm, height_mm) = self.paper_size.dimensions_mm();
        if !(width_mm > 0.0 && height_mm > 0.0 && width_mm.is_finite() && height_mm.is_finite())
        {
            return Err(MergeError::Config(format!(
                "Paper size must be positive, got {}x{} mm",
                width_mm, height_mm
            )));
        }

        if !(self.overlay.font_size > 0.0 && self.overlay.font_size.is_finite()) {
            return Err(MergeError::Config(format!(
                "Font size must be positive, got {}",
                self.overlay.font_size
            )));
        }

        if !self.overlay.baseline_offset.is_finite() {
            return Err(MergeError::Config(
                "Baseline offset must be a finite number".to_string(),
            ));
        }

        if !self.overlay.color.is_valid() {
            return Err(MergeError::Config(format!(
                "Color components must be within 0..=1, got {:?}",
                self.overlay.color
            )));
        }

        if self.output_prefix.trim().is_empty() {
            return Err(MergeError::Config(
                "Output prefix must not be empty".to_string(),
            ));
        }
        if self.output_prefix.contains(['/', '\\']) {
            return Err(MergeError::Config(format!(
                "Output prefix must be a plain file name, got '{}'",
                self.output_prefix
            )));
        }

        Ok(())
    }
}
