//! Pipeline configuration.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options recognized by the conversion pipeline.
///
/// Every field is optional in the JSON form; omitted fields take the
/// [`Default`] value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Output sampling rate in Hz (`None` keeps the native rate)
    pub hertz: Option<u32>,
    /// Seconds trimmed from the start of every snippet
    pub start_offset: f64,
    /// Seconds trimmed from the end of every snippet
    pub end_offset: f64,
    /// Snippets to convert (`None` converts all of them)
    pub snippet_ids: Option<Vec<u32>>,
    /// Snippets longer than this many seconds are skipped
    pub max_scenario_duration: Option<f64>,
    /// Also make the two criticality vocabularies available to converters
    pub load_criticality_vocabularies: bool,
}

impl PipelineConfig {
    pub fn from_json_str(text: &str) -> Result<Self, PipelineError> {
        let config: PipelineConfig = serde_json::from_str(text)?;
        Ok(config.normalized())
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| PipelineError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Clamp negative or non-finite trim offsets to zero.
    pub fn normalized(mut self) -> Self {
        for offset in [&mut self.start_offset, &mut self.end_offset] {
            if !offset.is_finite() || *offset < 0.0 {
                *offset = 0.0;
            }
        }
        self
    }
}
