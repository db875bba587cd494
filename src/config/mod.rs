//! Runtime configuration documents for the tool binaries.

use crate::roi::RoiOptions;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Default, Deserialize)]
pub struct OutputConfig {
    pub standardized_image: Option<PathBuf>,
    pub roi_image: Option<PathBuf>,
    pub summary_json: Option<PathBuf>,
}

/// Config document for the ROI extraction tool.
#[derive(Clone, Deserialize)]
pub struct RoiToolConfig {
    pub input: PathBuf,
    /// Standardization criteria JSON; omitted = raw image goes straight to
    /// ROI extraction.
    #[serde(default)]
    pub criteria: Option<PathBuf>,
    #[serde(default)]
    pub roi: RoiOptions,
    #[serde(default)]
    pub output: OutputConfig,
}

pub fn load_roi_tool_config(path: &Path) -> Result<RoiToolConfig, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}
