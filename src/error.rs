//! Error taxonomy for the prediction core.
//!
//! Stage skips (ROI search finding nothing) are deliberately NOT errors;
//! they are reported through [`crate::roi::RoiOutcome`] and the pipeline
//! continues with the prior image. Only conditions that make the request
//! or the process unusable surface here.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OsteoError {
    /// Missing or malformed request input (unreadable image, bad covariates).
    /// Surfaced to the caller, never retried.
    #[error("input error: {0}")]
    Input(String),

    /// Missing or inconsistent reference data (criteria file, growth table,
    /// empty sex partition). Fatal at startup or per request.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The external recalibration mapping is absent or failed for this
    /// input. Recovered locally by falling back to the clamped estimate.
    #[error("recalibration unavailable: {0}")]
    Recalibration(String),

    /// The external maturity estimator failed outright.
    #[error("estimator error: {0}")]
    Estimator(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image {path}: {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read growth table: {0}")]
    Csv(#[from] csv::Error),
}

impl OsteoError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}
