//! Declarative standardization criteria, loaded once per process.

use crate::error::OsteoError;
use serde::Deserialize;
use std::path::Path;

/// Standardization criteria document.
///
/// Every section is optional; an empty document makes [`super::standardize`]
/// a near no-op (only the intensity remap with auto-derived windows runs).
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Criteria {
    #[serde(default)]
    pub align: Align,
    #[serde(default)]
    pub resize: Resize,
    #[serde(default)]
    pub roi: Option<RoiBox>,
    #[serde(default)]
    pub intensity: Intensity,
    /// Power-curve exponent applied on the 0–255 domain after windowing.
    #[serde(default)]
    pub gamma: Option<f64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Align {
    /// Rotation about the image centre, degrees, positive = counter-clockwise.
    #[serde(default)]
    pub rotate_deg: Option<f64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Resize {
    /// Target length of the shorter edge, pixels.
    #[serde(default)]
    pub short: Option<u32>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxKind {
    #[default]
    Relative,
    Absolute,
}

/// Crop box, either fractional (relative to image dimensions) or in pixels.
#[derive(Clone, Debug, Deserialize)]
pub struct RoiBox {
    #[serde(rename = "type", default)]
    pub kind: BoxKind,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Intensity window. Missing source bounds are derived per image as the
/// 1st/99th pixel percentile.
#[derive(Clone, Debug, Deserialize)]
pub struct Intensity {
    #[serde(default)]
    pub src_lo: Option<f64>,
    #[serde(default)]
    pub src_hi: Option<f64>,
    #[serde(default = "default_dst_lo")]
    pub dst_lo: f64,
    #[serde(default = "default_dst_hi")]
    pub dst_hi: f64,
}

fn default_dst_lo() -> f64 {
    0.0
}

fn default_dst_hi() -> f64 {
    255.0
}

impl Default for Intensity {
    fn default() -> Self {
        Self {
            src_lo: None,
            src_hi: None,
            dst_lo: 0.0,
            dst_hi: 255.0,
        }
    }
}

impl Criteria {
    pub fn from_json_path(path: &Path) -> Result<Self, OsteoError> {
        let contents = std::fs::read_to_string(path).map_err(|source| OsteoError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let criteria: Criteria =
            serde_json::from_str(&contents).map_err(|source| OsteoError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        criteria.validate()?;
        Ok(criteria)
    }

    /// Destination window must be non-degenerate; the source window is
    /// coerced at apply time instead (`src_hi <= src_lo` becomes
    /// `src_lo + 1`).
    pub fn validate(&self) -> Result<(), OsteoError> {
        if self.intensity.dst_hi <= self.intensity.dst_lo {
            return Err(OsteoError::configuration(format!(
                "intensity destination window is degenerate: [{}, {}]",
                self.intensity.dst_lo, self.intensity.dst_hi
            )));
        }
        Ok(())
    }
}
