//! Parameter types configuring the ROI extraction stages.
//!
//! Defaults carry the production tuning for hand radiographs. For new
//! acquisition protocols, start with the threshold block size and the
//! morphology kernel sizes.

use serde::Deserialize;

/// Exactly one denoising filter is active per configuration.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum Denoise {
    /// Edge-preserving smoothing (bilateral): `d` is the pixel diameter.
    Bilateral {
        d: usize,
        sigma_color: f64,
        sigma_space: f64,
    },
    /// Median blur with a `k × k` window (k oddized, min 3).
    Median { k: usize },
    /// Gaussian blur with a `k × k` kernel (k oddized, min 3).
    Gaussian { k: usize },
    /// Tile-based local contrast equalization with a clip limit.
    LocalEqualize { clip: f64, tile: usize },
}

/// Binarization method. `invert` lives in [`RoiOptions`] and applies to all.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum Threshold {
    /// Adaptive: per-pixel threshold is the block mean minus `c`.
    AdaptiveMean { block: usize, c: f64 },
    /// Adaptive: Gaussian-weighted block mean minus `c`.
    AdaptiveGaussian { block: usize, c: f64 },
    /// Fixed global threshold (clamped to 0–255).
    Global { t: i32 },
    /// Automatic global threshold (Otsu).
    Auto,
}

/// Contour selection strategy once candidates pass the filters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Weighted blend of area, perimeter, solidity and centrality.
    #[default]
    Composite,
    MaxArea,
    MaxPerimeter,
    MinCenterDist,
    MaxSolidity,
}

/// Morphological cleanup: each operation runs only when its kernel size is
/// positive, each repeated `iterations` times, in the fixed order
/// open → close → erode → dilate.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct Morphology {
    pub open_k: usize,
    pub close_k: usize,
    pub erode_k: usize,
    pub dilate_k: usize,
    pub iterations: usize,
    pub fill_holes: bool,
}

impl Default for Morphology {
    fn default() -> Self {
        Self {
            open_k: 5,
            close_k: 59,
            erode_k: 0,
            dilate_k: 61,
            iterations: 1,
            fill_holes: false,
        }
    }
}

/// Extractor-wide parameters controlling the segmentation pipeline.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RoiOptions {
    /// Border margin discarded on each side, percent of the dimension.
    pub margin_pct: f64,
    pub denoise: Denoise,
    pub threshold: Threshold,
    /// Invert the binary mask (bone bright on dark background).
    pub invert: bool,
    pub morphology: Morphology,
    /// Candidate area window, percent of the working-region area.
    pub min_area_pct: f64,
    pub max_area_pct: f64,
    /// Centroid must fall inside this central window; 0 accepts all.
    pub central_window_pct: f64,
    pub selection: SelectionMode,
    /// Composite weights as integer percents (divided by 100 at scoring).
    pub w_area: f64,
    pub w_length: f64,
    pub w_solidity: f64,
    pub w_center: f64,
    pub central_bias: f64,
    /// Bounding-box expansion applied to the winning contour, pixels.
    pub crop_margin: usize,
    /// Black out pixels outside the contour polygon within the crop.
    pub apply_mask: bool,
}

impl Default for RoiOptions {
    fn default() -> Self {
        Self {
            margin_pct: 10.0,
            denoise: Denoise::Median { k: 9 },
            threshold: Threshold::AdaptiveGaussian { block: 40, c: 9.0 },
            invert: true,
            morphology: Morphology::default(),
            min_area_pct: 10.0,
            max_area_pct: 100.0,
            central_window_pct: 0.0,
            selection: SelectionMode::Composite,
            w_area: 20.0,
            w_length: 70.0,
            w_solidity: 10.0,
            w_center: 30.0,
            central_bias: 10.0,
            crop_margin: 0,
            apply_mask: true,
        }
    }
}

/// Coerce to the nearest odd value, at least `min_odd`.
pub(crate) fn oddize(x: usize, min_odd: usize) -> usize {
    let x = x.max(min_odd);
    if x % 2 == 1 {
        x
    } else {
        x + 1
    }
}
