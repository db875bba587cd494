//! Orchestrator configuration: stage flags and run parameters.

use crate::roi::RoiOptions;
use serde::Deserialize;

/// One step of the image pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageSpec {
    Standardize,
    ExtractRoi,
}

/// Which pipeline stages run, and in what combination. Two standardize/ROI
/// rounds are supported; the default is a single standardize pass.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct PipelineFlags {
    pub do_standardize: bool,
    pub do_roi: bool,
    pub use_std1: bool,
    pub use_roi1: bool,
    pub use_std2: bool,
    pub use_roi2: bool,
}

impl Default for PipelineFlags {
    fn default() -> Self {
        Self {
            do_standardize: true,
            do_roi: true,
            use_std1: true,
            use_roi1: false,
            use_std2: false,
            use_roi2: false,
        }
    }
}

impl PipelineFlags {
    /// Resolve the flags into the ordered stage list executed per request.
    pub fn build_stages(&self) -> Vec<StageSpec> {
        let mut stages = Vec::with_capacity(4);
        if self.do_standardize && self.use_std1 {
            stages.push(StageSpec::Standardize);
        }
        if self.do_roi && self.use_roi1 {
            stages.push(StageSpec::ExtractRoi);
        }
        if self.do_standardize && self.use_std2 {
            stages.push(StageSpec::Standardize);
        }
        if self.do_roi && self.use_roi2 {
            stages.push(StageSpec::ExtractRoi);
        }
        stages
    }
}

/// Full orchestrator parameter set.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PredictorParams {
    pub flags: PipelineFlags,
    pub roi: RoiOptions,
    /// Maximum allowed |maturity - chronological|, months.
    pub max_deviation_months: f64,
    /// Adult reference age for the cascade's distribution lookups, months.
    pub adult_months: f64,
    /// Apply the recalibrator when the resources carry one.
    pub use_recalibration: bool,
}

impl Default for PredictorParams {
    fn default() -> Self {
        Self {
            flags: PipelineFlags::default(),
            roi: RoiOptions::default(),
            max_deviation_months: 24.0,
            adult_months: 216.0,
            use_recalibration: true,
        }
    }
}
