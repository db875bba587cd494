//! Prediction orchestrator: image stages → estimator → cascade → record.
//!
//! The stage list is resolved once from the pipeline flags and executed as
//! a fold over the image; an unsuccessful ROI search keeps the prior image
//! and is only logged. Recalibration failures likewise fall back to the
//! clamped estimate.

pub mod options;
pub mod report;

pub use self::options::{PipelineFlags, PredictorParams, StageSpec};
pub use self::report::PredictionResult;

use crate::cascade;
use crate::error::OsteoError;
use crate::estimator::clamp_maturity;
use crate::growth::Sex;
use crate::image::GrayImage;
use crate::resources::Resources;
use crate::roi::{extract_roi, RoiOutcome};
use crate::standardize::standardize;
use log::{debug, warn};
use serde::Deserialize;

/// Per-request patient covariates.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct PatientInput {
    pub sex: Sex,
    pub height_cm: f64,
    pub age_months: f64,
    #[serde(default)]
    pub father_height_cm: Option<f64>,
    #[serde(default)]
    pub mother_height_cm: Option<f64>,
}

/// Stateless orchestrator; one instance serves many requests.
pub struct Predictor {
    params: PredictorParams,
    stages: Vec<StageSpec>,
}

impl Predictor {
    pub fn new(params: PredictorParams) -> Self {
        let stages = params.flags.build_stages();
        Self { params, stages }
    }

    pub fn params(&self) -> &PredictorParams {
        &self.params
    }

    /// Run the full prediction for one image + covariate set.
    pub fn process(
        &self,
        gray: GrayImage,
        input: &PatientInput,
        resources: &Resources,
    ) -> Result<PredictionResult, OsteoError> {
        if !(input.age_months.is_finite() && input.age_months >= 0.0) {
            return Err(OsteoError::input(format!(
                "age must be a non-negative month count, got {}",
                input.age_months
            )));
        }

        let image = self.run_stages(gray, resources);

        let raw = resources.estimator.estimate(&image, input.sex)?;
        let mut estimate = clamp_maturity(raw, input.age_months, self.params.max_deviation_months);
        if estimate.was_clamped {
            debug!(
                "maturity estimate {:.2} clamped to {:.2} (chronological {:.1})",
                estimate.raw, estimate.clamped, input.age_months
            );
        }

        if self.params.use_recalibration {
            if let Some(recalibrator) = &resources.recalibrator {
                match recalibrator.map(estimate.clamped) {
                    Ok(corrected) => {
                        debug!(
                            "recalibration {:.2} -> {:.2}",
                            estimate.clamped, corrected
                        );
                        estimate.recalibrated = Some(corrected);
                    }
                    Err(err) => {
                        warn!("recalibration failed, using clamped estimate: {err}");
                    }
                }
            }
        }
        let maturity_months = estimate.effective();

        let calib = cascade::calibrate(
            &resources.table,
            input.sex,
            input.height_cm,
            input.age_months,
            maturity_months,
            input.father_height_cm,
            input.mother_height_cm,
            self.params.adult_months,
        )?;

        Ok(PredictionResult::assemble(
            &calib,
            input.height_cm,
            input.age_months,
            maturity_months,
        ))
    }

    fn run_stages(&self, gray: GrayImage, resources: &Resources) -> GrayImage {
        self.stages.iter().fold(gray, |img, stage| match stage {
            StageSpec::Standardize => standardize(&img, &resources.criteria),
            StageSpec::ExtractRoi => match extract_roi(&img, &self.params.roi) {
                RoiOutcome::Extracted(crop) => crop,
                outcome => {
                    debug!("roi stage skipped ({}), keeping prior image", outcome.reason());
                    img
                }
            },
        })
    }
}
