//! Seams for the external maturity estimator and its recalibration layer.
//!
//! The crate never trains or embeds a model; it consumes one behind
//! [`MaturityEstimator`] and optionally post-corrects its output behind
//! [`Recalibrator`]. Both traits return months.

use crate::error::OsteoError;
use crate::growth::Sex;
use crate::image::GrayImage;

/// Produces a skeletal-maturity age estimate, in months, for one image.
pub trait MaturityEstimator: Send + Sync {
    fn estimate(&self, image: &GrayImage, sex: Sex) -> Result<f64, OsteoError>;
}

/// Monotonic correction of an estimator's output, fitted offline. May fail
/// outside its fitted range; callers fall back to the uncorrected value.
pub trait Recalibrator: Send + Sync {
    fn map(&self, months: f64) -> Result<f64, OsteoError>;
}

/// Fixed-output estimator for demos and tests.
#[derive(Clone, Copy, Debug)]
pub struct ConstantEstimator {
    pub months: f64,
}

impl ConstantEstimator {
    pub fn new(months: f64) -> Self {
        Self { months }
    }
}

impl MaturityEstimator for ConstantEstimator {
    fn estimate(&self, _image: &GrayImage, _sex: Sex) -> Result<f64, OsteoError> {
        Ok(self.months)
    }
}

/// Weighted average over several member estimators, evaluated in order.
pub struct EnsembleEstimator {
    members: Vec<(Box<dyn MaturityEstimator>, f64)>,
}

impl std::fmt::Debug for EnsembleEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnsembleEstimator")
            .field("members", &self.members.len())
            .finish()
    }
}

impl EnsembleEstimator {
    pub fn new(members: Vec<(Box<dyn MaturityEstimator>, f64)>) -> Result<Self, OsteoError> {
        if members.is_empty() {
            return Err(OsteoError::configuration("ensemble needs at least one member"));
        }
        let weight_sum: f64 = members.iter().map(|(_, w)| w).sum();
        if !(weight_sum.is_finite() && weight_sum > 0.0) {
            return Err(OsteoError::configuration(format!(
                "ensemble weights must sum to a positive value, got {weight_sum}"
            )));
        }
        Ok(Self { members })
    }
}

impl MaturityEstimator for EnsembleEstimator {
    fn estimate(&self, image: &GrayImage, sex: Sex) -> Result<f64, OsteoError> {
        let mut num = 0.0;
        let mut den = 0.0;
        for (member, weight) in &self.members {
            let months = member.estimate(image, sex)?;
            num += weight * months;
            den += weight;
        }
        Ok(num / den)
    }
}

/// A maturity estimate with its clamp and recalibration bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaturityEstimate {
    /// The estimator's raw output, months.
    pub raw: f64,
    /// Raw output clamped to `chronological ± max_deviation`.
    pub clamped: f64,
    pub was_clamped: bool,
    /// Set by the orchestrator when recalibration succeeds.
    pub recalibrated: Option<f64>,
}

impl MaturityEstimate {
    /// The value the cascade should use.
    pub fn effective(&self) -> f64 {
        self.recalibrated.unwrap_or(self.clamped)
    }
}

/// Clamp a raw estimate to within `max_deviation_months` of the
/// chronological age.
pub fn clamp_maturity(raw: f64, chronological_months: f64, max_deviation_months: f64) -> MaturityEstimate {
    let lo = chronological_months - max_deviation_months;
    let hi = chronological_months + max_deviation_months;
    let clamped = raw.clamp(lo, hi);
    MaturityEstimate {
        raw,
        clamped,
        was_clamped: clamped != raw,
        recalibrated: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_pulls_runaway_estimates_back() {
        let est = clamp_maturity(250.0, 143.0, 24.0);
        assert_eq!(est.clamped, 167.0);
        assert!(est.was_clamped);
        assert_eq!(est.effective(), 167.0);

        let low = clamp_maturity(90.0, 143.0, 24.0);
        assert_eq!(low.clamped, 119.0);
        assert!(low.was_clamped);
    }

    #[test]
    fn clamp_leaves_in_range_estimates_alone() {
        let est = clamp_maturity(150.0, 143.0, 24.0);
        assert_eq!(est.clamped, 150.0);
        assert!(!est.was_clamped);
    }

    #[test]
    fn recalibrated_value_wins_when_present() {
        let mut est = clamp_maturity(150.0, 143.0, 24.0);
        est.recalibrated = Some(148.2);
        assert_eq!(est.effective(), 148.2);
    }

    #[test]
    fn ensemble_is_a_weighted_average() {
        let ensemble = EnsembleEstimator::new(vec![
            (Box::new(ConstantEstimator::new(120.0)), 1.0),
            (Box::new(ConstantEstimator::new(150.0)), 3.0),
        ])
        .unwrap();
        let img = GrayImage::new(4, 4);
        let months = ensemble.estimate(&img, Sex::Male).unwrap();
        assert!((months - 142.5).abs() < 1e-12);
    }

    #[test]
    fn empty_ensemble_is_a_configuration_error() {
        let err = EnsembleEstimator::new(Vec::new()).unwrap_err();
        assert!(matches!(err, OsteoError::Configuration(_)));
    }
}
