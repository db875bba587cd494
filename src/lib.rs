#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod cascade;
pub mod error;
pub mod estimator;
pub mod growth;
pub mod image;
pub mod predictor;
pub mod resources;

// Pipeline stages – public for tools, considered unstable internals.
pub mod config;
pub mod roi;
pub mod standardize;

// --- High-level re-exports -------------------------------------------------

// Main entry points: orchestrator + results.
pub use crate::error::OsteoError;
pub use crate::predictor::{
    PatientInput, PipelineFlags, PredictionResult, Predictor, PredictorParams,
};
pub use crate::resources::{ResourceCache, Resources};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
pub mod prelude {
    pub use crate::cascade::{CalibrationResult, PotentialScore, PotentialTier};
    pub use crate::estimator::{
        ConstantEstimator, EnsembleEstimator, MaturityEstimator, Recalibrator,
    };
    pub use crate::growth::{GrowthCurveTable, Lms, Sex};
    pub use crate::image::GrayImage;
    pub use crate::roi::{extract_roi, RoiOptions, RoiOutcome};
    pub use crate::standardize::{standardize, Criteria};
    pub use crate::{
        OsteoError, PatientInput, PredictionResult, Predictor, PredictorParams, ResourceCache,
        Resources,
    };
}
