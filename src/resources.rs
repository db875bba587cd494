//! Process-wide reference data: criteria, growth table, estimator handles.
//!
//! [`Resources`] is assembled once and shared immutably; [`ResourceCache`]
//! gives long-lived servers lazy idempotent loading with an explicit reload
//! escape hatch.

use crate::error::OsteoError;
use crate::estimator::{MaturityEstimator, Recalibrator};
use crate::growth::GrowthCurveTable;
use crate::standardize::Criteria;
use std::sync::{Arc, Mutex};

/// Everything a prediction run reads but never mutates.
pub struct Resources {
    pub criteria: Criteria,
    pub table: GrowthCurveTable,
    pub estimator: Arc<dyn MaturityEstimator>,
    pub recalibrator: Option<Arc<dyn Recalibrator>>,
}

impl std::fmt::Debug for Resources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resources")
            .field("criteria", &self.criteria)
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl Resources {
    pub fn builder() -> ResourcesBuilder {
        ResourcesBuilder::default()
    }
}

/// Step-wise construction; `table` and `estimator` are mandatory.
#[derive(Default)]
pub struct ResourcesBuilder {
    criteria: Option<Criteria>,
    table: Option<GrowthCurveTable>,
    estimator: Option<Arc<dyn MaturityEstimator>>,
    recalibrator: Option<Arc<dyn Recalibrator>>,
}

impl ResourcesBuilder {
    pub fn criteria(mut self, criteria: Criteria) -> Self {
        self.criteria = Some(criteria);
        self
    }

    pub fn table(mut self, table: GrowthCurveTable) -> Self {
        self.table = Some(table);
        self
    }

    pub fn estimator(mut self, estimator: Arc<dyn MaturityEstimator>) -> Self {
        self.estimator = Some(estimator);
        self
    }

    pub fn recalibrator(mut self, recalibrator: Arc<dyn Recalibrator>) -> Self {
        self.recalibrator = Some(recalibrator);
        self
    }

    pub fn build(self) -> Result<Resources, OsteoError> {
        let table = self
            .table
            .ok_or_else(|| OsteoError::configuration("resources need a growth-curve table"))?;
        let estimator = self
            .estimator
            .ok_or_else(|| OsteoError::configuration("resources need a maturity estimator"))?;
        Ok(Resources {
            criteria: self.criteria.unwrap_or_default(),
            table,
            estimator,
            recalibrator: self.recalibrator,
        })
    }
}

/// Lazy shared holder for [`Resources`]. The first `get_or_load` caller runs
/// the loader while concurrent callers block on the lock and then share the
/// same `Arc`.
#[derive(Default)]
pub struct ResourceCache {
    slot: Mutex<Option<Arc<Resources>>>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load<F>(&self, loader: F) -> Result<Arc<Resources>, OsteoError>
    where
        F: FnOnce() -> Result<Resources, OsteoError>,
    {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(resources) = slot.as_ref() {
            return Ok(Arc::clone(resources));
        }
        let resources = Arc::new(loader()?);
        *slot = Some(Arc::clone(&resources));
        Ok(resources)
    }

    /// Replace the cached resources unconditionally.
    pub fn reload<F>(&self, loader: F) -> Result<Arc<Resources>, OsteoError>
    where
        F: FnOnce() -> Result<Resources, OsteoError>,
    {
        let resources = Arc::new(loader()?);
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(Arc::clone(&resources));
        Ok(resources)
    }
}
