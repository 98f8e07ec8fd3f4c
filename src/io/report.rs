use serde::Serialize;

use crate::model::results::{BatchResults, RunFailure, RunResult};

/// A failed run as written to the report.
pub type ErrorRecord = RunFailure;

/// Output envelope of a batch.
///
/// Borrows from the [`BatchResults`] it was built from; successful
/// results keep their run-index order.
#[derive(Debug, Clone, Serialize)]
pub struct Report<'a> {
    pub successful_results: &'a [RunResult],
    pub total_requested: usize,
    pub successful_count: usize,
    pub failed_count: usize,
    pub errors: &'a [ErrorRecord],
}

impl<'a> Report<'a> {
    pub fn from_batch(batch: &'a BatchResults) -> Self {
        Self {
            successful_results: &batch.successful,
            total_requested: batch.total_requested,
            successful_count: batch.successful_count(),
            failed_count: batch.failed_count(),
            errors: &batch.failures,
        }
    }

    /// A batch fails as a whole only when nothing succeeded.
    pub fn is_failure(&self) -> bool {
        self.successful_count == 0 && self.total_requested > 0
    }
}
