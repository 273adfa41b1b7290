//! Contracts for the external analysis collaborators.
//!
//! Activity scoring (AUCell), binarization and 2-D embedding are computed
//! outside this crate. The exporter only needs blocking calls that return a
//! complete matrix; failures surface unchanged as
//! [`ExportError::Delegate`](crate::errors::ExportError::Delegate).
//!
//! The worker count is threaded through explicitly rather than read from a
//! process-global default, so callers stay in control of parallelism.

use ndarray::Array2;

use crate::models::{ActivityMatrix, EmbeddingMatrix, ExpressionMatrix, Regulon, ThresholdRecord};

/// Per-cell, per-regulon enrichment scoring (AUCell or equivalent).
pub trait ActivityScorer {
    /// Computes the cells × regulons activity matrix. `num_workers` bounds
    /// internal fan-out; the call blocks until the full matrix is available.
    fn compute_activity(
        &self,
        expression: &ExpressionMatrix,
        regulons: &[Regulon],
        num_workers: usize,
    ) -> anyhow::Result<ActivityMatrix>;
}

/// Derives active/inactive calls and per-regulon thresholds from an activity
/// matrix. Thresholds may be plain scalars or carry extra payload; both are
/// modelled by [`crate::models::Threshold`].
pub trait Binarizer {
    fn compute_binarization(
        &self,
        activity: &ActivityMatrix,
    ) -> anyhow::Result<(Array2<f64>, Vec<ThresholdRecord>)>;
}

/// Dimensionality reduction producing exactly one (x, y) pair per cell.
pub trait Embedder {
    fn compute_embedding(&self, activity: &ActivityMatrix) -> anyhow::Result<EmbeddingMatrix>;
}
