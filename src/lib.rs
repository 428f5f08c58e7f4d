pub mod algorithms;
pub mod core;
pub mod metrics;

use std::ops::Range;

pub use crate::algorithms::first_row::QtSeed;
pub use crate::algorithms::recurrence::QtRecurrence;
pub use crate::algorithms::stomp::{stomp, stomp_range};
pub use crate::core::diagnostics::{Diagnostic, DiagnosticSink, LogSink, NullSink};
pub use crate::core::error::{Error, Result, SeriesRole};
pub use crate::core::matrix_profile::{
    MatrixProfile, MatrixProfileConfig, ProfileRow, RollingStats,
};
pub use crate::metrics::euclidean::ZNormalizedEuclidean;

/// High-level facade for STOMP matrix profile computation.
///
/// Diagnostics from the plain `compute`/`self_join`/`ab_join` calls go to the
/// `log` facade; use [`StompEngine::compute_with_sink`] to capture them.
///
/// # Examples
///
/// ```
/// use stomp_rs::{MatrixProfileConfig, StompEngine};
///
/// let ts = vec![1.0, 2.0, 3.0, 2.0, 1.0, 2.0, 3.0, 2.0, 1.0];
/// let engine = StompEngine::new(MatrixProfileConfig::new(4));
/// let mp = engine.self_join(&ts).unwrap();
/// assert_eq!(mp.len(), ts.len() - 4 + 1);
/// assert_eq!(mp.rows()[0].index, 4);
/// ```
#[derive(Debug, Clone)]
pub struct StompEngine {
    config: MatrixProfileConfig,
}

impl StompEngine {
    pub fn new(config: MatrixProfileConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatrixProfileConfig {
        &self.config
    }

    /// Matrix profile of `ts` against itself, with trivial matches excluded.
    pub fn self_join(&self, ts: &[f64]) -> Result<MatrixProfile> {
        stomp(ts, None, &self.config, &mut LogSink::default())
    }

    /// Nearest neighbor in `ts_a` for every window of `ts_b`, no exclusion zone.
    pub fn ab_join(&self, ts_a: &[f64], ts_b: &[f64]) -> Result<MatrixProfile> {
        let config = self.config.clone().with_ignore_trivial(false);
        stomp(ts_a, Some(ts_b), &config, &mut LogSink::default())
    }

    /// Compute with the configured join mode; `ts_b = None` forces a self-join.
    pub fn compute(&self, ts_a: &[f64], ts_b: Option<&[f64]>) -> Result<MatrixProfile> {
        stomp(ts_a, ts_b, &self.config, &mut LogSink::default())
    }

    /// Like [`StompEngine::compute`], sending diagnostics to `sink`.
    pub fn compute_with_sink(
        &self,
        ts_a: &[f64],
        ts_b: Option<&[f64]>,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<MatrixProfile> {
        stomp(ts_a, ts_b, &self.config, sink)
    }

    /// Compute only the query rows in `range`.
    pub fn compute_range(
        &self,
        ts_a: &[f64],
        ts_b: Option<&[f64]>,
        range: Range<usize>,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<MatrixProfile> {
        stomp_range(ts_a, ts_b, &self.config, range, sink)
    }
}
