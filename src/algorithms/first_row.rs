use crate::algorithms::common::{nearest_neighbors, sliding_dot_product, JoinInputs};
use crate::core::matrix_profile::ProfileRow;
use crate::metrics::euclidean::ZNormalizedEuclidean;

/// Dot products that seed the row recurrence.
#[derive(Debug, Clone)]
pub struct QtSeed {
    /// `qt[j]` = dot(query window `start`, reference window `j`).
    pub qt: Vec<f64>,
    /// `qt_first[i]` = dot(reference window 0, query window `i`), for every `i`.
    pub qt_first: Vec<f64>,
}

impl QtSeed {
    /// Compute the seed for a recurrence whose first row is query index `start`.
    pub fn compute(ts_a: &[f64], ts_b: &[f64], m: usize, start: usize) -> Self {
        Self {
            qt: sliding_dot_product(&ts_b[start..start + m], ts_a),
            qt_first: sliding_dot_product(&ts_a[..m], ts_b),
        }
    }
}

/// Profile row for query index `start`, computed directly.
///
/// `qt` holds the dot products of query window `start` against every
/// reference window, as in [`QtSeed::qt`]. Masking and tie-break rules are
/// the same as for the rows the recurrence produces.
pub fn first_profile_row(inputs: &JoinInputs<'_>, start: usize, qt: &[f64]) -> ProfileRow {
    debug_assert_eq!(qt.len(), inputs.n_reference());
    let mut squared = ZNormalizedEuclidean::squared_distance_profile(
        qt,
        inputs.m,
        start,
        inputs.stats_b,
        inputs.stats_a,
    );
    nearest_neighbors(&mut squared, start, inputs.zone)
}
