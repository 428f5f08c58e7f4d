use crate::algorithms::common::{nearest_neighbors, JoinInputs};
use crate::algorithms::first_row::QtSeed;
use crate::core::matrix_profile::ProfileRow;
use crate::metrics::euclidean::ZNormalizedEuclidean;

/// Minimum number of reference windows before the per-row column loop is
/// split across threads. Below this, dispatch overhead exceeds the gain.
#[cfg(feature = "parallel")]
pub const MIN_PARALLEL_COLUMNS: usize = 256;

/// Smallest run of columns handed to a single rayon task.
#[cfg(feature = "parallel")]
const COLUMN_CHUNK: usize = 512;

/// Row-wise STOMP recurrence over the query windows.
///
/// Each row's dot products are derived from the previous row's:
/// `QT[i][j] = QT[i-1][j-1] - T_B[i-1]*T_A[j-1] + T_B[i+m-1]*T_A[j+m-1]`,
/// an O(1) update per column instead of an O(m) dot product.
///
/// Two buffers alternate by row parity: row `i` writes `qt_even` when `i` is
/// even and reads `qt_odd`, and vice versa. Since no column reads a value
/// written in the same row, the column loop can run in any order, including
/// in parallel.
pub struct QtRecurrence<'a> {
    inputs: JoinInputs<'a>,
    qt_first: Vec<f64>,
    qt_even: Vec<f64>,
    qt_odd: Vec<f64>,
    squared: Vec<f64>,
    next_row: usize,
    #[cfg(feature = "parallel")]
    parallel: bool,
}

impl<'a> QtRecurrence<'a> {
    /// Create a recurrence whose buffers hold the dot products of query
    /// window `seed_row`; the first computed row is `seed_row + 1`.
    pub fn new(inputs: JoinInputs<'a>, seed: QtSeed, seed_row: usize) -> Self {
        let k = inputs.n_reference();
        debug_assert_eq!(seed.qt.len(), k);
        debug_assert_eq!(seed.qt_first.len(), inputs.n_query());
        Self {
            inputs,
            qt_first: seed.qt_first,
            qt_even: seed.qt.clone(),
            qt_odd: seed.qt,
            squared: vec![0.0; k],
            next_row: seed_row + 1,
            #[cfg(feature = "parallel")]
            parallel: k >= MIN_PARALLEL_COLUMNS,
        }
    }

    /// Force the column loop onto (or off) the rayon pool.
    #[cfg(feature = "parallel")]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Query index of the row the next `step` will produce.
    pub fn next_row(&self) -> usize {
        self.next_row
    }

    /// Dot products of the most recently processed row.
    pub fn current_qt(&self) -> &[f64] {
        if (self.next_row - 1) % 2 == 0 {
            &self.qt_even
        } else {
            &self.qt_odd
        }
    }

    /// Advance one row. Returns `None` once every query window is done, and
    /// immediately when there are no reference windows.
    pub fn step(&mut self) -> Option<ProfileRow> {
        let i = self.next_row;
        if i >= self.inputs.n_query() || self.squared.is_empty() {
            return None;
        }
        let JoinInputs {
            ts_a,
            ts_b,
            m,
            stats_a,
            stats_b,
            zone,
        } = self.inputs;

        let (live, prev) = if i % 2 == 0 {
            (&mut self.qt_even, &self.qt_odd)
        } else {
            (&mut self.qt_odd, &self.qt_even)
        };

        let leaving = ts_b[i - 1];
        let entering = ts_b[i + m - 1];

        #[cfg(feature = "parallel")]
        if self.parallel {
            update_columns_parallel(live, prev, ts_a, m, leaving, entering);
        } else {
            update_columns(live, prev, ts_a, m, leaving, entering);
        }
        #[cfg(not(feature = "parallel"))]
        update_columns(live, prev, ts_a, m, leaving, entering);

        // Column 0 has no predecessor; it comes from the first-column dot products.
        live[0] = self.qt_first[i];

        let (mean_q, msi_q) = (stats_b.mean[i], stats_b.m_sigma_inv[i]);

        #[cfg(feature = "parallel")]
        if self.parallel {
            fill_profile_parallel(
                &mut self.squared,
                live,
                m,
                mean_q,
                msi_q,
                &stats_a.mean,
                &stats_a.m_sigma_inv,
            );
        } else {
            ZNormalizedEuclidean::fill_squared_distance_profile(
                &mut self.squared,
                live,
                m,
                mean_q,
                msi_q,
                &stats_a.mean,
                &stats_a.m_sigma_inv,
            );
        }
        #[cfg(not(feature = "parallel"))]
        ZNormalizedEuclidean::fill_squared_distance_profile(
            &mut self.squared,
            live,
            m,
            mean_q,
            msi_q,
            &stats_a.mean,
            &stats_a.m_sigma_inv,
        );

        self.next_row += 1;
        Some(nearest_neighbors(&mut self.squared, i, zone))
    }

    /// Produce rows up to (not including) `range_stop`, clamped to the
    /// number of query windows.
    pub fn run(&mut self, range_stop: usize) -> Vec<ProfileRow> {
        let stop = range_stop.min(self.inputs.n_query());
        let mut rows = Vec::with_capacity(stop.saturating_sub(self.next_row));
        while self.next_row < stop {
            match self.step() {
                Some(row) => rows.push(row),
                None => break,
            }
        }
        rows
    }
}

impl Iterator for QtRecurrence<'_> {
    type Item = ProfileRow;

    fn next(&mut self) -> Option<ProfileRow> {
        self.step()
    }
}

/// Serial column update for one row. Columns `1..k` only.
#[inline]
fn update_columns(
    live: &mut [f64],
    prev: &[f64],
    ts_a: &[f64],
    m: usize,
    leaving: f64,
    entering: f64,
) {
    let k = live.len();
    for (((q, &p), &a_out), &a_in) in live[1..]
        .iter_mut()
        .zip(&prev[..k - 1])
        .zip(&ts_a[..k - 1])
        .zip(&ts_a[m..m + k - 1])
    {
        *q = p - leaving * a_out + entering * a_in;
    }
}

/// Column update split across the rayon pool. Each task owns a disjoint
/// run of `live`; `for_each` returns only after every column is written.
#[cfg(feature = "parallel")]
fn update_columns_parallel(
    live: &mut [f64],
    prev: &[f64],
    ts_a: &[f64],
    m: usize,
    leaving: f64,
    entering: f64,
) {
    use rayon::prelude::*;

    let k = live.len();
    live[1..]
        .par_iter_mut()
        .zip(prev[..k - 1].par_iter())
        .zip(ts_a[..k - 1].par_iter())
        .zip(ts_a[m..m + k - 1].par_iter())
        .with_min_len(COLUMN_CHUNK)
        .for_each(|(((q, &p), &a_out), &a_in)| {
            *q = p - leaving * a_out + entering * a_in;
        });
}

#[cfg(feature = "parallel")]
fn fill_profile_parallel(
    squared: &mut [f64],
    qt: &[f64],
    m: usize,
    mean_q: f64,
    msi_q: f64,
    mean_t: &[f64],
    msi_t: &[f64],
) {
    use rayon::prelude::*;

    squared
        .par_chunks_mut(COLUMN_CHUNK)
        .zip(qt.par_chunks(COLUMN_CHUNK))
        .zip(mean_t.par_chunks(COLUMN_CHUNK))
        .zip(msi_t.par_chunks(COLUMN_CHUNK))
        .for_each(|(((d, q), mu), s)| {
            ZNormalizedEuclidean::fill_squared_distance_profile(d, q, m, mean_q, msi_q, mu, s);
        });
}
