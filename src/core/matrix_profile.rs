use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};

/// Default threshold below which distances are considered suspiciously small.
pub const DEFAULT_NEAR_ZERO_THRESHOLD: f64 = 10e-6;

/// Windows with a standard deviation at or below this are treated as constant.
pub const STDDEV_THRESHOLD: f64 = 1e-7;

/// Configuration for matrix profile computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixProfileConfig {
    /// Subsequence length.
    pub m: usize,
    /// Whether this is a self-join, i.e. trivial matches must be excluded.
    pub ignore_trivial: bool,
    /// Exclusion zone denominator: zone = ceil(m / exclusion_zone_denom).
    /// Default is 4 (STOMP's m/4 rather than STAMP's m/2).
    pub exclusion_zone_denom: usize,
    /// Distances below this value count as near-zero for the
    /// misconfiguration diagnostic.
    pub near_zero_threshold: f64,
}

impl MatrixProfileConfig {
    pub fn new(m: usize) -> Self {
        Self {
            m,
            ignore_trivial: true,
            exclusion_zone_denom: 4,
            near_zero_threshold: DEFAULT_NEAR_ZERO_THRESHOLD,
        }
    }

    pub fn with_ignore_trivial(mut self, ignore_trivial: bool) -> Self {
        self.ignore_trivial = ignore_trivial;
        self
    }

    pub fn with_exclusion_zone_denom(mut self, denom: usize) -> Self {
        self.exclusion_zone_denom = denom;
        self
    }

    pub fn with_near_zero_threshold(mut self, threshold: f64) -> Self {
        self.near_zero_threshold = threshold;
        self
    }

    /// Half-width of the exclusion zone, `ceil(m / exclusion_zone_denom)`.
    pub fn exclusion_zone(&self) -> usize {
        self.m.div_ceil(self.exclusion_zone_denom.max(1))
    }

    /// The exclusion zone to mask around each query index, if any.
    ///
    /// `None` for AB-joins, where every candidate is a legitimate match.
    pub fn trivial_match_zone(&self) -> Option<usize> {
        self.ignore_trivial.then(|| self.exclusion_zone())
    }

    /// Check the parameters that do not depend on the input series.
    pub fn validate(&self) -> Result<()> {
        if self.m < 2 {
            return Err(Error::WindowTooShort { m: self.m });
        }
        if self.exclusion_zone_denom == 0 {
            return Err(Error::InvalidConfig(
                "exclusion_zone_denom must be positive".to_string(),
            ));
        }
        if !(self.near_zero_threshold.is_finite() && self.near_zero_threshold > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "near_zero_threshold must be a positive finite number, got {}",
                self.near_zero_threshold
            )));
        }
        Ok(())
    }
}

/// Rolling mean and standard deviation for all subsequences of length `m`.
///
/// Each window is reduced in two passes (mean, then squared deviations from
/// that mean), using the population denominator.
///
/// A window is constant when all of its values are equal, or when its
/// standard deviation is at most [`STDDEV_THRESHOLD`]. The equality check
/// catches flat windows at any magnitude, where the two-pass std is rounding
/// noise (around 1e-10 for values near 1e6). Constant windows get `std` and
/// `m_sigma_inv` of exactly zero.
#[derive(Debug, Clone)]
pub struct RollingStats {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
    /// Precomputed `1 / (sqrt(m) * sigma)` for each subsequence.
    /// Zero for constant subsequences (sigma == 0).
    /// Enables replacing division with multiplication in the distance kernel:
    /// `r = (QT - m*mu_i*mu_j) * m_sigma_inv[i] * m_sigma_inv[j]`
    pub m_sigma_inv: Vec<f64>,
    /// Whether any subsequence is constant (has sigma == 0).
    pub has_constant: bool,
}

impl RollingStats {
    /// Compute rolling statistics for subsequences of length `m`.
    pub fn compute(ts: &[f64], m: usize) -> Result<Self> {
        if m == 0 || ts.len() < m {
            return Err(Error::InvalidConfig(format!(
                "rolling window of {m} does not fit a series of length {}",
                ts.len()
            )));
        }

        let n_subs = ts.len() - m + 1;
        let mut mean = Vec::with_capacity(n_subs);
        let mut std = Vec::with_capacity(n_subs);
        let mut m_sigma_inv = Vec::with_capacity(n_subs);
        let mut has_constant = false;

        let m_f = m as f64;
        let sqrt_m = m_f.sqrt();
        for window in ts.windows(m) {
            let mu = window.iter().sum::<f64>() / m_f;
            let var = window.iter().map(|&x| (x - mu) * (x - mu)).sum::<f64>() / m_f;
            let sigma = var.sqrt();
            mean.push(mu);
            let flat = window.iter().all(|&x| x == window[0]);
            if flat || sigma <= STDDEV_THRESHOLD {
                std.push(0.0);
                m_sigma_inv.push(0.0);
                has_constant = true;
            } else {
                std.push(sigma);
                m_sigma_inv.push(1.0 / (sqrt_m * sigma));
            }
        }

        Ok(Self {
            mean,
            std,
            m_sigma_inv,
            has_constant,
        })
    }

    /// Number of windows covered.
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// Whether window `i` has zero standard deviation.
    #[inline]
    pub fn is_constant(&self, i: usize) -> bool {
        self.m_sigma_inv[i] == 0.0
    }
}

/// Nearest-neighbor record for one query window.
///
/// Indices use `-1` for "no neighbor", matching the `(l x 4)` layout of
/// [`MatrixProfile::to_matrix`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileRow {
    /// Z-normalized Euclidean distance to the nearest neighbor.
    pub distance: f64,
    /// Index of the nearest neighbor in the reference series.
    pub index: i64,
    /// Nearest neighbor strictly before the query (self-joins only).
    pub left_index: i64,
    /// Nearest neighbor strictly after the query (self-joins only).
    pub right_index: i64,
}

impl ProfileRow {
    pub const NO_NEIGHBOR: i64 = -1;

    pub fn neighbor(&self) -> Option<usize> {
        to_neighbor(self.index)
    }

    pub fn left_neighbor(&self) -> Option<usize> {
        to_neighbor(self.left_index)
    }

    pub fn right_neighbor(&self) -> Option<usize> {
        to_neighbor(self.right_index)
    }
}

#[inline]
fn to_neighbor(index: i64) -> Option<usize> {
    usize::try_from(index).ok()
}

/// The matrix profile result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixProfile {
    rows: Vec<ProfileRow>,
    /// Subsequence length used.
    pub m: usize,
    /// Exclusion zone half-width (applied only when `ignore_trivial`).
    pub exclusion_zone: usize,
    /// Whether the exclusion zone and left/right profiles were in effect.
    pub ignore_trivial: bool,
    /// Query index of the first row.
    pub range_start: usize,
}

impl MatrixProfile {
    pub(crate) fn from_rows(
        rows: Vec<ProfileRow>,
        config: &MatrixProfileConfig,
        range_start: usize,
    ) -> Self {
        Self {
            rows,
            m: config.m,
            exclusion_zone: config.exclusion_zone(),
            ignore_trivial: config.ignore_trivial,
            range_start,
        }
    }

    pub fn rows(&self) -> &[ProfileRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<ProfileRow> {
        self.rows
    }

    /// Row for query index `i` (absolute, not offset by `range_start`).
    pub fn row(&self, i: usize) -> Option<&ProfileRow> {
        i.checked_sub(self.range_start).and_then(|r| self.rows.get(r))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn distances(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.distance).collect()
    }

    pub fn indices(&self) -> Vec<i64> {
        self.rows.iter().map(|r| r.index).collect()
    }

    pub fn left_indices(&self) -> Vec<i64> {
        self.rows.iter().map(|r| r.left_index).collect()
    }

    pub fn right_indices(&self) -> Vec<i64> {
        self.rows.iter().map(|r| r.right_index).collect()
    }

    /// The `(l x 4)` layout: distance, index, left index, right index.
    pub fn to_matrix(&self) -> Vec<[f64; 4]> {
        self.rows
            .iter()
            .map(|r| {
                [
                    r.distance,
                    r.index as f64,
                    r.left_index as f64,
                    r.right_index as f64,
                ]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_stats_simple() {
        // ts = [1, 2, 3, 4, 5], m = 3
        // Subsequences: [1,2,3], [2,3,4], [3,4,5]
        // Means: 2, 3, 4
        // Stds: sqrt(2/3), sqrt(2/3), sqrt(2/3)
        let ts = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let stats = RollingStats::compute(&ts, 3).unwrap();

        assert_eq!(stats.len(), 3);
        assert!((stats.mean[0] - 2.0).abs() < 1e-10);
        assert!((stats.mean[1] - 3.0).abs() < 1e-10);
        assert!((stats.mean[2] - 4.0).abs() < 1e-10);

        let expected_std = (2.0_f64 / 3.0).sqrt();
        for s in &stats.std {
            assert!((s - expected_std).abs() < 1e-10);
        }
        assert!(!stats.has_constant);
    }

    #[test]
    fn test_rolling_stats_population_denominator() {
        // [0, 2]: population std = 1, sample std would be sqrt(2)
        let stats = RollingStats::compute(&[0.0, 2.0], 2).unwrap();
        assert!((stats.std[0] - 1.0).abs() < 1e-12);
        assert!((stats.m_sigma_inv[0] - 1.0 / 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_rolling_stats_constant() {
        let ts = vec![5.0; 10];
        let stats = RollingStats::compute(&ts, 4).unwrap();
        for mu in &stats.mean {
            assert!((mu - 5.0).abs() < 1e-10);
        }
        assert!(stats.std.iter().all(|&s| s == 0.0));
        assert!(stats.has_constant);
        assert!(stats.is_constant(0));
    }

    #[test]
    fn test_rolling_stats_constant_after_large_values() {
        // A flat run following large values must still be flagged constant
        let mut ts: Vec<f64> = (0..50).map(|i| 1e6 * (i as f64 * 0.7).sin()).collect();
        ts.extend(vec![-1.3; 8]);
        let stats = RollingStats::compute(&ts, 5).unwrap();
        let last = stats.len() - 1;
        assert_eq!(stats.std[last], 0.0);
        assert!(stats.is_constant(last));
        assert!((stats.mean[last] + 1.3).abs() < 1e-12);
    }

    #[test]
    fn test_rolling_stats_constant_inexact_values() {
        // Values with no exact binary form leave rounding residue in the std
        for v in [1234.567, 98765.4321, 1e6 + 0.3] {
            for m in [7, 10, 13] {
                let stats = RollingStats::compute(&vec![v; m + 3], m).unwrap();
                for i in 0..stats.len() {
                    assert!(stats.is_constant(i), "v={v}, m={m}, window {i}");
                    assert_eq!(stats.std[i], 0.0);
                }
                assert!(stats.has_constant);
            }
        }
    }

    #[test]
    fn test_rolling_stats_threshold_near_flat() {
        let mut ts = vec![3.0; 6];
        ts[2] += 1e-9;
        let stats = RollingStats::compute(&ts, 4).unwrap();
        assert!(stats.is_constant(0));

        ts[2] = 3.001;
        let stats = RollingStats::compute(&ts, 4).unwrap();
        assert!(!stats.is_constant(0));
    }

    #[test]
    fn test_rolling_stats_rejects_oversized_window() {
        assert!(RollingStats::compute(&[1.0, 2.0], 3).is_err());
        assert!(RollingStats::compute(&[1.0, 2.0], 0).is_err());
    }

    #[test]
    fn test_exclusion_zone() {
        let config = MatrixProfileConfig::new(8);
        assert_eq!(config.exclusion_zone(), 2); // ceil(8/4) = 2

        let config = MatrixProfileConfig::new(10);
        assert_eq!(config.exclusion_zone(), 3); // ceil(10/4) = 3
        assert_eq!(config.trivial_match_zone(), Some(3));

        let config = MatrixProfileConfig::new(10).with_ignore_trivial(false);
        assert_eq!(config.trivial_match_zone(), None);

        let config = MatrixProfileConfig::new(3);
        assert_eq!(config.exclusion_zone(), 1);
    }

    #[test]
    fn test_config_validate() {
        assert!(MatrixProfileConfig::new(4).validate().is_ok());
        assert_eq!(
            MatrixProfileConfig::new(1).validate(),
            Err(Error::WindowTooShort { m: 1 })
        );
        assert!(MatrixProfileConfig::new(4)
            .with_exclusion_zone_denom(0)
            .validate()
            .is_err());
        assert!(MatrixProfileConfig::new(4)
            .with_near_zero_threshold(f64::NAN)
            .validate()
            .is_err());
    }

    #[test]
    fn test_config_serde() {
        let config = MatrixProfileConfig::new(16).with_ignore_trivial(false);
        let json = serde_json::to_string(&config).unwrap();
        let back: MatrixProfileConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_profile_row_accessors() {
        let row = ProfileRow {
            distance: 0.5,
            index: 7,
            left_index: ProfileRow::NO_NEIGHBOR,
            right_index: 9,
        };
        assert_eq!(row.neighbor(), Some(7));
        assert_eq!(row.left_neighbor(), None);
        assert_eq!(row.right_neighbor(), Some(9));
    }

    #[test]
    fn test_matrix_profile_views() {
        let config = MatrixProfileConfig::new(4);
        let rows = vec![
            ProfileRow {
                distance: 1.0,
                index: 3,
                left_index: -1,
                right_index: 3,
            },
            ProfileRow {
                distance: 2.0,
                index: 0,
                left_index: 0,
                right_index: -1,
            },
        ];
        let mp = MatrixProfile::from_rows(rows, &config, 5);
        assert_eq!(mp.len(), 2);
        assert_eq!(mp.distances(), vec![1.0, 2.0]);
        assert_eq!(mp.indices(), vec![3, 0]);
        assert_eq!(mp.left_indices(), vec![-1, 0]);
        assert_eq!(mp.right_indices(), vec![3, -1]);
        assert_eq!(mp.row(6).map(|r| r.index), Some(0));
        assert!(mp.row(4).is_none());
        assert_eq!(mp.to_matrix()[0], [1.0, 3.0, -1.0, 3.0]);
    }
}
