use crate::core::matrix_profile::RollingStats;

/// Z-normalized Euclidean distance kernel.
///
/// Works on squared distances: `D = 2 * m * (1 - r)` where
/// `r = (QT - m * mu_q * mu_t) / (m * sigma_q * sigma_t)`.
///
/// Edge cases:
/// - Both windows constant (sigma_q == 0 && sigma_t == 0) → D = 0
/// - One window constant → D = 2m (zero correlation)
/// - `r` is clamped to [-1, 1], so D always lies in [0, 4m]
#[derive(Debug, Clone, Copy)]
pub struct ZNormalizedEuclidean;

impl ZNormalizedEuclidean {
    /// Squared distance for a single pair, given its dot product.
    ///
    /// `msi_*` are the `1 / (sqrt(m) * sigma)` factors from [`RollingStats`],
    /// zero for constant windows.
    #[inline(always)]
    pub fn squared_distance(
        qt: f64,
        m_f: f64,
        mean_q: f64,
        msi_q: f64,
        mean_t: f64,
        msi_t: f64,
    ) -> f64 {
        // Both constant → identical after z-normalization
        if msi_q == 0.0 && msi_t == 0.0 {
            return 0.0;
        }
        // One constant → uncorrelated with any non-constant window
        if msi_q == 0.0 || msi_t == 0.0 {
            return 2.0 * m_f;
        }
        let r = (qt - m_f * mean_q * mean_t) * msi_q * msi_t;
        (2.0 * m_f * (1.0 - r.clamp(-1.0, 1.0))).max(0.0)
    }

    /// Fill `out` with the squared distance profile of one query window.
    ///
    /// `qt[j]`, `mean_t[j]` and `msi_t[j]` describe reference window `j`;
    /// all four slices must have the same length. Callers may pass matching
    /// sub-slices to split the profile into independent chunks.
    pub fn fill_squared_distance_profile(
        out: &mut [f64],
        qt: &[f64],
        m: usize,
        mean_q: f64,
        msi_q: f64,
        mean_t: &[f64],
        msi_t: &[f64],
    ) {
        debug_assert_eq!(out.len(), qt.len());
        debug_assert_eq!(out.len(), mean_t.len());
        debug_assert_eq!(out.len(), msi_t.len());
        let m_f = m as f64;
        for (((d, &q), &mu_t), &s_t) in out.iter_mut().zip(qt).zip(mean_t).zip(msi_t) {
            *d = Self::squared_distance(q, m_f, mean_q, msi_q, mu_t, s_t);
        }
    }

    /// Squared distance profile of query window `i` (stats in `stats_q`)
    /// against every reference window (stats in `stats_t`).
    pub fn squared_distance_profile(
        qt: &[f64],
        m: usize,
        i: usize,
        stats_q: &RollingStats,
        stats_t: &RollingStats,
    ) -> Vec<f64> {
        let mut out = vec![0.0; qt.len()];
        Self::fill_squared_distance_profile(
            &mut out,
            qt,
            m,
            stats_q.mean[i],
            stats_q.m_sigma_inv[i],
            &stats_t.mean,
            &stats_t.m_sigma_inv,
        );
        out
    }

    /// Squared distance profile of query window `i` of `ts_b` against `ts_a`,
    /// computed from scratch with direct dot products.
    pub fn direct_squared_distance_profile(
        ts_a: &[f64],
        ts_b: &[f64],
        i: usize,
        m: usize,
        stats_a: &RollingStats,
        stats_b: &RollingStats,
    ) -> Vec<f64> {
        let query = &ts_b[i..i + m];
        let qt: Vec<f64> = ts_a
            .windows(m)
            .map(|w| query.iter().zip(w).map(|(a, b)| a * b).sum())
            .collect();
        Self::squared_distance_profile(&qt, m, i, stats_b, stats_a)
    }

    /// Distance between query window `i` of `ts_b` and reference window `j`
    /// of `ts_a`.
    pub fn distance(
        ts_a: &[f64],
        ts_b: &[f64],
        i: usize,
        j: usize,
        m: usize,
        stats_a: &RollingStats,
        stats_b: &RollingStats,
    ) -> f64 {
        let qt: f64 = ts_b[i..i + m]
            .iter()
            .zip(&ts_a[j..j + m])
            .map(|(a, b)| a * b)
            .sum();
        Self::squared_distance(
            qt,
            m as f64,
            stats_b.mean[i],
            stats_b.m_sigma_inv[i],
            stats_a.mean[j],
            stats_a.m_sigma_inv[j],
        )
        .sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(ts: &[f64], m: usize) -> RollingStats {
        RollingStats::compute(ts, m).unwrap()
    }

    #[test]
    fn test_distance_identical_subsequences() {
        let ts = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let m = 4;
        let s = stats(&ts, m);
        let d = ZNormalizedEuclidean::distance(&ts, &ts, 0, 0, m, &s, &s);
        assert!(d.abs() < 1e-6, "Self-distance should be 0, got {d}");
    }

    #[test]
    fn test_distance_shifted_linear() {
        // [1,2,3,4] vs [3,4,5,6]: same shape, just shifted → d ≈ 0
        let ts = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let m = 4;
        let s = stats(&ts, m);
        let d = ZNormalizedEuclidean::distance(&ts, &ts, 0, 2, m, &s, &s);
        assert!(d < 1e-6, "Shifted linear sequences should have d≈0, got {d}");
    }

    #[test]
    fn test_distance_constant_both() {
        let ts = vec![5.0; 10];
        let m = 4;
        let s = stats(&ts, m);
        let d = ZNormalizedEuclidean::distance(&ts, &ts, 0, 3, m, &s, &s);
        assert_eq!(d, 0.0, "Two constant subsequences → d=0, got {d}");
    }

    #[test]
    fn test_distance_constant_different_levels() {
        // Constant windows at different levels are still identical once z-normalized
        let ts_a = vec![1.0; 6];
        let ts_b = vec![9.0; 6];
        let m = 3;
        let (stats_a, stats_b) = (stats(&ts_a, m), stats(&ts_b, m));
        let d = ZNormalizedEuclidean::distance(&ts_a, &ts_b, 0, 0, m, &stats_a, &stats_b);
        assert_eq!(d, 0.0);
    }

    #[test]
    fn test_distance_one_constant() {
        // [5,5,5,5] vs [1,2,3,4], one constant
        let ts = vec![5.0, 5.0, 5.0, 5.0, 1.0, 2.0, 3.0, 4.0];
        let m = 4;
        let s = stats(&ts, m);
        let d = ZNormalizedEuclidean::distance(&ts, &ts, 0, 4, m, &s, &s);
        let expected = (2.0 * 4.0_f64).sqrt();
        assert!(
            (d - expected).abs() < 1e-10,
            "One constant → d=sqrt(2m)={expected}, got {d}"
        );
    }

    #[test]
    fn test_distance_constant_inexact_levels() {
        // Flat windows at levels with no exact binary form
        let mut ts = vec![98765.4321; 8];
        ts.extend((0..8).map(|i| 98765.4321 + (i as f64 * 0.9).sin()));
        ts.extend(vec![1234.567; 8]);
        let m = 5;
        let s = stats(&ts, m);
        let (flat_a, bump, flat_b) = (0, 9, 19);
        assert!(s.is_constant(flat_a) && s.is_constant(flat_b));

        let d = ZNormalizedEuclidean::distance(&ts, &ts, flat_a, flat_b, m, &s, &s);
        assert_eq!(d, 0.0);
        let d = ZNormalizedEuclidean::distance(&ts, &ts, flat_a, bump, m, &s, &s);
        assert!((d - (2.0 * m as f64).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_squared_distance_hand_computed() {
        // ts = [1, 2, 3, 4], m = 2
        // Subseqs: [1,2] (mu=1.5, std=0.5), [2,3] (mu=2.5, std=0.5)
        // QT(0,1) = 1*2 + 2*3 = 8
        // r = (8 - 2*1.5*2.5) / (2*0.5*0.5) = 1.0 → D = 0
        let ts = vec![1.0, 2.0, 3.0, 4.0];
        let m = 2;
        let s = stats(&ts, m);
        let d2 = ZNormalizedEuclidean::squared_distance(
            8.0,
            2.0,
            s.mean[0],
            s.m_sigma_inv[0],
            s.mean[1],
            s.m_sigma_inv[1],
        );
        assert!(d2 < 1e-12, "Hand-computed: D should be ~0, got {d2}");
    }

    #[test]
    fn test_squared_distance_anticorrelated() {
        // [1,2] z-norm: [-1, 1], [4,3] z-norm: [1, -1], perfectly anticorrelated
        // QT(0,2) = 1*4 + 2*3 = 10
        // r = (10 - 2*1.5*3.5) / (2*0.5*0.5) = -1.0 → D = 2*2*2 = 8
        let ts = vec![1.0, 2.0, 4.0, 3.0];
        let m = 2;
        let s = stats(&ts, m);
        let d2 = ZNormalizedEuclidean::squared_distance(
            10.0,
            2.0,
            s.mean[0],
            s.m_sigma_inv[0],
            s.mean[2],
            s.m_sigma_inv[2],
        );
        assert!((d2 - 8.0).abs() < 1e-10, "Anticorrelated: expected 8, got {d2}");
    }

    #[test]
    fn test_profile_never_nan_with_constant_windows() {
        let ts = vec![3.0, 3.0, 3.0, 3.0, 1.0, 7.0, 2.0, 2.0, 2.0, 2.0];
        let m = 4;
        let s = stats(&ts, m);
        for i in 0..s.len() {
            let dp =
                ZNormalizedEuclidean::direct_squared_distance_profile(&ts, &ts, i, m, &s, &s);
            assert_eq!(dp.len(), s.len());
            for (j, d) in dp.iter().enumerate() {
                assert!(d.is_finite(), "D[{i}][{j}] = {d}");
                assert!((0.0..=4.0 * m as f64).contains(d));
            }
        }
    }

    #[test]
    fn test_chunked_fill_matches_whole_profile() {
        let ts: Vec<f64> = (0..40)
            .map(|i| (i as f64 * 0.37).sin() + 0.01 * i as f64)
            .collect();
        let m = 6;
        let s = stats(&ts, m);
        let query = &ts[3..3 + m];
        let qt: Vec<f64> = ts
            .windows(m)
            .map(|w| query.iter().zip(w).map(|(a, b)| a * b).sum())
            .collect();
        let whole = ZNormalizedEuclidean::squared_distance_profile(&qt, m, 3, &s, &s);

        let mut chunked = vec![0.0; qt.len()];
        for (start, end) in [(0, 10), (10, 11), (11, qt.len())] {
            ZNormalizedEuclidean::fill_squared_distance_profile(
                &mut chunked[start..end],
                &qt[start..end],
                m,
                s.mean[3],
                s.m_sigma_inv[3],
                &s.mean[start..end],
                &s.m_sigma_inv[start..end],
            );
        }
        assert_eq!(whole, chunked);
    }
}
