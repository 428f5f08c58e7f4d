use realfft::RealFftPlanner;

use crate::core::matrix_profile::{ProfileRow, RollingStats};

/// Size threshold (n * m) above which we dispatch to the FFT path.
/// Below this, the naive O(n*m) loop wins due to lower constant overhead.
const FFT_THRESHOLD: usize = 256 * 1024;

/// Compute the sliding dot product between a query subsequence `q` and time series `ts`.
///
/// Returns a vector of length `ts.len() - q.len() + 1` where element `i` is
/// `dot(q, ts[i..i+m])`, or an empty vector when `ts` is shorter than `q`.
///
/// Adaptively dispatches to an FFT-based O(n log n) implementation for large
/// inputs, falling back to the naive O(n*m) loop for small inputs.
pub fn sliding_dot_product(q: &[f64], ts: &[f64]) -> Vec<f64> {
    let m = q.len();
    let n = ts.len();
    if n < m || m == 0 {
        return Vec::new();
    }
    if n * m > FFT_THRESHOLD {
        sliding_dot_product_fft(q, ts)
    } else {
        sliding_dot_product_naive(q, ts)
    }
}

/// Naive O(n*m) sliding dot product.
pub fn sliding_dot_product_naive(q: &[f64], ts: &[f64]) -> Vec<f64> {
    if ts.len() < q.len() || q.is_empty() {
        return Vec::new();
    }
    ts.windows(q.len())
        .map(|w| q.iter().zip(w).map(|(a, b)| a * b).sum())
        .collect()
}

/// FFT-based O(n log n) sliding dot product via cross-correlation.
///
/// Uses real-to-complex FFT to compute the convolution of the reversed query
/// with the time series, then extracts the dot-product values.
pub fn sliding_dot_product_fft(q: &[f64], ts: &[f64]) -> Vec<f64> {
    let m = q.len();
    let n = ts.len();
    if n < m || m == 0 {
        return Vec::new();
    }
    let n_subs = n - m + 1;
    let conv_len = n + m - 1;
    let fft_len = conv_len.next_power_of_two();

    let mut planner = RealFftPlanner::<f64>::new();
    let fft_forward = planner.plan_fft_forward(fft_len);
    let fft_inverse = planner.plan_fft_inverse(fft_len);

    // Reverse query into zero-padded buffer
    let mut q_padded = vec![0.0; fft_len];
    for (dst, &src) in q_padded.iter_mut().zip(q.iter().rev()) {
        *dst = src;
    }

    let mut ts_padded = vec![0.0; fft_len];
    ts_padded[..n].copy_from_slice(ts);

    let mut q_spectrum = fft_forward.make_output_vec();
    let mut ts_spectrum = fft_forward.make_output_vec();
    let mut result = vec![0.0; fft_len];

    // Buffer lengths come from the plans, so these only fail on a planner bug.
    if fft_forward.process(&mut q_padded, &mut q_spectrum).is_err()
        || fft_forward.process(&mut ts_padded, &mut ts_spectrum).is_err()
    {
        return sliding_dot_product_naive(q, ts);
    }

    for (q_val, ts_val) in q_spectrum.iter_mut().zip(ts_spectrum.iter()) {
        *q_val *= ts_val;
    }

    if fft_inverse.process(&mut q_spectrum, &mut result).is_err() {
        return sliding_dot_product_naive(q, ts);
    }

    // realfft inverse is unnormalized, divide by fft_len
    let norm = 1.0 / fft_len as f64;

    // Extract dot products: convolution result at indices [m-1 .. m-1+n_subs]
    result[m - 1..m - 1 + n_subs]
        .iter()
        .map(|&x| x * norm)
        .collect()
}

/// Read-only inputs shared by the first-row initializer and the recurrence.
///
/// `ts_a` is the reference series, `ts_b` the query series. `zone` is the
/// exclusion zone half-width for self-joins and `None` for AB-joins.
#[derive(Debug, Clone, Copy)]
pub struct JoinInputs<'a> {
    pub ts_a: &'a [f64],
    pub ts_b: &'a [f64],
    pub m: usize,
    pub stats_a: &'a RollingStats,
    pub stats_b: &'a RollingStats,
    pub zone: Option<usize>,
}

impl JoinInputs<'_> {
    /// Number of reference windows (length of every distance profile).
    pub fn n_reference(&self) -> usize {
        self.stats_a.len()
    }

    /// Number of query windows (rows of the full profile).
    pub fn n_query(&self) -> usize {
        self.stats_b.len()
    }
}

/// Apply an exclusion zone around index `idx`, setting entries within the zone to infinity.
///
/// The zone covers indices `[idx - zone, idx + zone]` (clamped to bounds).
#[inline]
pub fn apply_exclusion_zone(profile: &mut [f64], idx: usize, zone: usize) {
    let end = idx.saturating_add(zone).saturating_add(1).min(profile.len());
    let start = idx.saturating_sub(zone).min(end);
    for val in &mut profile[start..end] {
        *val = f64::INFINITY;
    }
}

/// Index of the smallest finite value; ties resolve to the lowest index.
#[inline]
pub fn argmin(values: &[f64]) -> Option<usize> {
    let mut best = f64::INFINITY;
    let mut best_idx = None;
    for (j, &v) in values.iter().enumerate() {
        if v < best {
            best = v;
            best_idx = Some(j);
        }
    }
    best_idx
}

/// Reduce the squared distance profile of query index `i` to a profile row.
///
/// With `Some(zone)` (self-join) the exclusion zone is masked in place and
/// left/right neighbors are searched in `[0, i)` and `(i, k)`. With `None`
/// (AB-join) left/right neighbors are undefined.
pub fn nearest_neighbors(squared: &mut [f64], i: usize, zone: Option<usize>) -> ProfileRow {
    if let Some(zone) = zone {
        apply_exclusion_zone(squared, i, zone);
    }

    let (index, distance) = match argmin(squared) {
        Some(j) => (j as i64, squared[j].sqrt()),
        None => (ProfileRow::NO_NEIGHBOR, f64::INFINITY),
    };

    let (left_index, right_index) = if zone.is_some() {
        let left = argmin(&squared[..i.min(squared.len())])
            .map_or(ProfileRow::NO_NEIGHBOR, |j| j as i64);
        let right = squared
            .get(i + 1..)
            .and_then(argmin)
            .map_or(ProfileRow::NO_NEIGHBOR, |j| (i + 1 + j) as i64);
        (left, right)
    } else {
        (ProfileRow::NO_NEIGHBOR, ProfileRow::NO_NEIGHBOR)
    };

    ProfileRow {
        distance,
        index,
        left_index,
        right_index,
    }
}
