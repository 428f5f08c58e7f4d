use crate::core::error::{Error, Result, SeriesRole};

/// Check that a series can take part in a profile with window `m`.
///
/// Requires `2 <= m < ts.len()` and every value finite.
pub fn validate_series(ts: &[f64], m: usize, series: SeriesRole) -> Result<()> {
    if m < 2 {
        return Err(Error::WindowTooShort { m });
    }
    if m >= ts.len() {
        return Err(Error::WindowTooLong {
            series,
            m,
            len: ts.len(),
        });
    }
    if let Some((index, &value)) = ts.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(Error::NonFinite {
            series,
            index,
            value,
        });
    }
    Ok(())
}

/// Whether two series hold exactly the same values.
///
/// Slices that alias the same memory compare equal without a scan.
pub fn are_arrays_equal(a: &[f64], b: &[f64]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    if std::ptr::eq(a.as_ptr(), b.as_ptr()) {
        return true;
    }
    a == b
}

/// Whether a profile looks degenerate: its mean, or every entry, is below
/// `threshold`.
pub fn are_distances_too_small(distances: &[f64], threshold: f64) -> bool {
    if distances.is_empty() {
        return false;
    }
    mean(distances) < threshold || distances.iter().all(|&d| d < threshold)
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
