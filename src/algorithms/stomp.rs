use std::borrow::Cow;
use std::ops::Range;

use crate::algorithms::common::JoinInputs;
use crate::algorithms::first_row::{first_profile_row, QtSeed};
use crate::algorithms::recurrence::QtRecurrence;
use crate::core::diagnostics::{Diagnostic, DiagnosticSink};
use crate::core::error::{Error, Result, SeriesRole};
use crate::core::matrix_profile::{MatrixProfile, MatrixProfileConfig, RollingStats};
use crate::core::validation::{are_arrays_equal, are_distances_too_small, mean, validate_series};

/// Compute the matrix profile of `ts_b` against `ts_a` using STOMP.
///
/// For every window of the query series `ts_b` (or `ts_a` itself when
/// `ts_b` is `None`) returns the distance to and index of its nearest
/// neighbor among the windows of `ts_a`. Omitting `ts_b` forces a
/// self-join regardless of `config.ignore_trivial`.
///
/// Row 0 is computed directly; rows `1..l` come from the QT recurrence,
/// O(k) per row instead of O(k*m).
///
/// Non-fatal configuration warnings are sent to `sink`.
pub fn stomp(
    ts_a: &[f64],
    ts_b: Option<&[f64]>,
    config: &MatrixProfileConfig,
    sink: &mut dyn DiagnosticSink,
) -> Result<MatrixProfile> {
    let n_query = ts_b.unwrap_or(ts_a).len();
    let n_rows = (n_query + 1).saturating_sub(config.m);
    stomp_range(ts_a, ts_b, config, 0..n_rows, sink)
}

/// Compute only the rows `range` of the matrix profile.
///
/// Row `range.start` is computed directly, the rest by recurrence from it.
/// Concatenating the results of disjoint ranges reproduces [`stomp`].
pub fn stomp_range(
    ts_a: &[f64],
    ts_b: Option<&[f64]>,
    config: &MatrixProfileConfig,
    range: Range<usize>,
    sink: &mut dyn DiagnosticSink,
) -> Result<MatrixProfile> {
    config.validate()?;
    let m = config.m;

    validate_series(ts_a, m, SeriesRole::Reference)?;
    let (ts_b, config) = match ts_b {
        Some(ts_b) => {
            validate_series(ts_b, m, SeriesRole::Query)?;
            (ts_b, Cow::Borrowed(config))
        }
        None => (
            ts_a,
            Cow::Owned(config.clone().with_ignore_trivial(true)),
        ),
    };

    let n_rows = ts_b.len() - m + 1;
    if range.start >= range.end || range.end > n_rows {
        return Err(Error::invalid_range(range.start, range.end, n_rows));
    }

    let arrays_equal = are_arrays_equal(ts_a, ts_b);
    if !config.ignore_trivial && arrays_equal {
        sink.emit(Diagnostic::AbJoinOnEqualArrays);
    }
    if config.ignore_trivial && !arrays_equal {
        sink.emit(Diagnostic::SelfJoinOnDistinctArrays);
    }

    let stats_a = RollingStats::compute(ts_a, m)?;
    let stats_b = if arrays_equal {
        stats_a.clone()
    } else {
        RollingStats::compute(ts_b, m)?
    };

    let zone = config.trivial_match_zone();
    let inputs = JoinInputs {
        ts_a,
        ts_b,
        m,
        stats_a: &stats_a,
        stats_b: &stats_b,
        zone,
    };

    log::debug!(
        "stomp: n_a={}, n_b={}, m={m}, k={}, rows={}..{}, exclusion_zone={zone:?}",
        ts_a.len(),
        ts_b.len(),
        inputs.n_reference(),
        range.start,
        range.end,
    );
    #[cfg(feature = "parallel")]
    log::trace!(
        "stomp: column loop parallel={}",
        inputs.n_reference() >= crate::algorithms::recurrence::MIN_PARALLEL_COLUMNS
    );

    let seed = QtSeed::compute(ts_a, ts_b, m, range.start);
    let mut rows = Vec::with_capacity(range.end - range.start);
    rows.push(first_profile_row(&inputs, range.start, &seed.qt));

    let mut recurrence = QtRecurrence::new(inputs, seed, range.start);
    rows.extend(recurrence.run(range.end));

    let mp = MatrixProfile::from_rows(rows, &config, range.start);

    let distances = mp.distances();
    if are_distances_too_small(&distances, config.near_zero_threshold) {
        sink.emit(Diagnostic::DistancesTooSmall {
            threshold: config.near_zero_threshold,
            mean: mean(&distances),
        });
    }

    log::debug!("stomp: computed {} rows", mp.len());
    Ok(mp)
}
