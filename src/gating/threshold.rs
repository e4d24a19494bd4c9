//! # Respiratory signal thresholder
//!
//! Converts a raw respiratory trace into a binary inclusion mask using
//! robust statistics. The trace is standardized around its median with a
//! MAD-based scale estimate (resistant to heavy-tailed drift, unlike
//! mean/std standardization), the extreme tails are cut away, and the
//! gating threshold is taken as a percentile of the retained central band.
//!
//! ## Overview
//! -----------------
//! For a trace `r` and gating percentile `q`:
//!
//! 1. `sigma = 1.4826 · median(|r − median(r)|)` — Gaussian-equivalent
//!    robust scale. A zero scale means the trace carries no usable
//!    variation and is rejected as degenerate.
//! 2. `s = −(r − median(r)) / sigma` — standardization with sign inversion,
//!    so that *low* values correspond to end-expiration, the most stable
//!    respiratory phase.
//! 3. Samples outside `[P(margin), P(100 − margin))` of `s` are extreme and
//!    excluded outright; they would otherwise skew the threshold estimate.
//! 4. `thresh = P(q)` over the retained samples; a sample is included iff
//!    `s < thresh` and it is not extreme.
//!
//! Percentiles use linear interpolation between order statistics.

use ndarray::ArrayView1;

use crate::constants::{GatingMask, DEFAULT_MARGIN_PERCENT, MAD_SCALE};
use crate::regate_errors::RegateError;

/// Tuning of the respiratory thresholder.
#[derive(Debug, Clone, PartialEq)]
pub struct GatingParams {
    /// Gating threshold as a percentile of the retained band, in `[0, 100]`.
    /// `50` gates on the median of the central band.
    pub gating_thresh: f64,
    /// Reserved weighting option; accepted for configuration compatibility,
    /// numerically inert.
    pub gating_weight: f64,
    /// Percent trimmed from each tail of the standardized signal before the
    /// threshold is estimated.
    pub margin_percent: f64,
    /// Reserved sign-convention override; accepted for configuration
    /// compatibility, numerically inert.
    pub flip: bool,
}

impl Default for GatingParams {
    fn default() -> Self {
        GatingParams {
            gating_thresh: 50.0,
            gating_weight: 1.0,
            margin_percent: DEFAULT_MARGIN_PERCENT,
            flip: false,
        }
    }
}

impl GatingParams {
    /// Check the parameters against their admissible domains.
    pub fn validate(&self) -> Result<(), RegateError> {
        if !(0.0..=100.0).contains(&self.gating_thresh) {
            return Err(RegateError::Configuration(format!(
                "gating_thresh must be a percentile in [0, 100], got {}",
                self.gating_thresh
            )));
        }
        if !(0.0..50.0).contains(&self.margin_percent) {
            return Err(RegateError::Configuration(format!(
                "margin_percent must be in [0, 50), got {}",
                self.margin_percent
            )));
        }
        if !self.gating_weight.is_finite() || self.gating_weight < 0.0 {
            return Err(RegateError::Configuration(format!(
                "gating_weight must be finite and non-negative, got {}",
                self.gating_weight
            )));
        }
        Ok(())
    }
}

/// Derive the binary inclusion mask from a respiratory trace.
///
/// The input trace is never mutated; all statistics are computed on a
/// private working copy. Re-running with identical inputs yields a
/// bitwise-identical mask.
///
/// Arguments
/// -----------------
/// * `trace`: one real-valued respiratory sample per readout, time-ordered.
/// * `params`: thresholder tuning, see [`GatingParams`].
///
/// Return
/// ----------
/// * A `0`/`1` mask of the same length as `trace`, or a [`RegateError`]:
///   - [`RegateError::DegenerateSignal`] for an empty or zero-variation
///     trace (the robust scale estimate vanishes),
///   - [`RegateError::Configuration`] for parameters outside their domain.
///
/// Boundary behavior
/// -----------------
/// `gating_thresh <= 0` produces an all-zero mask, `gating_thresh >= 100`
/// includes every non-extreme sample. Both are handled explicitly: the
/// strict `s < thresh` comparison alone would silently drop the maximum
/// retained sample at the upper boundary.
pub fn threshold_mask(
    trace: ArrayView1<'_, f64>,
    params: &GatingParams,
) -> Result<GatingMask, RegateError> {
    params.validate()?;

    if trace.is_empty() {
        return Err(RegateError::DegenerateSignal(
            "respiratory trace is empty".to_string(),
        ));
    }

    let samples: Vec<f64> = trace.iter().copied().collect();
    let med = median(&samples);

    let deviations: Vec<f64> = samples.iter().map(|x| (x - med).abs()).collect();
    let sigma = MAD_SCALE * median(&deviations);
    if sigma == 0.0 {
        return Err(RegateError::DegenerateSignal(
            "zero-variance respiratory trace (robust scale estimate is 0)".to_string(),
        ));
    }

    // Standardize with approximately unit variance and zero median; the sign
    // inversion orients end-expiration towards low values.
    let standardized: Vec<f64> = samples.iter().map(|x| -(x - med) / sigma).collect();

    let mut sorted = standardized.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let low_cut = percentile_of_sorted(&sorted, params.margin_percent);
    let high_cut = percentile_of_sorted(&sorted, 100.0 - params.margin_percent);

    // The sorted retained band inherits the ordering of `sorted`.
    let retained: Vec<f64> = sorted
        .iter()
        .copied()
        .filter(|&s| s >= low_cut && s < high_cut)
        .collect();
    if retained.is_empty() {
        // Every sample fell outside the cut-off band (only possible with
        // massive ties near the cuts); nothing is safe to gate on.
        return Ok(GatingMask::zeros(trace.len()));
    }

    let thresh = percentile_of_sorted(&retained, params.gating_thresh);

    let mask: Vec<u8> = standardized
        .iter()
        .map(|&s| {
            let in_band = s >= low_cut && s < high_cut;
            let below = if params.gating_thresh <= 0.0 {
                false
            } else if params.gating_thresh >= 100.0 {
                true
            } else {
                s < thresh
            };
            u8::from(in_band && below)
        })
        .collect();

    Ok(GatingMask::from_vec(mask))
}

/// Median of a slice (sorts a copy).
fn median(data: &[f64]) -> f64 {
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Percentile of an ascending-sorted slice, with linear interpolation
/// between adjacent order statistics: rank `q/100 · (N − 1)`.
fn percentile_of_sorted(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let q = q.clamp(0.0, 100.0);
    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = rank - lo as f64;
        sorted[lo] + frac * (sorted[hi] - sorted[lo])
    }
}
