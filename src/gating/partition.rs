//! # Sample partitioner
//!
//! Applies a respiratory inclusion mask to the co-indexed k-space arrays.
//! The same subset of readout indices is selected identically across the
//! k-space samples, the trajectory coordinates, and the density
//! compensation weights, preserving relative order.

use ndarray::{ArrayView1, ArrayView2, Axis};

use crate::constants::{DcfWeights, GatingMask, KSpace, Trajectory};
use crate::regate_errors::RegateError;

/// Filter the k-space arrays down to the readouts where `mask == 1`.
///
/// Arguments
/// -----------------
/// * `mask`: binary inclusion mask, one label per readout.
/// * `ksp`: complex k-space samples, `(num_coils, num_readouts)`.
/// * `coord`: trajectory coordinates, `(num_readouts, num_dims)`.
/// * `dcf`: density compensation weights, `(num_readouts,)`.
///
/// Return
/// ----------
/// * The gated `(ksp, coord, dcf)` triple, with the readout axis shortened
///   to the number of `1`s in the mask, or
///   [`RegateError::ShapeMismatch`] if any array disagrees with the mask
///   length along the readout axis *before* filtering.
pub fn partition(
    mask: &GatingMask,
    ksp: ArrayView2<'_, num_complex::Complex64>,
    coord: ArrayView2<'_, f64>,
    dcf: ArrayView1<'_, f64>,
) -> Result<(KSpace, Trajectory, DcfWeights), RegateError> {
    let num_readouts = mask.len();
    check_readout_axis("k-space samples", num_readouts, ksp.ncols())?;
    check_readout_axis("trajectory coordinates", num_readouts, coord.nrows())?;
    check_readout_axis("density compensation weights", num_readouts, dcf.len())?;

    let keep: Vec<usize> = mask
        .iter()
        .enumerate()
        .filter_map(|(i, &m)| (m == 1).then_some(i))
        .collect();

    Ok((
        ksp.select(Axis(1), &keep),
        coord.select(Axis(0), &keep),
        dcf.select(Axis(0), &keep),
    ))
}

fn check_readout_axis(context: &str, expected: usize, actual: usize) -> Result<(), RegateError> {
    if expected != actual {
        return Err(RegateError::ShapeMismatch {
            context: context.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}
