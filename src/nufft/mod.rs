//! # Adjoint non-uniform FFT
//!
//! Gridding-based adjoint NUFFT mapping irregularly sampled k-space data to
//! a dense image volume. This is the numerically heavy stage of the
//! pipeline; everything upstream exists to decide *which* samples enter it.
//!
//! ## Overview
//! -----------------
//! For an output shape `n` and oversampling ratio `os`, a sample set is
//! reconstructed in five steps:
//!
//! 1. **Gridding** — each sample is spread onto an oversampled grid of
//!    `ceil(os · n)` points per axis with a separable Kaiser–Bessel window
//!    of support `width` ([`gridding::grid_samples`]), then the grid is
//!    divided by `width³`.
//! 2. **Inverse FFT** — centered, unnormalized inverse 3D FFT
//!    ([`fft::centered_ifft3`]).
//! 3. **Crop** — the central `n` block is cut out of the oversampled image.
//! 4. **Scale** — a single `1 / sqrt(prod(n))` factor normalizes the
//!    transform.
//! 5. **Apodization** — the Kaiser–Bessel roll-off is divided out per axis
//!    ([`kernel::apodization`]).
//!
//! The transform is linear in its input and adjoint to the corresponding
//! forward NUFFT; reconstruction quality is controlled by the
//! `oversamp`/`width` trade-off.

pub mod fft;
pub mod gridding;
pub mod kernel;

use ndarray::{Array3, ArrayView1, ArrayView2};
use num_complex::Complex64;

use crate::regate_errors::RegateError;

/// Adjoint NUFFT of a single coil's k-space samples.
///
/// Arguments
/// -----------------
/// * `ksp`: one complex sample per readout (already density-weighted).
/// * `coord`: `(num_readouts, 3)` spatial-frequency coordinates in
///   cycles/FOV, `[-n/2, n/2)` per axis.
/// * `img_shape`: output volume dimensions.
/// * `oversamp`: grid oversampling ratio, strictly greater than 1.
/// * `width`: interpolation kernel support in oversampled-grid units.
///
/// Return
/// ----------
/// * The complex image volume of shape `img_shape`, or a [`RegateError`]:
///   - [`RegateError::InsufficientSamples`] for an empty sample set,
///   - [`RegateError::ShapeMismatch`] if `coord` disagrees with `ksp`
///     along the readout axis,
///   - [`RegateError::Configuration`] for non-3D coordinates.
pub fn nufft_adjoint(
    ksp: ArrayView1<'_, Complex64>,
    coord: ArrayView2<'_, f64>,
    img_shape: [usize; 3],
    oversamp: f64,
    width: f64,
) -> Result<Array3<Complex64>, RegateError> {
    if ksp.is_empty() {
        return Err(RegateError::InsufficientSamples);
    }
    if coord.nrows() != ksp.len() {
        return Err(RegateError::ShapeMismatch {
            context: "trajectory coordinates".to_string(),
            expected: ksp.len(),
            actual: coord.nrows(),
        });
    }
    if coord.ncols() != 3 {
        return Err(RegateError::Configuration(format!(
            "volumetric reconstruction requires 3-dimensional trajectories, got {}",
            coord.ncols()
        )));
    }

    let beta = kernel::kb_beta(width, oversamp);
    let os_shape = [
        (oversamp * img_shape[0] as f64).ceil() as usize,
        (oversamp * img_shape[1] as f64).ceil() as usize,
        (oversamp * img_shape[2] as f64).ceil() as usize,
    ];

    let mut grid = gridding::grid_samples(ksp, coord, img_shape, os_shape, width, beta);
    let kernel_norm = width.powi(3);
    grid.mapv_inplace(|v| v / kernel_norm);

    let os_img = fft::centered_ifft3(grid);

    // Center crop, transform normalization, and apodization in one pass.
    let scale = 1.0 / (img_shape.iter().product::<usize>() as f64).sqrt();
    let offset = [
        os_shape[0] / 2 - img_shape[0] / 2,
        os_shape[1] / 2 - img_shape[1] / 2,
        os_shape[2] / 2 - img_shape[2] / 2,
    ];
    let apod: [Vec<f64>; 3] = [
        apod_axis(img_shape[0], os_shape[0], width, beta),
        apod_axis(img_shape[1], os_shape[1], width, beta),
        apod_axis(img_shape[2], os_shape[2], width, beta),
    ];

    Ok(Array3::from_shape_fn(img_shape, |(i, j, k)| {
        os_img[[offset[0] + i, offset[1] + j, offset[2] + k]]
            * (scale * apod[0][i] * apod[1][j] * apod[2][k])
    }))
}

fn apod_axis(n: usize, os_n: usize, width: f64, beta: f64) -> Vec<f64> {
    (0..n)
        .map(|k| kernel::apodization(k, n, os_n, width, beta))
        .collect()
}
