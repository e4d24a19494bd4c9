//! Centered 3D inverse FFT on top of `rustfft`.
//!
//! `rustfft` provides 1D transforms only; the 3D transform is applied
//! axis by axis, gathering strided lanes into a scratch buffer where the
//! memory layout is not contiguous. Transforms are unnormalized — the
//! adjoint NUFFT applies its single combined scale factor afterwards.

use ndarray::{Array3, Axis};
use num_complex::Complex64;
use rustfft::{Fft, FftDirection, FftPlanner};
use std::sync::Arc;

/// Inverse 3D FFT with centered conventions:
/// `fftshift(ifft3(ifftshift(grid)))`, unnormalized.
pub fn centered_ifft3(grid: Array3<Complex64>) -> Array3<Complex64> {
    let mut data = ifftshift3(&grid);
    ifft3_inplace(&mut data);
    fftshift3(&data)
}

/// Unnormalized inverse 3D FFT, axis by axis.
fn ifft3_inplace(data: &mut Array3<Complex64>) {
    let mut planner = FftPlanner::new();
    let dims = data.dim();
    let plans: [Arc<dyn Fft<f64>>; 3] = [
        planner.plan_fft(dims.0, FftDirection::Inverse),
        planner.plan_fft(dims.1, FftDirection::Inverse),
        planner.plan_fft(dims.2, FftDirection::Inverse),
    ];

    for (axis, plan) in plans.iter().enumerate() {
        let mut scratch = vec![Complex64::new(0.0, 0.0); plan.get_inplace_scratch_len()];
        let mut buffer = vec![Complex64::new(0.0, 0.0); plan.len()];
        for mut lane in data.lanes_mut(Axis(axis)) {
            if let Some(slice) = lane.as_slice_mut() {
                plan.process_with_scratch(slice, &mut scratch);
            } else {
                for (dst, src) in buffer.iter_mut().zip(lane.iter()) {
                    *dst = *src;
                }
                plan.process_with_scratch(&mut buffer, &mut scratch);
                for (dst, src) in lane.iter_mut().zip(buffer.iter()) {
                    *dst = *src;
                }
            }
        }
    }
}

/// Cyclically roll each axis forward by `shift`, `out[i] = in[(i + shift) % n]`.
fn roll3(src: &Array3<Complex64>, shift: [usize; 3]) -> Array3<Complex64> {
    let (n0, n1, n2) = src.dim();
    Array3::from_shape_fn((n0, n1, n2), |(i, j, k)| {
        src[[
            (i + shift[0]) % n0,
            (j + shift[1]) % n1,
            (k + shift[2]) % n2,
        ]]
    })
}

/// Move the grid center (`n/2` per axis) to index 0.
pub fn ifftshift3(src: &Array3<Complex64>) -> Array3<Complex64> {
    let (n0, n1, n2) = src.dim();
    roll3(src, [n0 / 2, n1 / 2, n2 / 2])
}

/// Move index 0 back to the grid center (`n/2` per axis).
pub fn fftshift3(src: &Array3<Complex64>) -> Array3<Complex64> {
    let (n0, n1, n2) = src.dim();
    roll3(src, [n0 - n0 / 2, n1 - n1 / 2, n2 - n2 / 2])
}
