//! Sample spreading onto the oversampled grid.
//!
//! Each k-space sample is deposited onto its neighboring grid points with
//! separable Kaiser–Bessel weights. Coordinates arrive in cycles/FOV
//! (`[-n/2, n/2)` per axis) and are mapped to oversampled-grid index space
//! here; out-of-range neighbors wrap cyclically, consistent with the
//! periodicity of the subsequent FFT.

use ndarray::{Array3, ArrayView1, ArrayView2};
use num_complex::Complex64;

use crate::nufft::kernel::kaiser_bessel;

/// Spread all samples onto a zero-initialized oversampled grid.
///
/// Arguments
/// -----------------
/// * `ksp`: one complex sample per readout (already density-weighted).
/// * `coord`: `(num_readouts, 3)` coordinates in cycles/FOV.
/// * `img_shape` / `os_shape`: final and oversampled grid dimensions.
/// * `width`: kernel support in oversampled-grid units.
/// * `beta`: Kaiser–Bessel shape parameter.
pub fn grid_samples(
    ksp: ArrayView1<'_, Complex64>,
    coord: ArrayView2<'_, f64>,
    img_shape: [usize; 3],
    os_shape: [usize; 3],
    width: f64,
    beta: f64,
) -> Array3<Complex64> {
    let mut grid = Array3::from_elem(os_shape, Complex64::new(0.0, 0.0));

    // Per-axis scale and center shift mapping cycles/FOV to grid indices.
    let scale = [
        os_shape[0] as f64 / img_shape[0] as f64,
        os_shape[1] as f64 / img_shape[1] as f64,
        os_shape[2] as f64 / img_shape[2] as f64,
    ];
    let shift = [
        (os_shape[0] / 2) as f64,
        (os_shape[1] / 2) as f64,
        (os_shape[2] / 2) as f64,
    ];

    let mut wx: Vec<(usize, f64)> = Vec::with_capacity(width as usize + 2);
    let mut wy: Vec<(usize, f64)> = Vec::with_capacity(width as usize + 2);
    let mut wz: Vec<(usize, f64)> = Vec::with_capacity(width as usize + 2);

    for (j, &value) in ksp.iter().enumerate() {
        let c = [
            coord[[j, 0]] * scale[0] + shift[0],
            coord[[j, 1]] * scale[1] + shift[1],
            coord[[j, 2]] * scale[2] + shift[2],
        ];

        neighbor_weights(c[0], width, beta, os_shape[0], &mut wx);
        neighbor_weights(c[1], width, beta, os_shape[1], &mut wy);
        neighbor_weights(c[2], width, beta, os_shape[2], &mut wz);

        for &(gx, w0) in &wx {
            for &(gy, w1) in &wy {
                let w01 = w0 * w1;
                for &(gz, w2) in &wz {
                    grid[[gx, gy, gz]] += value * (w01 * w2);
                }
            }
        }
    }

    grid
}

/// Collect the grid neighbors of a continuous coordinate together with
/// their kernel weights. Support is `[c - width/2, c + width/2]`; indices
/// wrap into `[0, n)`.
fn neighbor_weights(c: f64, width: f64, beta: f64, n: usize, out: &mut Vec<(usize, f64)>) {
    out.clear();
    let half = width / 2.0;
    let start = (c - half).ceil() as i64;
    let end = (c + half).floor() as i64;
    for g in start..=end {
        let w = kaiser_bessel((c - g as f64) / half, beta);
        if w > 0.0 {
            out.push((g.rem_euclid(n as i64) as usize, w));
        }
    }
}

#[cfg(test)]
mod gridding_test {
    use ndarray::{Array1, Array2};

    use super::*;
    use crate::nufft::kernel::kb_beta;

    #[test]
    fn single_sample_mass_is_localized_around_its_coordinate() {
        let img_shape = [16, 16, 16];
        let os_shape = [20, 20, 20];
        let (width, oversamp) = (4.0, 1.25);
        let beta = kb_beta(width, oversamp);

        // Sample at the k-space origin maps to the grid center (10, 10, 10).
        let ksp = Array1::from_vec(vec![Complex64::new(1.0, 0.0)]);
        let coord = Array2::zeros((1, 3));

        let grid = grid_samples(ksp.view(), coord.view(), img_shape, os_shape, width, beta);

        let center = grid[[10, 10, 10]].re;
        assert!(center > 0.0);
        // All deposited mass lies within the kernel support of the center.
        for ((i, j, k), v) in grid.indexed_iter() {
            let far = [i, j, k]
                .iter()
                .any(|&idx| (idx as f64 - 10.0).abs() > width / 2.0);
            if far {
                assert_eq!(v.norm(), 0.0, "unexpected mass at ({i}, {j}, {k})");
            }
        }
        assert!(center >= grid[[10, 10, 12]].re);
    }

    #[test]
    fn neighbor_weights_wrap_at_grid_edges() {
        let beta = kb_beta(4.0, 1.25);
        let mut out = Vec::new();
        // Coordinate near index 0: part of the support wraps to the top end.
        neighbor_weights(0.5, 4.0, beta, 20, &mut out);
        assert!(out.iter().any(|&(g, _)| g >= 18));
        assert!(out.iter().any(|&(g, _)| g <= 2));
        assert!(out.iter().all(|&(_, w)| w > 0.0));
    }
}
