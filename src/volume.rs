//! # Volume output
//!
//! Min–max normalization and NIfTI-1 serialization of reconstructed
//! magnitude volumes. Volumes are written with an identity spatial
//! transform (the pipeline carries no geometry beyond voxel indices) and
//! the `<strategy>.nii.gz` naming convention of the batch driver.

use camino::{Utf8Path, Utf8PathBuf};
use nalgebra::Matrix4;
use nifti::writer::WriterOptions;
use nifti::NiftiHeader;
use tracing::info;

use crate::constants::Volume;
use crate::regate_errors::RegateError;

/// Min–max normalize an array into `[min_val, max_val]`, preserving NaNs.
///
/// NaN entries are ignored when locating the data range and stay NaN in
/// the output. A constant (or all-NaN) input maps to the midpoint of the
/// target range.
pub fn minmax_normalize(volume: &Volume, min_val: f64, max_val: f64) -> Volume {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &v in volume.iter() {
        if v.is_nan() {
            continue;
        }
        lo = lo.min(v);
        hi = hi.max(v);
    }

    if !lo.is_finite() || lo == hi {
        let mid = (min_val + max_val) / 2.0;
        return volume.mapv(|v| if v.is_nan() { v } else { mid });
    }

    let span = hi - lo;
    volume.mapv(|v| {
        if v.is_nan() {
            v
        } else {
            (v - lo) / span * (max_val - min_val) + min_val
        }
    })
}

/// Write a magnitude volume as `<name>.nii.gz` under `out_dir`.
///
/// The volume is normalized to `[0, 255]` and stored with an identity
/// 4×4 affine. Returns the path of the written file.
pub fn save_nifti(
    volume: &Volume,
    name: &str,
    out_dir: &Utf8Path,
) -> Result<Utf8PathBuf, RegateError> {
    let path = out_dir.join(format!("{name}.nii.gz"));
    info!(%path, "saving reconstructed volume");

    let normalized = minmax_normalize(volume, 0.0, 255.0);

    let affine: Matrix4<f64> = Matrix4::identity();
    let mut header = NiftiHeader::default();
    header.set_affine(&affine);

    WriterOptions::new(&path)
        .reference_header(&header)
        .write_nifti(&normalized)?;

    Ok(path)
}
